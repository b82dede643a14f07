mod completion_barrier;

pub use self::completion_barrier::*;
