mod repeat_timer;


pub use self::repeat_timer::*;
