mod callbacks;
mod coordinator;
mod dispatcher;
mod errors;
mod work_unit;


pub use {self::callbacks::*, self::coordinator::*, self::dispatcher::*, self::errors::*, self::work_unit::*};
