mod handler;
mod registry;
mod token;

#[cfg(test)]
mod tests;

pub use {self::handler::*, self::registry::*, self::token::*};
