pub mod condition;
pub mod display;

pub use condition::*;
pub use display::*;
