mod core;
mod handlers;

pub use core::*;
pub use handlers::*;
