mod admin_handler;
mod public_handler;

pub use admin_handler::*;
pub use public_handler::*;
