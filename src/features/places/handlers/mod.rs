pub mod place_handler;

pub use place_handler::*;
