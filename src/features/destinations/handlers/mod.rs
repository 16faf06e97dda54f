pub mod destination_handler;

pub use destination_handler::*;
