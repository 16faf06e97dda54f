pub mod destination_dto;

pub use destination_dto::*;
