pub mod place_service;

pub use place_service::PlaceService;
