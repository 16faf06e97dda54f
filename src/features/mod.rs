pub mod ads;
pub mod auth;
pub mod categories;
pub mod destinations;
pub mod images;
pub mod places;
