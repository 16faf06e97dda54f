pub mod image_service;

pub use image_service::{dropped_urls, ImageService};
