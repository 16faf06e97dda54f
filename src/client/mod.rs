//! Typed HTTP client for the tourbook REST API.

pub mod error;
pub mod tourbook_client;

mod data_source;

pub use error::ClientError;
pub use tourbook_client::{Listing, TourbookClient};
