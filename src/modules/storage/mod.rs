//! Storage module for image blobs
//!
//! Provides the `ObjectStore` seam and its S3-compatible (Cloudflare R2)
//! implementation.

mod object_store;
mod r2_client;

#[cfg(test)]
mod memory;

pub use object_store::ObjectStore;
pub use r2_client::R2Storage;

#[cfg(test)]
pub use memory::MemoryStore;
