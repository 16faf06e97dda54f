//! tourbook: a tourism content API (categories, destinations, places, ads and
//! their images), the interactive book navigator that browses it, and a typed
//! client for the REST surface.

pub mod book;
pub mod client;
pub mod core;
pub mod features;
pub mod modules;
pub mod shared;
