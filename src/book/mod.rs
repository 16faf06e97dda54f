//! Client-side state of the interactive tour book.
//!
//! [`navigator`] is the pure page state machine; [`session`] couples it with a
//! data source so that choosing a category or place loads what the next page
//! shows.

pub mod navigator;
pub mod session;

pub use navigator::{BookNavigator, FlipDirection, Navigation, Notice, NoticeLevel, Page, Selection};
pub use session::{BookSession, TourDataSource};
