pub mod ad_service;

pub use ad_service::AdService;
