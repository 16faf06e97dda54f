use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::ads::handlers;
use crate::features::ads::services::AdService;

/// Ad routes. Reads are public; mutations require the editor role.
pub fn routes(service: Arc<AdService>) -> Router {
    Router::new()
        .route(
            "/api/ads",
            get(handlers::list_ads).post(handlers::create_ad),
        )
        .route(
            "/api/ads/{id}",
            get(handlers::get_ad)
                .put(handlers::update_ad)
                .delete(handlers::delete_ad)
                .patch(handlers::toggle_ad),
        )
        .with_state(service)
}
