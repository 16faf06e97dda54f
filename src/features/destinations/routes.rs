use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::destinations::handlers;
use crate::features::destinations::services::DestinationService;

/// Destination routes. Reads are public; mutations require the editor role.
pub fn routes(service: Arc<DestinationService>) -> Router {
    Router::new()
        .route(
            "/api/destinations",
            get(handlers::list_destinations).post(handlers::create_destination),
        )
        .route(
            "/api/destinations/{id}",
            get(handlers::get_destination)
                .put(handlers::update_destination)
                .delete(handlers::delete_destination)
                .patch(handlers::toggle_destination),
        )
        .with_state(service)
}
