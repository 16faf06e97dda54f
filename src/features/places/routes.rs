use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::places::handlers;
use crate::features::places::services::PlaceService;

/// Place routes. Reads are public; mutations require the editor role.
pub fn routes(service: Arc<PlaceService>) -> Router {
    Router::new()
        .route(
            "/api/places",
            get(handlers::list_places).post(handlers::create_place),
        )
        .route(
            "/api/places/{id}",
            get(handlers::get_place)
                .put(handlers::update_place)
                .delete(handlers::delete_place)
                .patch(handlers::toggle_place),
        )
        .with_state(service)
}
