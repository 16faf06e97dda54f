use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;

/// Category routes. Reads are public; mutations require the editor role.
pub fn routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route(
            "/api/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/api/categories/{id}",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category)
                .patch(handlers::toggle_category),
        )
        .with_state(service)
}
