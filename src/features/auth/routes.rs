use crate::features::auth::handlers;
use crate::features::auth::services::SessionService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Auth routes. Sign-in is public; the rest rely on the session middleware
/// having resolved a user.
pub fn routes(service: Arc<SessionService>) -> Router {
    Router::new()
        .route("/api/auth/sign-in", post(handlers::sign_in))
        .route("/api/auth/sign-out", post(handlers::sign_out))
        .route("/api/auth/session", get(handlers::get_session))
        .route("/api/auth/users", post(handlers::create_user))
        .with_state(service)
}
