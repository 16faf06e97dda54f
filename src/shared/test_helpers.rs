use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::Request, middleware::Next, response::Response, Router};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

pub fn create_user(role: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: Uuid::new_v4(),
        session_id: Uuid::new_v4(),
        email: format!("{}@tourbook.test", role),
        name: format!("Test {}", role),
        role: role.to_string(),
    }
}

/// Router with every request authenticated as the given role
pub fn with_user_auth(router: Router, role: &str) -> Router {
    let user = create_user(role);
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                let response: Response = next.run(request).await;
                response
            }
        },
    ))
}

pub fn with_admin_auth(router: Router) -> Router {
    with_user_auth(router, "admin")
}

pub fn with_editor_auth(router: Router) -> Router {
    with_user_auth(router, "editor")
}

/// Pool that never connects until a query runs.
///
/// Handlers that fail validation or authorization never reach the database,
/// so they can be exercised without Postgres. Must be created inside a Tokio runtime.
pub fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgres://localhost/tourbook_unused")
        .expect("static database URL parses")
}
