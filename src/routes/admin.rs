use crate::{AppState, handlers::users};
use axum::{
    Router,
    routing::{get, patch},
};

/// Admin Router
///
/// User management. Handlers are gated on `policy::USER_MANAGERS`.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET/POST /users
        .route("/users", get(users::list_users).post(users::create_user))
        // PATCH /users/{userId}
        // Admin patch: may change email, name, image, bio and role.
        .route("/users/{userId}", patch(users::update_user))
}
