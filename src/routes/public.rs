use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        .route("/health", get(handlers::health))
        // POST /login
        // Issues a bearer token for email + password.
        .route("/login", post(handlers::account::login))
}
