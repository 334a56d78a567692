use crate::{AppState, handlers::account};
use axum::{
    Router,
    routing::{get, patch},
};

pub fn account_routes() -> Router<AppState> {
    Router::new()
        // GET/PATCH /me
        .route("/me", get(account::get_me).patch(account::update_me))
        // PATCH /me/password
        // Requires the current password; the confirmation is checked by the schema.
        .route("/me/password", patch(account::change_password))
}
