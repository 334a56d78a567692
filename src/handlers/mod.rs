//! Route handlers, one module per resource.
//!
//! Every gated handler has the same shape: route context (`RouteParams`) is parsed by
//! the extractor, then the handler runs `policy::authorize` on the resolved session,
//! then validates the body, then performs exactly one repository operation.

pub mod account;
pub mod courses;
pub mod lessons;
pub mod users;

/// Liveness probe for load balancers.
#[utoipa::path(get, path = "/health", responses((status = 200, description = "Alive", body = String)))]
pub async fn health() -> &'static str {
    "ok"
}
