//! Routers grouped by who may call them. Grouping is organisational only: the role
//! gate itself runs inside each handler (`policy::authorize`), after the route
//! context has been parsed.

/// Routes open to anonymous callers (health check, login).
pub mod public;

/// Course and lesson management for ADMIN and PROFESSOR.
pub mod dashboard;

/// User management, ADMIN only.
pub mod admin;

/// Self-service account routes for any signed-in role.
pub mod account;
