//! The authorization gate.
//!
//! Each operation names the set of roles allowed to run it; [`authorize`] checks a
//! resolved session against that set. Handlers call it first thing, before the body
//! is decoded and before any store access.

use thiserror::Error;

use crate::{
    auth::{Session, SessionUser},
    models::Role,
};

/// Course and lesson management, including read-only counters.
pub const COURSE_EDITORS: &[Role] = &[Role::Admin, Role::Professor];

/// Creating users and changing other users' profiles or roles.
pub const USER_MANAGERS: &[Role] = &[Role::Admin];

/// Self-service account routes.
pub const ANY_ROLE: &[Role] = &[Role::Admin, Role::Professor, Role::Student];

/// Proof that the gate passed, carrying the caller's identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorized {
    pub user: SessionUser,
}

/// Why the gate refused. Both variants render as the same 403; they only differ in logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
    #[error("no session")]
    Unauthenticated,
    #[error("role {role} is not allowed (user {user_id})")]
    Forbidden { user_id: String, role: Role },
}

pub fn authorize(session: Option<&Session>, allowed: &[Role]) -> Result<Authorized, AuthzError> {
    let Some(session) = session else {
        tracing::warn!("request rejected: no session");
        return Err(AuthzError::Unauthenticated);
    };

    if !allowed.contains(&session.user.role) {
        tracing::warn!(
            user_id = %session.user.id,
            role = %session.user.role,
            "request rejected: role not allowed"
        );
        return Err(AuthzError::Forbidden {
            user_id: session.user.id.clone(),
            role: session.user.role,
        });
    }

    Ok(Authorized {
        user: session.user.clone(),
    })
}
