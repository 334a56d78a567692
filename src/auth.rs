use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    config::{AppConfig, Env},
    error::AppError,
    models::Role,
    repository::RepositoryState,
};

/// Claims
///
/// Payload of the bearer tokens issued by `POST /login`. Only the subject is trusted;
/// the role is always re-read from the store so demotions take effect immediately.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

/// SessionUser
///
/// The resolved identity of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub role: Role,
}

/// Session
///
/// Produced once per request and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: SessionUser,
}

impl Session {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            user: SessionUser { id: id.into(), role },
        }
    }
}

/// MaybeSession
///
/// Extractor that resolves the caller's session without deciding anything about it.
/// Missing, malformed, expired or orphaned credentials all yield `None`; handlers hand
/// the result to `policy::authorize`. Only a store failure during the user lookup
/// rejects the request (500).
///
/// Resolution order:
/// 1. Local bypass: in `Env::Local`, an `x-user-id` header naming an existing user.
/// 2. `Authorization: Bearer <jwt>`, decoded with the configured secret.
/// 3. Store lookup of the token subject for its current role.
#[derive(Debug, Clone, Default)]
pub struct MaybeSession(pub Option<Session>);

impl<S> FromRequestParts<S> for MaybeSession
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            if let Some(user_id) = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
            {
                if let Some(user) = repo.get_user(user_id).await? {
                    return Ok(MaybeSession(Some(Session::new(user.id, user.role))));
                }
            }
        }

        let Some(token) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
        else {
            return Ok(MaybeSession(None));
        };

        let claims = match decode_token(token, &config.jwt_secret) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "rejected bearer token");
                return Ok(MaybeSession(None));
            }
        };

        // The token may outlive the account.
        let session = repo
            .get_user(&claims.sub)
            .await?
            .map(|user| Session::new(user.id, user.role));

        Ok(MaybeSession(session))
    }
}

/// Signs a token for `user_id` valid for `config.token_ttl_secs`.
/// Fails with `AppError::Internal` when the lifetime overflows the `exp` claim.
pub fn issue_token(config: &AppConfig, user_id: &str) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = usize::try_from(config.token_ttl_secs)
        .ok()
        .and_then(|ttl| now.checked_add(ttl))
        .ok_or_else(|| {
            AppError::Internal(format!(
                "token lifetime of {}s overflows the exp claim",
                config.token_ttl_secs
            ))
        })?;
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
}
