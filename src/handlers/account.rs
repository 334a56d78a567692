use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    auth::{self, MaybeSession},
    error::AppError,
    models::{ChangePasswordRequest, LoginRequest, MePatchRequest, TokenResponse, UserProfile},
    password,
    policy::{ANY_ROLE, authorize},
    validation::{Issue, JsonBody, validated},
};

/// login
///
/// [Public] Exchanges email and password for a bearer token. Unknown email, a user
/// without a password, and a wrong password are indistinguishable to the caller.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 403, description = "Unauthorized"),
        (status = 422, description = "Validation issues", body = [Issue])
    )
)]
pub async fn login(
    State(state): State<AppState>,
    body: JsonBody<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let payload = validated(body)?;

    let credentials = state.repo.get_credentials_by_email(&payload.email).await?;
    let Some((user_id, hash)) = credentials.and_then(|c| c.password_hash.map(|h| (c.id, h))) else {
        tracing::warn!("login rejected: unknown user or no password set");
        return Err(AppError::Unauthorized);
    };

    if !password::verify_password(&payload.password, &hash)? {
        tracing::warn!(user_id = %user_id, "login rejected: wrong password");
        return Err(AppError::Unauthorized);
    }

    let token = auth::issue_token(&state.config, &user_id)?;

    Ok(Json(TokenResponse { token }))
}

#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 403, description = "Unauthorized")
    )
)]
pub async fn get_me(
    MaybeSession(session): MaybeSession,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, AppError> {
    let authorized = authorize(session.as_ref(), ANY_ROLE)?;

    state
        .repo
        .get_user(&authorized.user.id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// update_me
///
/// [Any role] Self-service profile patch. The role cannot be changed here.
#[utoipa::path(
    patch,
    path = "/me",
    request_body = MePatchRequest,
    responses(
        (status = 200, description = "Updated", body = UserProfile),
        (status = 403, description = "Unauthorized"),
        (status = 422, description = "Validation issues", body = [Issue])
    )
)]
pub async fn update_me(
    MaybeSession(session): MaybeSession,
    State(state): State<AppState>,
    body: JsonBody<MePatchRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let authorized = authorize(session.as_ref(), ANY_ROLE)?;
    let payload = validated(body)?;

    state
        .repo
        .update_user(&authorized.user.id, payload.into())
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// change_password
///
/// [Any role] Replaces the caller's password after checking the current one. A wrong
/// current password is a validation issue on `password`, so the form can show it inline.
#[utoipa::path(
    patch,
    path = "/me/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 403, description = "Unauthorized"),
        (status = 422, description = "Validation issues", body = [Issue])
    )
)]
pub async fn change_password(
    MaybeSession(session): MaybeSession,
    State(state): State<AppState>,
    body: JsonBody<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    let authorized = authorize(session.as_ref(), ANY_ROLE)?;
    let payload = validated(body)?;

    let credentials = state
        .repo
        .get_credentials(&authorized.user.id)
        .await?
        .ok_or(AppError::NotFound)?;

    let current_matches = match credentials.password_hash.as_deref() {
        Some(hash) => password::verify_password(&payload.password, hash)?,
        None => false,
    };
    if !current_matches {
        return Err(AppError::Validation(vec![Issue::new(
            "password",
            "incorrect",
            "Current password is incorrect",
        )]));
    }

    let new_hash = password::hash_password(&payload.new_password)?;
    if !state
        .repo
        .set_password_hash(&authorized.user.id, &new_hash)
        .await?
    {
        return Err(AppError::NotFound);
    }

    tracing::info!(user_id = %authorized.user.id, "password changed");
    Ok(StatusCode::OK)
}
