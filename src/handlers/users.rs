use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    auth::MaybeSession,
    error::AppError,
    models::{CreateUserRequest, NewUser, UserParams, UserPatchRequest, UserProfile},
    password,
    policy::{USER_MANAGERS, authorize},
    validation::{Issue, JsonBody, RouteParams, validated},
};

#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users", body = [UserProfile]),
        (status = 403, description = "Unauthorized")
    )
)]
pub async fn list_users(
    MaybeSession(session): MaybeSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    authorize(session.as_ref(), USER_MANAGERS)?;
    Ok(Json(state.repo.list_users().await?))
}

/// create_user
///
/// [Admin] Creates a user account. The password, when given, is hashed before it
/// reaches the repository; the response never includes it.
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Created", body = UserProfile),
        (status = 403, description = "Unauthorized"),
        (status = 409, description = "Email already in use"),
        (status = 422, description = "Validation issues", body = [Issue])
    )
)]
pub async fn create_user(
    MaybeSession(session): MaybeSession,
    State(state): State<AppState>,
    body: JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let authorized = authorize(session.as_ref(), USER_MANAGERS)?;
    let payload = validated(body)?;

    let password_hash = payload
        .password
        .as_deref()
        .map(password::hash_password)
        .transpose()?;

    let user = state
        .repo
        .create_user(NewUser {
            name: payload.name,
            email: payload.email,
            password_hash,
            role: payload.role,
        })
        .await?;

    tracing::info!(
        new_user_id = %user.id,
        role = %user.role,
        user_id = %authorized.user.id,
        "user created"
    );
    Ok((StatusCode::CREATED, Json(user)))
}

/// update_user
///
/// [Admin] Patches another user's profile, including their role.
#[utoipa::path(
    patch,
    path = "/users/{userId}",
    params(("userId" = String, Path, description = "User ID")),
    request_body = UserPatchRequest,
    responses(
        (status = 200, description = "Updated", body = UserProfile),
        (status = 403, description = "Unauthorized"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Validation issues", body = [Issue])
    )
)]
pub async fn update_user(
    RouteParams(params): RouteParams<UserParams>,
    MaybeSession(session): MaybeSession,
    State(state): State<AppState>,
    body: JsonBody<UserPatchRequest>,
) -> Result<Json<UserProfile>, AppError> {
    authorize(session.as_ref(), USER_MANAGERS)?;
    let payload = validated(body)?;

    state
        .repo
        .update_user(&params.user_id, payload.into())
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}
