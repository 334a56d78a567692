mod common;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use common::{ADMIN_ID, MockRepo, PROFESSOR_ID, STUDENT_ID, session, test_state};
use course_dashboard::{
    auth::{self, MaybeSession},
    config::AppConfig,
    error::AppError,
    handlers,
    models::{
        ChangePasswordRequest, CreateUserRequest, LoginRequest, MePatchRequest, Role, UserParams,
        UserPatchRequest,
    },
    password,
    validation::RouteParams,
};
use std::sync::Arc;
use tokio::test;

fn body<T>(value: T) -> Result<Json<T>, JsonRejection> {
    Ok(Json(value))
}

fn issue_fields(err: AppError) -> Vec<String> {
    match err {
        AppError::Validation(issues) => issues
            .iter()
            .filter_map(|i| i.field().map(str::to_string))
            .collect(),
        other => panic!("expected validation error, got {other:?}"),
    }
}

// --- ADMIN USER MANAGEMENT ---

#[test]
async fn test_admin_creates_user_with_hashed_password() {
    let repo = Arc::new(MockRepo::seeded());

    let (status, Json(user)) = handlers::users::create_user(
        MaybeSession(session(ADMIN_ID, Role::Admin)),
        State(test_state(repo.clone())),
        body(CreateUserRequest {
            name: "Ada Lovelace".into(),
            email: Some("ada@example.com".into()),
            password: Some("analytical-engine".into()),
            role: Some(Role::Professor),
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user.role, Role::Professor);

    let stored = repo.password_hash_of(&user.id).expect("hash stored");
    assert_ne!(stored, "analytical-engine");
    assert!(password::verify_password("analytical-engine", &stored).unwrap());

    let json = serde_json::to_value(&user).unwrap();
    assert!(json.get("password").is_none());
    assert!(json.get("passwordHash").is_none());
}

#[test]
async fn test_created_user_defaults_to_student() {
    let (_, Json(user)) = handlers::users::create_user(
        MaybeSession(session(ADMIN_ID, Role::Admin)),
        State(test_state(Arc::new(MockRepo::seeded()))),
        body(CreateUserRequest {
            name: "No Role".into(),
            ..Default::default()
        }),
    )
    .await
    .unwrap();

    assert_eq!(user.role, Role::Student);
}

#[test]
async fn test_professor_cannot_manage_users() {
    let repo = Arc::new(MockRepo::seeded());

    let err = handlers::users::create_user(
        MaybeSession(session(PROFESSOR_ID, Role::Professor)),
        State(test_state(repo.clone())),
        body(CreateUserRequest {
            name: "Sneaky".into(),
            ..Default::default()
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    let err = handlers::users::list_users(
        MaybeSession(session(PROFESSOR_ID, Role::Professor)),
        State(test_state(repo.clone())),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    assert_eq!(repo.writes(), 0);
}

#[test]
async fn test_admin_changes_role() {
    let repo = Arc::new(MockRepo::seeded());

    let Json(user) = handlers::users::update_user(
        RouteParams(UserParams {
            user_id: STUDENT_ID.into(),
        }),
        MaybeSession(session(ADMIN_ID, Role::Admin)),
        State(test_state(repo)),
        body(UserPatchRequest {
            role: Some(Role::Professor),
            ..Default::default()
        }),
    )
    .await
    .unwrap();

    assert_eq!(user.id, STUDENT_ID);
    assert_eq!(user.role, Role::Professor);
}

#[test]
async fn test_update_unknown_user_is_not_found() {
    let err = handlers::users::update_user(
        RouteParams(UserParams {
            user_id: "ghost".into(),
        }),
        MaybeSession(session(ADMIN_ID, Role::Admin)),
        State(test_state(Arc::new(MockRepo::seeded()))),
        body(UserPatchRequest::default()),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

// --- SELF SERVICE ---

#[test]
async fn test_student_reads_and_patches_own_profile() {
    let repo = Arc::new(MockRepo::seeded());

    let Json(me) = handlers::account::get_me(
        MaybeSession(session(STUDENT_ID, Role::Student)),
        State(test_state(repo.clone())),
    )
    .await
    .unwrap();
    assert_eq!(me.id, STUDENT_ID);

    let Json(updated) = handlers::account::update_me(
        MaybeSession(session(STUDENT_ID, Role::Student)),
        State(test_state(repo)),
        body(MePatchRequest {
            bio: Some("Learning Rust".into()),
            image_key: Some("avatars/u-student.png".into()),
            ..Default::default()
        }),
    )
    .await
    .unwrap();

    assert_eq!(updated.bio.as_deref(), Some("Learning Rust"));
    assert_eq!(updated.role, Role::Student);
}

#[test]
async fn test_me_requires_session() {
    let err = handlers::account::get_me(
        MaybeSession(None),
        State(test_state(Arc::new(MockRepo::seeded()))),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status(), StatusCode::FORBIDDEN);
}

#[test]
async fn test_change_password_replaces_hash() {
    let repo = Arc::new(MockRepo::seeded());
    repo.set_password_hash_for(STUDENT_ID, &password::hash_password("old-password").unwrap());

    let status = handlers::account::change_password(
        MaybeSession(session(STUDENT_ID, Role::Student)),
        State(test_state(repo.clone())),
        body(ChangePasswordRequest {
            password: "old-password".into(),
            new_password: "new-password".into(),
            confirm_password: "new-password".into(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    let stored = repo.password_hash_of(STUDENT_ID).unwrap();
    assert!(password::verify_password("new-password", &stored).unwrap());
}

#[test]
async fn test_change_password_wrong_current_password() {
    let repo = Arc::new(MockRepo::seeded());
    repo.set_password_hash_for(STUDENT_ID, &password::hash_password("old-password").unwrap());

    let err = handlers::account::change_password(
        MaybeSession(session(STUDENT_ID, Role::Student)),
        State(test_state(repo.clone())),
        body(ChangePasswordRequest {
            password: "not-my-password".into(),
            new_password: "new-password".into(),
            confirm_password: "new-password".into(),
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(issue_fields(err), vec!["password"]);
    assert_eq!(repo.writes(), 0);
}

#[test]
async fn test_change_password_mismatch_is_reported_on_confirmation() {
    let repo = Arc::new(MockRepo::seeded());

    let err = handlers::account::change_password(
        MaybeSession(session(STUDENT_ID, Role::Student)),
        State(test_state(repo.clone())),
        body(ChangePasswordRequest {
            password: "old-password".into(),
            new_password: "new-password".into(),
            confirm_password: "other-password".into(),
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(issue_fields(err), vec!["confirmPassword"]);
    assert_eq!(repo.writes(), 0);
}

// --- LOGIN ---

#[test]
async fn test_login_issues_token_for_valid_credentials() {
    let repo = Arc::new(MockRepo::seeded());
    repo.set_password_hash_for(PROFESSOR_ID, &password::hash_password("correct-horse").unwrap());

    let Json(response) = handlers::account::login(
        State(test_state(repo)),
        body(LoginRequest {
            email: format!("{PROFESSOR_ID}@example.com"),
            password: "correct-horse".into(),
        }),
    )
    .await
    .unwrap();

    let claims = auth::decode_token(&response.token, &AppConfig::default().jwt_secret).unwrap();
    assert_eq!(claims.sub, PROFESSOR_ID);
}

#[test]
async fn test_login_rejects_wrong_password_and_unknown_email() {
    let repo = Arc::new(MockRepo::seeded());
    repo.set_password_hash_for(PROFESSOR_ID, &password::hash_password("correct-horse").unwrap());

    for (email, pw) in [
        (format!("{PROFESSOR_ID}@example.com"), "battery-staple"),
        ("nobody@example.com".to_string(), "correct-horse"),
    ] {
        let err = handlers::account::login(
            State(test_state(repo.clone())),
            body(LoginRequest {
                email,
                password: pw.into(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }
}
