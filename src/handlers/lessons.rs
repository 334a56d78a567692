use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    auth::MaybeSession,
    error::AppError,
    models::{CreateLessonRequest, Lesson, LessonSummary},
    policy::{COURSE_EDITORS, authorize},
    validation::{Issue, JsonBody, validated},
};

/// list_lessons
///
/// [Course editors] `id` + `name` of every lesson, feeding the course form dropdown.
#[utoipa::path(
    get,
    path = "/lessons",
    responses(
        (status = 200, description = "Lesson options", body = [LessonSummary]),
        (status = 403, description = "Unauthorized")
    )
)]
pub async fn list_lessons(
    MaybeSession(session): MaybeSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<LessonSummary>>, AppError> {
    authorize(session.as_ref(), COURSE_EDITORS)?;
    Ok(Json(state.repo.list_lesson_summaries().await?))
}

#[utoipa::path(
    post,
    path = "/lessons",
    request_body = CreateLessonRequest,
    responses(
        (status = 201, description = "Created", body = Lesson),
        (status = 403, description = "Unauthorized"),
        (status = 409, description = "Slug already in use"),
        (status = 422, description = "Validation issues", body = [Issue])
    )
)]
pub async fn create_lesson(
    MaybeSession(session): MaybeSession,
    State(state): State<AppState>,
    body: JsonBody<CreateLessonRequest>,
) -> Result<(StatusCode, Json<Lesson>), AppError> {
    let authorized = authorize(session.as_ref(), COURSE_EDITORS)?;
    let payload = validated(body)?;

    let lesson = state.repo.create_lesson(payload).await?;

    tracing::info!(lesson_id = %lesson.id, user_id = %authorized.user.id, "lesson created");
    Ok((StatusCode::CREATED, Json(lesson)))
}
