use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    auth::MaybeSession,
    error::AppError,
    models::{
        ConnectLessonParams, Course, CourseDetail, CourseParams, CreateCourseRequest,
        UpdateCourseRequest,
    },
    policy::{COURSE_EDITORS, authorize},
    validation::{Issue, JsonBody, RouteParams, validated},
};

/// total_courses
///
/// [Course editors] Number of courses, for the dashboard counter. Reads are gated
/// like writes.
#[utoipa::path(
    get,
    path = "/courses/total-courses",
    responses(
        (status = 200, description = "Course count", body = i64),
        (status = 403, description = "Unauthorized")
    )
)]
pub async fn total_courses(
    MaybeSession(session): MaybeSession,
    State(state): State<AppState>,
) -> Result<Json<i64>, AppError> {
    authorize(session.as_ref(), COURSE_EDITORS)?;
    Ok(Json(state.repo.count_courses().await?))
}

#[utoipa::path(
    get,
    path = "/courses",
    responses(
        (status = 200, description = "All courses", body = [Course]),
        (status = 403, description = "Unauthorized")
    )
)]
pub async fn list_courses(
    MaybeSession(session): MaybeSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<Course>>, AppError> {
    authorize(session.as_ref(), COURSE_EDITORS)?;
    Ok(Json(state.repo.list_courses().await?))
}

/// create_course
///
/// [Course editors] Creates a course, optionally connecting one lesson. A `lessonId`
/// that names no lesson is reported as a validation issue on that field.
#[utoipa::path(
    post,
    path = "/courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Created", body = Course),
        (status = 403, description = "Unauthorized"),
        (status = 422, description = "Validation issues", body = [Issue])
    )
)]
pub async fn create_course(
    MaybeSession(session): MaybeSession,
    State(state): State<AppState>,
    body: JsonBody<CreateCourseRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let authorized = authorize(session.as_ref(), COURSE_EDITORS)?;
    let payload = validated(body)?;
    let with_lesson = payload.lesson_id.is_some();

    let course = state
        .repo
        .create_course(payload)
        .await
        .map_err(AppError::from)
        .map_err(|e| match e {
            AppError::NotFound if with_lesson => AppError::Validation(vec![Issue::new(
                "lessonId",
                "not_found",
                "Lesson does not exist",
            )]),
            other => other,
        })?;

    tracing::info!(course_id = %course.id, user_id = %authorized.user.id, "course created");
    Ok((StatusCode::CREATED, Json(course)))
}

#[utoipa::path(
    get,
    path = "/courses/{courseId}",
    params(("courseId" = String, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course with its lessons", body = CourseDetail),
        (status = 403, description = "Unauthorized"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_course(
    RouteParams(params): RouteParams<CourseParams>,
    MaybeSession(session): MaybeSession,
    State(state): State<AppState>,
) -> Result<Json<CourseDetail>, AppError> {
    authorize(session.as_ref(), COURSE_EDITORS)?;

    let course = state
        .repo
        .get_course(&params.course_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let lessons = state.repo.get_course_lessons(&course.id).await?;

    Ok(Json(CourseDetail { course, lessons }))
}

/// update_course
///
/// [Course editors] Partial update from the course edit page.
#[utoipa::path(
    patch,
    path = "/courses/{courseId}",
    params(("courseId" = String, Path, description = "Course ID")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Updated", body = Course),
        (status = 403, description = "Unauthorized"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Validation issues", body = [Issue])
    )
)]
pub async fn update_course(
    RouteParams(params): RouteParams<CourseParams>,
    MaybeSession(session): MaybeSession,
    State(state): State<AppState>,
    body: JsonBody<UpdateCourseRequest>,
) -> Result<Json<Course>, AppError> {
    authorize(session.as_ref(), COURSE_EDITORS)?;
    let payload = validated(body)?;

    state
        .repo
        .update_course(&params.course_id, payload)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// connect_lesson
///
/// [Course editors] Adds one lesson to a course's lesson set. Existing members are
/// untouched and repeating the call is a successful no-op.
#[utoipa::path(
    patch,
    path = "/courses/{courseId}/connect-lesson/{lessonId}",
    params(
        ("courseId" = String, Path, description = "Course ID"),
        ("lessonId" = String, Path, description = "Lesson ID")
    ),
    responses(
        (status = 200, description = "Connected"),
        (status = 403, description = "Unauthorized"),
        (status = 404, description = "Course or lesson not found"),
        (status = 422, description = "Invalid route parameters", body = [Issue])
    )
)]
pub async fn connect_lesson(
    RouteParams(params): RouteParams<ConnectLessonParams>,
    MaybeSession(session): MaybeSession,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let authorized = authorize(session.as_ref(), COURSE_EDITORS)?;

    state
        .repo
        .connect_lesson(&params.course_id, &params.lesson_id)
        .await?;

    tracing::info!(
        course_id = %params.course_id,
        lesson_id = %params.lesson_id,
        user_id = %authorized.user.id,
        "lesson connected"
    );
    Ok(StatusCode::OK)
}
