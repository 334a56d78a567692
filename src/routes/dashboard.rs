use crate::{AppState, handlers::{courses, lessons}};
use axum::{
    Router,
    routing::{get, patch},
};

/// Dashboard Router
///
/// Course and lesson management. Every handler here is gated on
/// `policy::COURSE_EDITORS`, including the read-only ones.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        // GET /courses/total-courses
        // Dashboard counter. Registered as a static segment so it wins over {courseId}.
        .route("/courses/total-courses", get(courses::total_courses))
        // GET/POST /courses
        .route(
            "/courses",
            get(courses::list_courses).post(courses::create_course),
        )
        // GET/PATCH /courses/{courseId}
        // Detail (with connected lessons) and partial edit.
        .route(
            "/courses/{courseId}",
            get(courses::get_course).patch(courses::update_course),
        )
        // PATCH /courses/{courseId}/connect-lesson/{lessonId}
        // Additive, idempotent relation edit.
        .route(
            "/courses/{courseId}/connect-lesson/{lessonId}",
            patch(courses::connect_lesson),
        )
        // GET/POST /lessons
        // GET returns the id + name projection used by form dropdowns.
        .route(
            "/lessons",
            get(lessons::list_lessons).post(lessons::create_lesson),
        )
}
