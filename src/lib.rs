use axum::{
    Router,
    body::Body,
    extract::FromRef,
    http::{HeaderName, Request, StatusCode},
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Server side: session resolution, the role gate, schemas, handlers, persistence.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod password;
pub mod policy;
pub mod repository;
pub mod validation;

// Routers grouped by audience (public, dashboard, admin, account).
pub mod routes;
use routes::{account, admin, dashboard, public};

// Client side: multi-step form controllers that submit to the routes above.
pub mod wizard;

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::AppError;
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document served at `/api-docs/openapi.json` and rendered by Swagger UI.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::account::login, handlers::account::get_me, handlers::account::update_me,
        handlers::account::change_password,
        handlers::courses::total_courses, handlers::courses::list_courses,
        handlers::courses::create_course, handlers::courses::get_course,
        handlers::courses::update_course, handlers::courses::connect_lesson,
        handlers::lessons::list_lessons, handlers::lessons::create_lesson,
        handlers::users::list_users, handlers::users::create_user, handlers::users::update_user,
    ),
    components(
        schemas(
            models::Role, models::Course, models::CourseDetail, models::Lesson,
            models::LessonSummary, models::UserProfile, models::CreateCourseRequest,
            models::UpdateCourseRequest, models::CreateLessonRequest, models::CreateUserRequest,
            models::UserPatchRequest, models::MePatchRequest, models::ChangePasswordRequest,
            models::LoginRequest, models::TokenResponse, validation::Issue,
        )
    ),
    tags(
        (name = "course-dashboard", description = "Course administration dashboard API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, immutable handle to the services every request needs. Requests share no
/// mutable in-process state; all shared data lives behind the repository.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub config: AppConfig,
}

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles all routers, registers state and wraps the stack in the request-id,
/// tracing, panic and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(dashboard::dashboard_routes())
        .merge(admin::admin_routes())
        .merge(account::account_routes())
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id))
                // A panicking handler fails its own request with a bare 500.
                .layer(CatchPanicLayer::custom(panic_response)),
        )
        .layer(cors)
}

fn panic_response(_err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    tracing::error!("handler panicked");
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

/// trace_span_logger
///
/// Span for `TraceLayer` carrying method, URI and the generated `x-request-id`, so
/// every log line of one request can be correlated.
fn trace_span_logger(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
