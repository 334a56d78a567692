use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

// --- Roles ---

/// Role
///
/// The closed set of roles a dashboard user can hold. Authorization is decided by
/// set membership (see `policy`), never by comparing roles against each other.
/// Stored as the Postgres enum `user_role`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, TS, ToSchema,
)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Professor,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Professor => "PROFESSOR",
            Role::Student => "STUDENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Core Records (Mapped to Database) ---

/// Course
///
/// A row of the `courses` table. Lessons are attached through `course_lessons`
/// and are only loaded for the detail view (`CourseDetail`).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// CourseDetail
///
/// Read model for the course edit page: the course plus the lessons currently
/// connected to it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub lessons: Vec<LessonSummary>,
}

/// Lesson
///
/// A row of the `lessons` table. `video_id` keeps its snake_case wire name.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Lesson {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub video_id: String,
    #[serde(rename = "createdAt")]
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// LessonSummary
///
/// The `id` + `name` projection used by course form dropdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct LessonSummary {
    pub id: String,
    pub name: String,
}

/// UserProfile
///
/// The public face of a `users` row. The password hash lives in the same table
/// but is never selected into this struct, so it cannot leak into a response.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub role: Role,
    pub image: Option<String>,
    pub bio: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Credentials
///
/// Internal row used by login and password change. Never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct Credentials {
    pub id: String,
    pub password_hash: Option<String>,
}

// --- Route Contexts ---

/// Path context for `/courses/{courseId}`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CourseParams {
    #[serde(rename = "courseId")]
    #[validate(length(min = 1, message = "courseId is required"))]
    pub course_id: String,
}

/// Path context for `/courses/{courseId}/connect-lesson/{lessonId}`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConnectLessonParams {
    #[serde(rename = "courseId")]
    #[validate(length(min = 1, message = "courseId is required"))]
    pub course_id: String,
    #[serde(rename = "lessonId")]
    #[validate(length(min = 1, message = "lessonId is required"))]
    pub lesson_id: String,
}

/// Path context for `/users/{userId}`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserParams {
    #[serde(rename = "userId")]
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
}

// --- Request Payloads (Input Schemas) ---

/// CreateCourseRequest
///
/// Input payload for POST /courses. When `lessonId` is absent the key is left out of
/// the serialized body entirely, which is what the course wizard relies on.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 128, message = "Title must contain between 1 and 128 characters"))]
    pub title: String,
    #[validate(length(
        min = 1,
        max = 1024,
        message = "Description must contain between 1 and 1024 characters"
    ))]
    pub description: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    #[serde(rename = "lessonId", default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Select a lesson or leave it empty"))]
    pub lesson_id: Option<String>,
}

/// UpdateCourseRequest
///
/// Partial update for PATCH /courses/{courseId}. Only provided fields change.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCourseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 128, message = "Title must contain between 1 and 128 characters"))]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(
        min = 1,
        max = 1024,
        message = "Description must contain between 1 and 1024 characters"
    ))]
    pub description: Option<String>,

    #[serde(rename = "imageURL", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// CreateLessonRequest
///
/// Input payload for POST /lessons.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateLessonRequest {
    #[validate(length(min = 3, max = 128, message = "Name must contain between 3 and 128 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "Slug is required"))]
    pub slug: String,
    #[validate(length(
        min = 3,
        max = 250,
        message = "Description must contain between 3 and 250 characters"
    ))]
    pub description: String,
    #[validate(length(min = 1, message = "Video id is required"))]
    pub video_id: String,
}

/// CreateUserRequest
///
/// Input payload for POST /users. Only `name` is mandatory; a user created without a
/// password cannot log in until one is set.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 250, message = "Name must contain between 3 and 250 characters"))]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 8, max = 50, message = "Password must contain between 8 and 50 characters"))]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// UserPatchRequest
///
/// Admin variant of the user patch (PATCH /users/{userId}); may change the role.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserPatchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, max = 250, message = "Name must contain between 3 and 250 characters"))]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// MePatchRequest
///
/// Self-service variant (PATCH /me). Carries the uploaded image key instead of a role.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[ts(export)]
pub struct MePatchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, max = 250, message = "Name must contain between 3 and 250 characters"))]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    #[serde(rename = "imageKey", default, skip_serializing_if = "Option::is_none")]
    pub image_key: Option<String>,
}

/// ChangePasswordRequest
///
/// PATCH /me/password. A mismatched confirmation is reported on `confirmPassword`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 8, message = "Password must contain at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 8, message = "Password must contain at least 8 characters"))]
    pub new_password: String,
    #[validate(
        length(min = 8, message = "Password must contain at least 8 characters"),
        must_match(other = "new_password", message = "Passwords do not match")
    )]
    pub confirm_password: String,
}

/// LoginRequest
///
/// POST /login. Exchanges credentials for a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// TokenResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TokenResponse {
    pub token: String,
}

// --- Store Inputs (Internal) ---

/// NewUser
///
/// What the repository persists for POST /users: the validated request with the
/// plaintext password already replaced by its hash.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

/// UserChanges
///
/// Column-level patch shared by the admin and self-service update paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub image_key: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

impl From<UserPatchRequest> for UserChanges {
    fn from(req: UserPatchRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            image: req.image,
            image_key: None,
            bio: req.bio,
            role: req.role,
        }
    }
}

impl From<MePatchRequest> for UserChanges {
    fn from(req: MePatchRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            image: req.image,
            image_key: req.image_key,
            bio: req.bio,
            role: None,
        }
    }
}
