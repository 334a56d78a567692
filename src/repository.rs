use crate::models::{
    Course, CreateCourseRequest, CreateLessonRequest, Credentials, Lesson, LessonSummary, NewUser,
    UpdateCourseRequest, UserChanges, UserProfile,
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

type StoreResult<T> = Result<T, sqlx::Error>;

/// Repository Trait
///
/// The persistence contract the handlers are written against. Every method is a
/// single store operation; multi-statement writes run inside one transaction.
/// Errors are returned untouched and classified by `AppError::from`.
///
/// `Send + Sync + async_trait` make `Arc<dyn Repository>` shareable across Axum tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Courses ---
    async fn count_courses(&self) -> StoreResult<i64>;
    async fn list_courses(&self) -> StoreResult<Vec<Course>>;
    async fn get_course(&self, id: &str) -> StoreResult<Option<Course>>;
    async fn get_course_lessons(&self, course_id: &str) -> StoreResult<Vec<LessonSummary>>;
    /// Inserts the course and, when `lesson_id` is set, connects that lesson in the
    /// same transaction.
    async fn create_course(&self, req: CreateCourseRequest) -> StoreResult<Course>;
    async fn update_course(&self, id: &str, req: UpdateCourseRequest) -> StoreResult<Option<Course>>;
    /// Adds the lesson to the course's lesson set. Connecting an already connected
    /// lesson succeeds without creating a duplicate.
    async fn connect_lesson(&self, course_id: &str, lesson_id: &str) -> StoreResult<()>;

    // --- Lessons ---
    async fn list_lesson_summaries(&self) -> StoreResult<Vec<LessonSummary>>;
    async fn create_lesson(&self, req: CreateLessonRequest) -> StoreResult<Lesson>;

    // --- Users ---
    async fn get_user(&self, id: &str) -> StoreResult<Option<UserProfile>>;
    async fn list_users(&self) -> StoreResult<Vec<UserProfile>>;
    async fn create_user(&self, user: NewUser) -> StoreResult<UserProfile>;
    async fn update_user(&self, id: &str, changes: UserChanges) -> StoreResult<Option<UserProfile>>;
    async fn get_credentials(&self, id: &str) -> StoreResult<Option<Credentials>>;
    async fn get_credentials_by_email(&self, email: &str) -> StoreResult<Option<Credentials>>;
    /// Returns false when the user does not exist.
    async fn set_password_hash(&self, id: &str, password_hash: &str) -> StoreResult<bool>;
}

/// RepositoryState
///
/// The shared handle stored in `AppState`.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// `Repository` backed by the schema in `migrations/`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COURSE_COLUMNS: &str = "id, title, description, image_url, created_at, updated_at";
const USER_COLUMNS: &str = "id, name, email, role, image, bio, created_at";

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn count_courses(&self) -> StoreResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.pool)
            .await
    }

    async fn list_courses(&self) -> StoreResult<Vec<Course>> {
        sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn get_course(&self, id: &str) -> StoreResult<Option<Course>> {
        sqlx::query_as::<_, Course>(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_course_lessons(&self, course_id: &str) -> StoreResult<Vec<LessonSummary>> {
        sqlx::query_as::<_, LessonSummary>(
            r#"
            SELECT l.id, l.name
            FROM lessons l
            JOIN course_lessons cl ON cl.lesson_id = l.id
            WHERE cl.course_id = $1
            ORDER BY l.name ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
    }

    /// create_course
    ///
    /// The insert and the optional connect share a transaction, so a bad `lessonId`
    /// (foreign-key violation) leaves no orphan course behind.
    async fn create_course(&self, req: CreateCourseRequest) -> StoreResult<Course> {
        let mut tx = self.pool.begin().await?;

        let course = sqlx::query_as::<_, Course>(&format!(
            r#"
            INSERT INTO courses (id, title, description, image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(new_id())
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.image_url)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(lesson_id) = &req.lesson_id {
            sqlx::query(
                "INSERT INTO course_lessons (course_id, lesson_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(&course.id)
            .bind(lesson_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(course)
    }

    async fn update_course(&self, id: &str, req: UpdateCourseRequest) -> StoreResult<Option<Course>> {
        sqlx::query_as::<_, Course>(&format!(
            r#"
            UPDATE courses
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                image_url = COALESCE($4, image_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(req.title)
        .bind(req.description)
        .bind(req.image_url)
        .fetch_optional(&self.pool)
        .await
    }

    /// connect_lesson
    ///
    /// `ON CONFLICT DO NOTHING` on the composite primary key makes the connect
    /// idempotent. A missing course or lesson surfaces as a foreign-key violation.
    async fn connect_lesson(&self, course_id: &str, lesson_id: &str) -> StoreResult<()> {
        let result = sqlx::query(
            "INSERT INTO course_lessons (course_id, lesson_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(course_id)
        .bind(lesson_id)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            course_id,
            lesson_id,
            inserted = result.rows_affected(),
            "connect_lesson"
        );
        Ok(())
    }

    async fn list_lesson_summaries(&self) -> StoreResult<Vec<LessonSummary>> {
        sqlx::query_as::<_, LessonSummary>("SELECT id, name FROM lessons ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
    }

    async fn create_lesson(&self, req: CreateLessonRequest) -> StoreResult<Lesson> {
        sqlx::query_as::<_, Lesson>(
            r#"
            INSERT INTO lessons (id, name, slug, description, video_id, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id, name, slug, description, video_id, created_at
            "#,
        )
        .bind(new_id())
        .bind(req.name)
        .bind(req.slug)
        .bind(req.description)
        .bind(req.video_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_user(&self, id: &str) -> StoreResult<Option<UserProfile>> {
        sqlx::query_as::<_, UserProfile>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_users(&self) -> StoreResult<Vec<UserProfile>> {
        sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    /// create_user
    ///
    /// Users created without a role default to STUDENT.
    async fn create_user(&self, user: NewUser) -> StoreResult<UserProfile> {
        sqlx::query_as::<_, UserProfile>(&format!(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, COALESCE($5, 'STUDENT'::user_role), NOW(), NOW())
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new_id())
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_user(&self, id: &str, changes: UserChanges) -> StoreResult<Option<UserProfile>> {
        sqlx::query_as::<_, UserProfile>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                image = COALESCE($4, image),
                image_key = COALESCE($5, image_key),
                bio = COALESCE($6, bio),
                role = COALESCE($7, role),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.image)
        .bind(changes.image_key)
        .bind(changes.bio)
        .bind(changes.role)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_credentials(&self, id: &str) -> StoreResult<Option<Credentials>> {
        sqlx::query_as::<_, Credentials>("SELECT id, password_hash FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_credentials_by_email(&self, email: &str) -> StoreResult<Option<Credentials>> {
        sqlx::query_as::<_, Credentials>("SELECT id, password_hash FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    async fn set_password_hash(&self, id: &str, password_hash: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
