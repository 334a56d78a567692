#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use course_dashboard::{
    AppConfig, AppState,
    auth::Session,
    models::{
        Course, CreateCourseRequest, CreateLessonRequest, Credentials, Lesson, LessonSummary,
        NewUser, Role, UpdateCourseRequest, UserChanges, UserProfile,
    },
    repository::Repository,
};
use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex},
};

// --- MOCK REPOSITORY IMPLEMENTATION ---

pub const ADMIN_ID: &str = "u-admin";
pub const PROFESSOR_ID: &str = "u-prof";
pub const STUDENT_ID: &str = "u-student";

/// In-memory tables behind `MockRepo`.
#[derive(Default)]
pub struct MockData {
    pub courses: Vec<Course>,
    pub lessons: Vec<Lesson>,
    pub users: Vec<(UserProfile, Option<String>)>,
    /// (course_id, lesson_id) pairs.
    pub connections: BTreeSet<(String, String)>,
    /// Number of write operations that reached the store.
    pub writes: usize,
}

/// Handlers only see `Arc<dyn Repository>`, so the mock implements the trait over
/// shared in-memory state and can be inspected after the call.
#[derive(Default)]
pub struct MockRepo {
    pub data: Mutex<MockData>,
    /// When set, every call fails like an unreachable database.
    pub fail: bool,
}

impl MockRepo {
    /// Course `c1`, lesson `l1`, and one user per role.
    pub fn seeded() -> Self {
        let repo = MockRepo::default();
        {
            let mut data = repo.data.lock().unwrap();
            data.courses.push(course("c1", "Intro to Rust"));
            data.lessons.push(lesson("l1", "Ownership"));
            data.users.push((profile(ADMIN_ID, Role::Admin), None));
            data.users.push((profile(PROFESSOR_ID, Role::Professor), None));
            data.users.push((profile(STUDENT_ID, Role::Student), None));
        }
        repo
    }

    pub fn failing() -> Self {
        MockRepo {
            fail: true,
            ..MockRepo::seeded()
        }
    }

    pub fn writes(&self) -> usize {
        self.data.lock().unwrap().writes
    }

    pub fn lessons_of(&self, course_id: &str) -> Vec<String> {
        self.data
            .lock()
            .unwrap()
            .connections
            .iter()
            .filter(|(c, _)| c == course_id)
            .map(|(_, l)| l.clone())
            .collect()
    }

    pub fn set_password_hash_for(&self, user_id: &str, hash: &str) {
        let mut data = self.data.lock().unwrap();
        if let Some((_, stored)) = data.users.iter_mut().find(|(u, _)| u.id == user_id) {
            *stored = Some(hash.to_string());
        }
    }

    pub fn password_hash_of(&self, user_id: &str) -> Option<String> {
        self.data
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|(u, _)| u.id == user_id)
            .and_then(|(_, hash)| hash.clone())
    }

    fn guard(&self) -> Result<(), sqlx::Error> {
        if self.fail {
            Err(sqlx::Error::PoolTimedOut)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Repository for MockRepo {
    async fn count_courses(&self) -> Result<i64, sqlx::Error> {
        self.guard()?;
        Ok(self.data.lock().unwrap().courses.len() as i64)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, sqlx::Error> {
        self.guard()?;
        Ok(self.data.lock().unwrap().courses.clone())
    }

    async fn get_course(&self, id: &str) -> Result<Option<Course>, sqlx::Error> {
        self.guard()?;
        Ok(self.data.lock().unwrap().courses.iter().find(|c| c.id == id).cloned())
    }

    async fn get_course_lessons(&self, course_id: &str) -> Result<Vec<LessonSummary>, sqlx::Error> {
        self.guard()?;
        let data = self.data.lock().unwrap();
        Ok(data
            .lessons
            .iter()
            .filter(|l| data.connections.contains(&(course_id.to_string(), l.id.clone())))
            .map(|l| LessonSummary {
                id: l.id.clone(),
                name: l.name.clone(),
            })
            .collect())
    }

    async fn create_course(&self, req: CreateCourseRequest) -> Result<Course, sqlx::Error> {
        self.guard()?;
        let mut data = self.data.lock().unwrap();
        data.writes += 1;

        if let Some(lesson_id) = &req.lesson_id {
            if !data.lessons.iter().any(|l| &l.id == lesson_id) {
                return Err(sqlx::Error::RowNotFound);
            }
        }

        let id = format!("c{}", data.courses.len() + 1);
        let course = Course {
            id: id.clone(),
            title: req.title,
            description: req.description,
            image_url: req.image_url,
            ..course(&id, "")
        };
        data.courses.push(course.clone());
        if let Some(lesson_id) = req.lesson_id {
            data.connections.insert((id, lesson_id));
        }
        Ok(course)
    }

    async fn update_course(
        &self,
        id: &str,
        req: UpdateCourseRequest,
    ) -> Result<Option<Course>, sqlx::Error> {
        self.guard()?;
        let mut data = self.data.lock().unwrap();
        data.writes += 1;

        let Some(course) = data.courses.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(title) = req.title {
            course.title = title;
        }
        if let Some(description) = req.description {
            course.description = description;
        }
        if let Some(image_url) = req.image_url {
            course.image_url = image_url;
        }
        course.updated_at = Utc::now();
        Ok(Some(course.clone()))
    }

    async fn connect_lesson(&self, course_id: &str, lesson_id: &str) -> Result<(), sqlx::Error> {
        self.guard()?;
        let mut data = self.data.lock().unwrap();
        data.writes += 1;

        let course_exists = data.courses.iter().any(|c| c.id == course_id);
        let lesson_exists = data.lessons.iter().any(|l| l.id == lesson_id);
        if !course_exists || !lesson_exists {
            return Err(sqlx::Error::RowNotFound);
        }
        data.connections
            .insert((course_id.to_string(), lesson_id.to_string()));
        Ok(())
    }

    async fn list_lesson_summaries(&self) -> Result<Vec<LessonSummary>, sqlx::Error> {
        self.guard()?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .lessons
            .iter()
            .map(|l| LessonSummary {
                id: l.id.clone(),
                name: l.name.clone(),
            })
            .collect())
    }

    async fn create_lesson(&self, req: CreateLessonRequest) -> Result<Lesson, sqlx::Error> {
        self.guard()?;
        let mut data = self.data.lock().unwrap();
        data.writes += 1;

        let id = format!("l{}", data.lessons.len() + 1);
        let lesson = Lesson {
            id,
            name: req.name,
            slug: req.slug,
            description: req.description,
            video_id: req.video_id,
            created_at: Utc::now(),
        };
        data.lessons.push(lesson.clone());
        Ok(lesson)
    }

    async fn get_user(&self, id: &str) -> Result<Option<UserProfile>, sqlx::Error> {
        self.guard()?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone()))
    }

    async fn list_users(&self) -> Result<Vec<UserProfile>, sqlx::Error> {
        self.guard()?;
        Ok(self.data.lock().unwrap().users.iter().map(|(u, _)| u.clone()).collect())
    }

    async fn create_user(&self, user: NewUser) -> Result<UserProfile, sqlx::Error> {
        self.guard()?;
        let mut data = self.data.lock().unwrap();
        data.writes += 1;

        let id = format!("u{}", data.users.len() + 1);
        let profile = UserProfile {
            name: user.name,
            email: user.email,
            role: user.role.unwrap_or(Role::Student),
            ..profile(&id, Role::Student)
        };
        data.users.push((profile.clone(), user.password_hash));
        Ok(profile)
    }

    async fn update_user(
        &self,
        id: &str,
        changes: UserChanges,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        self.guard()?;
        let mut data = self.data.lock().unwrap();
        data.writes += 1;

        let Some((user, _)) = data.users.iter_mut().find(|(u, _)| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = Some(email);
        }
        if let Some(image) = changes.image {
            user.image = Some(image);
        }
        if let Some(bio) = changes.bio {
            user.bio = Some(bio);
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        Ok(Some(user.clone()))
    }

    async fn get_credentials(&self, id: &str) -> Result<Option<Credentials>, sqlx::Error> {
        self.guard()?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, hash)| Credentials {
                id: u.id.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn get_credentials_by_email(&self, email: &str) -> Result<Option<Credentials>, sqlx::Error> {
        self.guard()?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|(u, _)| u.email.as_deref() == Some(email))
            .map(|(u, hash)| Credentials {
                id: u.id.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn set_password_hash(&self, id: &str, password_hash: &str) -> Result<bool, sqlx::Error> {
        self.guard()?;
        let mut data = self.data.lock().unwrap();
        data.writes += 1;

        match data.users.iter_mut().find(|(u, _)| u.id == id) {
            Some((_, stored)) => {
                *stored = Some(password_hash.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// --- TEST UTILITIES ---

pub fn course(id: &str, title: &str) -> Course {
    Course {
        id: id.to_string(),
        title: title.to_string(),
        description: "A course".to_string(),
        image_url: "https://example.com/course.png".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn lesson(id: &str, name: &str) -> Lesson {
    Lesson {
        id: id.to_string(),
        name: name.to_string(),
        slug: name.to_lowercase(),
        description: "A lesson".to_string(),
        video_id: "vid-1".to_string(),
        created_at: Utc::now(),
    }
}

pub fn profile(id: &str, role: Role) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        name: format!("User {id}"),
        email: Some(format!("{id}@example.com")),
        role,
        image: None,
        bio: None,
        created_at: Utc::now(),
    }
}

pub fn session(id: &str, role: Role) -> Option<Session> {
    Some(Session::new(id, role))
}

/// Builds an `AppState` around a shared mock so tests can inspect it afterwards.
pub fn test_state(repo: Arc<MockRepo>) -> AppState {
    AppState {
        repo,
        config: AppConfig::default(),
    }
}
