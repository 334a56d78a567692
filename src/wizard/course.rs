use reqwest::Method;

use super::{Notice, WizardForm, non_blank};
use crate::models::CreateCourseRequest;

/// Values typed into the course wizard so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub image_url: String,
    /// Selected lesson id; an empty selection means no lesson.
    pub lesson_id: String,
}

/// CourseForm
///
/// Five steps: title, description, image URL, optional lesson, review.
/// Submits `POST /courses`.
#[derive(Debug)]
pub struct CourseForm;

impl WizardForm for CourseForm {
    type Draft = CourseDraft;
    type Request = CreateCourseRequest;

    const STEPS: usize = 5;
    const METHOD: Method = Method::POST;
    const PATH: &'static str = "/courses";

    fn step_fields(step: usize) -> &'static [&'static str] {
        match step {
            1 => &["title"],
            2 => &["description"],
            3 => &["imageURL"],
            4 => &["lessonId"],
            _ => &[],
        }
    }

    fn build(draft: &CourseDraft) -> CreateCourseRequest {
        CreateCourseRequest {
            title: draft.title.clone(),
            description: draft.description.clone(),
            image_url: draft.image_url.clone(),
            lesson_id: non_blank(&draft.lesson_id),
        }
    }

    fn success_notice() -> Notice {
        Notice::success("Course created.", "The course was created! Check the lessons page.")
    }

    fn failure_notice() -> Notice {
        Notice::destructive(
            "Something went wrong.",
            "The course was not created! Please, try again.",
        )
    }
}
