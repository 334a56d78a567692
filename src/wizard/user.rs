use reqwest::Method;

use super::{Notice, WizardForm, non_blank};
use crate::models::{CreateUserRequest, Role};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

/// UserForm
///
/// Five steps: name, email, password, role, review. Submits `POST /users`.
/// Blank email or password are sent as absent, and no role means the server default.
#[derive(Debug)]
pub struct UserForm;

impl WizardForm for UserForm {
    type Draft = UserDraft;
    type Request = CreateUserRequest;

    const STEPS: usize = 5;
    const METHOD: Method = Method::POST;
    const PATH: &'static str = "/users";

    fn step_fields(step: usize) -> &'static [&'static str] {
        match step {
            1 => &["name"],
            2 => &["email"],
            3 => &["password"],
            4 => &["role"],
            _ => &[],
        }
    }

    fn build(draft: &UserDraft) -> CreateUserRequest {
        CreateUserRequest {
            name: draft.name.trim().to_string(),
            email: non_blank(&draft.email),
            // Passwords are sent as typed; only an empty input counts as absent.
            password: (!draft.password.is_empty()).then(|| draft.password.clone()),
            role: draft.role,
        }
    }

    fn success_notice() -> Notice {
        Notice::success("User created.", "The user was created! Check the users page.")
    }

    fn failure_notice() -> Notice {
        Notice::destructive("Something went wrong.", "The user was not created! Please, try again.")
    }
}
