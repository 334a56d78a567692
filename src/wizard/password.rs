use reqwest::Method;

use super::{Notice, WizardForm};
use crate::models::ChangePasswordRequest;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordDraft {
    pub password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// PasswordForm
///
/// Single-step change of the caller's own password (`PATCH /me/password`). The step
/// is also the terminal step, so `submit` is available immediately.
#[derive(Debug)]
pub struct PasswordForm;

impl WizardForm for PasswordForm {
    type Draft = PasswordDraft;
    type Request = ChangePasswordRequest;

    const STEPS: usize = 1;
    const METHOD: Method = Method::PATCH;
    const PATH: &'static str = "/me/password";

    fn step_fields(step: usize) -> &'static [&'static str] {
        match step {
            1 => &["password", "newPassword", "confirmPassword"],
            _ => &[],
        }
    }

    fn build(draft: &PasswordDraft) -> ChangePasswordRequest {
        ChangePasswordRequest {
            password: draft.password.clone(),
            new_password: draft.new_password.clone(),
            confirm_password: draft.confirm_password.clone(),
        }
    }

    fn success_notice() -> Notice {
        Notice::success("Password changed.", "Your password was updated.")
    }

    fn failure_notice() -> Notice {
        Notice::destructive(
            "Something went wrong.",
            "The password was not changed! Please, try again.",
        )
    }
}
