//! Multi-step form controllers.
//!
//! A [`Wizard`] walks a draft through steps `1..=N`. It only moves forward when the
//! active step's fields pass the same schema the server enforces, and only submits
//! from the last step. Submission goes through a [`Dispatcher`] and its outcome is
//! reported to a [`Notifier`]; on success the wizard starts over, on failure it keeps
//! the step and the draft so the user can fix and resubmit.

use std::{
    fmt,
    marker::PhantomData,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use reqwest::{Method, StatusCode};
use serde::Serialize;
use thiserror::Error;
use validator::Validate;

use crate::validation::{self, Issue};

pub mod course;
pub mod dispatch;
pub mod notify;
pub mod password;
pub mod user;

pub use course::{CourseDraft, CourseForm};
pub use dispatch::{DispatchError, Dispatcher, HttpDispatcher};
pub use notify::{Notice, Notifier, Severity, TracingNotifier};
pub use password::{PasswordDraft, PasswordForm};
pub use user::{UserDraft, UserForm};

/// WizardForm
///
/// Static description of one form: how many steps, which fields each step owns,
/// how a draft becomes a request, and where that request goes.
pub trait WizardForm {
    type Draft: Default + Clone + fmt::Debug;
    type Request: Serialize + Validate;

    const STEPS: usize;
    const METHOD: Method;
    const PATH: &'static str;

    /// Wire names of the fields edited on `step`. Review steps own none.
    fn step_fields(step: usize) -> &'static [&'static str];

    fn build(draft: &Self::Draft) -> Self::Request;

    fn success_notice() -> Notice;

    fn failure_notice() -> Notice;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("step {step} has {} invalid field(s)", .issues.len())]
    Invalid { step: usize, issues: Vec<Issue> },
    #[error("already at the first step")]
    AtFirstStep,
    #[error("already at the last step")]
    AtLastStep,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("submit is only available on the last step (currently on step {0})")]
    NotAtTerminalStep(usize),
    #[error("a submission is already in flight")]
    InFlight,
    #[error("draft has {} invalid field(s)", .0.len())]
    Invalid(Vec<Issue>),
    #[error("server answered {0}")]
    Rejected(StatusCode),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Successful submission. `refresh_listing` tells the surrounding view to reload
/// whatever list the new record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submitted {
    pub status: StatusCode,
    pub refresh_listing: bool,
}

/// SavingFlag
///
/// Shared view of a wizard's in-flight state. A view clones it once and polls it to
/// disable the submit control and show a busy indicator while `submit` is pending.
#[derive(Debug, Clone, Default)]
pub struct SavingFlag(Arc<AtomicBool>);

impl SavingFlag {
    pub fn is_saving(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Claims the flag. `None` when a submission already holds it.
    fn claim(&self) -> Option<SavingGuard> {
        if self.0.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(SavingGuard(self.0.clone()))
        }
    }
}

// Clears the flag when the submission ends, including when its future is dropped.
struct SavingGuard(Arc<AtomicBool>);

impl Drop for SavingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Wizard
///
/// State is the step index plus the draft. `issues` holds the validation result of
/// the most recent check and is what a view renders under each field.
#[derive(Debug)]
pub struct Wizard<F: WizardForm> {
    step: usize,
    draft: F::Draft,
    issues: Vec<Issue>,
    saving: SavingFlag,
    _form: PhantomData<fn() -> F>,
}

impl<F: WizardForm> Default for Wizard<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: WizardForm> Wizard<F> {
    pub fn new() -> Self {
        Self {
            step: 1,
            draft: F::Draft::default(),
            issues: Vec::new(),
            saving: SavingFlag::default(),
            _form: PhantomData,
        }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn is_terminal(&self) -> bool {
        self.step == F::STEPS
    }

    pub fn draft(&self) -> &F::Draft {
        &self.draft
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// First issue attached to `field`, for inline display.
    pub fn field_issue(&self, field: &str) -> Option<&Issue> {
        self.issues.iter().find(|issue| issue.field() == Some(field))
    }

    /// True while a submission is in flight; the submit control is disabled meanwhile.
    pub fn is_saving(&self) -> bool {
        self.saving.is_saving()
    }

    /// Handle a view keeps to observe `is_saving` while `submit` holds the wizard.
    pub fn saving_flag(&self) -> SavingFlag {
        self.saving.clone()
    }

    /// Applies a user edit and revalidates the active step.
    pub fn edit(&mut self, change: impl FnOnce(&mut F::Draft)) {
        change(&mut self.draft);
        self.issues = self.step_issues();
    }

    /// Issues for the fields owned by the active step.
    pub fn step_issues(&self) -> Vec<Issue> {
        let fields = F::step_fields(self.step);
        if fields.is_empty() {
            return Vec::new();
        }

        validation::check(&F::build(&self.draft))
            .into_iter()
            .filter(|issue| issue.field().is_some_and(|f| fields.contains(&f)))
            .collect()
    }

    pub fn advance(&mut self) -> Result<usize, StepError> {
        if self.is_terminal() {
            return Err(StepError::AtLastStep);
        }

        let issues = self.step_issues();
        if !issues.is_empty() {
            self.issues = issues.clone();
            return Err(StepError::Invalid {
                step: self.step,
                issues,
            });
        }

        self.step += 1;
        self.issues.clear();
        Ok(self.step)
    }

    /// Goes back one step, keeping everything entered so far.
    pub fn retreat(&mut self) -> Result<usize, StepError> {
        if self.step == 1 {
            return Err(StepError::AtFirstStep);
        }

        self.step -= 1;
        self.issues.clear();
        Ok(self.step)
    }

    pub fn reset(&mut self) {
        self.step = 1;
        self.draft = F::Draft::default();
        self.issues.clear();
    }

    /// submit
    ///
    /// Validates the whole draft (nothing is dispatched when it fails), sends it, and
    /// reacts to the outcome: 2xx resets the wizard, anything else keeps it as is.
    /// Refused while another submission holds the saving flag. There is no retry.
    /// Dropping the returned future releases the flag and leaves the draft untouched.
    pub async fn submit<D, N>(&mut self, dispatcher: &D, notifier: &N) -> Result<Submitted, SubmitError>
    where
        D: Dispatcher + ?Sized,
        N: Notifier + ?Sized,
    {
        if !self.is_terminal() {
            return Err(SubmitError::NotAtTerminalStep(self.step));
        }

        let request = F::build(&self.draft);
        let issues = validation::check(&request);
        if !issues.is_empty() {
            self.issues = issues.clone();
            return Err(SubmitError::Invalid(issues));
        }
        let body = serde_json::to_value(&request).map_err(DispatchError::from)?;

        let guard = self.saving.claim().ok_or(SubmitError::InFlight)?;
        let outcome = dispatcher.dispatch(F::METHOD, F::PATH, body).await;
        drop(guard);

        match outcome {
            Ok(status) if status.is_success() => {
                notifier.notify(F::success_notice());
                self.reset();
                Ok(Submitted {
                    status,
                    refresh_listing: true,
                })
            }
            Ok(status) => {
                tracing::warn!(path = F::PATH, %status, "form submission rejected");
                notifier.notify(F::failure_notice());
                Err(SubmitError::Rejected(status))
            }
            Err(e) => {
                tracing::warn!(path = F::PATH, error = %e, "form submission failed");
                notifier.notify(F::failure_notice());
                Err(SubmitError::Dispatch(e))
            }
        }
    }
}

/// Treats blank text inputs as "not provided".
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
