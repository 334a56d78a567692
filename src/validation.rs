//! Turning schema failures into the structured issue list returned with 422.
//!
//! Every payload schema is a `validator::Validate` derive. This module converts
//! `ValidationErrors` into [`Issue`]s keyed by wire field names, and provides the
//! two request-side entry points handlers use: [`RouteParams`] for path contexts
//! and [`validated`] for JSON bodies.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{FromRequestParts, Path, rejection::JsonRejection},
    http::request::Parts,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use ts_rs::TS;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::error::AppError;

/// Issue
///
/// One field-level validation failure. `path[0]` is the wire name of the offending
/// field (`confirmPassword`, `imageURL`, ...), or `body` / `params` when the payload
/// could not be decoded at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Issue {
    pub code: String,
    pub path: Vec<String>,
    pub message: String,
}

impl Issue {
    pub fn new(field: &str, code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            path: vec![field.to_string()],
            message: message.into(),
        }
    }

    /// The top-level field this issue is attached to.
    pub fn field(&self) -> Option<&str> {
        self.path.first().map(String::as_str)
    }
}

/// JSON request body as handlers receive it: decoding failures are kept rather than
/// rejected so the authorization gate can run before the body is looked at.
pub type JsonBody<T> = Result<Json<T>, JsonRejection>;

// Rust field names whose wire name differs. Depending on the validator version the
// error keys are either already the serde names or the Rust names; both resolve here.
fn wire_field(name: &str) -> String {
    match name {
        "image_url" => "imageURL",
        "lesson_id" => "lessonId",
        "course_id" => "courseId",
        "user_id" => "userId",
        "new_password" => "newPassword",
        "confirm_password" => "confirmPassword",
        "image_key" => "imageKey",
        other => other,
    }
    .to_string()
}

/// Flattens `ValidationErrors` into issues, sorted by field for stable output.
pub fn issues_from(errors: &ValidationErrors) -> Vec<Issue> {
    let mut issues: Vec<Issue> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = wire_field(&field.to_string());
            errs.iter()
                .map(|err| {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", err.code));
                    Issue::new(&field, &err.code, message)
                })
                .collect::<Vec<_>>()
        })
        .collect();

    issues.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.code.cmp(&b.code)));
    issues
}

/// Runs a schema and returns its issues, empty when the value is valid.
pub fn check<T: Validate>(value: &T) -> Vec<Issue> {
    match value.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => issues_from(&errors),
    }
}

/// Decodes and validates a JSON body, producing the 422 error on any failure.
pub fn validated<T: Validate>(body: JsonBody<T>) -> Result<T, AppError> {
    let Json(value) = body
        .map_err(|rejection| AppError::Validation(vec![Issue::new("body", "invalid_body", rejection.body_text())]))?;

    let issues = check(&value);
    if issues.is_empty() {
        Ok(value)
    } else {
        Err(AppError::Validation(issues))
    }
}

/// Parses raw path parameters against a route-context schema.
pub fn parse_route_context<T>(raw: &HashMap<String, String>) -> Result<T, Vec<Issue>>
where
    T: DeserializeOwned + Validate,
{
    let object = raw
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect::<serde_json::Map<_, _>>();

    let params: T = serde_json::from_value(serde_json::Value::Object(object))
        .map_err(|e| vec![Issue::new("params", "invalid_params", e.to_string())])?;

    let issues = check(&params);
    if issues.is_empty() {
        Ok(params)
    } else {
        Err(issues)
    }
}

/// RouteParams
///
/// Extractor for a validated route context. Rejects with 422 and the issue list
/// before any other part of the handler runs.
#[derive(Debug, Clone)]
pub struct RouteParams<T>(pub T);

impl<T, S> FromRequestParts<S> for RouteParams<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                AppError::Validation(vec![Issue::new("params", "invalid_params", rejection.body_text())])
            })?;

        parse_route_context(&raw)
            .map(RouteParams)
            .map_err(AppError::Validation)
    }
}
