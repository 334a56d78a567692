use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use thiserror::Error;

use crate::models::LessonSummary;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("could not encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Dispatcher
///
/// Sends one JSON request and reports the response status. Bodies of failed
/// responses are not interpreted by the wizards.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: serde_json::Value,
    ) -> Result<StatusCode, DispatchError>;
}

/// HttpDispatcher
///
/// `Dispatcher` backed by a `reqwest::Client` talking to the dashboard API.
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpDispatcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Options for the course wizard's lesson select (`GET /lessons`).
    pub async fn lesson_options(&self) -> Result<Vec<LessonSummary>, DispatchError> {
        let lessons = self
            .request(Method::GET, "/lessons")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(lessons)
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: serde_json::Value,
    ) -> Result<StatusCode, DispatchError> {
        tracing::debug!(%method, path, "dispatching form submission");
        let response = self.request(method, path).json(&body).send().await?;
        Ok(response.status())
    }
}
