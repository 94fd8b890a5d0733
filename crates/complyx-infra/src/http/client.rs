//! HttpAssessmentBackend -- concrete [`AssessmentBackend`] implementation.
//!
//! Sends JSON requests to the assessment backend configured in
//! `AppConfig`. Every call goes through the same bounded retry loop; a
//! non-2xx response is surfaced as `BackendError::Api` with the message
//! taken from the body's `error` field when present, else the HTTP status
//! text.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use complyx_core::backend::AssessmentBackend;
use complyx_types::assessment::{AssessmentScores, ProgressData};
use complyx_types::backend::{
    AssessmentSessionState, NextQuestionRequest, ProgressRequest, Question, SaveSessionResponse,
    ScoreRequest, ScoreResponse,
};
use complyx_types::config::AppConfig;
use complyx_types::error::BackendError;

/// Reqwest-backed assessment backend client.
pub struct HttpAssessmentBackend {
    client: reqwest::Client,
    base_url: String,
    retries: u32,
}

impl HttpAssessmentBackend {
    /// Create a new backend client from the application config.
    pub fn new(config: &AppConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            retries: config.request_retries,
        })
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Send a request built by `build`, retrying the uniform number of
    /// times on any failure (transport or non-2xx).
    async fn send_with_retry(
        &self,
        url: &str,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, BackendError> {
        let mut attempt = 0;
        loop {
            let result = async {
                let response = build()
                    .send()
                    .await
                    .map_err(|e| BackendError::Transport(e.to_string()))?;
                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                }
                let body = response.text().await.unwrap_or_default();
                Err(api_error(status, &body))
            }
            .await;

            match result {
                Ok(response) => return Ok(response),
                Err(err) if attempt < self.retries => {
                    attempt += 1;
                    warn!(url, attempt, error = %err, "Backend request failed, retrying");
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .send_with_retry(&url, || self.client.post(&url).json(body))
            .await?;
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .send_with_retry(&url, || self.client.get(&url))
            .await?;
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}

/// Build an `Api` error from a non-2xx response body.
///
/// The backend reports failures as `{"error": "..."}`; anything else falls
/// back to the HTTP status text.
fn api_error(status: StatusCode, body: &str) -> BackendError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|e| e.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });
    BackendError::Api {
        status: status.as_u16(),
        message,
    }
}

impl AssessmentBackend for HttpAssessmentBackend {
    async fn calculate_scores(
        &self,
        request: &ScoreRequest,
    ) -> Result<AssessmentScores, BackendError> {
        let response: ScoreResponse = self
            .post_json("/api/assessment/scores/calculate", request)
            .await?;
        Ok(response.scores)
    }

    async fn calculate_progress(
        &self,
        request: &ProgressRequest,
    ) -> Result<ProgressData, BackendError> {
        let response: complyx_types::backend::ProgressResponse = self
            .post_json("/api/assessment/progress/calculate", request)
            .await?;
        Ok(response.progress)
    }

    async fn next_question(
        &self,
        request: &NextQuestionRequest,
    ) -> Result<Option<Question>, BackendError> {
        let response: complyx_types::backend::NextQuestionResponse =
            self.post_json("/api/questions/next", request).await?;
        Ok(response.question)
    }

    async fn save_session(&self, state: &AssessmentSessionState) -> Result<String, BackendError> {
        let response: SaveSessionResponse = self
            .post_json("/api/assessment/session/save", state)
            .await?;
        Ok(response.session_id)
    }

    async fn load_session(
        &self,
        session_id: &str,
    ) -> Result<Option<AssessmentSessionState>, BackendError> {
        let path = format!("/api/assessment/session/{session_id}");
        match self.get_json::<AssessmentSessionState>(&path).await {
            Ok(state) => Ok(Some(state)),
            Err(BackendError::Api { status: 404, .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn autosave_session(&self, state: &AssessmentSessionState) -> Result<(), BackendError> {
        let url = format!("{}/api/assessment/session/autosave", self.base_url);
        self.send_with_retry(&url, || self.client.post(&url).json(state))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_extracts_error_field() {
        let err = api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"error": "ifrsStandard must be S1 or S2"}"#,
        );
        match err {
            BackendError::Api { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "ifrsStandard must be S1 or S2");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_error_falls_back_to_status_text() {
        let err = api_error(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        match err {
            BackendError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_error_ignores_non_string_error_field() {
        let err = api_error(StatusCode::BAD_REQUEST, r#"{"error": {"code": 7}}"#);
        match err {
            BackendError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Bad Request");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = AppConfig {
            api_url: "http://localhost:8000/".to_string(),
            ..AppConfig::default()
        };
        let client = HttpAssessmentBackend::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:8000");

        let client = client.with_base_url("https://api.complyx.example/");
        assert_eq!(client.base_url, "https://api.complyx.example");
    }
}
