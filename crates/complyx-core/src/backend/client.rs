//! AssessmentBackend trait definition.
//!
//! The port for the out-of-scope backend that owns question adaptivity,
//! scoring, and the server-side assessment mirror. The HTTP adapter lives
//! in complyx-infra. Uses RPITIT (native async fn in traits, Rust 2024
//! edition).

use complyx_types::assessment::{AssessmentScores, ProgressData};
use complyx_types::backend::{
    AssessmentSessionState, NextQuestionRequest, ProgressRequest, Question, ScoreRequest,
};
use complyx_types::error::BackendError;

/// Client port for the assessment backend HTTP surface.
pub trait AssessmentBackend: Send + Sync {
    /// `POST /api/assessment/scores/calculate` -- compute the compliance
    /// score snapshot for the submitted answers.
    fn calculate_scores(
        &self,
        request: &ScoreRequest,
    ) -> impl std::future::Future<Output = Result<AssessmentScores, BackendError>> + Send;

    /// `POST /api/assessment/progress/calculate` -- compute progress for
    /// the answered-question set.
    fn calculate_progress(
        &self,
        request: &ProgressRequest,
    ) -> impl std::future::Future<Output = Result<ProgressData, BackendError>> + Send;

    /// `POST /api/questions/next` -- the adaptive engine's next question,
    /// or `None` when the current phase is exhausted.
    fn next_question(
        &self,
        request: &NextQuestionRequest,
    ) -> impl std::future::Future<Output = Result<Option<Question>, BackendError>> + Send;

    /// `POST /api/assessment/session/save` -- persist the assessment state
    /// server-side; returns the server's session id.
    fn save_session(
        &self,
        state: &AssessmentSessionState,
    ) -> impl std::future::Future<Output = Result<String, BackendError>> + Send;

    /// `GET /api/assessment/session/{id}` -- fetch a server-side mirror.
    /// `None` when the backend has no session under that id.
    fn load_session(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<AssessmentSessionState>, BackendError>> + Send;

    /// `POST /api/assessment/session/autosave` -- fire-and-forget variant
    /// of save; the response body is ignored.
    fn autosave_session(
        &self,
        state: &AssessmentSessionState,
    ) -> impl std::future::Future<Output = Result<(), BackendError>> + Send;
}
