//! Wire DTOs for the assessment backend HTTP contract.
//!
//! Request and response shapes for the out-of-scope backend that owns
//! question adaptivity, scoring, and compliance-gap analysis. Field names
//! are camelCase on the wire, matching the backend's JSON contract.

use serde::{Deserialize, Serialize};

use crate::assessment::{
    AssessmentAnswer, AssessmentPhase, AssessmentScores, AssessmentStatus, IfrsStandard,
    ProgressData,
};

/// Body of `POST /api/assessment/scores/calculate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    pub answers: Vec<AssessmentAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ifrs_standard: Option<IfrsStandard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<AssessmentPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_id: Option<String>,
}

/// Response envelope of the scores endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub scores: AssessmentScores,
}

/// Body of `POST /api/assessment/progress/calculate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRequest {
    pub answered_questions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ifrs_standard: Option<IfrsStandard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<AssessmentPhase>,
}

/// Response envelope of the progress endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub progress: ProgressData,
}

/// Body of `POST /api/questions/next`.
///
/// `answered_questions` is the id set; `answered_answers` carries the full
/// entries so the backend can branch on answer values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextQuestionRequest {
    pub answered_questions: Vec<String>,
    pub answered_answers: Vec<AssessmentAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ifrs_standard: Option<IfrsStandard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<AssessmentPhase>,
}

/// Response envelope of the next-question endpoint.
///
/// `question: null` means the backend has no further questions for the
/// current phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextQuestionResponse {
    pub question: Option<Question>,
}

/// A question selected by the backend's adaptive engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<AssessmentPhase>,
}

/// Serialized assessment session state for the server-side mirror.
///
/// Body of `POST /api/assessment/session/save` and
/// `POST /api/assessment/session/autosave`; response shape of
/// `GET /api/assessment/session/{id}`. Independent of the local durable
/// store -- the backend keeps its own copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ifrs_standard: Option<IfrsStandard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_phase: Option<AssessmentPhase>,
    #[serde(default)]
    pub status: AssessmentStatus,
    pub answers: Vec<AssessmentAnswer>,
    pub progress: f64,
    pub answered_count: u32,
    pub total_count: u32,
}

/// Response envelope of the session save endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSessionResponse {
    pub session_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_answer(id: &str, value: &str) -> AssessmentAnswer {
        AssessmentAnswer {
            question_id: id.to_string(),
            value: value.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_score_request_omits_absent_optionals() {
        let request = ScoreRequest {
            answers: vec![sample_answer("S1-GOV-01", "yes")],
            ifrs_standard: None,
            phase: None,
            assessment_id: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("ifrsStandard"));
        assert!(!json.contains("assessmentId"));
        assert!(json.contains("\"questionId\":\"S1-GOV-01\""));
    }

    #[test]
    fn test_progress_request_wire_shape() {
        let request = ProgressRequest {
            answered_questions: vec!["S1-GOV-01".to_string(), "S2-MET-03".to_string()],
            ifrs_standard: Some(IfrsStandard::S2),
            phase: Some(AssessmentPhase::Quick),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"answeredQuestions\":[\"S1-GOV-01\",\"S2-MET-03\"]"));
        assert!(json.contains("\"ifrsStandard\":\"S2\""));
        assert!(json.contains("\"phase\":\"quick\""));
    }

    #[test]
    fn test_next_question_null_means_done() {
        let response: NextQuestionResponse = serde_json::from_str(r#"{"question":null}"#).unwrap();
        assert!(response.question.is_none());
    }

    #[test]
    fn test_next_question_deserialize() {
        let json = r#"{"question":{"id":"S2-MET-03","text":"Do you report scope 3 emissions?","category":"Metrics"}}"#;
        let response: NextQuestionResponse = serde_json::from_str(json).unwrap();
        let question = response.question.unwrap();
        assert_eq!(question.id, "S2-MET-03");
        assert_eq!(question.category.as_deref(), Some("Metrics"));
        assert!(question.phase.is_none());
    }

    #[test]
    fn test_session_state_roundtrip() {
        let state = AssessmentSessionState {
            assessment_id: Some("assess-42".to_string()),
            ifrs_standard: Some(IfrsStandard::S1),
            current_phase: Some(AssessmentPhase::Detailed),
            status: AssessmentStatus::InProgress,
            answers: vec![sample_answer("S1-GOV-01", "partial")],
            progress: 25.0,
            answered_count: 1,
            total_count: 4,
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"assessmentId\":\"assess-42\""));
        assert!(json.contains("\"status\":\"in_progress\""));

        let parsed: AssessmentSessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
    }

    #[test]
    fn test_session_state_status_defaults_in_progress() {
        let json = r#"{"answers":[],"progress":0.0,"answeredCount":0,"totalCount":0}"#;
        let parsed: AssessmentSessionState = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.status, AssessmentStatus::InProgress);
    }
}
