//! Snapshot projections persisted to the durable store.
//!
//! One snapshot type per state container, each written through under its
//! own storage key on every mutation. Snapshots are the codec boundary for
//! non-JSON-native values: `DateTime<Utc>` fields serialize as ISO-8601
//! strings (chrono's serde form), and the answered-question set is encoded
//! as an ordered array (answer-list order) and rebuilt as a set on decode.
//!
//! The message log's working `messages` view is intentionally absent from
//! [`ChatSnapshot`]: it is derivable from `session_messages` keyed by
//! `current_session_id`, and persisting it would risk staleness relative
//! to the per-session map.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use complyx_types::assessment::{
    AssessmentAnswer, AssessmentPhase, AssessmentScores, AssessmentStatus, IfrsStandard,
};
use complyx_types::chat::{ChatMessage, ChatSession};
use complyx_types::error::StoreError;

/// Durable key for the session registry snapshot.
pub const SESSION_STORAGE_KEY: &str = "complyx-session-storage";

/// Durable key for the message log snapshot.
pub const CHAT_STORAGE_KEY: &str = "complyx-chat-storage";

/// Durable key for the assessment tracker snapshot.
pub const ASSESSMENT_STORAGE_KEY: &str = "complyx-assessment-storage";

/// Serialize a snapshot into the JSON value written to the durable store.
pub fn encode<T: Serialize>(snapshot: &T) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(snapshot).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Deserialize a snapshot read back from the durable store.
///
/// Malformed records surface as `StoreError::Serialization`; stores do not
/// attempt repair.
pub fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Persisted projection of the session registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub sessions: Vec<ChatSession>,
    pub active_session_id: Option<Uuid>,
}

/// Persisted projection of the message log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatSnapshot {
    pub session_messages: HashMap<Uuid, Vec<ChatMessage>>,
    pub current_session_id: Option<Uuid>,
}

/// Persisted projection of the assessment tracker.
///
/// `answered_questions` is the array encoding of the answered set, ordered
/// by answer-list position -- equal to the `question_id` projection of
/// `answers`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssessmentSnapshot {
    pub assessment_id: Option<String>,
    pub ifrs_standard: Option<IfrsStandard>,
    pub current_phase: Option<AssessmentPhase>,
    #[serde(default)]
    pub status: AssessmentStatus,
    pub answers: Vec<AssessmentAnswer>,
    pub answered_questions: Vec<String>,
    pub progress: f64,
    pub answered_count: u32,
    pub total_count: u32,
    pub scores: Option<AssessmentScores>,
}
