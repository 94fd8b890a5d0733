//! Store change-notification events.
//!
//! Every completed store mutation publishes one of these on the event bus
//! so UI layers can react without polling. Events describe what changed,
//! not the new state -- subscribers read the store for that.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A change notification emitted after a store mutation completes
/// (in-memory update and durable write-through both applied).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    // --- Session registry ---
    SessionCreated { session_id: Uuid },
    SessionRenamed { session_id: Uuid },
    SessionDeleted { session_id: Uuid },
    /// Derived display fields (preview, message count) changed.
    SessionUpdated { session_id: Uuid },
    ActiveSessionChanged { session_id: Option<Uuid> },

    // --- Message log ---
    CurrentSessionChanged { session_id: Option<Uuid> },
    MessageAdded { session_id: Uuid, message_id: Uuid },
    MessageUpdated { session_id: Uuid, message_id: Uuid },
    MessageRemoved { session_id: Uuid, message_id: Uuid },
    MessagesCleared { session_id: Option<Uuid> },

    // --- Assessment tracker ---
    AnswerRecorded { question_id: String },
    AnswerRemoved { question_id: String },
    ProgressUpdated,
    ScoresUpdated,
    /// One of the metadata fields (id, standard, phase, status) changed.
    AssessmentUpdated,
    AssessmentReset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serde_tagged() {
        let event = StoreEvent::MessageAdded {
            session_id: Uuid::now_v7(),
            message_id: Uuid::now_v7(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"message_added\""));

        let parsed: StoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_active_session_cleared_serializes_null() {
        let event = StoreEvent::ActiveSessionChanged { session_id: None };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"session_id\":null"));
    }

    #[test]
    fn test_answer_event_carries_question_id() {
        let event = StoreEvent::AnswerRecorded {
            question_id: "S1-GOV-01".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"answer_recorded\""));
        assert!(json.contains("S1-GOV-01"));
    }
}
