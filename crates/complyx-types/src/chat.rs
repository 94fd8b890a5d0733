//! Chat session and message types for Complyx.
//!
//! These types model the client-side chat state: named sessions and the
//! per-session message history partitioned by the message log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Delivery status of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sending,
    Sent,
    Delivered,
    Error,
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageStatus::Sending => write!(f, "sending"),
            MessageStatus::Sent => write!(f, "sent"),
            MessageStatus::Delivered => write!(f, "delivered"),
            MessageStatus::Error => write!(f, "error"),
        }
    }
}

impl FromStr for MessageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sending" => Ok(MessageStatus::Sending),
            "sent" => Ok(MessageStatus::Sent),
            "delivered" => Ok(MessageStatus::Delivered),
            "error" => Ok(MessageStatus::Error),
            other => Err(format!("invalid message status: '{other}'")),
        }
    }
}

/// A named chat conversation thread.
///
/// Sessions are identified by a UUIDv7 (time-ordered with a random suffix,
/// collision probability negligible but not guaranteed unique).
/// `message_count` and `preview` are derived display fields maintained by
/// the session registry as messages flow through the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// A single message within a chat session.
///
/// Messages are owned by exactly one session via the message log's
/// per-session map. `question_id` links a message to the assessment
/// question it answers or asks about, when there is one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub content: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_status_roundtrip() {
        for status in [
            MessageStatus::Sending,
            MessageStatus::Sent,
            MessageStatus::Delivered,
            MessageStatus::Error,
        ] {
            let s = status.to_string();
            let parsed: MessageStatus = s.parse().unwrap();
            assert_eq!(status, parsed);
        }
    }

    #[test]
    fn test_message_status_serde() {
        let status = MessageStatus::Delivered;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "\"delivered\"");
        let parsed: MessageStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, MessageStatus::Delivered);
    }

    #[test]
    fn test_chat_session_serialize() {
        let session = ChatSession {
            id: Uuid::now_v7(),
            name: "Q3 disclosure review".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            message_count: 4,
            preview: Some("What does S2 require for scope 3?".to_string()),
        };
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("\"name\":\"Q3 disclosure review\""));
        assert!(json.contains("\"message_count\":4"));
    }

    #[test]
    fn test_chat_session_preview_omitted_when_none() {
        let session = ChatSession {
            id: Uuid::now_v7(),
            name: "empty".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            message_count: 0,
            preview: None,
        };
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("preview"));
    }

    #[test]
    fn test_chat_message_json_roundtrip() {
        let msg = ChatMessage {
            id: Uuid::now_v7(),
            content: "How do we report governance oversight?".to_string(),
            is_user: true,
            timestamp: Utc::now(),
            status: Some(MessageStatus::Sent),
            question_id: Some("S1-GOV-01".to_string()),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"is_user\":true"));
        assert!(json.contains("\"status\":\"sent\""));

        let parsed: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_chat_message_optional_fields_default() {
        let json = r#"{"id":"018f7b4e-2f7a-7000-8000-000000000000","content":"hi","is_user":false,"timestamp":"2026-08-05T10:00:00Z"}"#;
        let parsed: ChatMessage = serde_json::from_str(json).unwrap();
        assert!(parsed.status.is_none());
        assert!(parsed.question_id.is_none());
    }
}
