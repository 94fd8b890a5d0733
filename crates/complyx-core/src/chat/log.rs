//! Per-session message history with a derived "current messages" view.
//!
//! Messages live in a map keyed by session id; the working view mirrors
//! the entry for the current session. Invariant: after any mutation with a
//! current session set, the view equals that session's map entry -- every
//! write lands on both sides together. The view itself is never persisted
//! (it is rebuilt from the map on load).

use std::collections::HashMap;

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use complyx_types::chat::{ChatMessage, MessageStatus};
use complyx_types::error::StoreError;
use complyx_types::event::StoreEvent;

use crate::event::EventBus;
use crate::persist::snapshot::{self, ChatSnapshot, CHAT_STORAGE_KEY};
use crate::persist::StateStore;

/// Fields supplied by the caller when adding a message; id and timestamp
/// are assigned by the log.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub content: String,
    pub is_user: bool,
    pub status: Option<MessageStatus>,
    pub question_id: Option<String>,
}

impl NewMessage {
    /// A user-sent message, initially marked as sent.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_user: true,
            status: Some(MessageStatus::Sent),
            question_id: None,
        }
    }

    /// A received (non-user) message.
    pub fn received(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_user: false,
            status: Some(MessageStatus::Delivered),
            question_id: None,
        }
    }

    /// Attach the assessment question this message relates to.
    pub fn with_question_id(mut self, question_id: impl Into<String>) -> Self {
        self.question_id = Some(question_id.into());
        self
    }
}

/// Partial update merged into an existing message by id.
#[derive(Debug, Clone, Default)]
pub struct MessageEdit {
    pub content: Option<String>,
    pub status: Option<MessageStatus>,
}

impl MessageEdit {
    /// An edit that only transitions the delivery status.
    pub fn status(status: MessageStatus) -> Self {
        Self {
            content: None,
            status: Some(status),
        }
    }

    fn apply(&self, message: &mut ChatMessage) {
        if let Some(content) = &self.content {
            message.content = content.clone();
        }
        if let Some(status) = self.status {
            message.status = Some(status);
        }
    }
}

/// Editable message history, partitioned by session.
pub struct MessageLog<S: StateStore> {
    store: S,
    bus: EventBus,
    session_messages: HashMap<Uuid, Vec<ChatMessage>>,
    current_session_id: Option<Uuid>,
    /// Working view of the current session's messages. Derived, never
    /// persisted.
    messages: Vec<ChatMessage>,
}

impl<S: StateStore> MessageLog<S> {
    /// Create an empty log (nothing persisted yet).
    pub fn new(store: S, bus: EventBus) -> Self {
        Self {
            store,
            bus,
            session_messages: HashMap::new(),
            current_session_id: None,
            messages: Vec::new(),
        }
    }

    /// Restore the log from the durable store and rebuild the working view
    /// from the persisted current session id (empty if none).
    pub async fn load(store: S, bus: EventBus) -> Result<Self, StoreError> {
        let snapshot = match store.get(CHAT_STORAGE_KEY).await? {
            Some(value) => snapshot::decode::<ChatSnapshot>(value)?,
            None => ChatSnapshot::default(),
        };
        let mut log = Self {
            store,
            bus,
            session_messages: snapshot.session_messages,
            current_session_id: snapshot.current_session_id,
            messages: Vec::new(),
        };
        log.rebuild_view();
        Ok(log)
    }

    /// The working view: messages of the current session.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Id of the session the working view tracks.
    pub fn current_session_id(&self) -> Option<Uuid> {
        self.current_session_id
    }

    /// Full history for any session id, current or not. Empty for unknown
    /// sessions (including orphaned entries left behind by session delete).
    pub fn history(&self, session_id: &Uuid) -> &[ChatMessage] {
        self.session_messages
            .get(session_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Switch the working view to another session (or to none).
    pub async fn set_current_session(&mut self, id: Option<Uuid>) -> Result<(), StoreError> {
        self.current_session_id = id;
        self.rebuild_view();
        self.persist().await?;

        self.bus
            .publish(StoreEvent::CurrentSessionChanged { session_id: id });
        Ok(())
    }

    /// Repopulate the working view from the per-session map without moving
    /// the current pointer. `None` or an unknown session yields an empty
    /// view.
    pub fn load_session_messages(&mut self, id: Option<Uuid>) {
        self.messages = id
            .and_then(|id| self.session_messages.get(&id).cloned())
            .unwrap_or_default();
    }

    /// Append a message to the current session.
    ///
    /// Assigns a fresh id and the current timestamp, writes to both the
    /// working view and the per-session map. Returns `None` (and does
    /// nothing) when no current session is set.
    pub async fn add_message(&mut self, draft: NewMessage) -> Result<Option<Uuid>, StoreError> {
        let Some(session_id) = self.current_session_id else {
            warn!("Attempted to add a message with no current session");
            return Ok(None);
        };
        let message = ChatMessage {
            id: Uuid::now_v7(),
            content: draft.content,
            is_user: draft.is_user,
            timestamp: Utc::now(),
            status: draft.status,
            question_id: draft.question_id,
        };
        let message_id = message.id;

        self.messages.push(message.clone());
        self.session_messages
            .entry(session_id)
            .or_default()
            .push(message);
        self.persist().await?;

        self.bus.publish(StoreEvent::MessageAdded {
            session_id,
            message_id,
        });
        Ok(Some(message_id))
    }

    /// Merge an edit into the matching message in both the working view
    /// and the per-session map. No-op without a current session or when
    /// the id does not match.
    pub async fn update_message(
        &mut self,
        message_id: Uuid,
        edit: MessageEdit,
    ) -> Result<(), StoreError> {
        let Some(session_id) = self.current_session_id else {
            warn!(message_id = %message_id, "Attempted to update a message with no current session");
            return Ok(());
        };

        let mut changed = false;
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == message_id) {
            edit.apply(message);
            changed = true;
        }
        if let Some(entry) = self.session_messages.get_mut(&session_id) {
            if let Some(message) = entry.iter_mut().find(|m| m.id == message_id) {
                edit.apply(message);
            }
        }
        if !changed {
            return Ok(());
        }
        self.persist().await?;

        self.bus.publish(StoreEvent::MessageUpdated {
            session_id,
            message_id,
        });
        Ok(())
    }

    /// Remove a message by id from both the working view and the
    /// per-session map. No-op without a current session.
    pub async fn remove_message(&mut self, message_id: Uuid) -> Result<(), StoreError> {
        let Some(session_id) = self.current_session_id else {
            warn!(message_id = %message_id, "Attempted to remove a message with no current session");
            return Ok(());
        };

        let before = self.messages.len();
        self.messages.retain(|m| m.id != message_id);
        if let Some(entry) = self.session_messages.get_mut(&session_id) {
            entry.retain(|m| m.id != message_id);
        }
        if self.messages.len() == before {
            return Ok(());
        }
        self.persist().await?;

        self.bus.publish(StoreEvent::MessageRemoved {
            session_id,
            message_id,
        });
        Ok(())
    }

    /// Empty the working view, and the current session's map entry when a
    /// session is set.
    pub async fn clear_messages(&mut self) -> Result<(), StoreError> {
        self.messages.clear();
        if let Some(session_id) = self.current_session_id {
            self.session_messages.insert(session_id, Vec::new());
        }
        self.persist().await?;

        self.bus.publish(StoreEvent::MessagesCleared {
            session_id: self.current_session_id,
        });
        Ok(())
    }

    fn rebuild_view(&mut self) {
        self.load_session_messages(self.current_session_id);
    }

    async fn persist(&self) -> Result<(), StoreError> {
        // The working view is derivable from the map; only the map and the
        // pointer are persisted.
        let snapshot = ChatSnapshot {
            session_messages: self.session_messages.clone(),
            current_session_id: self.current_session_id,
        };
        let value = snapshot::encode(&snapshot)?;
        self.store.set(CHAT_STORAGE_KEY, &value).await
    }
}
