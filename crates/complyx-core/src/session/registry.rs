//! Session registry maintaining the ordered session list and active id.
//!
//! New sessions are prepended, so the most recently created session is
//! first; list order is otherwise stable (no reorder operations exist).
//! Every mutation writes the registry snapshot through the durable store
//! before publishing its change event.

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use complyx_types::chat::ChatSession;
use complyx_types::error::StoreError;
use complyx_types::event::StoreEvent;

use crate::event::EventBus;
use crate::persist::snapshot::{self, SessionSnapshot, SESSION_STORAGE_KEY};
use crate::persist::StateStore;

/// Tracks named chat sessions and the active selection.
#[derive(Debug)]
pub struct SessionRegistry<S: StateStore> {
    store: S,
    bus: EventBus,
    sessions: Vec<ChatSession>,
    active_session_id: Option<Uuid>,
}

impl<S: StateStore> SessionRegistry<S> {
    /// Create an empty registry (nothing persisted yet).
    pub fn new(store: S, bus: EventBus) -> Self {
        Self {
            store,
            bus,
            sessions: Vec::new(),
            active_session_id: None,
        }
    }

    /// Restore the registry from the durable store.
    ///
    /// A missing record means a fresh start (empty registry); a malformed
    /// record is a `StoreError::Serialization`.
    pub async fn load(store: S, bus: EventBus) -> Result<Self, StoreError> {
        let snapshot = match store.get(SESSION_STORAGE_KEY).await? {
            Some(value) => snapshot::decode::<SessionSnapshot>(value)?,
            None => SessionSnapshot::default(),
        };
        Ok(Self {
            store,
            bus,
            sessions: snapshot.sessions,
            active_session_id: snapshot.active_session_id,
        })
    }

    /// Sessions in caller-visible order (most recently created first).
    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    /// Id of the active session, if any.
    pub fn active_session_id(&self) -> Option<Uuid> {
        self.active_session_id
    }

    /// Look up a session by id.
    pub fn get_session(&self, id: &Uuid) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == *id)
    }

    /// Create a session, insert it at the front of the list, and make it
    /// active. Returns the new id.
    ///
    /// The default name is derived from the current date/time when `name`
    /// is omitted. No message-log entry is created here -- the log starts
    /// lazily on the first message.
    pub async fn create_session(&mut self, name: Option<String>) -> Result<Uuid, StoreError> {
        let now = Utc::now();
        let name = name.unwrap_or_else(|| format!("Chat {}", now.format("%Y-%m-%d %H:%M")));
        let session = ChatSession {
            id: Uuid::now_v7(),
            name,
            created_at: now,
            updated_at: now,
            message_count: 0,
            preview: None,
        };
        let id = session.id;

        self.sessions.insert(0, session);
        self.active_session_id = Some(id);
        self.persist().await?;

        self.bus.publish(StoreEvent::SessionCreated { session_id: id });
        self.bus.publish(StoreEvent::ActiveSessionChanged {
            session_id: Some(id),
        });
        Ok(id)
    }

    /// Delete a session.
    ///
    /// If it was active, the first remaining session in list order becomes
    /// active, or no session is active if the list is now empty. The
    /// message log is not cascaded into (orphaned history stays
    /// recoverable by id).
    pub async fn delete_session(&mut self, id: Uuid) -> Result<(), StoreError> {
        let Some(index) = self.sessions.iter().position(|s| s.id == id) else {
            warn!(session_id = %id, "Attempted to delete non-existent session");
            return Ok(());
        };
        self.sessions.remove(index);

        let active_changed = self.active_session_id == Some(id);
        if active_changed {
            self.active_session_id = self.sessions.first().map(|s| s.id);
        }
        self.persist().await?;

        self.bus.publish(StoreEvent::SessionDeleted { session_id: id });
        if active_changed {
            self.bus.publish(StoreEvent::ActiveSessionChanged {
                session_id: self.active_session_id,
            });
        }
        Ok(())
    }

    /// Rename a session and bump its `updated_at`.
    ///
    /// A name that trims to empty leaves the session untouched.
    pub async fn rename_session(&mut self, id: Uuid, new_name: &str) -> Result<(), StoreError> {
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) else {
            warn!(session_id = %id, "Attempted to rename non-existent session");
            return Ok(());
        };
        session.name = trimmed.to_string();
        session.updated_at = Utc::now();
        self.persist().await?;

        self.bus.publish(StoreEvent::SessionRenamed { session_id: id });
        Ok(())
    }

    /// Make a session active and bump its `updated_at` ("last opened").
    pub async fn set_active_session(&mut self, id: Uuid) -> Result<(), StoreError> {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) else {
            warn!(session_id = %id, "Attempted to activate non-existent session");
            return Ok(());
        };
        session.updated_at = Utc::now();
        self.active_session_id = Some(id);
        self.persist().await?;

        self.bus.publish(StoreEvent::ActiveSessionChanged {
            session_id: Some(id),
        });
        Ok(())
    }

    /// Update the derived preview text shown in session listings.
    pub async fn update_session_preview(
        &mut self,
        id: Uuid,
        preview: String,
    ) -> Result<(), StoreError> {
        self.update_fields(id, |session| session.preview = Some(preview))
            .await
    }

    /// Update the derived message count shown in session listings.
    pub async fn update_session_message_count(
        &mut self,
        id: Uuid,
        count: u32,
    ) -> Result<(), StoreError> {
        self.update_fields(id, |session| session.message_count = count)
            .await
    }

    async fn update_fields(
        &mut self,
        id: Uuid,
        apply: impl FnOnce(&mut ChatSession),
    ) -> Result<(), StoreError> {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) else {
            warn!(session_id = %id, "Attempted to update non-existent session");
            return Ok(());
        };
        apply(session);
        session.updated_at = Utc::now();
        self.persist().await?;

        self.bus.publish(StoreEvent::SessionUpdated { session_id: id });
        Ok(())
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let snapshot = SessionSnapshot {
            sessions: self.sessions.clone(),
            active_session_id: self.active_session_id,
        };
        let value = snapshot::encode(&snapshot)?;
        self.store.set(SESSION_STORAGE_KEY, &value).await
    }
}
