//! Editor for a single command row.
//!
//! Each row owns its own save/delete lifecycle and knows nothing about the
//! list it came from. Results are broadcast as
//! [`EntryUpdate`](super::entries::EntryUpdate) facts on the
//! `entry.updated` topic; the list reconciles them by ordinal id.
//!
//! The server keys commands by name, so a rename is a delete of the old
//! name followed by a create under the new one. `last_key` tracks the name
//! the server currently knows this row by; `pending_key` is the name a save
//! in flight is about to establish.

use std::sync::Arc;

use crate::api::types::EntryRecord;
use crate::api::ApiClient;
use crate::bus::{topics, EventBus};
use crate::PanelError;

use super::GENERIC_ERROR_MESSAGE;

/// Asks the operator to confirm a destructive action. Any
/// `Fn(&str) -> bool` closure qualifies; the argument is the command name.
pub trait ConfirmPrompt {
    fn confirm(&self, key: &str) -> bool;
}

impl<F: Fn(&str) -> bool> ConfirmPrompt for F {
    fn confirm(&self, key: &str) -> bool {
        self(key)
    }
}

pub struct EntryEditor {
    id: u64,
    /// Name the server currently stores this row under. `None` until the
    /// first successful save.
    last_key: Option<String>,
    /// Name a save in flight will establish on success.
    pending_key: Option<String>,
    client: Arc<ApiClient>,
    bus: Arc<EventBus>,
    error: Option<String>,
    saved: bool,
    deleted: bool,
}

impl EntryEditor {
    pub fn new(
        id: u64,
        existing_key: Option<String>,
        client: Arc<ApiClient>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            id,
            last_key: existing_key,
            pending_key: None,
            client,
            bus,
            error: None,
            saved: false,
            deleted: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Name the server currently knows this row by, if it was ever saved.
    pub fn last_key(&self) -> Option<&str> {
        self.last_key.as_deref()
    }

    /// Operator-facing error from the last failed operation, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True after a successful save, until the next failure or delete.
    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Persist the row under `name`. A blank name is silently skipped (the
    /// trailing blank row saves on every edit pass). Returns `true` when a
    /// save actually reached the server.
    ///
    /// When the name changed since the last save, the old name is deleted
    /// first; if the create afterwards fails the old command is already
    /// gone, matching how the server models renames.
    pub async fn save(&mut self, name: &str, template: &str) -> Result<bool, PanelError> {
        if name.is_empty() {
            tracing::debug!("skipping save of unnamed entry {}", self.id);
            return Ok(false);
        }

        self.pending_key = Some(name.to_string());

        if let Some(old) = self.last_key.clone().filter(|k| k != name) {
            if let Err(e) = self.client.delete_entry(&old).await {
                self.pending_key = None;
                self.fail("rename delete failed", &e);
                return Err(e.into());
            }
        }

        let record = EntryRecord {
            name: name.to_string(),
            template: template.to_string(),
        };
        match self.client.put_entry(&record).await {
            Ok(saved) => {
                self.last_key = self.pending_key.take();
                self.error = None;
                self.saved = true;
                self.bus.publish(
                    topics::ENTRY_UPDATED,
                    serde_json::json!({
                        "id": self.id,
                        "name": saved.name,
                        "template": saved.template,
                    }),
                );
                Ok(true)
            }
            Err(e) => {
                self.pending_key = None;
                self.fail("entry save failed", &e);
                Err(e.into())
            }
        }
    }

    /// Delete the row, gated on `prompt`. Declining costs nothing: no
    /// network call, no state change. Returns `true` when the row was
    /// deleted. A row that was never saved is only removed locally.
    pub async fn delete(&mut self, prompt: &impl ConfirmPrompt) -> Result<bool, PanelError> {
        let display = self.last_key.clone().unwrap_or_default();
        if !prompt.confirm(&display) {
            return Ok(false);
        }

        if let Some(key) = self.last_key.clone() {
            if let Err(e) = self.client.delete_entry(&key).await {
                self.fail("entry delete failed", &e);
                return Err(e.into());
            }
        }

        self.deleted = true;
        self.saved = false;
        self.last_key = None;
        self.error = None;
        self.bus.publish(
            topics::ENTRY_UPDATED,
            serde_json::json!({
                "id": self.id,
                "deleted": true,
            }),
        );
        Ok(true)
    }

    fn fail(&mut self, action: &str, error: &crate::api::ApiError) {
        tracing::error!("{action}: {error}");
        self.saved = false;
        self.error = Some(GENERIC_ERROR_MESSAGE.to_string());
    }
}
