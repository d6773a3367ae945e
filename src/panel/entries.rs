//! The synchronized command list.
//!
//! Owns an ordered collection of editable (key, value) entries backed by
//! the remote `/entries` collection. Row editors are mounted independently
//! and never reference the list; they broadcast what changed on the
//! `entry.updated` topic and the list reconciles here. The list is the
//! single authority for two invariants:
//!
//! - there is always exactly one trailing blank entry (empty key and
//!   value) inviting the operator to create a new command, and
//! - ordinal entry ids are monotonic and never reused within a session,
//!   so a stale notification from a torn-down editor cannot corrupt a
//!   different entry.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::api::types::EntryRecord;
use crate::api::ApiClient;
use crate::bus::{topics, EventBus, SubscriptionId};
use crate::PanelError;

use super::editor::EntryEditor;
use super::{DedupGuard, GENERIC_ERROR_MESSAGE};

/// Rendered in place of the key and value once a delete is confirmed.
pub const DELETED_PLACEHOLDER: &str = "deleted";

/// One row of the command list.
///
/// `id` is an ordinal assigned by the list at load/reconciliation time, not
/// a remote key; remote identity is `key`. An empty `key` means the entry
/// has not been created on the server yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: u64,
    pub key: String,
    pub value: String,
    /// Terminal: once set the row renders as removed and is excluded from
    /// future identity lookups, but it keeps its slot in the sequence.
    pub deleted: bool,
}

impl Entry {
    fn is_blank(&self) -> bool {
        self.key.is_empty() && self.value.is_empty()
    }
}

/// Fact published on [`topics::ENTRY_UPDATED`] by an entry editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryUpdate {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

struct ListState {
    entries: Vec<Entry>,
    next_id: u64,
    error: Option<String>,
}

impl ListState {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            error: None,
        }
    }

    fn assign_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Replace local entries 1:1 in server order, then restore the
    /// blank-row invariant. Ids continue from where the session left off.
    fn replace_from_server(&mut self, records: Vec<EntryRecord>) {
        self.entries = records
            .into_iter()
            .map(|record| Entry {
                id: 0,
                key: record.name,
                value: record.template,
                deleted: false,
            })
            .collect();
        for i in 0..self.entries.len() {
            self.entries[i].id = self.assign_id();
        }
        self.error = None;
        self.ensure_blank_row();
    }

    fn apply_update(&mut self, update: &EntryUpdate) {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == update.id) else {
            // Stale notification from a torn-down editor.
            tracing::debug!("entry update for unknown id {}, ignoring", update.id);
            return;
        };

        if update.deleted {
            entry.key = DELETED_PLACEHOLDER.to_string();
            entry.value = DELETED_PLACEHOLDER.to_string();
            entry.deleted = true;
        } else {
            if let Some(name) = &update.name {
                entry.key = name.clone();
            }
            if let Some(template) = &update.template {
                entry.value = template.clone();
            }
        }

        self.ensure_blank_row();
    }

    fn ensure_blank_row(&mut self) {
        if self.entries.iter().any(Entry::is_blank) {
            return;
        }
        let id = self.assign_id();
        self.entries.push(Entry {
            id,
            key: String::new(),
            value: String::new(),
            deleted: false,
        });
    }
}

/// The mounted command list component.
pub struct EntryList {
    client: Arc<ApiClient>,
    bus: Arc<EventBus>,
    state: Arc<Mutex<ListState>>,
    guard: DedupGuard,
    subscription: SubscriptionId,
}

impl EntryList {
    /// Mount the list: subscribes to [`topics::ENTRY_UPDATED`] immediately
    /// so no editor notification can race past it. Call [`load`] next.
    ///
    /// [`load`]: EntryList::load
    pub fn new(client: Arc<ApiClient>, bus: Arc<EventBus>) -> Self {
        let state = Arc::new(Mutex::new(ListState::new()));

        let handler_state = state.clone();
        let subscription = bus.subscribe(topics::ENTRY_UPDATED, move |payload| {
            let update: EntryUpdate = serde_json::from_value(payload.clone())
                .map_err(|e| format!("malformed entry update: {e}"))?;
            handler_state
                .lock()
                .expect("entry list mutex poisoned")
                .apply_update(&update);
            Ok(())
        });

        Self {
            client,
            bus,
            state,
            guard: DedupGuard::new(),
            subscription,
        }
    }

    /// Fetch the full remote collection and replace local entries. Returns
    /// `false` when another load was already in flight and this one was
    /// swallowed.
    pub async fn load(&self) -> Result<bool, PanelError> {
        if !self.guard.try_begin() {
            tracing::debug!("entry list load already in flight, skipping");
            return Ok(false);
        }

        let result = self.client.list_entries().await;
        self.guard.end();

        let mut state = self.state.lock().expect("entry list mutex poisoned");
        match result {
            Ok(records) => {
                state.replace_from_server(records);
                Ok(true)
            }
            Err(e) => {
                tracing::error!("entry list load failed: {e}");
                state.error = Some(GENERIC_ERROR_MESSAGE.to_string());
                Err(e.into())
            }
        }
    }

    /// Snapshot of the current entries, in order.
    pub fn entries(&self) -> Vec<Entry> {
        self.state
            .lock()
            .expect("entry list mutex poisoned")
            .entries
            .clone()
    }

    /// Operator-facing error from the last failed load, if any.
    pub fn error(&self) -> Option<String> {
        self.state
            .lock()
            .expect("entry list mutex poisoned")
            .error
            .clone()
    }

    /// Build the editor for one row. The editor shares the list's client
    /// and bus but holds no reference back to the list.
    pub fn editor_for(&self, entry: &Entry) -> EntryEditor {
        let existing_key = (!entry.key.is_empty()).then(|| entry.key.clone());
        EntryEditor::new(
            entry.id,
            existing_key,
            self.client.clone(),
            self.bus.clone(),
        )
    }
}

impl Drop for EntryList {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.subscription);
    }
}
