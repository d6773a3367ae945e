//! Stateful panel components.
//!
//! - `status`: bot status display driven by interval + manual refresh
//! - `entries`: the command list, reconciled through the event bus
//! - `editor`: one editable command row with its own save/delete lifecycle
//! - `greetings`: greeting-template settings form
//!
//! Remote failures are mapped to one fixed operator-facing message per
//! component and logged for diagnostics; nothing is retried automatically.

pub mod editor;
pub mod entries;
pub mod greetings;
pub mod status;

pub use editor::{ConfirmPrompt, EntryEditor};
pub use entries::{Entry, EntryList, EntryUpdate};
pub use greetings::GreetingPanel;
pub use status::{PollerState, StatusPoller, StatusSnapshot};

use std::sync::Mutex;

/// Shown when a command or template round trip fails.
pub const GENERIC_ERROR_MESSAGE: &str =
    "Sorry, there was an internal server error.  Please try again later.";

/// Shown when the bot status cannot be loaded or changed.
pub const STATUS_ERROR_MESSAGE: &str =
    "Sorry, we could not load your bot information.  Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchState {
    Idle,
    Fetching,
}

/// Two-state guard that deduplicates overlapping fetches of the same kind.
/// `try_begin` wins exactly once until the matching `end`.
pub(crate) struct DedupGuard(Mutex<FetchState>);

impl DedupGuard {
    pub(crate) fn new() -> Self {
        Self(Mutex::new(FetchState::Idle))
    }

    pub(crate) fn try_begin(&self) -> bool {
        let mut state = self.0.lock().expect("dedup guard mutex poisoned");
        if *state == FetchState::Fetching {
            return false;
        }
        *state = FetchState::Fetching;
        true
    }

    pub(crate) fn end(&self) {
        *self.0.lock().expect("dedup guard mutex poisoned") = FetchState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_guard_admits_one_fetch_at_a_time() {
        let guard = DedupGuard::new();
        assert!(guard.try_begin());
        assert!(!guard.try_begin());
        guard.end();
        assert!(guard.try_begin());
    }
}
