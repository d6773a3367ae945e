//! Authenticated operator session.
//!
//! The backend identifies the operator from its own cookie; the panel only
//! mirrors who is signed in. The profile is held as an immutable snapshot
//! behind an `Arc` so readers never observe a half-updated identity.

use std::sync::{Arc, RwLock};

use serde::Deserialize;

/// Identity of the signed-in operator as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub public_id: String,
    pub username: String,
}

#[derive(Default)]
pub struct Session {
    user: RwLock<Option<Arc<UserProfile>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&self, profile: UserProfile) {
        tracing::info!("session established for {}", profile.username);
        *self.user.write().expect("session lock poisoned") = Some(Arc::new(profile));
    }

    pub fn logout(&self) {
        *self.user.write().expect("session lock poisoned") = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.read().expect("session lock poisoned").is_some()
    }

    /// Snapshot of the current profile; stays valid even if the session
    /// ends while the caller holds it.
    pub fn user(&self) -> Option<Arc<UserProfile>> {
        self.user.read().expect("session lock poisoned").clone()
    }
}
