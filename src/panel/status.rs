//! Bot status poller.
//!
//! Drives the single remote status resource through a bounded
//! refresh/mutate state machine. A fixed-interval background refresh and
//! on-demand manual refresh share one dedup guard, so overlapping fetches
//! collapse into a single network call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time;

use crate::api::types::{BotState, BotStatus};
use crate::api::ApiClient;

use super::{DedupGuard, STATUS_ERROR_MESSAGE};

/// Immutable view of the last successful status fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub state: BotState,
    /// Meaningful only while the bot is connecting or joined.
    pub since: Option<DateTime<Utc>>,
}

impl StatusSnapshot {
    fn from_status(status: BotStatus) -> Self {
        let since = match status.state {
            BotState::NotStarted => None,
            BotState::Connecting | BotState::Joined => status.started,
        };
        Self {
            state: status.state,
            since,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Fetching,
    Starting,
    Stopping,
    Settled(StatusSnapshot),
    Failed(String),
}

/// Poller for the remote bot status.
///
/// Constructed with [`StatusPoller::mount`], which spawns the interval
/// task; the first tick fires immediately and performs the initial fetch.
/// [`StatusPoller::unmount`] (also run on drop) cancels the timer and
/// marks the poller dead so in-flight responses are discarded.
pub struct StatusPoller {
    client: Arc<ApiClient>,
    state: Mutex<PollerState>,
    guard: DedupGuard,
    alive: AtomicBool,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl StatusPoller {
    /// Create a poller without a background timer. Useful for one-shot
    /// status checks and tests; interactive views use [`mount`].
    ///
    /// [`mount`]: StatusPoller::mount
    pub fn new(client: Arc<ApiClient>) -> Arc<Self> {
        Arc::new(Self {
            client,
            state: Mutex::new(PollerState::Idle),
            guard: DedupGuard::new(),
            alive: AtomicBool::new(true),
            timer: Mutex::new(None),
        })
    }

    /// Create a poller and start refreshing every `period` until unmounted.
    pub fn mount(client: Arc<ApiClient>, period: Duration) -> Arc<Self> {
        let poller = Self::new(client);

        let weak = Arc::downgrade(&poller);
        let handle = tokio::spawn(async move {
            let mut interval = time::interval(period);
            loop {
                interval.tick().await;
                let Some(poller) = weak.upgrade() else { break };
                if !poller.alive.load(Ordering::Acquire) {
                    break;
                }
                poller.refresh().await;
            }
        });
        *poller.timer.lock().expect("status poller mutex poisoned") = Some(handle);

        poller
    }

    /// Cancel the background timer and drop the results of any in-flight
    /// requests. Idempotent.
    pub fn unmount(&self) {
        self.alive.store(false, Ordering::Release);
        if let Some(handle) = self
            .timer
            .lock()
            .expect("status poller mutex poisoned")
            .take()
        {
            handle.abort();
        }
    }

    /// Current state of the machine.
    pub fn state(&self) -> PollerState {
        self.state.lock().expect("status poller mutex poisoned").clone()
    }

    /// Fetch the remote status. Returns `false` when another refresh was
    /// already in flight and this one was swallowed.
    pub async fn refresh(&self) -> bool {
        if !self.guard.try_begin() {
            tracing::debug!("status refresh already in flight, skipping");
            return false;
        }

        // Only the very first load shows as Fetching; later refreshes keep
        // displaying the last settled snapshot while the fetch runs.
        {
            let mut state = self.state.lock().expect("status poller mutex poisoned");
            if *state == PollerState::Idle {
                *state = PollerState::Fetching;
            }
        }

        let result = self.client.bot_status().await;
        self.guard.end();
        if !self.alive.load(Ordering::Acquire) {
            return true;
        }

        match result {
            Ok(status) => {
                self.set_state(PollerState::Settled(StatusSnapshot::from_status(status)));
            }
            Err(e) => self.fail("status fetch failed", &e),
        }
        true
    }

    /// Ask the backend to start the bot, then refresh.
    pub async fn start(&self) {
        self.set_state(PollerState::Starting);

        let result = self.client.start_bot().await;
        if !self.alive.load(Ordering::Acquire) {
            return;
        }

        match result {
            Ok(()) => {
                self.refresh().await;
            }
            Err(e) => self.fail("bot start failed", &e),
        }
    }

    /// Ask the backend to stop the bot, then refresh.
    pub async fn stop(&self) {
        self.set_state(PollerState::Stopping);

        let result = self.client.stop_bot().await;
        if !self.alive.load(Ordering::Acquire) {
            return;
        }

        match result {
            Ok(()) => {
                self.refresh().await;
            }
            Err(e) => self.fail("bot stop failed", &e),
        }
    }

    fn set_state(&self, next: PollerState) {
        *self.state.lock().expect("status poller mutex poisoned") = next;
    }

    fn fail(&self, action: &str, error: &crate::api::ApiError) {
        tracing::error!("{action}: {error}");
        self.set_state(PollerState::Failed(STATUS_ERROR_MESSAGE.to_string()));
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.unmount();
    }
}
