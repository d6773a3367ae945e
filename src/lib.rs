//! Chat-bot admin panel client library.
//!
//! This crate is the state-synchronization layer behind a chat-bot
//! administration panel. It keeps independently-mounted panel components
//! agreed on the contents of a server-backed command list, drives the bot
//! status display, and edits greeting templates.
//!
//! # Architecture
//!
//! - `bus`: named-topic publish/subscribe for decoupled panel components
//! - `api`: REST client for the bot backend (status, entries, templates)
//! - `panel`: the stateful components (status poller, entry list, entry
//!   editor, greeting form)
//! - `session`: authenticated-user snapshot
//! - `config`: environment-driven configuration
//!
//! Entry editors never hold a reference to the list they appear in; they
//! broadcast what changed on the bus and the list reconciles.

pub mod api;
pub mod bus;
pub mod config;
pub mod panel;
pub mod session;

use std::sync::Arc;

use api::ApiClient;
use bus::EventBus;
use config::Config;
use session::Session;

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("{0}")]
    Api(#[from] api::ApiError),
    #[error("{0}")]
    Other(String),
}

// ---------------------------------------------------------------------------
// Shared context
// ---------------------------------------------------------------------------

/// Everything a mounted panel component needs: the REST client, the event
/// bus, and the current session. Built once at startup and cloned into
/// components; there is no hidden global state.
#[derive(Clone)]
pub struct PanelContext {
    pub client: Arc<ApiClient>,
    pub bus: Arc<EventBus>,
    pub session: Arc<Session>,
}

impl PanelContext {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Arc::new(ApiClient::new(&config.api_base_url)),
            bus: Arc::new(EventBus::new()),
            session: Arc::new(Session::new()),
        }
    }
}
