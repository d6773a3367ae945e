//! Event system for decoupled panel components.
//!
//! The event bus provides:
//! - Publish-subscribe on named topics
//! - Synchronous delivery in subscription order
//! - Per-handler failure isolation
//!
//! # Architecture
//!
//! Components that mutate a shared remote resource publish a fact on a
//! topic; components that render that resource subscribe to the same topic
//! and reconcile. The bus never persists or replays: a subscriber that
//! joins after a publish never observes it. The bus is always an explicit
//! injected dependency (`Arc<EventBus>`), never a module-level singleton.

mod event_bus;
pub mod topics;

pub use event_bus::{EventBus, SubscriptionId};
