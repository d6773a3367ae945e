//! Topic name constants.
//!
//! Single source of truth for the topic strings shared between publishers
//! and subscribers.

/// An entry in the command list was created, renamed, edited, or deleted.
/// Payload: `panel::entries::EntryUpdate` as JSON.
pub const ENTRY_UPDATED: &str = "entry.updated";
