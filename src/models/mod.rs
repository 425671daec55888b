//! Domain models for Choreboard.
//!
//! The data model is deliberately small:
//!
//! - [`Item`]: a to-do entry with an integer id and its text. The only
//!   persistent entity; stored in a single shared table.
//! - Request/response bodies for the JSON API (`AddItemInput` and friends).
//!
//! Sessions are in-memory only and live in [`crate::session`], not here:
//! they are never serialized to the store and do not survive a restart.

mod item;

pub use item::*;
