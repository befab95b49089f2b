//! Core domain + application logic for reachbot.
//!
//! This crate is framework-agnostic: Telegram lives behind the messaging
//! port implemented in the adapter crate. The pieces with real invariants
//! are the recipient store, the flood guard, the moderation gate, and the
//! broadcast engine; the content generator is plain string templating.

pub mod broadcast;
pub mod config;
pub mod content;
pub mod domain;
pub mod errors;
pub mod flood;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod moderation;
pub mod store;

pub use errors::{Error, Result};
