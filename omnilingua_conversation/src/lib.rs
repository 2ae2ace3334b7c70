#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Conversation session management for a single chat.
//!
//! Three pieces cooperate here:
//! - [`ChatGateway`] owns the one remote chat session and turns a line of
//!   user text into a model reply
//! - [`ConversationStore`] is the append-only log of turns that gets rendered
//! - [`TurnController`] runs one submission at a time against both
//!
//! # Key Features
//! - Lazily created, resettable remote session
//! - Single-flight submissions guarded by a busy flag
//! - Remote failures become error turns instead of errors

mod controller;
mod gateway;
mod session;
mod store;

pub use controller::{ConversationSnapshot, IgnoreReason, SubmitOutcome, TurnController};
pub use gateway::{ChatGateway, RemoteError, SessionConfig, SessionGateway};
pub use session::ChatSession;
pub use store::ConversationStore;
