//! The remote chat session handle.
//!
//! The endpoint keeps no state between calls, so the handle carries what a
//! stateful chat needs: the model, the directive, and the exchanges the
//! model has already seen.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use omnilingua_core::{ChatMessage, Role};

/// Context of one remote conversation.
#[derive(Debug, Clone)]
pub struct ChatSession {
    /// Session identifier, for logs
    pub id: Uuid,
    /// Model every request of this session targets
    pub model: String,
    /// Directive sent along with every request
    pub system_instruction: String,
    /// Completed exchanges, alternating user then model
    pub messages: Vec<ChatMessage>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Create a session with empty history.
    #[must_use]
    pub fn new(model: String, system_instruction: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            model,
            system_instruction,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a completed exchange.
    pub fn add_exchange(&mut self, user: &str, model: &str) {
        self.messages.push(ChatMessage::user(user));
        self.messages.push(ChatMessage::model(model));
        self.updated_at = Utc::now();
    }

    /// Get the last N messages from history, trimmed so the window opens on
    /// a user message.
    #[must_use]
    pub fn last_n_messages(&self, n: usize) -> &[ChatMessage] {
        let mut start = self.messages.len().saturating_sub(n);
        while start < self.messages.len() && self.messages[start].role != Role::User {
            start += 1;
        }
        &self.messages[start..]
    }

    /// Messages for the next request: the (optionally windowed) history
    /// followed by the new user text.
    #[must_use]
    pub fn request_messages(&self, text: &str, history_limit: Option<usize>) -> Vec<ChatMessage> {
        let history = history_limit.map_or(self.messages.as_slice(), |n| self.last_n_messages(n));
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(text));
        messages
    }

    /// Get message count.
    #[must_use]
    pub const fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Check if the session has no history yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
