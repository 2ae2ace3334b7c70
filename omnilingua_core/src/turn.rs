//! A single message unit of the rendered conversation.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Role;

/// One immutable entry of the conversation log.
///
/// Fields are private so a turn cannot be altered once it has been created;
/// the error flag can only be set through [`Turn::error`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    id: Uuid,
    role: Role,
    text: String,
    /// Creation time, epoch milliseconds
    timestamp: i64,
    #[serde(default)]
    is_error: bool,
}

impl Turn {
    fn new(role: Role, text: String, is_error: bool) -> Self {
        Self {
            id: Uuid::now_v7(),
            role,
            text,
            timestamp: Utc::now().timestamp_millis(),
            is_error,
        }
    }

    /// A turn typed by the user.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text.into(), false)
    }

    /// A regular model reply (also used for the welcome turn).
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text.into(), false)
    }

    /// A synthetic model turn standing in for a failed exchange.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text.into(), true)
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        self.timestamp
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.is_error
    }
}
