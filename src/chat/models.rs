//! Chat data models
//!
//! Defines structures for chat sessions and their messages.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Identity of a chat session
///
/// Assigned by the store in creation order, so a larger id is a more recent session.
pub type SessionId = i64;

/// Identity of a single message, monotonically increasing across the store
pub type MessageId = i64;

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the user
    User,
    /// Message generated by a model
    Bot,
}

impl MessageRole {
    /// Convert the role to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Bot => "bot",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A titled conversation thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ChatSession {
    /// Unique identifier for the session
    pub id: SessionId,
    /// Title, taken from the first user prompt when the session was created
    pub title: String,
    /// When the session was created (Unix timestamp)
    pub created_at: i64,
}

/// A single immutable turn in a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// Unique identifier, also the message's position in creation order
    pub id: MessageId,
    /// ID of the session this message belongs to
    pub session_id: SessionId,
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
    /// When the message was created (Unix timestamp)
    pub created_at: i64,
}

impl Message {
    /// Whether this message was sent by the user
    pub fn is_from_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MessageRole::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&MessageRole::Bot).unwrap(), "\"bot\"");
        let role: MessageRole = serde_json::from_str("\"bot\"").unwrap();
        assert_eq!(role, MessageRole::Bot);
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let result: Result<MessageRole, _> = serde_json::from_str("\"assistant\"");
        assert!(result.is_err());
    }
}
