//! Chat module
//!
//! Handles chat sessions and messages storage using SQLite database.

pub mod db;
pub mod models;

pub use db::ChatDb;
pub use models::{ChatSession, Message, MessageId, MessageRole, SessionId};
