//! Chat Relay Backend Library
//!
//! Persists chat sessions, remembers the open session across restarts and
//! forwards prompts to one of several model providers.
//! The main binary is in `src/main.rs`.

pub mod api;
/// Session and message storage
pub mod chat;
pub mod config;
pub mod conversation;
pub mod error;
pub mod providers;
/// Shared handler state and the session pointer sidecar
pub mod state;
