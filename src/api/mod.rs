//! API module
//!
//! Contains HTTP request handlers for the chat endpoints

pub mod chat;
pub mod sessions;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

use axum::{
    routing::{get, post},
    Router,
};
use utils::RouterState;

/// Build the API routes
///
/// Middleware is added by the binary.
pub fn router(state: RouterState) -> Router {
    Router::new()
        // Model picker
        .route("/api/models", get(sessions::list_models))
        // History navigation
        .route("/api/sessions", get(sessions::list_sessions))
        .route("/api/sessions/current", get(sessions::current_session))
        .route("/api/sessions/:id/open", post(sessions::open_session))
        .route("/api/sessions/:id/messages", get(sessions::session_messages))
        .route("/api/history/clear", post(sessions::clear_history))
        // Chat turns
        .route("/api/chat", post(chat::send_message))
        .route("/api/chat/retry", post(chat::retry_generation))
        .with_state(state)
}
