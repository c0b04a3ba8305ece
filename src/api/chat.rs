//! Chat API endpoints
//!
//! Handles sending messages and retrying unanswered prompts.

use crate::api::utils::{validate_message, RouterState};
use crate::chat::{Message, SessionId};
use crate::conversation::TurnOutcome;
use crate::error::AppError;
use crate::state::SettingsOverride;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Request to send a message
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// Message content
    pub message: String,
    /// Session the message belongs to; a new session is started when absent
    #[serde(default)]
    pub session_id: Option<SessionId>,
    /// Model and sampling overrides
    #[serde(flatten)]
    pub settings: SettingsOverride,
}

/// Request to retry generation for an unanswered prompt
#[derive(Debug, Deserialize)]
pub struct RetryRequest {
    /// Session to answer
    pub session_id: SessionId,
    /// Model and sampling overrides
    #[serde(flatten)]
    pub settings: SettingsOverride,
}

/// Result of a chat turn
#[derive(Debug, Serialize)]
pub struct ChatTurnResponse {
    /// Session the turn ran in
    pub session_id: SessionId,
    /// The stored user message, when this turn stored one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_message: Option<Message>,
    /// What the response step did
    pub outcome: TurnOutcome,
    /// Full message list of the session after the turn
    pub messages: Vec<Message>,
}

/// POST /api/chat - Send a message and generate a response
pub async fn send_message(
    State(state): State<RouterState>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<ChatTurnResponse>, AppError> {
    validate_message(&request.message)?;

    let _turn = state.turn_lock.lock().await;
    let mut ctx = state.context(request.session_id, &request.settings);

    info!(
        session_id = ?request.session_id,
        model = %ctx.settings.model,
        message_len = request.message.len(),
        "Chat message received"
    );

    let report = state.controller.send(&mut ctx, &request.message).await?;
    let messages = state.controller.history(&ctx).await?;

    Ok(Json(ChatTurnResponse {
        session_id: report.session_id,
        user_message: Some(report.user_message),
        outcome: report.outcome,
        messages,
    }))
}

/// POST /api/chat/retry - Generate a response for the session's pending prompt
///
/// Does nothing when the session's last message is already answered.
pub async fn retry_generation(
    State(state): State<RouterState>,
    Json(request): Json<RetryRequest>,
) -> Result<Json<ChatTurnResponse>, AppError> {
    let _turn = state.turn_lock.lock().await;

    state
        .controller
        .db()
        .get_session(request.session_id)
        .await?
        .ok_or(AppError::SessionNotFound(request.session_id))?;

    let mut ctx = state.context(Some(request.session_id), &request.settings);
    ctx.settings
        .params
        .validate()
        .map_err(AppError::InvalidInput)?;

    let outcome = state.controller.generate_response(&mut ctx).await?;
    let messages = state.controller.history(&ctx).await?;

    Ok(Json(ChatTurnResponse {
        session_id: request.session_id,
        user_message: None,
        outcome,
        messages,
    }))
}
