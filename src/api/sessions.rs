//! Session API endpoints
//!
//! History navigation: listing sessions, resuming the last open one,
//! switching between them and the soft clear.

use crate::api::utils::RouterState;
use crate::chat::{ChatSession, Message, SessionId};
use crate::error::AppError;
use crate::providers::{ModelChoice, MAX_TOKENS_LIMIT};
use crate::state::SettingsOverride;
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Serialize;

/// Session entry for the history sidebar
#[derive(Debug, Serialize)]
pub struct SessionSummary {
    /// Session identifier
    pub id: SessionId,
    /// Session title
    pub title: String,
    /// Unix timestamp when the session was created
    pub created_at: i64,
}

impl From<ChatSession> for SessionSummary {
    fn from(session: ChatSession) -> Self {
        Self {
            id: session.id,
            title: session.title,
            created_at: session.created_at,
        }
    }
}

/// The session restored from the sidecar file, if any
#[derive(Debug, Serialize)]
pub struct CurrentSessionResponse {
    /// Current session identifier
    pub session_id: Option<SessionId>,
    /// Messages of the current session
    pub messages: Vec<Message>,
}

/// A session together with its messages
#[derive(Debug, Serialize)]
pub struct SessionWithMessagesResponse {
    /// The session
    pub session: SessionSummary,
    /// Messages in creation order
    pub messages: Vec<Message>,
}

/// Models offered in the picker and the default settings
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    /// Registered models in picker order
    pub models: Vec<ModelChoice>,
    /// Preselected model
    pub default_model: ModelChoice,
    /// Default temperature
    pub default_temperature: f32,
    /// Default response token limit
    pub default_max_tokens: u32,
    /// Highest accepted token limit
    pub max_tokens_limit: u32,
}

/// GET /api/models - List models and generation defaults
pub async fn list_models(State(state): State<RouterState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.controller.registry().models(),
        default_model: state.generation.default_model,
        default_temperature: state.generation.default_temperature,
        default_max_tokens: state.generation.default_max_tokens,
        max_tokens_limit: MAX_TOKENS_LIMIT,
    })
}

/// GET /api/sessions - List sessions, newest first
pub async fn list_sessions(
    State(state): State<RouterState>,
) -> Result<Json<Vec<SessionSummary>>, AppError> {
    let sessions = state.controller.sessions().await?;
    Ok(Json(sessions.into_iter().map(SessionSummary::from).collect()))
}

/// GET /api/sessions/current - Session restored from the last run
pub async fn current_session(
    State(state): State<RouterState>,
) -> Result<Json<CurrentSessionResponse>, AppError> {
    let session_id = state.controller.resume().await?;
    let ctx = state.context(session_id, &SettingsOverride::default());
    let messages = state.controller.history(&ctx).await?;

    Ok(Json(CurrentSessionResponse {
        session_id,
        messages,
    }))
}

/// POST /api/sessions/:id/open - Make a session the current one
pub async fn open_session(
    State(state): State<RouterState>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionWithMessagesResponse>, AppError> {
    let _turn = state.turn_lock.lock().await;
    let mut ctx = state.context(None, &SettingsOverride::default());

    let session = state.controller.switch_session(&mut ctx, id).await?;
    let messages = state.controller.history(&ctx).await?;

    Ok(Json(SessionWithMessagesResponse {
        session: session.into(),
        messages,
    }))
}

/// GET /api/sessions/:id/messages - Messages of a session
///
/// Unknown sessions have no messages.
pub async fn session_messages(
    State(state): State<RouterState>,
    Path(id): Path<SessionId>,
) -> Result<Json<Vec<Message>>, AppError> {
    let messages = state.controller.db().list_messages(id).await?;
    Ok(Json(messages))
}

/// POST /api/history/clear - Start fresh without deleting stored sessions
pub async fn clear_history(
    State(state): State<RouterState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _turn = state.turn_lock.lock().await;
    let mut ctx = state.context(None, &SettingsOverride::default());
    state.controller.clear_history(&mut ctx)?;

    Ok(Json(serde_json::json!({
        "message": "Chat history cleared",
    })))
}
