//! Conversation controller
//!
//! Runs one chat turn at a time:
//! 1. resolve or create the current session
//! 2. store the user message
//! 3. generate a response, but only while the session's last message is
//!    from the user
//! 4. store the response
//!
//! Provider failures are recovered here. They leave the user message
//! unanswered so that a later call to [`ConversationController::generate_response`]
//! can retry.

use crate::chat::{ChatDb, ChatSession, Message, MessageRole, SessionId};
use crate::conversation::context::{TurnContext, TurnPhase};
use crate::error::AppError;
use crate::providers::{Dispatch, GenerationError, ModelRegistry};
use crate::state::SessionLocator;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// What the response step did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The model answered and the answer was stored
    Responded(Message),
    /// No generation happened because the last message is not from the user
    Skipped,
    /// The provider failed; nothing was stored
    Failed {
        /// Error text to show inline
        error: String,
    },
    /// The selected model is not available; the notice was stored as the response
    InvalidModel(Message),
}

/// Result of a full send-message turn
#[derive(Debug, Clone, Serialize)]
pub struct TurnReport {
    /// Session the turn ran in
    pub session_id: SessionId,
    /// The stored user message, shown immediately regardless of the outcome
    pub user_message: Message,
    /// What the response step did
    pub outcome: TurnOutcome,
}

/// Orchestrates sessions, messages and model calls
pub struct ConversationController {
    db: Arc<ChatDb>,
    locator: SessionLocator,
    registry: Arc<ModelRegistry>,
    generation_timeout: Duration,
}

impl ConversationController {
    /// Create a controller
    pub fn new(
        db: Arc<ChatDb>,
        locator: SessionLocator,
        registry: Arc<ModelRegistry>,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            db,
            locator,
            registry,
            generation_timeout,
        }
    }

    /// The session store
    pub fn db(&self) -> &Arc<ChatDb> {
        &self.db
    }

    /// The model registry
    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Session that was open when the process last stopped
    ///
    /// A pointer to a session that no longer exists resolves to `None`.
    pub async fn resume(&self) -> Result<Option<SessionId>, AppError> {
        let Some(session_id) = self.locator.load() else {
            return Ok(None);
        };

        if self.db.get_session(session_id).await?.is_none() {
            warn!(
                session_id = session_id,
                "Session pointer refers to a missing session, starting fresh"
            );
            return Ok(None);
        }

        debug!(session_id = session_id, "Resumed chat session");
        Ok(Some(session_id))
    }

    /// Store a user message, creating a session titled with it if none is open
    pub async fn submit_user_input(
        &self,
        ctx: &mut TurnContext,
        prompt: &str,
    ) -> Result<Message, AppError> {
        ctx.set_phase(TurnPhase::AwaitingInput);

        let session_id = match ctx.current_session {
            Some(session_id) => session_id,
            None => {
                let session_id = self.db.create_session(prompt).await?;
                ctx.current_session = Some(session_id);
                info!(session_id = session_id, "Started new chat session");
                session_id
            }
        };

        let message = self
            .db
            .append_message(session_id, MessageRole::User, prompt)
            .await?;

        // The session typed in last is the one to resume
        if self.locator.load() != Some(session_id) {
            // The turn goes on without continuity if the sidecar write fails
            if let Err(e) = self.locator.save(session_id) {
                warn!(session_id = session_id, error = %e, "Failed to save session pointer");
            }
        }

        ctx.set_phase(TurnPhase::UserAppended);
        Ok(message)
    }

    /// Generate and store a response for the current session
    ///
    /// Only runs when the session's last message is from the user; the
    /// prompt sent to the model is that message's content.
    pub async fn generate_response(&self, ctx: &mut TurnContext) -> Result<TurnOutcome, AppError> {
        let Some(session_id) = ctx.current_session else {
            debug!("No current session, skipping generation");
            return Ok(TurnOutcome::Skipped);
        };

        let pending = match self.db.last_message(session_id).await? {
            Some(message) if message.is_from_user() => message,
            _ => {
                debug!(session_id = session_id, "Last message is not from the user, skipping generation");
                return Ok(TurnOutcome::Skipped);
            }
        };

        let model = ctx.settings.model.clone();
        let dispatch = tokio::time::timeout(
            self.generation_timeout,
            self.registry
                .dispatch(&model, &pending.content, ctx.settings.params),
        )
        .await
        .unwrap_or_else(|_| Err(GenerationError::Timeout(self.generation_timeout)));

        let outcome = match dispatch {
            Ok(Dispatch::Generated(parts)) => {
                let text = parts.concat();
                let message = self
                    .db
                    .append_message(session_id, MessageRole::Bot, &text)
                    .await?;
                info!(
                    session_id = session_id,
                    message_id = message.id,
                    response_len = text.len(),
                    "Stored bot response"
                );
                TurnOutcome::Responded(message)
            }
            Ok(Dispatch::InvalidModel(notice)) => {
                warn!(session_id = session_id, model = %model, "Unknown model selected");
                let message = self
                    .db
                    .append_message(session_id, MessageRole::Bot, &notice)
                    .await?;
                TurnOutcome::InvalidModel(message)
            }
            Err(e) => {
                warn!(
                    session_id = session_id,
                    model = %model,
                    error = %e,
                    "Response generation failed"
                );
                ctx.set_phase(TurnPhase::AwaitingInput);
                return Ok(TurnOutcome::Failed {
                    error: format!("Error generating response: {}", e),
                });
            }
        };

        ctx.set_phase(TurnPhase::ResponseGenerated);
        Ok(outcome)
    }

    /// Run a full turn: store the prompt, then try to answer it
    pub async fn send(&self, ctx: &mut TurnContext, prompt: &str) -> Result<TurnReport, AppError> {
        if prompt.trim().is_empty() {
            return Err(AppError::InvalidInput("Message cannot be empty".to_string()));
        }
        ctx.settings
            .params
            .validate()
            .map_err(AppError::InvalidInput)?;

        let user_message = self.submit_user_input(ctx, prompt).await?;
        let outcome = self.generate_response(ctx).await?;

        Ok(TurnReport {
            session_id: user_message.session_id,
            user_message,
            outcome,
        })
    }

    /// Make an existing session the current one
    pub async fn switch_session(
        &self,
        ctx: &mut TurnContext,
        session_id: SessionId,
    ) -> Result<ChatSession, AppError> {
        let session = self
            .db
            .get_session(session_id)
            .await?
            .ok_or(AppError::SessionNotFound(session_id))?;

        self.locator.save(session_id)?;
        ctx.current_session = Some(session_id);
        ctx.set_phase(TurnPhase::Idle);
        info!(session_id = session_id, "Switched chat session");
        Ok(session)
    }

    /// Forget the current session without deleting anything
    ///
    /// Stored sessions stay listable; the next prompt starts a new one.
    pub fn clear_history(&self, ctx: &mut TurnContext) -> Result<(), AppError> {
        ctx.current_session = None;
        ctx.set_phase(TurnPhase::Idle);
        self.locator.clear()?;
        info!("Cleared current chat session");
        Ok(())
    }

    /// Messages of the current session, empty when none is open
    pub async fn history(&self, ctx: &TurnContext) -> Result<Vec<Message>, AppError> {
        match ctx.current_session {
            Some(session_id) => self.db.list_messages(session_id).await,
            None => Ok(Vec::new()),
        }
    }

    /// All sessions, newest first
    pub async fn sessions(&self) -> Result<Vec<ChatSession>, AppError> {
        let mut sessions = self.db.list_sessions().await?;
        sessions.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::ScriptedModel;
    use crate::conversation::TurnSettings;
    use crate::providers::{GenerationCapability, GenerationParams, ModelChoice};
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct Stalled;

    #[async_trait]
    impl GenerationCapability for Stalled {
        fn provider(&self) -> &'static str {
            "stalled"
        }

        async fn generate(
            &self,
            _prompt: &str,
            _params: GenerationParams,
        ) -> Result<Vec<String>, GenerationError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(vec!["too late".to_string()])
        }
    }

    async fn controller_with(
        capability: Arc<dyn GenerationCapability>,
        timeout: Duration,
    ) -> (ConversationController, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = ChatDb::new(temp_dir.path().join("chat.db").to_str().unwrap())
            .await
            .unwrap();
        let locator = SessionLocator::new(temp_dir.path().join("session_state.json"));
        let registry = ModelRegistry::new().with_capability(ModelChoice::Llama, capability);
        let controller =
            ConversationController::new(Arc::new(db), locator, Arc::new(registry), timeout);
        (controller, temp_dir)
    }

    fn context() -> TurnContext {
        TurnContext::new(
            None,
            TurnSettings {
                model: "LLaMA".to_string(),
                params: GenerationParams {
                    temperature: 0.7,
                    max_tokens: 4000,
                },
            },
        )
    }

    #[tokio::test]
    async fn test_turn_phases() {
        let (controller, _temp_dir) =
            controller_with(Arc::new(ScriptedModel::default()), Duration::from_secs(5)).await;
        let mut ctx = context();
        assert_eq!(ctx.phase(), TurnPhase::Idle);

        controller.submit_user_input(&mut ctx, "Hello").await.unwrap();
        assert_eq!(ctx.phase(), TurnPhase::UserAppended);

        let outcome = controller.generate_response(&mut ctx).await.unwrap();
        assert!(matches!(outcome, TurnOutcome::Responded(_)));
        assert_eq!(ctx.phase(), TurnPhase::ResponseGenerated);

        controller.clear_history(&mut ctx).unwrap();
        assert_eq!(ctx.phase(), TurnPhase::Idle);
        assert_eq!(ctx.current_session, None);
    }

    #[tokio::test]
    async fn test_failed_generation_waits_for_input() {
        let model = Arc::new(ScriptedModel::default());
        model.push_failure("boom");
        let (controller, _temp_dir) = controller_with(model, Duration::from_secs(5)).await;
        let mut ctx = context();

        let report = controller.send(&mut ctx, "Hello").await.unwrap();
        match report.outcome {
            TurnOutcome::Failed { error } => {
                assert!(error.starts_with("Error generating response:"));
                assert!(error.contains("boom"));
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
        assert_eq!(ctx.phase(), TurnPhase::AwaitingInput);
    }

    #[tokio::test]
    async fn test_generation_timeout_is_a_failure() {
        let (controller, _temp_dir) =
            controller_with(Arc::new(Stalled), Duration::from_millis(50)).await;
        let mut ctx = context();

        let report = controller.send(&mut ctx, "Anyone there?").await.unwrap();
        match report.outcome {
            TurnOutcome::Failed { error } => {
                assert!(error.contains("timed out after 50ms"), "{}", error)
            }
            other => panic!("Expected Failed, got {:?}", other),
        }

        let history = controller.history(&ctx).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_generate_without_session_is_skipped() {
        let model = Arc::new(ScriptedModel::default());
        let (controller, _temp_dir) = controller_with(model.clone(), Duration::from_secs(5)).await;
        let mut ctx = context();

        let outcome = controller.generate_response(&mut ctx).await.unwrap();
        assert_eq!(outcome, TurnOutcome::Skipped);
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_resume_ignores_pointer_to_missing_session() {
        let (controller, temp_dir) =
            controller_with(Arc::new(ScriptedModel::default()), Duration::from_secs(5)).await;
        SessionLocator::new(temp_dir.path().join("session_state.json"))
            .save(41)
            .unwrap();

        assert_eq!(controller.resume().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_send_rejects_invalid_params_before_storing() {
        let (controller, _temp_dir) =
            controller_with(Arc::new(ScriptedModel::default()), Duration::from_secs(5)).await;
        let mut ctx = context();
        ctx.settings.params.max_tokens = 0;

        let result = controller.send(&mut ctx, "Hello").await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert!(controller.sessions().await.unwrap().is_empty());
        assert_eq!(ctx.current_session, None);
    }
}
