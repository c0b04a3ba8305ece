//! Shared fixtures for handler tests

use crate::api::utils::RouterState;
use crate::chat::ChatDb;
use crate::config::GenerationConfig;
use crate::conversation::ConversationController;
use crate::providers::{
    GenerationCapability, GenerationError, GenerationParams, ModelChoice, ModelRegistry,
};
use crate::state::{AppState, SessionLocator};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Capability that replays queued replies, echoing once the queue is empty
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<Vec<String>, String>>>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn push_reply(&self, parts: &[&str]) {
        let parts = parts.iter().map(|p| p.to_string()).collect();
        self.replies.lock().unwrap().push_back(Ok(parts));
    }

    pub fn push_failure(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationCapability for ScriptedModel {
    fn provider(&self) -> &'static str {
        "scripted"
    }

    async fn generate(
        &self,
        prompt: &str,
        _params: GenerationParams,
    ) -> Result<Vec<String>, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(parts)) => Ok(parts),
            Some(Err(body)) => Err(GenerationError::Status {
                provider: "scripted",
                status: 500,
                body,
            }),
            None => Ok(vec![format!("echo: {}", prompt)]),
        }
    }
}

pub fn test_generation_config() -> GenerationConfig {
    GenerationConfig {
        default_model: ModelChoice::Llama,
        default_temperature: 0.7,
        default_max_tokens: 4000,
        timeout_secs: 5,
    }
}

pub async fn create_test_router_state() -> (RouterState, Arc<ScriptedModel>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let chat_db = ChatDb::new(db_path.to_str().unwrap())
        .await
        .expect("Failed to create test database");
    let locator = SessionLocator::new(temp_dir.path().join("session_state.json"));

    let model = Arc::new(ScriptedModel::default());
    let registry = ModelRegistry::new().with_capability(ModelChoice::Llama, model.clone());
    let controller = ConversationController::new(
        Arc::new(chat_db),
        locator,
        Arc::new(registry),
        Duration::from_secs(5),
    );

    let state = Arc::new(AppState::new(controller, test_generation_config()));
    (state, model, temp_dir)
}
