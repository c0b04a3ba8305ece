//! Per-request conversation context
//!
//! Everything a UI would otherwise keep as ambient global state (open
//! session, model choice, sampling settings) travels in a [`TurnContext`]
//! passed into the controller.

use crate::chat::SessionId;
use crate::providers::GenerationParams;
use serde::{Deserialize, Serialize};

/// Where the current turn stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// No turn in progress
    Idle,
    /// Ready for (or retrying after) user input
    AwaitingInput,
    /// The user message is stored and a response may be generated
    UserAppended,
    /// The bot response is stored
    ResponseGenerated,
}

/// Model selection and sampling settings for one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnSettings {
    /// Display name of the selected model
    pub model: String,
    /// Sampling parameters
    pub params: GenerationParams,
}

/// State carried through one controller invocation
#[derive(Debug, Clone)]
pub struct TurnContext {
    /// Session the user is looking at, if any
    pub current_session: Option<SessionId>,
    /// Model and sampling settings
    pub settings: TurnSettings,
    phase: TurnPhase,
}

impl TurnContext {
    /// Create a context for the given session and settings
    pub fn new(current_session: Option<SessionId>, settings: TurnSettings) -> Self {
        Self {
            current_session,
            settings,
            phase: TurnPhase::Idle,
        }
    }

    /// Current phase of the turn
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: TurnPhase) {
        tracing::trace!(from = ?self.phase, to = ?phase, "Turn phase transition");
        self.phase = phase;
    }
}
