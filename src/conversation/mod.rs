//! Conversation module
//!
//! Turn orchestration on top of the session store, the session locator and
//! the model registry.

pub mod context;
pub mod controller;

pub use context::{TurnContext, TurnPhase, TurnSettings};
pub use controller::{ConversationController, TurnOutcome, TurnReport};
