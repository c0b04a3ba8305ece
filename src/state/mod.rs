// State management module
// Handles shared handler state and the current-session pointer

pub mod app_state;
pub mod persistence;

pub use app_state::{AppState, SettingsOverride};
pub use persistence::{PersistenceError, SessionLocator};
