//! Detector background: the long-lived coordinator that wires the pure state
//! machine to the host ports and drives the scoring and sign-in workflows.
mod coordinator;
mod dispatch;
mod session_store;
mod wire;

pub use coordinator::{
    ActiveTab, Background, BackgroundConfig, BackgroundPorts, TOGGLE_PANEL_COMMAND,
};
pub use dispatch::handle_runtime_message;
pub use session_store::{JsonSessionStore, SessionStore};
pub use wire::{auth_broadcast, RuntimeMessage};
