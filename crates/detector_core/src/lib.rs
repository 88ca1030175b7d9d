//! Detector core: pure coordination state machine and UI wire contract.
mod effect;
mod msg;
mod panel;
mod session;
mod state;
mod update;

pub use effect::Effect;
pub use msg::{Msg, ScoreFailure};
pub use panel::{ErrorKind, ErrorPayload, PanelOutbound, ScoreReport};
pub use session::AuthSession;
pub use state::{CoordinatorState, Generation, RunPhase, RunState, TabId};
pub use update::{update, MIN_SELECTION_CHARS};
