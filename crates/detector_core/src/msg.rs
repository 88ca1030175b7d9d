use crate::panel::ScoreReport;
use crate::session::AuthSession;
use crate::state::{Generation, TabId};

/// Inbound events applied to the coordinator state.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// A panel announced it is mounted and listening for a tab.
    PanelReady { tab_id: TabId },
    /// The user triggered the panel command on the active tab.
    CommandInvoked { tab_id: TabId, url: Option<String> },
    /// The in-page selection read finished for a run.
    SelectionDone {
        tab_id: TabId,
        generation: Generation,
        result: Result<String, String>,
    },
    /// The scoring request finished for a run.
    ScoreDone {
        tab_id: TabId,
        generation: Generation,
        result: Result<ScoreReport, ScoreFailure>,
    },
    /// The auth provider (or a trusted UI surface) reported a session change.
    /// `None` means signed out.
    AuthChanged { session: Option<AuthSession> },
}

/// Failure of a scoring request, as observed by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreFailure {
    /// The service answered with a non-success status.
    Upstream { detail: String },
    /// The request never completed: transport error or timeout.
    Network { message: String },
}
