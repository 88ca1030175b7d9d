use crate::panel::PanelOutbound;
use crate::session::AuthSession;
use crate::state::{Generation, TabId};

/// Side effects requested by `update`, executed by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Open (or focus) the side panel for a tab. Idempotent if already open.
    OpenPanel { tab_id: TabId },
    /// Deliver a message to the panel for a tab, waiting briefly on readiness.
    Deliver {
        tab_id: TabId,
        message: PanelOutbound,
    },
    /// Read the current selection out of every frame of a tab.
    ExtractSelection { tab_id: TabId, generation: Generation },
    /// Submit the raw selected text to the scoring service.
    RequestScore {
        tab_id: TabId,
        generation: Generation,
        text: String,
    },
    /// Mirror the session cache into durable storage; `None` clears it.
    PersistSession { session: Option<AuthSession> },
    /// Announce the current session to every listening UI surface.
    BroadcastAuth { session: AuthSession },
}
