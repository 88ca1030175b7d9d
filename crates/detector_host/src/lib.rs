//! Detector host: trait seams to the browser host and concrete HTTP clients.
mod api;
mod auth;
mod extract;
mod offscreen;
mod panel;
mod score;
mod store;
mod types;

pub use api::{ApiClient, ApiError, ApiSettings, HttpApiClient};
pub use auth::{AuthError, IdentityProvider, ProviderIdentity};
pub use extract::{extract_selection, first_nonblank, FrameScripting, InjectionError};
pub use offscreen::{
    AuthHandoff, OffscreenBridge, OffscreenError, OffscreenHost, OffscreenSettings, StartAck,
};
pub use panel::{
    DeliveryError, DeliverySettings, PanelMessenger, PanelPort, PanelSurface, ReadinessProbe,
};
pub use score::{HttpScoreService, ScoreError, ScoreOutcome, ScoreService, ScoreSettings};
pub use store::{read_optional, AtomicFileWriter, StoreError};
pub use types::TabId;
