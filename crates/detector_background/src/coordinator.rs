use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use detector_core::{
    update, AuthSession, CoordinatorState, Effect, Msg, ScoreFailure, ScoreReport, TabId,
};
use detector_host::{
    extract_selection, ApiClient, AuthHandoff, DeliverySettings, FrameScripting, IdentityProvider,
    InjectionError, OffscreenBridge, OffscreenHost, OffscreenSettings, PanelMessenger, PanelPort,
    PanelSurface, ProviderIdentity, ReadinessProbe, ScoreError, ScoreOutcome, ScoreService,
};
use detector_logging::{detector_debug, detector_error, detector_warn};

use crate::session_store::SessionStore;
use crate::wire::auth_broadcast;

/// The single keyboard command; anything else is ignored.
pub const TOGGLE_PANEL_COMMAND: &str = "toggle-ai-likelihood-panel";

/// Active-tab snapshot captured by the host when the command fires.
#[derive(Debug, Clone)]
pub struct ActiveTab {
    pub id: TabId,
    pub url: Option<String>,
}

/// Host capabilities handed to the coordinator at construction.
pub struct BackgroundPorts {
    pub panel: Arc<dyn PanelPort>,
    pub surface: Arc<dyn PanelSurface>,
    pub scripting: Arc<dyn FrameScripting>,
    pub score: Arc<dyn ScoreService>,
    pub offscreen: Arc<dyn OffscreenHost>,
    pub provider: Arc<dyn IdentityProvider>,
    pub store: Arc<dyn SessionStore>,
    pub api: Arc<dyn ApiClient>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BackgroundConfig {
    pub delivery: DeliverySettings,
    pub offscreen: OffscreenSettings,
}

/// The long-lived background coordinator. Owns the process-scoped state and
/// every host handle; all mutation goes through the pure `update`.
pub struct Background {
    state: Arc<Mutex<CoordinatorState>>,
    messenger: PanelMessenger,
    surface: Arc<dyn PanelSurface>,
    scripting: Arc<dyn FrameScripting>,
    score: Arc<dyn ScoreService>,
    bridge: OffscreenBridge,
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn SessionStore>,
    api: Arc<dyn ApiClient>,
}

/// Readiness view over the shared coordinator state, handed to the
/// messenger while it polls.
struct StateProbe(Arc<Mutex<CoordinatorState>>);

impl ReadinessProbe for StateProbe {
    fn is_ready(&self, tab_id: TabId) -> bool {
        self.0.lock().expect("state lock").is_ready(tab_id)
    }
}

impl Background {
    pub fn new(ports: BackgroundPorts, config: BackgroundConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(CoordinatorState::new())),
            messenger: PanelMessenger::new(ports.panel, config.delivery),
            surface: ports.surface,
            scripting: ports.scripting,
            score: ports.score,
            bridge: OffscreenBridge::new(ports.offscreen, config.offscreen),
            provider: ports.provider,
            store: ports.store,
            api: ports.api,
        }
    }

    /// Seeds the session cache from the durable mirror; called once when the
    /// background process starts.
    pub async fn restore_session(&self) {
        match self.store.load().await {
            Ok(Some(session)) => {
                self.state
                    .lock()
                    .expect("state lock")
                    .restore_session(session);
            }
            Ok(None) => {}
            Err(err) => detector_warn!("session mirror unreadable: {}", err),
        }
    }

    /// Entry point for the keyboard command, scoped to the active tab.
    pub async fn on_command(&self, command: &str, tab: ActiveTab) {
        if command != TOGGLE_PANEL_COMMAND {
            detector_debug!("ignoring unknown command {:?}", command);
            return;
        }
        self.inject(Msg::CommandInvoked {
            tab_id: tab.id,
            url: tab.url,
        })
        .await;
    }

    /// Entry point for auth-provider change notifications. `None` means the
    /// provider lost or ended the session.
    pub async fn on_provider_auth_changed(&self, identity: Option<ProviderIdentity>) {
        let session = identity.map(session_from_identity);
        self.inject(Msg::AuthChanged { session }).await;
    }

    /// Current session as read by synchronous-looking handlers: the cache,
    /// never the provider.
    pub fn session(&self) -> AuthSession {
        self.state
            .lock()
            .expect("state lock")
            .session()
            .cloned()
            .unwrap_or_else(AuthSession::signed_out)
    }

    /// Feeds an `auth-result` message from the hidden document into the
    /// sign-in rendezvous.
    pub fn resolve_auth_result(&self, handoff: AuthHandoff) {
        self.bridge.resolve_result(handoff);
    }

    /// Full federated sign-in: hidden-document round trip, credential
    /// exchange, session establishment, durable mirror, broadcast.
    pub async fn sign_in_with_google(&self) -> Result<AuthSession, String> {
        let handoff = self
            .bridge
            .run_google_sign_in()
            .await
            .map_err(|err| err.to_string())?;
        let id_token = handoff
            .id_token
            .ok_or_else(|| "sign-in result carried no identity token".to_string())?;
        let identity = self
            .provider
            .exchange_google_token(&id_token)
            .await
            .map_err(|err| err.to_string())?;

        let session = session_from_identity(identity);
        self.inject(Msg::AuthChanged {
            session: Some(session.clone()),
        })
        .await;

        // Provisioning after the session is established; a failure here is
        // logged, the sign-in itself already succeeded.
        if let Some(token) = session.id_token.as_deref() {
            if let Err(err) = self
                .api
                .init_user(token, session.display_name.as_deref())
                .await
            {
                detector_warn!("user provisioning call failed: {}", err);
            }
        }
        Ok(session)
    }

    pub async fn sign_out(&self) -> Result<(), String> {
        self.provider.sign_out().await.map_err(|err| err.to_string())?;
        self.inject(Msg::AuthChanged { session: None }).await;
        Ok(())
    }

    /// Forwards a usage event if a session exists; `not_signed_in` otherwise.
    pub async fn log_event(&self, payload: serde_json::Value) -> Result<(), String> {
        let token = self
            .session()
            .id_token
            .ok_or_else(|| "not_signed_in".to_string())?;
        self.api
            .log_usage(&token, &payload)
            .await
            .map_err(|err| err.to_string())
    }

    /// Applies a message and runs the resulting effects; follow-up messages
    /// produced by effects are drained in order.
    pub(crate) async fn inject(&self, msg: Msg) {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            for effect in self.apply(msg) {
                if let Some(follow_up) = self.run_effect(effect).await {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    fn apply(&self, msg: Msg) -> Vec<Effect> {
        let mut state = self.state.lock().expect("state lock");
        let (next, effects) = update(std::mem::take(&mut *state), msg);
        *state = next;
        effects
    }

    async fn run_effect(&self, effect: Effect) -> Option<Msg> {
        match effect {
            Effect::OpenPanel { tab_id } => {
                if let Err(err) = self.surface.open(tab_id).await {
                    detector_warn!("failed to open panel for tab {}: {}", tab_id, err);
                }
                None
            }
            Effect::Deliver { tab_id, message } => {
                let probe = StateProbe(self.state.clone());
                self.messenger.deliver(&probe, tab_id, &message).await;
                None
            }
            Effect::ExtractSelection { tab_id, generation } => {
                let result = extract_selection(self.scripting.as_ref(), tab_id)
                    .await
                    .map_err(|InjectionError(message)| message);
                Some(Msg::SelectionDone {
                    tab_id,
                    generation,
                    result,
                })
            }
            Effect::RequestScore {
                tab_id,
                generation,
                text,
            } => {
                let result = match self.score.score(&text).await {
                    Ok(outcome) => Ok(to_report(outcome)),
                    Err(ScoreError::Upstream { detail, .. }) => {
                        Err(ScoreFailure::Upstream { detail })
                    }
                    Err(ScoreError::Network(message)) => Err(ScoreFailure::Network { message }),
                };
                Some(Msg::ScoreDone {
                    tab_id,
                    generation,
                    result,
                })
            }
            Effect::PersistSession { session } => {
                let stored = match &session {
                    Some(session) => self.store.save(session).await,
                    None => self.store.clear().await,
                };
                if let Err(err) = stored {
                    detector_error!("failed to mirror session to storage: {}", err);
                }
                None
            }
            Effect::BroadcastAuth { session } => {
                self.messenger.broadcast(&auth_broadcast(&session)).await;
                None
            }
        }
    }
}

fn session_from_identity(identity: ProviderIdentity) -> AuthSession {
    AuthSession {
        signed_in: true,
        uid: Some(identity.uid),
        email: identity.email,
        display_name: identity.display_name,
        id_token: Some(identity.id_token),
        issued_at: Some(Utc::now().timestamp_millis()),
    }
}

fn to_report(outcome: ScoreOutcome) -> ScoreReport {
    ScoreReport {
        prob_ai: outcome.prob_ai,
        n_tokens: outcome.n_tokens,
        model: outcome.model,
        ci_low: outcome.ci_low,
        ci_high: outcome.ci_high,
    }
}
