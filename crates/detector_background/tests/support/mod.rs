#![allow(dead_code)]
//! In-memory host fakes shared by the coordinator tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use detector_background::{Background, BackgroundConfig, BackgroundPorts, SessionStore};
use detector_core::AuthSession;
use detector_host::{
    ApiClient, ApiError, AuthError, DeliveryError, DeliverySettings, FrameScripting,
    IdentityProvider, InjectionError, OffscreenError, OffscreenHost, OffscreenSettings, PanelPort,
    PanelSurface, ProviderIdentity, ScoreError, ScoreOutcome, ScoreService, StartAck, StoreError,
    TabId,
};
use serde_json::Value;
use tokio::sync::mpsc;

#[derive(Default)]
pub struct FakePanel {
    pub posted: Mutex<Vec<(TabId, Value)>>,
    pub broadcasts: Mutex<Vec<Value>>,
    pub opened: Mutex<Vec<TabId>>,
}

impl FakePanel {
    pub fn posted_to(&self, tab_id: TabId) -> Vec<Value> {
        self.posted
            .lock()
            .unwrap()
            .iter()
            .filter(|(tab, _)| *tab == tab_id)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

#[async_trait]
impl PanelPort for FakePanel {
    async fn post(&self, tab_id: TabId, message: Value) -> Result<(), DeliveryError> {
        self.posted.lock().unwrap().push((tab_id, message));
        Ok(())
    }

    async fn broadcast(&self, message: Value) -> Result<(), DeliveryError> {
        self.broadcasts.lock().unwrap().push(message);
        Ok(())
    }
}

#[async_trait]
impl PanelSurface for FakePanel {
    async fn open(&self, tab_id: TabId) -> Result<(), DeliveryError> {
        self.opened.lock().unwrap().push(tab_id);
        Ok(())
    }
}

pub struct FakeScripting {
    pub frames: Mutex<Result<Vec<String>, InjectionError>>,
    pub calls: AtomicUsize,
}

impl Default for FakeScripting {
    fn default() -> Self {
        Self {
            frames: Mutex::new(Ok(Vec::new())),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl FrameScripting for FakeScripting {
    async fn selection_per_frame(&self, _tab_id: TabId) -> Result<Vec<String>, InjectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.frames.lock().unwrap().clone()
    }
}

pub struct FakeScore {
    pub result: Mutex<Result<ScoreOutcome, ScoreError>>,
    pub requests: Mutex<Vec<String>>,
}

impl Default for FakeScore {
    fn default() -> Self {
        Self {
            result: Mutex::new(Ok(outcome(0.63, 512, "mock-detector"))),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ScoreService for FakeScore {
    async fn score(&self, text: &str) -> Result<ScoreOutcome, ScoreError> {
        self.requests.lock().unwrap().push(text.to_string());
        self.result.lock().unwrap().clone()
    }
}

pub fn outcome(prob_ai: f64, n_tokens: u32, model: &str) -> ScoreOutcome {
    ScoreOutcome {
        prob_ai,
        n_tokens: Some(n_tokens),
        model: Some(model.to_string()),
        ci_low: None,
        ci_high: None,
        version: None,
        latency: None,
    }
}

pub struct FakeOffscreen {
    pub creates: AtomicUsize,
    pub closes: AtomicUsize,
    pub starts: AtomicUsize,
    pub has_doc: AtomicBool,
    pub started_tx: mpsc::UnboundedSender<()>,
}

impl FakeOffscreen {
    pub fn new(started_tx: mpsc::UnboundedSender<()>) -> Self {
        Self {
            creates: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
            starts: AtomicUsize::new(0),
            has_doc: AtomicBool::new(false),
            started_tx,
        }
    }
}

#[async_trait]
impl OffscreenHost for FakeOffscreen {
    async fn has_document(&self) -> bool {
        self.has_doc.load(Ordering::SeqCst)
    }

    async fn create_document(&self) -> Result<(), OffscreenError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.has_doc.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn close_document(&self) -> Result<(), OffscreenError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.has_doc.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn send_start(&self) -> Result<StartAck, OffscreenError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        let _ = self.started_tx.send(());
        Ok(StartAck {
            ok: true,
            error: None,
        })
    }
}

pub struct FakeProvider {
    pub identity: ProviderIdentity,
    pub reject: AtomicBool,
    pub sign_outs: AtomicUsize,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self {
            identity: ProviderIdentity {
                uid: "uid-1".to_string(),
                email: Some("ada@example.com".to_string()),
                display_name: Some("Ada".to_string()),
                id_token: "provider-token".to_string(),
            },
            reject: AtomicBool::new(false),
            sign_outs: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn exchange_google_token(
        &self,
        _id_token: &str,
    ) -> Result<ProviderIdentity, AuthError> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(AuthError::Rejected("token rejected".to_string()));
        }
        Ok(self.identity.clone())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub session: Mutex<Option<AuthSession>>,
    pub saves: AtomicUsize,
    pub clears: AtomicUsize,
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self) -> Result<Option<AuthSession>, StoreError> {
        Ok(self.session.lock().unwrap().clone())
    }

    async fn save(&self, session: &AuthSession) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        *self.session.lock().unwrap() = None;
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeApi {
    pub usage: Mutex<Vec<(String, Value)>>,
    pub inits: Mutex<Vec<(String, Option<String>)>>,
    pub fail_usage: AtomicBool,
}

#[async_trait]
impl ApiClient for FakeApi {
    async fn log_usage(&self, token: &str, body: &Value) -> Result<(), ApiError> {
        if self.fail_usage.load(Ordering::SeqCst) {
            return Err(ApiError::Status { status: 500 });
        }
        self.usage
            .lock()
            .unwrap()
            .push((token.to_string(), body.clone()));
        Ok(())
    }

    async fn init_user(&self, token: &str, display_name: Option<&str>) -> Result<(), ApiError> {
        self.inits
            .lock()
            .unwrap()
            .push((token.to_string(), display_name.map(str::to_string)));
        Ok(())
    }
}

pub struct Harness {
    pub background: Arc<Background>,
    pub panel: Arc<FakePanel>,
    pub scripting: Arc<FakeScripting>,
    pub score: Arc<FakeScore>,
    pub offscreen: Arc<FakeOffscreen>,
    pub provider: Arc<FakeProvider>,
    pub store: Arc<MemoryStore>,
    pub api: Arc<FakeApi>,
    pub started_rx: mpsc::UnboundedReceiver<()>,
}

impl Harness {
    pub fn new() -> Self {
        let (started_tx, started_rx) = mpsc::unbounded_channel();
        let panel = Arc::new(FakePanel::default());
        let scripting = Arc::new(FakeScripting::default());
        let score = Arc::new(FakeScore::default());
        let offscreen = Arc::new(FakeOffscreen::new(started_tx));
        let provider = Arc::new(FakeProvider::default());
        let store = Arc::new(MemoryStore::default());
        let api = Arc::new(FakeApi::default());

        let ports = BackgroundPorts {
            panel: panel.clone(),
            surface: panel.clone(),
            scripting: scripting.clone(),
            score: score.clone(),
            offscreen: offscreen.clone(),
            provider: provider.clone(),
            store: store.clone(),
            api: api.clone(),
        };
        // Short waits keep the readiness polling from dominating test time.
        let config = BackgroundConfig {
            delivery: DeliverySettings {
                readiness_timeout: Duration::from_millis(50),
                poll_interval: Duration::from_millis(10),
            },
            offscreen: OffscreenSettings {
                start_retry_delay: Duration::from_millis(10),
                ..OffscreenSettings::default()
            },
        };

        Self {
            background: Arc::new(Background::new(ports, config)),
            panel,
            scripting,
            score,
            offscreen,
            provider,
            store,
            api,
            started_rx,
        }
    }
}

/// A selection comfortably above the minimum-length floor.
pub fn long_selection() -> String {
    "The quick brown fox jumps over the lazy dog. ".repeat(10)
}
