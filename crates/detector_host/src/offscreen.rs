use std::sync::Arc;
use std::time::Duration;

use detector_logging::{detector_debug, detector_warn};
use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::{oneshot, Mutex};

/// Result relayed by the hidden document once its embedded sign-in frame
/// finishes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthHandoff {
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Acknowledgement of the start instruction by the hidden document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartAck {
    pub ok: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OffscreenError {
    #[error("hidden document could not be created: {0}")]
    Create(String),
    #[error("hidden document rejected the start instruction: {0}")]
    Start(String),
    #[error("sign-in result carried no identity token")]
    MissingToken,
    #[error("sign-in failed: {0}")]
    Rejected(String),
    #[error("timed out waiting for the sign-in result")]
    ResultTimeout,
}

/// Host operations on the singleton hidden document. Callers never invoke
/// these directly; the bridge owns the lifecycle, and the host environment
/// rejects duplicate documents.
#[async_trait::async_trait]
pub trait OffscreenHost: Send + Sync {
    async fn has_document(&self) -> bool;
    async fn create_document(&self) -> Result<(), OffscreenError>;
    async fn close_document(&self) -> Result<(), OffscreenError>;
    /// Instructs the hidden document to begin the embedded sign-in flow.
    async fn send_start(&self) -> Result<StartAck, OffscreenError>;
}

#[derive(Debug, Clone, Copy)]
pub struct OffscreenSettings {
    /// Pause before retrying the start instruction once; the embedded frame
    /// may not have finished loading when the first instruction lands.
    pub start_retry_delay: Duration,
    /// Upper bound on the one-shot result rendezvous. A hidden document
    /// that never answers must not hang the sign-in call forever.
    pub result_timeout: Duration,
}

impl Default for OffscreenSettings {
    fn default() -> Self {
        Self {
            start_retry_delay: Duration::from_millis(300),
            result_timeout: Duration::from_secs(60),
        }
    }
}

type SignInFuture = Shared<BoxFuture<'static, Result<AuthHandoff, OffscreenError>>>;
type CreateFuture = Shared<BoxFuture<'static, Result<(), OffscreenError>>>;

/// Performs a federated sign-in that needs a visible browser context from a
/// process that has no window, by delegating to the hidden document and
/// meeting it on a one-shot result message.
pub struct OffscreenBridge {
    inner: Arc<Inner>,
    in_flight: Arc<Mutex<Option<SignInFuture>>>,
}

struct Inner {
    host: Arc<dyn OffscreenHost>,
    settings: OffscreenSettings,
    creating: Mutex<Option<CreateFuture>>,
    pending: std::sync::Mutex<Option<oneshot::Sender<AuthHandoff>>>,
}

impl OffscreenBridge {
    pub fn new(host: Arc<dyn OffscreenHost>, settings: OffscreenSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                host,
                settings,
                creating: Mutex::new(None),
                pending: std::sync::Mutex::new(None),
            }),
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// Creates the hidden document unless one exists. Concurrent callers
    /// await the same in-flight creation instead of racing a duplicate.
    pub async fn ensure_document(&self) -> Result<(), OffscreenError> {
        self.inner.clone().ensure_document().await
    }

    /// Runs the full sign-in: ensure the document, instruct it to start,
    /// await the result, close the document on every path. Concurrent calls
    /// join the sign-in already in flight and observe the same outcome.
    pub async fn run_google_sign_in(&self) -> Result<AuthHandoff, OffscreenError> {
        let fut = {
            let mut slot = self.in_flight.lock().await;
            if let Some(existing) = slot.clone() {
                detector_debug!("sign-in already in flight; joining it");
                existing
            } else {
                let inner = self.inner.clone();
                let slot_handle = self.in_flight.clone();
                let fut = async move {
                    let outcome = inner.sign_in_once().await;
                    slot_handle.lock().await.take();
                    outcome
                }
                .boxed()
                .shared();
                *slot = Some(fut.clone());
                fut
            }
        };
        fut.await
    }

    /// Feeds an `auth-result` runtime message into the rendezvous. A result
    /// with no waiter is dropped.
    pub fn resolve_result(&self, handoff: AuthHandoff) {
        self.inner.resolve(handoff);
    }
}

impl Inner {
    async fn ensure_document(self: Arc<Self>) -> Result<(), OffscreenError> {
        if self.host.has_document().await {
            return Ok(());
        }
        let fut = {
            let mut slot = self.creating.lock().await;
            if let Some(existing) = slot.clone() {
                existing
            } else {
                let this = self.clone();
                let fut = async move {
                    let result = this.host.create_document().await;
                    this.creating.lock().await.take();
                    result
                }
                .boxed()
                .shared();
                *slot = Some(fut.clone());
                fut
            }
        };
        fut.await
    }

    fn register_waiter(&self) -> oneshot::Receiver<AuthHandoff> {
        let (tx, rx) = oneshot::channel();
        let mut pending = self.pending.lock().expect("pending lock");
        if pending.replace(tx).is_some() {
            detector_warn!("replacing an unresolved sign-in waiter");
        }
        rx
    }

    fn resolve(&self, handoff: AuthHandoff) {
        let waiter = self.pending.lock().expect("pending lock").take();
        match waiter {
            Some(tx) => {
                let _ = tx.send(handoff);
            }
            None => detector_debug!("auth result arrived with no waiter; dropped"),
        }
    }

    async fn start_with_retry(&self) -> Result<(), OffscreenError> {
        let first = self.host.send_start().await?;
        if first.ok {
            return Ok(());
        }
        detector_debug!(
            "hidden document not ready ({}); retrying start once",
            first.error.as_deref().unwrap_or("no detail")
        );
        tokio::time::sleep(self.settings.start_retry_delay).await;
        let second = self.host.send_start().await?;
        if second.ok {
            Ok(())
        } else {
            Err(OffscreenError::Start(second.error.unwrap_or_else(|| {
                "hidden document not ready".to_string()
            })))
        }
    }

    async fn sign_in_once(self: Arc<Self>) -> Result<AuthHandoff, OffscreenError> {
        self.clone().ensure_document().await?;
        let waiter = self.register_waiter();
        let outcome = match self.start_with_retry().await {
            Err(err) => Err(err),
            Ok(()) => match tokio::time::timeout(self.settings.result_timeout, waiter).await {
                Err(_) => Err(OffscreenError::ResultTimeout),
                Ok(Err(_)) => Err(OffscreenError::Rejected("sign-in waiter dropped".to_string())),
                Ok(Ok(handoff)) => inspect_handoff(handoff),
            },
        };
        // No orphaned document: close on success and on every failure path.
        if let Err(err) = self.host.close_document().await {
            detector_warn!("failed to close hidden document: {}", err);
        }
        self.pending.lock().expect("pending lock").take();
        outcome
    }
}

fn inspect_handoff(handoff: AuthHandoff) -> Result<AuthHandoff, OffscreenError> {
    if let Some(error) = &handoff.error {
        return Err(OffscreenError::Rejected(error.clone()));
    }
    if handoff.id_token.is_none() {
        return Err(OffscreenError::MissingToken);
    }
    Ok(handoff)
}
