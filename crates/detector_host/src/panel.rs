use std::sync::Arc;
use std::time::Duration;

use detector_logging::{detector_debug, detector_warn};
use serde::Serialize;
use thiserror::Error;

use crate::TabId;

/// How long `deliver` waits for a panel to announce readiness, and how often
/// it checks, before sending regardless.
#[derive(Debug, Clone, Copy)]
pub struct DeliverySettings {
    pub readiness_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            readiness_timeout: Duration::from_millis(1500),
            poll_interval: Duration::from_millis(50),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("panel delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Outbound runtime messaging: point-to-point to the panel of a tab, or
/// broadcast to every listening surface.
#[async_trait::async_trait]
pub trait PanelPort: Send + Sync {
    async fn post(&self, tab_id: TabId, message: serde_json::Value) -> Result<(), DeliveryError>;
    async fn broadcast(&self, message: serde_json::Value) -> Result<(), DeliveryError>;
}

/// Opens (or focuses) the side panel for a tab; idempotent when already
/// open.
#[async_trait::async_trait]
pub trait PanelSurface: Send + Sync {
    async fn open(&self, tab_id: TabId) -> Result<(), DeliveryError>;
}

/// Answers whether the panel for a tab has announced readiness. The
/// background process implements this over its coordinator state.
pub trait ReadinessProbe: Send + Sync {
    fn is_ready(&self, tab_id: TabId) -> bool;
}

/// Best-effort delivery to a panel that is torn down and rebuilt
/// independently of this process. There is no shared startup barrier, so a
/// listener cannot be assumed to exist when we want to speak; we poll the
/// readiness flag briefly and then send either way.
pub struct PanelMessenger {
    port: Arc<dyn PanelPort>,
    settings: DeliverySettings,
}

impl PanelMessenger {
    pub fn new(port: Arc<dyn PanelPort>, settings: DeliverySettings) -> Self {
        Self { port, settings }
    }

    /// Never fails the caller: a missing panel must not abort the workflow
    /// that produced the message. Misses are logged and swallowed.
    pub async fn deliver<M: Serialize>(
        &self,
        probe: &dyn ReadinessProbe,
        tab_id: TabId,
        message: &M,
    ) {
        if !probe.is_ready(tab_id) && !self.wait_for_readiness(probe, tab_id).await {
            detector_debug!(
                "panel for tab {} not ready after {:?}; sending anyway",
                tab_id,
                self.settings.readiness_timeout
            );
        }
        self.send(Some(tab_id), message).await;
    }

    /// Sends to every listening surface without a readiness wait.
    pub async fn broadcast<M: Serialize>(&self, message: &M) {
        self.send(None, message).await;
    }

    async fn send<M: Serialize>(&self, tab_id: Option<TabId>, message: &M) {
        let value = match serde_json::to_value(message) {
            Ok(value) => value,
            Err(err) => {
                detector_warn!("unserializable panel message dropped: {}", err);
                return;
            }
        };
        let sent = match tab_id {
            Some(tab_id) => self.port.post(tab_id, value).await,
            None => self.port.broadcast(value).await,
        };
        if let Err(err) = sent {
            detector_warn!("panel message dropped: {}", err);
        }
    }

    async fn wait_for_readiness(&self, probe: &dyn ReadinessProbe, tab_id: TabId) -> bool {
        let deadline = tokio::time::Instant::now() + self.settings.readiness_timeout;
        while tokio::time::Instant::now() < deadline {
            tokio::time::sleep(self.settings.poll_interval).await;
            if probe.is_ready(tab_id) {
                return true;
            }
        }
        false
    }
}
