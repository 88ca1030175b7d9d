use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use detector_core::AuthSession;
use detector_host::{read_optional, AtomicFileWriter, StoreError};
use detector_logging::detector_warn;

const SESSION_FILENAME: &str = "auth_session.json";

/// Durable mirror of the session cache, surviving background restarts.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<AuthSession>, StoreError>;
    async fn save(&self, session: &AuthSession) -> Result<(), StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
}

/// File-backed store holding the session under a single JSON key.
pub struct JsonSessionStore {
    writer: AtomicFileWriter,
    path: PathBuf,
}

impl JsonSessionStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            path: dir.join(SESSION_FILENAME),
            writer: AtomicFileWriter::new(dir),
        }
    }
}

#[async_trait]
impl SessionStore for JsonSessionStore {
    async fn load(&self) -> Result<Option<AuthSession>, StoreError> {
        let Some(content) = read_optional(&self.path)? else {
            return Ok(None);
        };
        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                // An unreadable mirror is treated as signed out rather than
                // wedging startup.
                detector_warn!("discarding unreadable session mirror: {}", err);
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &AuthSession) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(session)
            .map_err(|err| StoreError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))?;
        self.writer.write(SESSION_FILENAME, &content)?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.writer.remove(SESSION_FILENAME)
    }
}
