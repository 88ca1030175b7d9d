use detector_core::AuthSession;
use detector_host::AuthHandoff;
use serde::Deserialize;
use serde_json::{json, Value};

/// Runtime messages the background process accepts from UI surfaces. Each
/// tag maps to exactly one handler in `dispatch`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum RuntimeMessage {
    /// A panel announced it is mounted; the sender's tab scopes it.
    #[serde(rename = "PANEL_READY")]
    PanelReady,
    /// Read the current session.
    #[serde(rename = "GET_AUTH")]
    GetAuth,
    /// A UI surface observed a sign-out; drop the cached session.
    #[serde(rename = "SIGNED_OUT")]
    SignedOut,
    /// The hosted auth form established a session and announces it.
    #[serde(rename = "AUTH_UPDATED")]
    AuthUpdated { payload: AuthSession },
    #[serde(rename = "auth/signInWithGoogle")]
    SignInWithGoogle,
    #[serde(rename = "auth/signOut")]
    SignOut,
    #[serde(rename = "auth/getIdToken")]
    GetIdToken,
    /// Usage event to forward, bearer-authenticated, if a session exists.
    #[serde(rename = "LOG_EVENT")]
    LogEvent { payload: Value },
    /// One-shot sign-in result relayed by the hidden document.
    #[serde(rename = "auth-result")]
    AuthResult {
        #[serde(default)]
        target: Option<String>,
        payload: AuthHandoff,
    },
}

/// Envelope broadcast to every listening surface when the session changes.
pub fn auth_broadcast(session: &AuthSession) -> Value {
    json!({ "type": "AUTH_UPDATED", "payload": session })
}
