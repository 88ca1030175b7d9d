use serde::{Deserialize, Serialize};

/// Cached identity of the signed-in user. Owned by the background process,
/// mirrored into durable storage, broadcast to UI surfaces on change.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub signed_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    /// Unix milliseconds at which the session was established.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,
}

impl AuthSession {
    /// The state broadcast after a sign-out: no identity, nothing cached.
    pub fn signed_out() -> Self {
        Self::default()
    }
}
