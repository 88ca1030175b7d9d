use thiserror::Error;

/// Identity returned by the auth provider after exchanging a federated
/// token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub id_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("credential exchange rejected: {0}")]
    Rejected(String),
    #[error("auth provider unreachable: {0}")]
    Unavailable(String),
}

/// The external auth provider. The background process only exchanges tokens
/// and forwards sign-out; account management lives in the hosted auth pages.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchanges the identity token relayed by the hidden document for a
    /// provider session.
    async fn exchange_google_token(&self, id_token: &str)
        -> Result<ProviderIdentity, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}
