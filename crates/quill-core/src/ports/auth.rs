//! Authentication and federated-identity ports.

use async_trait::async_trait;
use uuid::Uuid;

/// Claims carried by an issued bearer token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub issued_at: i64,
    pub exp: i64,
}

/// Token service trait for signed bearer tokens.
pub trait TokenService: Send + Sync {
    /// Issue a token for a user.
    fn generate_token(&self, user_id: Uuid) -> Result<String, AuthError>;

    /// Verify signature, issuer and expiry, then decode.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of issued tokens.
    fn expiration_seconds(&self) -> i64;
}

/// Password hashing service.
///
/// Hashing is CPU-bound; implementations must not stall the async executor.
#[async_trait]
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    async fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Identity asserted by a third-party provider.
#[derive(Debug, Clone)]
pub struct ExternalProfile {
    /// The provider's stable subject identifier.
    pub provider_id: String,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
}

/// Third-party identity provider (authorization-code flow).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL of the provider's consent screen, carrying a signed `state`.
    fn authorization_url(&self) -> Result<String, AuthError>;

    /// Check `state`, exchange `code` and fetch the asserted profile.
    async fn exchange_code(&self, code: &str, state: &str) -> Result<ExternalProfile, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Hashing error: {0}")]
    HashingError(String),

    #[error("Identity provider error: {0}")]
    Provider(String),
}

impl From<AuthError> for crate::DomainError {
    fn from(err: AuthError) -> Self {
        use crate::DomainError;

        match err {
            AuthError::InvalidCredentials => DomainError::Unauthenticated(err.to_string()),
            AuthError::MissingAuth => {
                DomainError::Unauthenticated("Not authorized, no token".to_string())
            }
            AuthError::TokenExpired | AuthError::InvalidToken(_) => {
                DomainError::Unauthenticated("Not authorized, token failed".to_string())
            }
            AuthError::HashingError(msg) | AuthError::Provider(msg) => DomainError::Internal(msg),
        }
    }
}
