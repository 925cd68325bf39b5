//! Authentication ports: tokens, password hashing and the identity provider.

use async_trait::async_trait;

use crate::domain::{Session, User, UserId};

use super::session::{SessionListener, Subscription};

/// Claims stored in access tokens.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: UserId,
    pub email: String,
    pub exp: i64,
    /// Unique per issued token; revocation is keyed on it.
    pub token_id: String,
}

/// Token service trait for JWT operations.
pub trait TokenService: Send + Sync {
    /// Generate an access token for a user.
    fn generate_token(&self, user_id: &UserId, email: &str) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of issued tokens, in seconds.
    fn expiration_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Issues and validates sessions.
///
/// In production this is a hosted service; the system only relies on the
/// operations below.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the session behind an access token.
    async fn current_session(&self, access_token: &str) -> Result<Session, AuthError>;

    /// Register a new identity. Does not open a session.
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Exchange credentials for a session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// End a session; its token is rejected afterwards.
    async fn sign_out(&self, session: &Session) -> Result<(), AuthError>;

    /// Register a listener for session changes. Dropping or unsubscribing the
    /// returned handle stops delivery.
    fn subscribe(&self, listener: SessionListener) -> Subscription;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Email already registered")]
    EmailTaken,

    #[error("{0}")]
    InvalidSignUp(String),

    #[error("Hashing error: {0}")]
    HashingError(String),

    #[error("Identity store error: {0}")]
    Store(String),
}
