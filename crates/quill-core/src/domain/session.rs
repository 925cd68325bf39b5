use std::fmt;

use chrono::{DateTime, Utc};

use super::UserId;

/// An authenticated session, resolved once per request at the boundary.
#[derive(Clone)]
pub struct Session {
    pub identity: UserId,
    pub email: String,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

// Tokens must never reach the logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("email", &self.email)
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Notification emitted by the identity provider when a session starts or ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionChanged {
    /// The newly signed-in identity, or `None` after sign-out.
    pub identity: Option<UserId>,
}

impl SessionChanged {
    pub fn signed_in(identity: UserId) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn signed_out() -> Self {
        Self { identity: None }
    }
}
