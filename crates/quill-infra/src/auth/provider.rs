//! Local identity provider: email/password accounts with JWT sessions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use quill_core::domain::{Session, SessionChanged, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    AuthError, IdentityProvider, PasswordService, SessionListener, Subscription, TokenClaims,
    TokenService, UserRepository,
};

use crate::masking::mask_email;

use super::events::SessionBroadcaster;

const MIN_PASSWORD_LEN: usize = 6;

/// Revocation entries outlive `exp` by this much, covering any clock leeway
/// a token validator applies.
const REVOCATION_GRACE_SECS: i64 = 60;

/// Identity provider backed by the `users` table.
///
/// Signed-out tokens are remembered in process until they would have expired
/// anyway; a restart forgets them.
pub struct LocalIdentityProvider {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenService>,
    passwords: Arc<dyn PasswordService>,
    events: SessionBroadcaster,
    // token id -> exp (unix seconds)
    revoked: RwLock<HashMap<String, i64>>,
}

impl LocalIdentityProvider {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            users,
            tokens,
            passwords,
            events: SessionBroadcaster::default(),
            revoked: RwLock::new(HashMap::new()),
        }
    }

    fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    fn validate_sign_up(email: &str, password: &str) -> Result<(), AuthError> {
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => {
                return Err(AuthError::InvalidSignUp(
                    "A valid email address is required".to_string(),
                ));
            }
        }

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidSignUp(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        Ok(())
    }

    async fn is_revoked(&self, token_id: &str) -> bool {
        let revoked = self.revoked.read().await;
        revoked.contains_key(token_id)
    }

    fn session_from(claims: TokenClaims, access_token: &str) -> Session {
        Session {
            identity: claims.user_id,
            email: claims.email,
            access_token: access_token.to_string(),
            expires_at: DateTime::<Utc>::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now),
        }
    }
}

fn store_error(e: RepoError) -> AuthError {
    AuthError::Store(e.to_string())
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn current_session(&self, access_token: &str) -> Result<Session, AuthError> {
        let claims = self.tokens.validate_token(access_token)?;

        if self.is_revoked(&claims.token_id).await {
            return Err(AuthError::InvalidToken("session has been signed out".to_string()));
        }

        Ok(Self::session_from(claims, access_token))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Self::normalize_email(email);
        Self::validate_sign_up(&email, password)?;

        if self
            .users
            .find_by_email(&email)
            .await
            .map_err(store_error)?
            .is_some()
        {
            tracing::debug!(user_email = %mask_email(&email), "Sign-up for existing email");
            return Err(AuthError::EmailTaken);
        }

        let hash = self.passwords.hash(password)?;
        let user = self
            .users
            .insert(User::new(email, hash))
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent sign-up.
                RepoError::Constraint(_) => AuthError::EmailTaken,
                other => store_error(other),
            })?;

        tracing::info!(
            user_id = %user.id,
            user_email = %mask_email(&user.email),
            "User signed up"
        );
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = Self::normalize_email(email);

        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(store_error)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.passwords.verify(password, &user.password_hash)? {
            tracing::debug!(user_email = %mask_email(&email), "Sign-in with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.generate_token(&user.id, &user.email)?;
        let claims = self.tokens.validate_token(&token)?;
        let session = Self::session_from(claims, &token);

        tracing::info!(user_id = %session.identity, "User signed in");
        self.events
            .publish(SessionChanged::signed_in(session.identity.clone()));

        Ok(session)
    }

    async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        match self.tokens.validate_token(&session.access_token) {
            Ok(claims) => {
                let now = Utc::now().timestamp();
                let mut revoked = self.revoked.write().await;
                revoked.retain(|_, exp| *exp + REVOCATION_GRACE_SECS >= now);
                revoked.insert(claims.token_id, claims.exp);
            }
            // Already unusable, nothing to remember.
            Err(e) => {
                tracing::debug!(user_id = %session.identity, error = %e, "Sign-out of a dead token");
            }
        }

        tracing::info!(user_id = %session.identity, "User signed out");
        self.events.publish(SessionChanged::signed_out());

        Ok(())
    }

    fn subscribe(&self, listener: SessionListener) -> Subscription {
        self.events.subscribe(listener)
    }
}
