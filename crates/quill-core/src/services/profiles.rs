//! Profile store operations.

use std::sync::Arc;

use crate::domain::{Profile, UserId};
use crate::error::DomainError;
use crate::ports::ProfileRepository;

/// Profile operations. Every method is scoped to the caller's own identity.
#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Create the profile for a freshly registered identity.
    ///
    /// A blank `name` falls back to the local part of `email`. Callers treat a
    /// failure here as non-fatal: the identity exists with or without a profile.
    pub async fn create_on_signup(
        &self,
        identity: &UserId,
        name: Option<&str>,
        email: &str,
    ) -> Result<Profile, DomainError> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| Profile::fallback_name(email));

        if name.is_empty() {
            return Err(DomainError::validation("Name is required"));
        }

        let profile = Profile::new(identity.clone(), name.to_string());
        Ok(self.profiles.insert(profile).await?)
    }

    /// The identity's profile, if it has one.
    pub async fn get(&self, identity: &UserId) -> Result<Option<Profile>, DomainError> {
        Ok(self
            .profiles
            .find_by_id(identity.as_str().to_string())
            .await?)
    }

    /// Rename the caller's own profile.
    pub async fn update(
        &self,
        identity: &UserId,
        name: Option<&str>,
    ) -> Result<Profile, DomainError> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| DomainError::validation("Name is required"))?;

        self.profiles
            .update_name(identity, name)
            .await?
            .ok_or_else(|| DomainError::not_found("Profile", identity))
    }
}
