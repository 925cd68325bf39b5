//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{IdentityProvider, PostRepository, ProfileRepository, UserRepository};
use quill_core::services::{PostService, ProfileService};
use quill_infra::auth::{Argon2PasswordService, JwtConfig, JwtTokenService, LocalIdentityProvider};
use quill_infra::database::InMemoryStore;

#[cfg(feature = "postgres")]
use quill_infra::database::{
    PostgresPostRepository, PostgresProfileRepository, PostgresUserRepository, connect,
};

use crate::config::AppConfig;

/// Shared application state.
///
/// Every store handle is injected here once at startup; handlers never reach
/// for a global client.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub profiles: ProfileService,
    pub identity: Arc<dyn IdentityProvider>,
    /// Which backend is serving data, reported by the health check.
    pub store: &'static str,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        {
            if let Some(db_config) = &config.database {
                match connect(db_config).await {
                    Ok(conn) => {
                        tracing::info!("Application state initialized with PostgreSQL");
                        return Self::from_repositories(
                            Arc::new(PostgresUserRepository::new(conn.clone())),
                            Arc::new(PostgresProfileRepository::new(conn.clone())),
                            Arc::new(PostgresPostRepository::new(conn)),
                            config.jwt.clone(),
                            "postgres",
                        );
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            }
        }

        #[cfg(not(feature = "postgres"))]
        if config.database.is_some() {
            tracing::warn!("Built without postgres feature - DATABASE_URL is ignored");
        }

        Self::in_memory(config.jwt.clone())
    }

    /// State backed entirely by one [`InMemoryStore`].
    pub fn in_memory(jwt: JwtConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::from_repositories(store.clone(), store.clone(), store, jwt, "memory")
    }

    pub(crate) fn from_repositories(
        users: Arc<dyn UserRepository>,
        profiles: Arc<dyn ProfileRepository>,
        posts: Arc<dyn PostRepository>,
        jwt: JwtConfig,
        store: &'static str,
    ) -> Self {
        let identity = LocalIdentityProvider::new(
            users,
            Arc::new(JwtTokenService::new(jwt)),
            Arc::new(Argon2PasswordService::new()),
        );

        Self {
            posts: PostService::new(posts),
            profiles: ProfileService::new(profiles),
            identity: Arc::new(identity),
            store,
        }
    }
}
