//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//! This crate contains the database adapters and the local identity provider.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory store only
//! - `postgres` - PostgreSQL database support via SeaORM
//! - `auth` - JWT + Argon2 authentication and the local identity provider

pub mod database;
pub mod masking;

#[cfg(feature = "auth")]
pub mod auth;

pub use database::{DatabaseConfig, InMemoryStore};

#[cfg(feature = "postgres")]
pub use database::{PostgresPostRepository, PostgresProfileRepository, PostgresUserRepository};

#[cfg(feature = "auth")]
pub use auth::{
    Argon2PasswordService, JwtConfig, JwtTokenService, LocalIdentityProvider, SessionBroadcaster,
};
