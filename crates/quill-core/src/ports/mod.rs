//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod repository;
mod session;

pub use auth::{AuthError, IdentityProvider, PasswordService, TokenClaims, TokenService};
pub use repository::{BaseRepository, PostRepository, ProfileRepository, UserRepository};
pub use session::{SessionListener, Subscription};
