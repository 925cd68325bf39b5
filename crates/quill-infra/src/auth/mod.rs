//! Authentication implementations.

mod events;
mod jwt;
mod password;
mod provider;

pub use events::SessionBroadcaster;
pub use jwt::{JwtConfig, JwtTokenService};
pub use password::Argon2PasswordService;
pub use provider::LocalIdentityProvider;
