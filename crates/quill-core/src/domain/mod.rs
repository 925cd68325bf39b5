//! Domain entities - the core business objects.

mod identity;
mod post;
mod profile;
mod session;
mod user;

pub use identity::UserId;
pub use post::{ANONYMOUS_AUTHOR, Post, PostWithAuthor};
pub use profile::Profile;
pub use session::{Session, SessionChanged};
pub use user::User;
