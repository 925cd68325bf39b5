//! Services - business operations built on the ports.

pub mod authz;
mod posts;
mod profiles;

pub use authz::is_owner;
pub use posts::{NewPost, PostChanges, PostService};
pub use profiles::ProfileService;
