use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, PostWithAuthor, Profile, User, UserId};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity. Fails with [`RepoError::Constraint`] when its key
    /// (or another unique column) is already taken.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID. Fails with [`RepoError::NotFound`] when no row matched.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Credential storage for the local identity provider.
#[async_trait]
pub trait UserRepository: BaseRepository<User, String> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Profile store keyed by identity.
#[async_trait]
pub trait ProfileRepository: BaseRepository<Profile, String> {
    /// Change the display name of an existing profile.
    /// Returns `None` when the identity has no profile.
    async fn update_name(&self, id: &UserId, name: &str) -> Result<Option<Profile>, RepoError>;
}

/// Post store.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// All posts joined with their owner's profile name, newest first.
    async fn list_with_authors(&self) -> Result<Vec<PostWithAuthor>, RepoError>;

    /// One post joined with its owner's profile name.
    async fn find_with_author(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError>;

    /// Overwrite title and content only; owner and creation time are untouched.
    /// Returns `None` when no post has this id.
    async fn update_body(
        &self,
        id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Option<Post>, RepoError>;
}
