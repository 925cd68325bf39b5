//! Post store operations: list, get, create, update, delete.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Post, PostWithAuthor, UserId};
use crate::error::{DomainError, RepoError};
use crate::ports::PostRepository;

use super::authz::is_owner;

const ENTITY: &str = "Post";

/// Input for creating a post. Fields are optional so that missing and empty
/// values are reported the same way.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Input for updating a post.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Post operations with validation and ownership enforcement.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// All posts, newest first, with author names.
    pub async fn list(&self) -> Result<Vec<PostWithAuthor>, DomainError> {
        Ok(self.posts.list_with_authors().await?)
    }

    /// One post with its author name.
    pub async fn get(&self, id: &str) -> Result<PostWithAuthor, DomainError> {
        let id = parse_post_id(required(Some(id)).ok_or_else(id_required)?)?;

        self.posts
            .find_with_author(id)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))
    }

    /// Create a post owned by `owner`.
    pub async fn create(&self, owner: &UserId, input: NewPost) -> Result<Post, DomainError> {
        let (Some(title), Some(content)) = (
            required(input.title.as_deref()),
            required(input.content.as_deref()),
        ) else {
            return Err(DomainError::validation("Title and content are required"));
        };

        let post = Post::new(owner.clone(), title.to_string(), content.to_string());
        Ok(self.posts.insert(post).await?)
    }

    /// Replace title and content of a post owned by `actor`.
    pub async fn update(&self, actor: &UserId, changes: PostChanges) -> Result<Post, DomainError> {
        let (Some(id), Some(title), Some(content)) = (
            required(changes.id.as_deref()),
            required(changes.title.as_deref()),
            required(changes.content.as_deref()),
        ) else {
            return Err(DomainError::validation("ID, title and content are required"));
        };

        let id = parse_post_id(id)?;
        self.authorize(actor, id).await?;

        // Last write wins: a concurrent delete between the check and the
        // write surfaces as NotFound.
        self.posts
            .update_body(id, title, content)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))
    }

    /// Delete a post owned by `actor`.
    pub async fn delete(&self, actor: &UserId, id: Option<&str>) -> Result<(), DomainError> {
        let id = parse_post_id(required(id).ok_or_else(id_required)?)?;
        self.authorize(actor, id).await?;

        match self.posts.delete(id).await {
            Ok(()) => Ok(()),
            Err(RepoError::NotFound) => Err(DomainError::not_found(ENTITY, id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn authorize(&self, actor: &UserId, id: Uuid) -> Result<Post, DomainError> {
        let existing = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))?;

        if !is_owner(actor, &existing.owner) {
            return Err(DomainError::Forbidden("post"));
        }

        Ok(existing)
    }
}

fn required(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn id_required() -> DomainError {
    DomainError::validation("ID is required")
}

/// An id that is not a UUID cannot match any row.
fn parse_post_id(raw: &str) -> Result<Uuid, DomainError> {
    let raw = raw.trim();
    Uuid::parse_str(raw).map_err(|_| DomainError::not_found(ENTITY, raw))
}
