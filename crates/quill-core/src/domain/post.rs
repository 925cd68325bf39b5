use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Display name used when a post's owner has no profile.
pub const ANONYMOUS_AUTHOR: &str = "anonymous";

/// Post entity - a blog post owned by the identity that created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub owner: UserId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post owned by `owner`.
    pub fn new(owner: UserId, title: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner,
            title,
            content,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A post joined with its owner's profile name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author_name: Option<String>,
}

impl PostWithAuthor {
    pub fn new(post: Post, author_name: Option<String>) -> Self {
        Self { post, author_name }
    }

    /// The owner's display name, or [`ANONYMOUS_AUTHOR`] when the owner has
    /// no profile or a blank name.
    pub fn author_display_name(&self) -> &str {
        self.author_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(ANONYMOUS_AUTHOR)
    }
}
