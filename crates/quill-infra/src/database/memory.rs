//! In-memory store - used when no database is configured and as the test
//! substitute for PostgreSQL.
//!
//! Data is lost on process restart.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Post, PostWithAuthor, Profile, User, UserId};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, ProfileRepository, UserRepository};

struct PostRow {
    post: Post,
    // Insertion order, breaks ties between equal timestamps.
    seq: u64,
}

/// In-memory implementation of every repository port.
///
/// One instance plays the role of a whole database, so joins between posts
/// and profiles see a consistent view.
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<String, User>>,
    profiles: RwLock<HashMap<String, Profile>>,
    posts: RwLock<HashMap<Uuid, PostRow>>,
    next_seq: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn author_name(&self, owner: &UserId) -> Option<String> {
        let profiles = self.profiles.read().await;
        profiles.get(owner.as_str()).map(|p| p.name.clone())
    }
}

#[async_trait]
impl BaseRepository<User, String> for InMemoryStore {
    async fn find_by_id(&self, id: String) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.get(UserId::new(id).as_str()).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.write().await;

        if users.contains_key(user.id.as_str()) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(RepoError::Constraint("Email already exists".to_string()));
        }

        users.insert(user.id.as_str().to_string(), user.clone());
        Ok(user)
    }

    async fn delete(&self, id: String) -> Result<(), RepoError> {
        let mut users = self.users.write().await;
        users
            .remove(UserId::new(id).as_str())
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl BaseRepository<Profile, String> for InMemoryStore {
    async fn find_by_id(&self, id: String) -> Result<Option<Profile>, RepoError> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(UserId::new(id).as_str()).cloned())
    }

    async fn insert(&self, profile: Profile) -> Result<Profile, RepoError> {
        let mut profiles = self.profiles.write().await;

        if profiles.contains_key(profile.id.as_str()) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        profiles.insert(profile.id.as_str().to_string(), profile.clone());
        Ok(profile)
    }

    async fn delete(&self, id: String) -> Result<(), RepoError> {
        let mut profiles = self.profiles.write().await;
        profiles
            .remove(UserId::new(id).as_str())
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn update_name(&self, id: &UserId, name: &str) -> Result<Option<Profile>, RepoError> {
        let mut profiles = self.profiles.write().await;

        Ok(profiles.get_mut(id.as_str()).map(|profile| {
            profile.name = name.to_string();
            profile.updated_at = Utc::now();
            profile.clone()
        }))
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let posts = self.posts.read().await;
        Ok(posts.get(&id).map(|row| row.post.clone()))
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;

        if posts.contains_key(&post.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        posts.insert(
            post.id,
            PostRow {
                post: post.clone(),
                seq,
            },
        );
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut posts = self.posts.write().await;
        posts.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn list_with_authors(&self) -> Result<Vec<PostWithAuthor>, RepoError> {
        let mut rows: Vec<(Post, u64)> = {
            let posts = self.posts.read().await;
            posts
                .values()
                .map(|row| (row.post.clone(), row.seq))
                .collect()
        };
        rows.sort_by(|(a, a_seq), (b, b_seq)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b_seq.cmp(a_seq))
        });

        let profiles = self.profiles.read().await;
        Ok(rows
            .into_iter()
            .map(|(post, _)| {
                let name = profiles.get(post.owner.as_str()).map(|p| p.name.clone());
                PostWithAuthor::new(post, name)
            })
            .collect())
    }

    async fn find_with_author(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError> {
        let post = {
            let posts = self.posts.read().await;
            match posts.get(&id) {
                Some(row) => row.post.clone(),
                None => return Ok(None),
            }
        };

        let name = self.author_name(&post.owner).await;
        Ok(Some(PostWithAuthor::new(post, name)))
    }

    async fn update_body(
        &self,
        id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Option<Post>, RepoError> {
        let mut posts = self.posts.write().await;

        Ok(posts.get_mut(&id).map(|row| {
            row.post.title = title.to_string();
            row.post.content = content.to_string();
            row.post.updated_at = Utc::now();
            row.post.clone()
        }))
    }
}
