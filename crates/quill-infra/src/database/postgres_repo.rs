//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use quill_core::domain::{Post, PostWithAuthor, Profile, User, UserId};
use quill_core::error::RepoError;
use quill_core::ports::{PostRepository, ProfileRepository, UserRepository};

use crate::masking::mask_email;

use super::entity::post::{self, Entity as PostEntity};
use super::entity::profile::{self, Entity as ProfileEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, repo_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL profile repository.
pub type PostgresProfileRepository = PostgresBaseRepository<ProfileEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

fn joined((post, profile): (post::Model, Option<profile::Model>)) -> PostWithAuthor {
    PostWithAuthor::new(post.into(), profile.map(|p| p.name))
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn update_name(&self, id: &UserId, name: &str) -> Result<Option<Profile>, RepoError> {
        let changes = profile::ActiveModel {
            id: Unchanged(id.as_str().to_string()),
            name: Set(name.to_string()),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        match changes.update(&self.db).await {
            Ok(model) => Ok(Some(model.into())),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(repo_error(e)),
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list_with_authors(&self) -> Result<Vec<PostWithAuthor>, RepoError> {
        let rows = PostEntity::find()
            .find_also_related(ProfileEntity)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(rows.into_iter().map(joined).collect())
    }

    async fn find_with_author(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError> {
        let row = PostEntity::find_by_id(id)
            .find_also_related(ProfileEntity)
            .one(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(row.map(joined))
    }

    async fn update_body(
        &self,
        id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Option<Post>, RepoError> {
        let changes = post::ActiveModel {
            id: Unchanged(id),
            title: Set(title.to_string()),
            content: Set(content.to_string()),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        match changes.update(&self.db).await {
            Ok(model) => Ok(Some(model.into())),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(repo_error(e)),
        }
    }
}
