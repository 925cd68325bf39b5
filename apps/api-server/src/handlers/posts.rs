//! Post handlers: `/api/posts`.
//!
//! Reads are public. Writes need a session, and update and delete are further
//! restricted to the post's owner by the post service.

use actix_web::{HttpResponse, web};

use quill_core::domain::{Post, PostWithAuthor, UserId};
use quill_core::services::{NewPost, PostChanges, is_owner};
use quill_shared::dto::{
    AckResponse, CreatePostRequest, PostQuery, PostResponse, UpdatePostRequest,
};

use crate::middleware::auth::{Authenticated, MaybeAuthenticated};
use crate::middleware::error::AppResult;
use crate::state::AppState;

pub(crate) fn post_response(post: PostWithAuthor, viewer: Option<&UserId>) -> PostResponse {
    let author_name = post.author_display_name().to_string();
    let owned_by_viewer = viewer.is_some_and(|v| is_owner(v, &post.post.owner));
    let post = post.post;

    PostResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        user_id: post.owner.into_inner(),
        author_name,
        created_at: post.created_at,
        updated_at: post.updated_at,
        owned_by_viewer,
    }
}

/// Attach the caller's own profile name to a post they just wrote.
///
/// The write is already committed, so a failed lookup degrades to the
/// anonymous author name instead of failing the request.
async fn authored(state: &AppState, post: Post) -> PostWithAuthor {
    let name = match state.profiles.get(&post.owner).await {
        Ok(profile) => profile.map(|p| p.name),
        Err(e) => {
            tracing::warn!(post_id = %post.id, error = %e, "Author lookup failed after write");
            None
        }
    };
    PostWithAuthor::new(post, name)
}

/// GET /api/posts - list, or one post with `?id=`
pub async fn list_or_get(
    state: web::Data<AppState>,
    viewer: MaybeAuthenticated,
    query: web::Query<PostQuery>,
) -> AppResult<HttpResponse> {
    let viewer = viewer.identity();

    match query.into_inner().id {
        Some(id) => {
            let post = state.posts.get(&id).await?;
            Ok(HttpResponse::Ok().json(post_response(post, viewer)))
        }
        None => {
            let posts: Vec<PostResponse> = state
                .posts
                .list()
                .await?
                .into_iter()
                .map(|p| post_response(p, viewer))
                .collect();

            tracing::debug!(count = posts.len(), "Listed posts");
            Ok(HttpResponse::Ok().json(posts))
        }
    }
}

/// POST /api/posts
pub async fn create(
    Authenticated(session): Authenticated,
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post = state
        .posts
        .create(
            &session.identity,
            NewPost {
                title: req.title,
                content: req.content,
            },
        )
        .await?;

    tracing::info!(post_id = %post.id, user_id = %session.identity, "Post created");

    let post = authored(&state, post).await;
    Ok(HttpResponse::Created().json(post_response(post, Some(&session.identity))))
}

/// PUT /api/posts - the id travels in the body
pub async fn update(
    Authenticated(session): Authenticated,
    state: web::Data<AppState>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post = state
        .posts
        .update(
            &session.identity,
            PostChanges {
                id: req.id,
                title: req.title,
                content: req.content,
            },
        )
        .await?;

    tracing::info!(post_id = %post.id, user_id = %session.identity, "Post updated");

    let post = authored(&state, post).await;
    Ok(HttpResponse::Ok().json(post_response(post, Some(&session.identity))))
}

/// DELETE /api/posts?id=
pub async fn delete(
    Authenticated(session): Authenticated,
    state: web::Data<AppState>,
    query: web::Query<PostQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    state
        .posts
        .delete(&session.identity, query.id.as_deref())
        .await?;

    tracing::info!(post_id = ?query.id, user_id = %session.identity, "Post deleted");
    Ok(HttpResponse::Ok().json(AckResponse::ok()))
}
