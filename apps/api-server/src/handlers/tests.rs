use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use async_trait::async_trait;
use serde_json::{Value, json};
use uuid::Uuid;

use quill_core::domain::{Post, PostWithAuthor, Profile, Session, UserId};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, ProfileRepository};
use quill_core::services::NewPost;
use quill_infra::auth::JwtConfig;
use quill_infra::database::InMemoryStore;

use super::configure_routes;
use crate::observability::RequestIdMiddleware;
use crate::state::AppState;

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::new($state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

fn jwt() -> JwtConfig {
    JwtConfig {
        secret: "handler-test-secret".to_string(),
        ..JwtConfig::default()
    }
}

fn state() -> AppState {
    AppState::in_memory(jwt())
}

const BACKEND_FAILURE: &str = "connection reset by 10.0.0.7:5432";

/// Wraps the in-memory store and fails the selected operations.
#[derive(Default)]
struct FailingStore {
    inner: InMemoryStore,
    profile_reads: bool,
    profile_writes: bool,
    post_reads: bool,
}

impl FailingStore {
    fn check(&self, fail: bool) -> Result<(), RepoError> {
        if fail {
            Err(RepoError::Connection(BACKEND_FAILURE.to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BaseRepository<Profile, String> for FailingStore {
    async fn find_by_id(&self, id: String) -> Result<Option<Profile>, RepoError> {
        self.check(self.profile_reads)?;
        BaseRepository::<Profile, String>::find_by_id(&self.inner, id).await
    }

    async fn insert(&self, profile: Profile) -> Result<Profile, RepoError> {
        self.check(self.profile_writes)?;
        BaseRepository::<Profile, String>::insert(&self.inner, profile).await
    }

    async fn delete(&self, id: String) -> Result<(), RepoError> {
        self.check(self.profile_writes)?;
        BaseRepository::<Profile, String>::delete(&self.inner, id).await
    }
}

#[async_trait]
impl ProfileRepository for FailingStore {
    async fn update_name(&self, id: &UserId, name: &str) -> Result<Option<Profile>, RepoError> {
        self.check(self.profile_writes)?;
        self.inner.update_name(id, name).await
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for FailingStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        self.check(self.post_reads)?;
        BaseRepository::<Post, Uuid>::find_by_id(&self.inner, id).await
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        BaseRepository::<Post, Uuid>::insert(&self.inner, post).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        BaseRepository::<Post, Uuid>::delete(&self.inner, id).await
    }
}

#[async_trait]
impl PostRepository for FailingStore {
    async fn list_with_authors(&self) -> Result<Vec<PostWithAuthor>, RepoError> {
        self.check(self.post_reads)?;
        self.inner.list_with_authors().await
    }

    async fn find_with_author(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError> {
        self.check(self.post_reads)?;
        self.inner.find_with_author(id).await
    }

    async fn update_body(
        &self,
        id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Option<Post>, RepoError> {
        self.inner.update_body(id, title, content).await
    }
}

/// State whose profile and post stores go through `store`.
fn failing_state(store: FailingStore) -> (AppState, Arc<FailingStore>) {
    let store = Arc::new(store);
    let users = Arc::new(InMemoryStore::new());
    let state =
        AppState::from_repositories(users, store.clone(), store.clone(), jwt(), "memory");
    (state, store)
}

/// Register an account (with a profile when `name` is given) and sign in.
async fn account(state: &AppState, email: &str, name: Option<&str>) -> Session {
    let user = state.identity.sign_up(email, "password1").await.unwrap();
    if name.is_some() {
        state
            .profiles
            .create_on_signup(&user.id, name, email)
            .await
            .unwrap();
    }
    state.identity.sign_in(email, "password1").await.unwrap()
}

fn bearer(session: &Session) -> (header::HeaderName, String) {
    (
        header::AUTHORIZATION,
        format!("Bearer {}", session.access_token),
    )
}

#[actix_rt::test]
async fn test_health_reports_store() {
    let state = state();
    let app = test_app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request())
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
}

#[actix_rt::test]
async fn test_anonymous_list_joins_owner_names() {
    let state = state();
    let alice = account(&state, "alice@example.com", Some("Alice")).await;
    let ghost = account(&state, "ghost@example.com", None).await;

    for (owner, title) in [(&alice, "by alice"), (&ghost, "by ghost")] {
        state
            .posts
            .create(
                &owner.identity,
                NewPost {
                    title: Some(title.into()),
                    content: Some("body".into()),
                },
            )
            .await
            .unwrap();
    }

    let app = test_app!(state);
    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/api/posts").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let posts = body.as_array().unwrap();
    assert_eq!(posts.len(), 2);

    // Newest first.
    assert_eq!(posts[0]["title"], "by ghost");
    assert_eq!(posts[0]["author_name"], "anonymous");
    assert_eq!(posts[1]["title"], "by alice");
    assert_eq!(posts[1]["author_name"], "Alice");
    assert!(posts.iter().all(|p| p["owned_by_viewer"] == false));
}

#[actix_rt::test]
async fn test_create_requires_session() {
    let state = state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({"title": "T", "content": "C"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 401);
    assert!(body["request_id"].is_string());
    assert!(state.posts.list().await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_create_with_empty_title_is_rejected_without_insert() {
    let state = state();
    let alice = account(&state, "alice@example.com", Some("Alice")).await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&alice))
        .set_json(json!({"title": "", "content": "C"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Title and content are required");
    assert!(state.posts.list().await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_create_returns_created_post() {
    let state = state();
    let alice = account(&state, "alice@example.com", Some("Alice")).await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&alice))
        .set_json(json!({"title": "Hello", "content": "World"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Hello");
    assert_eq!(body["user_id"], alice.identity.as_str());
    assert_eq!(body["author_name"], "Alice");
    assert_eq!(body["owned_by_viewer"], true);
}

#[actix_rt::test]
async fn test_owner_only_update_and_delete_scenario() {
    let state = state();
    let alice = account(&state, "alice@example.com", Some("Alice")).await;
    let bob = account(&state, "bob@example.com", Some("Bob")).await;
    let app = test_app!(state);

    // A creates {"T", "C"}
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&alice))
        .set_json(json!({"title": "T", "content": "C"}))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_str().unwrap().to_string();
    let uri = format!("/api/posts?id={}", id);

    // B is refused
    let req = test::TestRequest::put()
        .uri("/api/posts")
        .insert_header(bearer(&bob))
        .set_json(json!({"id": id, "title": "B", "content": "B"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let fetched: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(fetched["title"], "T");
    assert_eq!(fetched["content"], "C");

    // A updates to {"T2", "C2"}
    let req = test::TestRequest::put()
        .uri("/api/posts")
        .insert_header(bearer(&alice))
        .set_json(json!({"id": id, "title": "T2", "content": "C2"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let fetched: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(fetched["title"], "T2");
    assert_eq!(fetched["content"], "C2");
    assert_eq!(fetched["created_at"], created["created_at"]);

    // A deletes, then the post is gone
    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);

    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_update_missing_fields_is_bad_request() {
    let state = state();
    let alice = account(&state, "alice@example.com", None).await;
    let app = test_app!(state);

    let req = test::TestRequest::put()
        .uri("/api/posts")
        .insert_header(bearer(&alice))
        .set_json(json!({"title": "T", "content": "C"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_post_id_errors() {
    let state = state();
    let alice = account(&state, "alice@example.com", None).await;
    let app = test_app!(state);

    // Not a UUID: cannot match a row
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/posts?id=not-a-uuid")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Delete without an id
    let req = test::TestRequest::delete()
        .uri("/api/posts")
        .insert_header(bearer(&alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Delete of an unknown post
    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts?id={}", uuid::Uuid::new_v4()))
        .insert_header(bearer(&alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_malformed_json_is_problem_document() {
    let state = state();
    let alice = account(&state, "alice@example.com", None).await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&alice))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Bad Request");
    assert_eq!(body["status"], 400);
}

#[actix_rt::test]
async fn test_session_is_null_when_anonymous() {
    let state = state();
    let app = test_app!(state);

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/api/session").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert!(body.is_null());
}

#[actix_rt::test]
async fn test_session_and_profile_update() {
    let state = state();
    let alice = account(&state, "alice@example.com", Some("Alice")).await;
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/session")
        .insert_header(bearer(&alice))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["profile"]["name"], "Alice");

    let req = test::TestRequest::put()
        .uri("/api/session/profile")
        .insert_header(bearer(&alice))
        .set_json(json!({"name": "   "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri("/api/session/profile")
        .insert_header(bearer(&alice))
        .set_json(json!({"name": "Alicia"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["name"], "Alicia");

    let req = test::TestRequest::put()
        .uri("/api/session/profile")
        .set_json(json!({"name": "Mallory"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_sign_up_sign_in_sign_out_flow() {
    let state = state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({"email": "carol@example.com", "password": "password1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["email"], "carol@example.com");
    assert_eq!(body["profile"]["name"], "carol");

    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({"email": "carol@example.com", "password": "password2"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri("/api/auth/signin")
        .set_json(json!({"email": "carol@example.com", "password": "wrong-password"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/signin")
        .set_json(json!({"email": "carol@example.com", "password": "password1"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["expires_in"].as_u64().unwrap() > 0);
    let auth = format!("Bearer {}", body["access_token"].as_str().unwrap());

    let req = test::TestRequest::post()
        .uri("/api/auth/signout")
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // The signed-out token no longer opens a session.
    let req = test::TestRequest::get()
        .uri("/api/session")
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body.is_null());

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header((header::AUTHORIZATION, auth))
        .set_json(json!({"title": "T", "content": "C"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_sign_up_rejects_short_password() {
    let state = state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({"email": "dave@example.com", "password": "123"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_store_failure_is_generic_500() {
    let (state, _) = failing_state(FailingStore {
        post_reads: true,
        ..Default::default()
    });
    let app = test_app!(state);

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/api/posts").to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 500);
    assert_eq!(body["detail"], "An unexpected error occurred");
    assert!(body["request_id"].is_string());
    assert!(!body.to_string().contains(BACKEND_FAILURE));
}

#[actix_rt::test]
async fn test_sign_up_survives_profile_failure() {
    let (state, _) = failing_state(FailingStore {
        profile_writes: true,
        ..Default::default()
    });
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({
            "email": "oscar@example.com",
            "password": "password1",
            "name": "Oscar"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["email"], "oscar@example.com");
    assert!(body["profile"].is_null());

    // The account exists and can sign in.
    state
        .identity
        .sign_in("oscar@example.com", "password1")
        .await
        .unwrap();
}

#[actix_rt::test]
async fn test_create_survives_author_lookup_failure() {
    let (state, store) = failing_state(FailingStore {
        profile_reads: true,
        ..Default::default()
    });
    let peggy = account(&state, "peggy@example.com", Some("Peggy")).await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&peggy))
        .set_json(json!({"title": "Kept", "content": "Written"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Kept");
    assert_eq!(body["author_name"], "anonymous");
    assert_eq!(body["owned_by_viewer"], true);

    // Exactly the one row was written.
    let stored = store.inner.list_with_authors().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].post.owner, peggy.identity);
}

#[actix_rt::test]
async fn test_profile_update_without_profile_is_not_found() {
    let state = state();
    let ghost = account(&state, "ghost@example.com", None).await;
    let app = test_app!(state);

    let req = test::TestRequest::put()
        .uri("/api/session/profile")
        .insert_header(bearer(&ghost))
        .set_json(json!({"name": "Casper"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(state.profiles.get(&ghost.identity).await.unwrap().is_none());
}
