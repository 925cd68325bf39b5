//! Current-session handlers: `/api/session`.

use actix_web::{HttpResponse, web};

use quill_core::domain::{Profile, Session};
use quill_shared::dto::{ProfileResponse, SessionResponse, UpdateProfileRequest, UserResponse};

use crate::middleware::auth::{Authenticated, MaybeAuthenticated};
use crate::middleware::error::AppResult;
use crate::state::AppState;

pub(crate) fn profile_response(profile: Profile) -> ProfileResponse {
    ProfileResponse {
        id: profile.id.into_inner(),
        name: profile.name,
        updated_at: profile.updated_at,
    }
}

fn session_user(session: &Session) -> UserResponse {
    UserResponse {
        id: session.identity.to_string(),
        email: session.email.clone(),
        created_at: None,
    }
}

/// GET /api/session - the caller's user and profile, or `null`
pub async fn current(
    viewer: MaybeAuthenticated,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let Some(session) = viewer.0 else {
        return Ok(HttpResponse::Ok().json(Option::<SessionResponse>::None));
    };

    // A profile-less identity is still a valid session.
    let profile = state.profiles.get(&session.identity).await?;

    Ok(HttpResponse::Ok().json(Some(SessionResponse {
        user: session_user(&session),
        profile: profile.map(profile_response),
    })))
}

/// PUT /api/session/profile - rename the caller's own profile
///
/// A caller whose sign-up left no profile gets 404: there is nothing to rename.
pub async fn update_profile(
    Authenticated(session): Authenticated,
    state: web::Data<AppState>,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let profile = state
        .profiles
        .update(&session.identity, req.name.as_deref())
        .await?;

    tracing::info!(user_id = %session.identity, "Profile updated");
    Ok(HttpResponse::Ok().json(profile_response(profile)))
}
