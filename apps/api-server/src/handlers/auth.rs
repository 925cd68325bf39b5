//! Authentication handlers: `/api/auth`.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use quill_infra::masking::mask_email;
use quill_shared::dto::{
    AckResponse, AuthResponse, SignInRequest, SignUpRequest, SignUpResponse, UserResponse,
};

use crate::handlers::session::profile_response;
use crate::middleware::auth::Authenticated;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/auth/signup
///
/// Profile creation is best-effort: if it fails the account still exists and
/// the response carries `profile: null`.
pub async fn sign_up(
    state: web::Data<AppState>,
    body: web::Json<SignUpRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let user = state.identity.sign_up(&req.email, &req.password).await?;

    let profile = match state
        .profiles
        .create_on_signup(&user.id, req.name.as_deref(), &user.email)
        .await
    {
        Ok(profile) => Some(profile_response(profile)),
        Err(e) => {
            tracing::warn!(
                user_id = %user.id,
                user_email = %mask_email(&user.email),
                error = %e,
                "Profile creation failed; continuing without a profile"
            );
            None
        }
    };

    Ok(HttpResponse::Created().json(SignUpResponse {
        user: UserResponse {
            id: user.id.into_inner(),
            email: user.email,
            created_at: Some(user.created_at),
        },
        profile,
    }))
}

/// POST /api/auth/signin
pub async fn sign_in(
    state: web::Data<AppState>,
    body: web::Json<SignInRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let session = state.identity.sign_in(&req.email, &req.password).await?;

    let expires_in = (session.expires_at - Utc::now()).num_seconds().max(0) as u64;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: session.access_token,
        token_type: "Bearer".to_string(),
        expires_in,
    }))
}

/// POST /api/auth/signout
pub async fn sign_out(
    Authenticated(session): Authenticated,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    state.identity.sign_out(&session).await?;
    Ok(HttpResponse::Ok().json(AckResponse::ok()))
}
