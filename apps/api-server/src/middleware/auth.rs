//! Session extractors.
//!
//! The session is resolved once per request here and handed to handlers as a
//! typed value.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures::future::LocalBoxFuture;

use quill_core::domain::{Session, UserId};
use quill_core::ports::AuthError;

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Extract the Bearer token from the `Authorization` header.
fn bearer_token(req: &HttpRequest) -> Result<String, AuthError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?;

    let value = value
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    // Parse "Bearer <token>"
    match value.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(AuthError::InvalidToken("Expected Bearer token".to_string())),
    }
}

fn app_state(req: &HttpRequest) -> Result<web::Data<AppState>, AppError> {
    req.app_data::<web::Data<AppState>>().cloned().ok_or_else(|| {
        tracing::error!("AppState not found in app data");
        AppError::Internal("Server configuration error".to_string())
    })
}

/// A verified session. Handlers taking this reject anonymous callers with 401.
///
/// ```ignore
/// async fn protected_route(Authenticated(session): Authenticated) -> impl Responder {
///     format!("Hello, user {}!", session.identity)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Authenticated(pub Session);

impl FromRequest for Authenticated {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = app_state(req);
        let token = bearer_token(req);

        Box::pin(async move {
            let state = state?;
            let token = token?;
            let session = state.identity.current_session(&token).await?;
            Ok::<_, AppError>(Authenticated(session))
        })
    }
}

/// Optional session - anonymous and invalid tokens both resolve to `None`.
#[derive(Debug, Clone)]
pub struct MaybeAuthenticated(pub Option<Session>);

impl MaybeAuthenticated {
    pub fn identity(&self) -> Option<&UserId> {
        self.0.as_ref().map(|s| &s.identity)
    }
}

impl FromRequest for MaybeAuthenticated {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = app_state(req);
        let token = bearer_token(req).ok();

        Box::pin(async move {
            let state = state?;
            let Some(token) = token else {
                return Ok(MaybeAuthenticated(None));
            };

            let session = match state.identity.current_session(&token).await {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::debug!(error = %e, "Ignoring unusable token on public route");
                    None
                }
            };
            Ok::<_, AppError>(MaybeAuthenticated(session))
        })
    }
}
