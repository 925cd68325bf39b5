//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;
mod session;

#[cfg(test)]
mod tests;

use actix_web::{HttpRequest, error, web};

use crate::middleware::error::AppError;

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Malformed bodies and query strings use the same error format
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .app_data(web::QueryConfig::default().error_handler(query_error))
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(auth::sign_up))
                    .route("/signin", web::post().to(auth::sign_in))
                    .route("/signout", web::post().to(auth::sign_out)),
            )
            .service(
                web::resource("/posts")
                    .route(web::get().to(posts::list_or_get))
                    .route(web::post().to(posts::create))
                    .route(web::put().to(posts::update))
                    .route(web::delete().to(posts::delete)),
            )
            .service(
                web::scope("/session")
                    .route("", web::get().to(session::current))
                    .route("/profile", web::put().to(session::update_profile)),
            ),
    );
}
