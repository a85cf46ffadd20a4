//! # tl-api
//!
//! The web routing and orchestration layer for Tellls.

pub mod accounts;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod session;

pub use handlers::AppState;

use actix_web::web;

/// Configures the routes for the app.
///
/// # Developer Note
/// We use a scoped configuration to allow the main binary to mount
/// the app under a different prefix if needed.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            // The home feed
            .route("/", web::get().to(handlers::index))
            // Posting
            .route("/do-telll", web::get().to(handlers::new_telll))
            .route("/do-telll", web::post().to(handlers::create_telll))
            // A telll and its comments
            .route("/telll/{id}", web::get().to(handlers::view_telll))
            .route("/telll/{id}/comment", web::post().to(handlers::add_comment))
            .route("/telll/{id}/delete", web::post().to(handlers::delete_telll))
            // Accounts
            .route("/sign-up", web::get().to(accounts::sign_up_form))
            .route("/sign-up", web::post().to(accounts::sign_up))
            .route("/sign-in", web::get().to(accounts::sign_in_form))
            .route("/sign-in", web::post().to(accounts::sign_in))
            .route("/sign-out", web::post().to(accounts::sign_out))
            .route("/onboarding", web::get().to(accounts::onboarding_form))
            .route("/onboarding", web::post().to(accounts::onboarding))
            .route("/profile/{username}", web::get().to(accounts::profile))
            // Communities
            .route("/communities", web::get().to(accounts::communities))
            .route("/communities", web::post().to(accounts::create_community))
            .route("/communities/{slug}", web::get().to(accounts::community)),
    );
}
