//! tellls/crates/tl-api/src/middleware.rs Middleware
//!
//! Request logging, CORS and security headers for the Tellls app.

use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger};

// Returns a standard set of middleware for the Tellls app.
pub fn standard_middleware() -> Logger {
    // remote-ip "request-line" status-code response-size "referrer" "user-agent"
    Logger::default()
}

// Configures CORS (Cross-Origin Resource Sharing). A single "*" allows any origin.
pub fn cors_policy(allowed_origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .max_age(3600);

    if allowed_origins.iter().any(|origin| origin == "*") {
        return cors.allow_any_origin();
    }
    allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("Referrer-Policy", "strict-origin-when-cross-origin"))
        .add(("X-Frame-Options", "DENY"))
        .add((
            "Content-Security-Policy",
            "default-src 'self'; img-src * data:; style-src 'self' 'unsafe-inline'",
        ))
}
