//! Session cookie handling and the "who is asking" checks pages share.

use crate::error::ApiError;
use crate::handlers::AppState;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use tl_core::models::User;

pub const SESSION_COOKIE: &str = "tellls_session";

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::named(SESSION_COOKIE);
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// The signed-in user, if the request carries a valid session.
pub async fn viewer(req: &HttpRequest, data: &AppState) -> Result<Option<User>, ApiError> {
    let Some(cookie) = req.cookie(SESSION_COOKIE) else {
        return Ok(None);
    };
    let Some(user_id) = data.auth.resolve_session(cookie.value()) else {
        return Ok(None);
    };
    Ok(data.accounts.get_user(user_id).await?)
}

/// A signed-in user, or a redirect to the sign-in page.
pub async fn signed_in(
    req: &HttpRequest,
    data: &AppState,
) -> Result<Result<User, HttpResponse>, ApiError> {
    Ok(viewer(req, data).await?.ok_or_else(|| see_other("/sign-in")))
}

/// A user that finished onboarding. Anyone else is sent to sign in or to
/// complete their profile first.
pub async fn onboarded(
    req: &HttpRequest,
    data: &AppState,
) -> Result<Result<User, HttpResponse>, ApiError> {
    Ok(match signed_in(req, data).await? {
        Ok(user) if user.onboarded => Ok(user),
        Ok(_) => Err(see_other("/onboarding")),
        Err(redirect) => Err(redirect),
    })
}
