//! # tl-api Handlers
//!
//! This module coordinates the flow between HTTP requests and Core traits for
//! the feed and the telll pages.

use crate::error::ApiError;
use crate::session::{onboarded, see_other, viewer};
use actix_web::{web, HttpRequest, HttpResponse};
use askama::Template;
use serde::Deserialize;
use std::sync::Arc;
use tl_core::models::NewTelll;
use tl_core::traits::{AccountRepo, AuthProvider, TelllRepo};
use tl_core::validation::{non_empty, validate_telll_text};
use tl_core::AppError;
use tl_ui::{CreateTelllTemplate, FeedTemplate, Layout, TelllTemplate};
use uuid::Uuid;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub tellls: Arc<dyn TelllRepo>,
    pub accounts: Arc<dyn AccountRepo>,
    pub auth: Box<dyn AuthProvider>,
    /// Top-level tellls per feed page
    pub page_size: u32,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TelllForm {
    pub telll: String,
    /// Community slug, empty for a personal telll
    pub account_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub telll: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub path: Option<String>,
    #[serde(default)]
    pub is_comment: bool,
}

pub(crate) fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

pub(crate) fn html_with_status(status: actix_web::http::StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// Only same-site paths are followed after a delete.
fn local_path(path: Option<&str>) -> &str {
    match path {
        Some(p) if p.starts_with('/') && !p.starts_with("//") => p,
        _ => "/",
    }
}

/// Renders the home feed (`/?page=n`).
pub async fn index(
    data: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let viewer = viewer(&req, &data).await?;
    let page_number = query.page.unwrap_or(1).max(1);

    let page = data.tellls.fetch_posts(page_number, data.page_size).await?;
    let body = FeedTemplate::new(Layout::new("Home", viewer.as_ref()), &page, page_number).render()?;
    Ok(html(body))
}

/// Renders the "Create a Telll" form.
pub async fn new_telll(data: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let user = match onboarded(&req, &data).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    let communities = data.accounts.list_communities().await?;

    let body = CreateTelllTemplate {
        layout: Layout::new("Create a Telll", Some(&user)),
        communities: &communities,
        text: String::new(),
        error: None,
    }
    .render()?;
    Ok(html(body))
}

/// Creates a top-level telll and goes back to the feed.
pub async fn create_telll(
    data: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<TelllForm>,
) -> Result<HttpResponse, ApiError> {
    let user = match onboarded(&req, &data).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    let form = form.into_inner();

    let text = match validate_telll_text(&form.telll) {
        Ok(text) => text,
        Err(AppError::ValidationError(message)) => {
            let communities = data.accounts.list_communities().await?;
            let body = CreateTelllTemplate {
                layout: Layout::new("Create a Telll", Some(&user)),
                communities: &communities,
                text: form.telll,
                error: Some(message),
            }
            .render()?;
            return Ok(html_with_status(actix_web::http::StatusCode::BAD_REQUEST, body));
        }
        Err(e) => return Err(e.into()),
    };

    data.tellls
        .create_telll(NewTelll {
            text,
            author_id: user.id,
            community: non_empty(form.account_id),
        })
        .await?;

    Ok(see_other("/"))
}

/// Renders a telll with its comments (e.g., /telll/<uuid>)
pub async fn view_telll(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let viewer = viewer(&req, &data).await?;
    if viewer.as_ref().is_some_and(|user| !user.onboarded) {
        return Ok(see_other("/onboarding"));
    }

    let telll = data
        .tellls
        .fetch_telll_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Telll", id))?;

    let page_path = format!("/telll/{id}");
    let body = TelllTemplate::new(Layout::new("Telll", viewer.as_ref()), &telll, &page_path).render()?;
    Ok(html(body))
}

/// Adds a comment under a telll and returns to it.
pub async fn add_comment(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    form: web::Form<CommentForm>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let user = match onboarded(&req, &data).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    let text = match validate_telll_text(&form.telll) {
        Ok(text) => text,
        Err(AppError::ValidationError(message)) => {
            let telll = data
                .tellls
                .fetch_telll_by_id(id)
                .await?
                .ok_or_else(|| AppError::not_found("Telll", id))?;
            let page_path = format!("/telll/{id}");
            let body = TelllTemplate::new(Layout::new("Telll", Some(&user)), &telll, &page_path)
                .with_error(message)
                .render()?;
            return Ok(html_with_status(actix_web::http::StatusCode::BAD_REQUEST, body));
        }
        Err(e) => return Err(e.into()),
    };

    data.tellls.add_comment(id, &text, user.id).await?;
    Ok(see_other(&format!("/telll/{id}")))
}

/// Deletes a telll with its comment subtree. Only the author may do this.
pub async fn delete_telll(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    form: web::Form<DeleteForm>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let user = match onboarded(&req, &data).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    let telll = data
        .tellls
        .get_telll(id)
        .await?
        .ok_or_else(|| AppError::not_found("Telll", id))?;
    if telll.author_id != user.id {
        return Err(AppError::Forbidden("only the author can delete a telll".into()).into());
    }

    let summary = data.tellls.delete_telll(id).await?;
    log::info!("{} removed {} tellls", user.username, summary.deleted);

    if summary.was_top_level || !form.is_comment {
        Ok(see_other("/"))
    } else {
        Ok(see_other(local_path(form.path.as_deref())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_local_paths_are_followed() {
        assert_eq!(local_path(Some("/telll/abc")), "/telll/abc");
        assert_eq!(local_path(Some("//evil.example")), "/");
        assert_eq!(local_path(Some("https://evil.example")), "/");
        assert_eq!(local_path(None), "/");
    }
}
