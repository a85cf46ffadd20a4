//! Sign-up, sign-in, onboarding, profiles and communities.

use crate::error::ApiError;
use crate::handlers::{html, html_with_status, AppState};
use crate::session::{
    onboarded, removal_cookie, see_other, session_cookie, signed_in, viewer,
};
use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse};
use askama::Template;
use serde::Deserialize;
use tl_core::models::{NewCommunity, ProfileUpdate, User};
use tl_core::validation::{non_empty, validate_handle, validate_password};
use tl_core::AppError;
use tl_ui::{
    AuthMode, AuthTemplate, CommunitiesTemplate, Layout, OnboardingTemplate, TelllsTabTemplate,
};

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    pub image: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommunityForm {
    pub slug: String,
    pub name: String,
    pub image: Option<String>,
    pub bio: Option<String>,
}

fn auth_page(
    mode: AuthMode,
    username: String,
    error: Option<String>,
    status: StatusCode,
) -> Result<HttpResponse, ApiError> {
    let title = match mode {
        AuthMode::SignIn => "Sign in",
        AuthMode::SignUp => "Sign up",
    };
    let body = AuthTemplate {
        layout: Layout::new(title, None),
        mode,
        username,
        error,
    }
    .render()?;
    Ok(html_with_status(status, body))
}

/// Redirect that also sets the session cookie for `user`.
fn start_session(data: &AppState, user: &User, location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .cookie(session_cookie(data.auth.issue_session(user.id)))
        .finish()
}

pub async fn sign_up_form() -> Result<HttpResponse, ApiError> {
    auth_page(AuthMode::SignUp, String::new(), None, StatusCode::OK)
}

pub async fn sign_up(
    data: web::Data<AppState>,
    form: web::Form<CredentialsForm>,
) -> Result<HttpResponse, ApiError> {
    let form = form.into_inner();
    let checked = validate_handle(&form.username)
        .and_then(|username| validate_password(&form.password).map(|()| username));
    let username = match checked {
        Ok(username) => username,
        Err(AppError::ValidationError(message)) => {
            return auth_page(AuthMode::SignUp, form.username, Some(message), StatusCode::BAD_REQUEST)
        }
        Err(e) => return Err(e.into()),
    };

    let hash = data.auth.hash_password(&form.password)?;
    match data.accounts.create_user(&username, &hash).await {
        Ok(user) => Ok(start_session(&data, &user, "/onboarding")),
        Err(AppError::Conflict(message)) => {
            auth_page(AuthMode::SignUp, form.username, Some(message), StatusCode::CONFLICT)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn sign_in_form() -> Result<HttpResponse, ApiError> {
    auth_page(AuthMode::SignIn, String::new(), None, StatusCode::OK)
}

pub async fn sign_in(
    data: web::Data<AppState>,
    form: web::Form<CredentialsForm>,
) -> Result<HttpResponse, ApiError> {
    let form = form.into_inner();
    let username = form.username.trim().to_ascii_lowercase();

    if let Some(user) = data.accounts.get_user_by_username(&username).await? {
        if data.auth.verify_password(&form.password, &user.password_hash).await {
            let next = if user.onboarded { "/" } else { "/onboarding" };
            return Ok(start_session(&data, &user, next));
        }
    }

    log::warn!("failed sign-in for {}", username);
    auth_page(
        AuthMode::SignIn,
        form.username,
        Some("Invalid username or password.".into()),
        StatusCode::UNAUTHORIZED,
    )
}

pub async fn sign_out() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .cookie(removal_cookie())
        .finish()
}

pub async fn onboarding_form(
    data: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user = match signed_in(&req, &data).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    let body = OnboardingTemplate {
        layout: Layout::new("Onboarding", Some(&user)),
        user: &user,
        error: None,
    }
    .render()?;
    Ok(html(body))
}

/// Saves the profile and marks the account as onboarded.
pub async fn onboarding(
    data: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<ProfileForm>,
) -> Result<HttpResponse, ApiError> {
    let user = match signed_in(&req, &data).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    let form = form.into_inner();

    let name = form.name.trim().to_string();
    if name.is_empty() {
        let body = OnboardingTemplate {
            layout: Layout::new("Onboarding", Some(&user)),
            user: &user,
            error: Some("Name is required.".into()),
        }
        .render()?;
        return Ok(html_with_status(StatusCode::BAD_REQUEST, body));
    }

    data.accounts
        .update_profile(
            user.id,
            ProfileUpdate {
                name,
                image: non_empty(form.image),
                bio: non_empty(form.bio),
            },
        )
        .await?;
    Ok(see_other("/"))
}

/// The tellls tab of a user (e.g., /profile/ferris)
pub async fn profile(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    // handles are stored lowercase
    let username = path.into_inner().to_ascii_lowercase();
    let viewer = viewer(&req, &data).await?;

    let Some(user) = data.accounts.get_user_by_username(&username).await? else {
        return Ok(see_other("/"));
    };
    let Some(account) = data.accounts.fetch_user_posts(user.id).await? else {
        return Ok(see_other("/"));
    };

    let page_path = format!("/profile/{}", account.handle);
    let body =
        TelllsTabTemplate::new(Layout::new(account.name.clone(), viewer.as_ref()), &account, &page_path)
            .render()?;
    Ok(html(body))
}

async fn communities_page(
    data: &AppState,
    viewer: Option<&User>,
    error: Option<String>,
    status: StatusCode,
) -> Result<HttpResponse, ApiError> {
    let communities = data.accounts.list_communities().await?;
    let body = CommunitiesTemplate {
        layout: Layout::new("Communities", viewer),
        communities: &communities,
        error,
    }
    .render()?;
    Ok(html_with_status(status, body))
}

pub async fn communities(
    data: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let viewer = viewer(&req, &data).await?;
    communities_page(&data, viewer.as_ref(), None, StatusCode::OK).await
}

pub async fn create_community(
    data: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<CommunityForm>,
) -> Result<HttpResponse, ApiError> {
    let user = match onboarded(&req, &data).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    let form = form.into_inner();

    let slug = match validate_handle(&form.slug) {
        Ok(slug) => slug,
        Err(AppError::ValidationError(message)) => {
            return communities_page(&data, Some(&user), Some(message), StatusCode::BAD_REQUEST)
                .await
        }
        Err(e) => return Err(e.into()),
    };
    let Some(name) = non_empty(Some(form.name)) else {
        return communities_page(
            &data,
            Some(&user),
            Some("Name is required.".into()),
            StatusCode::BAD_REQUEST,
        )
        .await;
    };

    let created = data
        .accounts
        .create_community(NewCommunity {
            slug,
            name,
            image: non_empty(form.image),
            bio: non_empty(form.bio),
            created_by: user.id,
        })
        .await;

    match created {
        Ok(community) => Ok(see_other(&format!("/communities/{}", community.slug))),
        Err(AppError::Conflict(message)) => {
            communities_page(&data, Some(&user), Some(message), StatusCode::CONFLICT).await
        }
        Err(e) => Err(e.into()),
    }
}

/// The tellls tab of a community (e.g., /communities/rust)
pub async fn community(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let slug = path.into_inner();
    let viewer = viewer(&req, &data).await?;

    let community = data
        .accounts
        .get_community_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::not_found("Community", &slug))?;
    let Some(account) = data.accounts.fetch_community_posts(community.id).await? else {
        return Ok(see_other("/"));
    };

    let page_path = format!("/communities/{}", account.handle);
    let body =
        TelllsTabTemplate::new(Layout::new(account.name.clone(), viewer.as_ref()), &account, &page_path)
            .render()?;
    Ok(html(body))
}
