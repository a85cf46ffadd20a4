//! # tl-ui
//!
//! Askama page templates. Handlers build these from `tl-core` read models and
//! call `render()`.

use askama::Template;
use tl_core::models::{AccountKind, AccountTellls, Community, FeedPage, TelllView, User};

/// Shared by every page: the `<title>` and the signed-in user for the nav bar.
pub struct Layout<'a> {
    pub title: String,
    pub viewer: Option<&'a User>,
}

impl<'a> Layout<'a> {
    pub fn new(title: impl Into<String>, viewer: Option<&'a User>) -> Self {
        Self {
            title: title.into(),
            viewer,
        }
    }
}

/// One telll as a card. Rendered inline by the page templates.
#[derive(Template)]
#[template(path = "telll_card.html")]
pub struct TelllCard<'a> {
    pub telll: &'a TelllView,
    /// Comments hide the date/community footer
    pub is_comment: bool,
    pub can_delete: bool,
    /// Page the card is shown on; the delete form sends it back
    pub path: &'a str,
}

impl<'a> TelllCard<'a> {
    pub fn new(telll: &'a TelllView, path: &'a str) -> Self {
        Self {
            telll,
            is_comment: false,
            can_delete: false,
            path,
        }
    }

    pub fn comment(mut self) -> Self {
        self.is_comment = true;
        self
    }

    /// The delete control is offered to the author, never on the feed.
    pub fn deletable_by(mut self, viewer: Option<&User>) -> Self {
        self.can_delete =
            self.path != "/" && viewer.is_some_and(|user| self.telll.is_authored_by(user.id));
        self
    }
}

#[derive(Template)]
#[template(path = "feed.html")]
pub struct FeedTemplate<'a> {
    pub layout: Layout<'a>,
    pub cards: Vec<TelllCard<'a>>,
    pub page_number: u32,
    pub is_next: bool,
}

impl<'a> FeedTemplate<'a> {
    pub fn new(layout: Layout<'a>, page: &'a FeedPage, page_number: u32) -> Self {
        let cards = page
            .posts
            .iter()
            .map(|telll| TelllCard::new(telll, "/").deletable_by(layout.viewer))
            .collect();
        Self {
            layout,
            cards,
            page_number,
            is_next: page.is_next,
        }
    }
}

#[derive(Template)]
#[template(path = "telll.html")]
pub struct TelllTemplate<'a> {
    pub layout: Layout<'a>,
    pub telll: &'a TelllView,
    pub card: TelllCard<'a>,
    pub comments: Vec<TelllCard<'a>>,
    pub error: Option<String>,
}

impl<'a> TelllTemplate<'a> {
    pub fn new(layout: Layout<'a>, telll: &'a TelllView, path: &'a str) -> Self {
        let viewer = layout.viewer;
        let comments = telll
            .children
            .iter()
            .map(|child| TelllCard::new(child, path).comment().deletable_by(viewer))
            .collect();
        Self {
            card: TelllCard::new(telll, path).deletable_by(viewer),
            layout,
            telll,
            comments,
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

#[derive(Template)]
#[template(path = "do_telll.html")]
pub struct CreateTelllTemplate<'a> {
    pub layout: Layout<'a>,
    pub communities: &'a [Community],
    pub text: String,
    pub error: Option<String>,
}

/// The tellls tab of a profile or a community.
#[derive(Template)]
#[template(path = "tellls_tab.html")]
pub struct TelllsTabTemplate<'a> {
    pub layout: Layout<'a>,
    pub account: &'a AccountTellls,
    pub cards: Vec<TelllCard<'a>>,
}

impl<'a> TelllsTabTemplate<'a> {
    pub fn new(layout: Layout<'a>, account: &'a AccountTellls, path: &'a str) -> Self {
        let viewer = layout.viewer;
        let cards = account
            .tellls
            .iter()
            .map(|telll| TelllCard::new(telll, path).deletable_by(viewer))
            .collect();
        Self {
            layout,
            account,
            cards,
        }
    }

    pub fn is_community(&self) -> bool {
        self.account.kind == AccountKind::Community
    }
}

#[derive(Template)]
#[template(path = "communities.html")]
pub struct CommunitiesTemplate<'a> {
    pub layout: Layout<'a>,
    pub communities: &'a [Community],
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

#[derive(Template)]
#[template(path = "sign_in.html")]
pub struct AuthTemplate<'a> {
    pub layout: Layout<'a>,
    pub mode: AuthMode,
    pub username: String,
    pub error: Option<String>,
}

impl AuthTemplate<'_> {
    pub fn is_sign_up(&self) -> bool {
        self.mode == AuthMode::SignUp
    }

    pub fn action(&self) -> &'static str {
        match self.mode {
            AuthMode::SignIn => "/sign-in",
            AuthMode::SignUp => "/sign-up",
        }
    }
}

#[derive(Template)]
#[template(path = "onboarding.html")]
pub struct OnboardingTemplate<'a> {
    pub layout: Layout<'a>,
    pub user: &'a User,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub layout: Layout<'a>,
    pub status: u16,
    pub message: String,
}
