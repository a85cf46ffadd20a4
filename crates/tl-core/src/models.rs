//! # Domain Models
//!
//! These structs represent the core entities of Tellls.
//! We use UUID v7 for time-ordered, globally unique identification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A short text post. A comment is a Telll with a parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Telll {
    pub id: Uuid,
    pub text: String,
    pub author_id: Uuid,
    /// Set when the telll was posted on behalf of a community
    pub community_id: Option<Uuid>,
    /// `None` for top-level tellls
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Telll {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Public handle used in profile URLs
    pub username: String,
    pub name: String,
    pub image: Option<String>,
    pub bio: Option<String>,
    /// False until the profile form has been completed
    pub onboarded: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A group that tellls can be attributed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Community {
    pub id: Uuid,
    /// The public id (e.g., "rustaceans")
    pub slug: String,
    pub name: String,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Input for a new top-level telll.
#[derive(Debug, Clone)]
pub struct NewTelll {
    pub text: String,
    pub author_id: Uuid,
    /// Community slug; an unknown slug yields a personal telll
    pub community: Option<String>,
}

/// Input for a profile update during onboarding.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: String,
    pub image: Option<String>,
    pub bio: Option<String>,
}

/// Input for a new community.
#[derive(Debug, Clone)]
pub struct NewCommunity {
    pub slug: String,
    pub name: String,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub created_by: Uuid,
}

// ── Populated read models ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub image: Option<String>,
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
            image: user.image.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommunitySummary {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub image: Option<String>,
}

/// A telll with its author, community and children resolved.
///
/// How deep `children` goes depends on the query that produced it; the feed
/// resolves one level, the detail page two.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelllView {
    pub id: Uuid,
    pub text: String,
    pub parent_id: Option<Uuid>,
    pub author: AuthorSummary,
    pub community: Option<CommunitySummary>,
    pub created_at: DateTime<Utc>,
    pub children: Vec<TelllView>,
}

impl TelllView {
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author.id == user_id
    }

    pub fn display_date(&self) -> String {
        self.created_at.format("%H:%M %b %d, %Y").to_string()
    }

    /// Distinct child authors in reply order, used for the reply avatars.
    pub fn reply_authors(&self) -> Vec<&AuthorSummary> {
        let mut seen = Vec::new();
        for child in &self.children {
            if !seen.iter().any(|a: &&AuthorSummary| a.id == child.author.id) {
                seen.push(&child.author);
            }
        }
        seen
    }
}

/// One page of the home feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPage {
    pub posts: Vec<TelllView>,
    pub is_next: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccountKind {
    User,
    Community,
}

/// The tellls tab of a profile or community page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountTellls {
    pub id: Uuid,
    /// Username or community slug
    pub handle: String,
    pub name: String,
    pub image: Option<String>,
    pub kind: AccountKind,
    pub tellls: Vec<TelllView>,
}

/// What a cascading delete removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteSummary {
    pub deleted: usize,
    pub was_top_level: bool,
}
