//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use crate::error::Result;
use crate::models::{
    AccountTellls, Community, DeleteSummary, FeedPage, NewCommunity, NewTelll, ProfileUpdate,
    Telll, TelllView, User,
};
use async_trait::async_trait;
use uuid::Uuid;

/// Data persistence contract for tellls and their comment trees.
#[async_trait]
pub trait TelllRepo: Send + Sync {
    /// Top-level tellls, newest first. `page_number` starts at 1.
    async fn fetch_posts(&self, page_number: u32, page_size: u32) -> Result<FeedPage>;

    /// Creates a top-level telll and records it on the author and community.
    async fn create_telll(&self, telll: NewTelll) -> Result<Telll>;

    async fn get_telll(&self, id: Uuid) -> Result<Option<Telll>>;

    /// A telll with children and grandchildren populated.
    async fn fetch_telll_by_id(&self, id: Uuid) -> Result<Option<TelllView>>;

    async fn add_comment(&self, parent_id: Uuid, text: &str, author_id: Uuid) -> Result<Telll>;

    /// Deletes a telll together with every telll whose parent chain reaches it.
    async fn delete_telll(&self, id: Uuid) -> Result<DeleteSummary>;
}

/// Users and communities, and the tellls tabs hanging off them.
#[async_trait]
pub trait AccountRepo: Send + Sync {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User>;
    async fn update_profile(&self, user_id: Uuid, profile: ProfileUpdate) -> Result<User>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn fetch_user_posts(&self, user_id: Uuid) -> Result<Option<AccountTellls>>;

    async fn create_community(&self, community: NewCommunity) -> Result<Community>;
    async fn get_community_by_slug(&self, slug: &str) -> Result<Option<Community>>;
    async fn list_communities(&self) -> Result<Vec<Community>>;
    async fn fetch_community_posts(&self, community_id: Uuid) -> Result<Option<AccountTellls>>;
}

/// Identity contract: password hashing and session tokens.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    fn hash_password(&self, password: &str) -> Result<String>;

    /// Verifies a password against a stored hash.
    async fn verify_password(&self, password: &str, hash: &str) -> bool;

    /// Issues an opaque token for a signed-in user
    fn issue_session(&self, user_id: Uuid) -> String;

    /// Returns the user id for a valid token, `None` for anything else.
    fn resolve_session(&self, token: &str) -> Option<Uuid>;
}
