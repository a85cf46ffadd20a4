use crate::rows::{community_from_row, user_from_row, view_from_row, SELECT_VIEW};
use crate::{is_unique_violation, wrap, SqliteTelllRepo};
use async_trait::async_trait;
use chrono::Utc;
use tl_core::error::{AppError, Result};
use tl_core::models::{
    AccountKind, AccountTellls, Community, NewCommunity, ProfileUpdate, TelllView, User,
};
use tl_core::traits::AccountRepo;
use uuid::Uuid;

const USER_ERR: &str = "Failed to fetch user";
const PROFILE_ERR: &str = "Failed to update user";
const COMMUNITY_ERR: &str = "Failed to fetch community";
const TAB_ERR: &str = "Failed to fetch posts";

const USER_COLUMNS: &str = "id, username, name, image, bio, onboarded, password_hash, created_at";
const COMMUNITY_COLUMNS: &str = "id, slug, name, image, bio, created_by, created_at";

impl SqliteTelllRepo {
    /// The telll list behind a tellls tab, newest entry first.
    ///
    /// `link_table` is `user_tellls` or `community_tellls`.
    async fn tab_tellls(
        &self,
        link_table: &str,
        owner_col: &str,
        owner: Uuid,
    ) -> std::result::Result<Vec<TelllView>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "{SELECT_VIEW} JOIN {link_table} l ON l.telll_id = t.id \
             WHERE l.{owner_col} = ? ORDER BY l.seq DESC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        let mut tellls = rows
            .iter()
            .map(view_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.attach_children(&mut tellls).await?;
        Ok(tellls)
    }

    async fn find_community(
        &self,
        slug: &str,
    ) -> std::result::Result<Option<Community>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT {COMMUNITY_COLUMNS} FROM communities WHERE slug = ?"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(community_from_row).transpose()
    }
}

#[async_trait]
impl AccountRepo for SqliteTelllRepo {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        let user = User {
            id: Uuid::now_v7(),
            username: username.to_string(),
            name: username.to_string(),
            image: None,
            bio: None,
            onboarded: false,
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };

        let inserted = sqlx::query(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.image)
        .bind(&user.bio)
        .bind(user.onboarded)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => {
                log::info!("user {} registered as {}", user.id, user.username);
                Ok(user)
            }
            Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(format!(
                "username {} is taken",
                username
            ))),
            Err(e) => Err(wrap("Failed to create user")(e)),
        }
    }

    /// Stores the profile and marks the user as onboarded.
    async fn update_profile(&self, user_id: Uuid, profile: ProfileUpdate) -> Result<User> {
        let done = sqlx::query(
            "UPDATE users SET name = ?, image = ?, bio = ?, onboarded = 1 WHERE id = ?",
        )
        .bind(&profile.name)
        .bind(&profile.image)
        .bind(&profile.bio)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(wrap(PROFILE_ERR))?;

        if done.rows_affected() == 0 {
            return Err(AppError::not_found("User", user_id));
        }
        self.get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User", user_id))
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(wrap(USER_ERR))?;
        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(wrap(USER_ERR))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(wrap(USER_ERR))?;
        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(wrap(USER_ERR))
    }

    async fn fetch_user_posts(&self, user_id: Uuid) -> Result<Option<AccountTellls>> {
        let Some(user) = self.get_user(user_id).await? else {
            return Ok(None);
        };
        let tellls = self
            .tab_tellls("user_tellls", "user_id", user.id)
            .await
            .map_err(wrap(TAB_ERR))?;

        Ok(Some(AccountTellls {
            id: user.id,
            handle: user.username,
            name: user.name,
            image: user.image,
            kind: AccountKind::User,
            tellls,
        }))
    }

    async fn create_community(&self, new: NewCommunity) -> Result<Community> {
        let community = Community {
            id: Uuid::now_v7(),
            slug: new.slug,
            name: new.name,
            image: new.image,
            bio: new.bio,
            created_by: new.created_by,
            created_at: Utc::now(),
        };

        let inserted = sqlx::query(&format!(
            "INSERT INTO communities ({COMMUNITY_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(community.id)
        .bind(&community.slug)
        .bind(&community.name)
        .bind(&community.image)
        .bind(&community.bio)
        .bind(community.created_by)
        .bind(community.created_at)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => {
                log::info!("community {} created", community.slug);
                Ok(community)
            }
            Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(format!(
                "community {} already exists",
                community.slug
            ))),
            Err(e) => Err(wrap("Failed to create community")(e)),
        }
    }

    async fn get_community_by_slug(&self, slug: &str) -> Result<Option<Community>> {
        self.find_community(slug)
            .await
            .map_err(wrap(COMMUNITY_ERR))
    }

    async fn list_communities(&self) -> Result<Vec<Community>> {
        let rows = sqlx::query(&format!(
            "SELECT {COMMUNITY_COLUMNS} FROM communities ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(wrap(COMMUNITY_ERR))?;

        rows.iter()
            .map(community_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(wrap(COMMUNITY_ERR))
    }

    async fn fetch_community_posts(&self, community_id: Uuid) -> Result<Option<AccountTellls>> {
        let row = sqlx::query(&format!(
            "SELECT {COMMUNITY_COLUMNS} FROM communities WHERE id = ?"
        ))
        .bind(community_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(wrap(COMMUNITY_ERR))?;

        let Some(community) = row
            .as_ref()
            .map(community_from_row)
            .transpose()
            .map_err(wrap(COMMUNITY_ERR))?
        else {
            return Ok(None);
        };

        let tellls = self
            .tab_tellls("community_tellls", "community_id", community.id)
            .await
            .map_err(wrap(TAB_ERR))?;

        Ok(Some(AccountTellls {
            id: community.id,
            handle: community.slug,
            name: community.name,
            image: community.image,
            kind: AccountKind::Community,
            tellls,
        }))
    }
}
