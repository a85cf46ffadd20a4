//! # tl-db-sqlite Implementation
//!
//! This crate implements the data mapping between the SQLite relational model
//! and the `tl-core` domain models. One `SqliteTelllRepo` serves both the
//! `TelllRepo` and the `AccountRepo` ports.

mod account;
mod rows;
mod schema;
mod telll;

use rows::{view_from_row, SELECT_VIEW};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use tl_core::error::AppError;
use tl_core::models::TelllView;
use uuid::Uuid;

pub struct SqliteTelllRepo {
    pool: SqlitePool,
}

impl SqliteTelllRepo {
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        Self::connect(url, 5).await
    }

    /// Opens the pool and creates missing tables.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
        if url.contains(":memory:") || url.contains("mode=memory") {
            // every connection to an in-memory database gets its own copy
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>);
        }

        let pool = pool_options.connect_with(options).await?;
        let repo = Self { pool };
        repo.migrate().await?;
        log::info!("SQLite store ready at {}", url);
        Ok(repo)
    }

    async fn migrate(&self) -> Result<(), sqlx::Error> {
        for statement in schema::STATEMENTS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Loads the direct children of every parent in one query and attaches
    /// them oldest first.
    async fn attach_children(&self, parents: &mut [TelllView]) -> Result<(), sqlx::Error> {
        if parents.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = parents.iter().map(|p| p.id).collect();

        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_VIEW);
        qb.push(" WHERE t.parent_id IN (");
        push_ids(&mut qb, &ids);
        qb.push(" ORDER BY t.id ASC");
        let rows = qb.build().fetch_all(&self.pool).await?;

        let mut by_parent: HashMap<Uuid, Vec<TelllView>> = HashMap::new();
        for row in &rows {
            let child = view_from_row(row)?;
            if let Some(parent_id) = child.parent_id {
                by_parent.entry(parent_id).or_default().push(child);
            }
        }
        for parent in parents.iter_mut() {
            parent.children = by_parent.remove(&parent.id).unwrap_or_default();
        }
        Ok(())
    }
}

/// Appends `?, ?, ...)` bound to `ids`. The caller has already pushed `IN (`.
pub(crate) fn push_ids(qb: &mut QueryBuilder<'_, Sqlite>, ids: &[Uuid]) {
    let mut list = qb.separated(", ");
    for id in ids {
        list.push_bind(*id);
    }
    list.push_unseparated(")");
}

/// Wraps a database failure with the message of the operation that failed.
pub(crate) fn wrap(context: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        log::error!("{}: {}", context, e);
        AppError::Internal(format!("{context}: {e}"))
    }
}

/// Like [`wrap`], but keeps the cause out of the returned message.
pub(crate) fn opaque(context: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        log::error!("{}: {}", context, e);
        AppError::Internal(context.to_string())
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tl_core::models::{NewCommunity, NewTelll, ProfileUpdate, User};
    use tl_core::traits::{AccountRepo, TelllRepo};

    async fn repo() -> SqliteTelllRepo {
        SqliteTelllRepo::new("sqlite::memory:").await.unwrap()
    }

    async fn onboarded_user(repo: &SqliteTelllRepo, username: &str) -> User {
        let user = repo.create_user(username, "hash").await.unwrap();
        repo.update_profile(
            user.id,
            ProfileUpdate {
                name: username.to_uppercase(),
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }

    async fn post(repo: &SqliteTelllRepo, author: &User, text: &str) -> Uuid {
        repo.create_telll(NewTelll {
            text: text.into(),
            author_id: author.id,
            community: None,
        })
        .await
        .unwrap()
        .id
    }

    /// Rows in a link table that still point at any of `ids`.
    async fn links_to(repo: &SqliteTelllRepo, table: &str, ids: &[Uuid]) -> i64 {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT COUNT(*) FROM {table} WHERE telll_id IN ("
        ));
        push_ids(&mut qb, ids);
        qb.build_query_scalar::<i64>()
            .fetch_one(&repo.pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_fetch_telll() {
        let repo = repo().await;
        let ann = onboarded_user(&repo, "ann").await;

        let id = post(&repo, &ann, "first telll").await;
        let view = repo.fetch_telll_by_id(id).await.unwrap().expect("telll exists");
        assert_eq!(view.text, "first telll");
        assert_eq!(view.author.username, "ann");
        assert_eq!(view.author.name, "ANN");
        assert!(view.community.is_none());
        assert!(view.children.is_empty());

        let tab = repo.fetch_user_posts(ann.id).await.unwrap().unwrap();
        assert_eq!(tab.tellls.len(), 1);
        assert_eq!(tab.tellls[0].id, id);
    }

    #[tokio::test]
    async fn test_community_attribution() {
        let repo = repo().await;
        let ann = onboarded_user(&repo, "ann").await;
        let rust = repo
            .create_community(NewCommunity {
                slug: "rust".into(),
                name: "Rustaceans".into(),
                image: None,
                bio: None,
                created_by: ann.id,
            })
            .await
            .unwrap();

        let attributed = repo
            .create_telll(NewTelll {
                text: "hello crabs".into(),
                author_id: ann.id,
                community: Some("rust".into()),
            })
            .await
            .unwrap();
        assert_eq!(attributed.community_id, Some(rust.id));

        let personal = repo
            .create_telll(NewTelll {
                text: "nobody home".into(),
                author_id: ann.id,
                community: Some("no_such_community".into()),
            })
            .await
            .unwrap();
        assert_eq!(personal.community_id, None);

        let tab = repo.fetch_community_posts(rust.id).await.unwrap().unwrap();
        assert_eq!(tab.handle, "rust");
        assert_eq!(tab.tellls.len(), 1);
        assert_eq!(
            tab.tellls[0].community.as_ref().map(|c| c.name.as_str()),
            Some("Rustaceans")
        );
    }

    #[tokio::test]
    async fn test_feed_lists_top_level_newest_first() {
        let repo = repo().await;
        let ann = onboarded_user(&repo, "ann").await;
        let ben = onboarded_user(&repo, "ben").await;

        let first = post(&repo, &ann, "one").await;
        let second = post(&repo, &ann, "two").await;
        let third = post(&repo, &ben, "three").await;
        repo.add_comment(first, "a reply", ben.id).await.unwrap();

        let page = repo.fetch_posts(1, 2).await.unwrap();
        let ids: Vec<Uuid> = page.posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![third, second]);
        assert!(page.is_next);

        let page = repo.fetch_posts(2, 2).await.unwrap();
        assert_eq!(page.posts.len(), 1);
        assert_eq!(page.posts[0].id, first);
        assert_eq!(page.posts[0].children.len(), 1);
        assert_eq!(page.posts[0].children[0].author.username, "ben");
        assert!(!page.is_next);

        // page 0 is treated as page 1
        let page = repo.fetch_posts(0, 2).await.unwrap();
        assert_eq!(page.posts[0].id, third);
    }

    #[tokio::test]
    async fn test_feed_far_past_the_end_is_empty() {
        let repo = repo().await;
        let ann = onboarded_user(&repo, "ann").await;
        post(&repo, &ann, "only one").await;

        let page = repo.fetch_posts(u32::MAX, u32::MAX).await.unwrap();
        assert!(page.posts.is_empty());
        assert!(!page.is_next);

        let page = repo.fetch_posts(3, 20).await.unwrap();
        assert!(page.posts.is_empty());
        assert!(!page.is_next);
    }

    #[tokio::test]
    async fn test_detail_populates_two_levels() {
        let repo = repo().await;
        let ann = onboarded_user(&repo, "ann").await;
        let root = post(&repo, &ann, "root").await;
        let child = repo.add_comment(root, "child", ann.id).await.unwrap();
        repo.add_comment(child.id, "grandchild", ann.id).await.unwrap();

        let view = repo.fetch_telll_by_id(root).await.unwrap().unwrap();
        assert_eq!(view.children.len(), 1);
        assert_eq!(view.children[0].text, "child");
        assert_eq!(view.children[0].children.len(), 1);
        assert_eq!(view.children[0].children[0].text, "grandchild");
    }

    #[tokio::test]
    async fn test_comment_on_missing_telll_is_not_found() {
        let repo = repo().await;
        let ann = onboarded_user(&repo, "ann").await;
        let err = repo
            .add_comment(Uuid::now_v7(), "hello?", ann.id)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_removes_subtree_and_nothing_else() {
        let repo = repo().await;
        let ann = onboarded_user(&repo, "ann").await;
        let ben = onboarded_user(&repo, "ben").await;

        let root = post(&repo, &ann, "root").await;
        let keep = post(&repo, &ben, "keep me").await;
        let c1 = repo.add_comment(root, "c1", ben.id).await.unwrap();
        let c2 = repo.add_comment(c1.id, "c2", ann.id).await.unwrap();
        let c3 = repo.add_comment(c2.id, "c3", ben.id).await.unwrap();
        let other = repo.add_comment(keep, "other", ann.id).await.unwrap();

        let summary = repo.delete_telll(root).await.unwrap();
        assert_eq!(summary.deleted, 4);
        assert!(summary.was_top_level);

        for id in [root, c1.id, c2.id, c3.id] {
            assert!(repo.get_telll(id).await.unwrap().is_none());
        }
        assert!(repo.get_telll(keep).await.unwrap().is_some());
        assert!(repo.get_telll(other.id).await.unwrap().is_some());

        let deleted = [root, c1.id, c2.id, c3.id];
        assert_eq!(links_to(&repo, "user_tellls", &deleted).await, 0);
        assert_eq!(links_to(&repo, "user_tellls", &[keep]).await, 1);

        let tab = repo.fetch_user_posts(ann.id).await.unwrap().unwrap();
        assert!(tab.tellls.is_empty());
        let tab = repo.fetch_user_posts(ben.id).await.unwrap().unwrap();
        assert_eq!(tab.tellls.len(), 1);
        assert_eq!(tab.tellls[0].id, keep);
    }

    #[tokio::test]
    async fn test_delete_pulls_from_community_list() {
        let repo = repo().await;
        let ann = onboarded_user(&repo, "ann").await;
        let rust = repo
            .create_community(NewCommunity {
                slug: "rust".into(),
                name: "Rust".into(),
                image: None,
                bio: None,
                created_by: ann.id,
            })
            .await
            .unwrap();
        let telll = repo
            .create_telll(NewTelll {
                text: "in community".into(),
                author_id: ann.id,
                community: Some("rust".into()),
            })
            .await
            .unwrap();

        assert_eq!(links_to(&repo, "community_tellls", &[telll.id]).await, 1);
        repo.delete_telll(telll.id).await.unwrap();
        assert_eq!(links_to(&repo, "community_tellls", &[telll.id]).await, 0);
        assert_eq!(links_to(&repo, "user_tellls", &[telll.id]).await, 0);

        let tab = repo.fetch_community_posts(rust.id).await.unwrap().unwrap();
        assert!(tab.tellls.is_empty());
    }

    #[tokio::test]
    async fn test_delete_comment_keeps_parent() {
        let repo = repo().await;
        let ann = onboarded_user(&repo, "ann").await;
        let root = post(&repo, &ann, "root").await;
        let comment = repo.add_comment(root, "comment", ann.id).await.unwrap();

        let summary = repo.delete_telll(comment.id).await.unwrap();
        assert_eq!(summary.deleted, 1);
        assert!(!summary.was_top_level);

        let view = repo.fetch_telll_by_id(root).await.unwrap().unwrap();
        assert!(view.children.is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let repo = repo().await;
        let err = repo.delete_telll(Uuid::now_v7()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let repo = repo().await;
        repo.create_user("ann", "hash").await.unwrap();
        let err = repo.create_user("ann", "other").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_telll_for_unknown_author_is_not_found() {
        let repo = repo().await;
        let err = repo
            .create_telll(NewTelll {
                text: "ghost".into(),
                author_id: Uuid::now_v7(),
                community: None,
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
