use crate::rows::{telll_from_row, view_from_row, SELECT_VIEW, TELLL_COLUMNS};
use crate::{opaque, push_ids, wrap, SqliteTelllRepo};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tl_core::cascade::{DeletePlan, DescendantWalk};
use tl_core::error::{AppError, Result};
use tl_core::models::{DeleteSummary, FeedPage, NewTelll, Telll, TelllView};
use tl_core::traits::TelllRepo;
use uuid::Uuid;

const CREATE_ERR: &str = "Failed to create the Telll";
const FETCH_ERR: &str = "Unable to fetch Telll";
const FEED_ERR: &str = "Failed to fetch Tellls";
const COMMENT_ERR: &str = "Unable to add comment";
const DELETE_ERR: &str = "Failed to delete Telll";

async fn find_telll(conn: &mut SqliteConnection, id: Uuid) -> std::result::Result<Option<Telll>, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT {TELLL_COLUMNS} FROM tellls WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(telll_from_row).transpose()
}

async fn user_exists(conn: &mut SqliteConnection, id: Uuid) -> std::result::Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

async fn insert_telll(conn: &mut SqliteConnection, telll: &Telll) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO tellls ({TELLL_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)"
    ))
    .bind(telll.id)
    .bind(&telll.text)
    .bind(telll.author_id)
    .bind(telll.community_id)
    .bind(telll.parent_id)
    .bind(telll.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Runs `DELETE FROM <table> WHERE <owner_col> IN (owners) AND telll_id IN (ids)`.
async fn pull_telll_ids(
    conn: &mut SqliteConnection,
    table: &str,
    owner_col: &str,
    owners: &[Uuid],
    ids: &[Uuid],
) -> std::result::Result<u64, sqlx::Error> {
    if owners.is_empty() {
        return Ok(0);
    }
    let mut qb = QueryBuilder::<Sqlite>::new(format!("DELETE FROM {table} WHERE {owner_col} IN ("));
    push_ids(&mut qb, owners);
    qb.push(" AND telll_id IN (");
    push_ids(&mut qb, ids);
    let done = qb.build().execute(&mut *conn).await?;
    Ok(done.rows_affected())
}

#[async_trait]
impl TelllRepo for SqliteTelllRepo {
    async fn fetch_posts(&self, page_number: u32, page_size: u32) -> Result<FeedPage> {
        let page_size = i64::from(page_size);
        // no offset that large can hold rows
        let Some(skip) = i64::from(page_number.max(1) - 1).checked_mul(page_size) else {
            return Ok(FeedPage {
                posts: Vec::new(),
                is_next: false,
            });
        };

        let rows = sqlx::query(&format!(
            "{SELECT_VIEW} WHERE t.parent_id IS NULL ORDER BY t.id DESC LIMIT ? OFFSET ?"
        ))
        .bind(page_size)
        .bind(skip)
        .fetch_all(&self.pool)
        .await
        .map_err(wrap(FEED_ERR))?;

        let mut posts = rows
            .iter()
            .map(view_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(wrap(FEED_ERR))?;
        self.attach_children(&mut posts).await.map_err(wrap(FEED_ERR))?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tellls WHERE parent_id IS NULL")
            .fetch_one(&self.pool)
            .await
            .map_err(wrap(FEED_ERR))?;

        let is_next = total > skip + posts.len() as i64;
        Ok(FeedPage { posts, is_next })
    }

    /// Inserts the telll and appends it to the author's (and community's)
    /// list in one transaction.
    async fn create_telll(&self, new: NewTelll) -> Result<Telll> {
        let mut tx = self.pool.begin().await.map_err(wrap(CREATE_ERR))?;

        if !user_exists(&mut tx, new.author_id).await.map_err(wrap(CREATE_ERR))? {
            return Err(AppError::not_found("User", new.author_id));
        }

        let community_id: Option<Uuid> = match new.community.as_deref() {
            Some(slug) => sqlx::query_scalar("SELECT id FROM communities WHERE slug = ?")
                .bind(slug)
                .fetch_optional(&mut *tx)
                .await
                .map_err(wrap(CREATE_ERR))?,
            None => None,
        };

        let telll = Telll {
            id: Uuid::now_v7(),
            text: new.text,
            author_id: new.author_id,
            community_id,
            parent_id: None,
            created_at: Utc::now(),
        };
        insert_telll(&mut tx, &telll).await.map_err(wrap(CREATE_ERR))?;

        sqlx::query("INSERT INTO user_tellls (user_id, telll_id) VALUES (?, ?)")
            .bind(telll.author_id)
            .bind(telll.id)
            .execute(&mut *tx)
            .await
            .map_err(wrap(CREATE_ERR))?;

        if let Some(community_id) = telll.community_id {
            sqlx::query("INSERT INTO community_tellls (community_id, telll_id) VALUES (?, ?)")
                .bind(community_id)
                .bind(telll.id)
                .execute(&mut *tx)
                .await
                .map_err(wrap(CREATE_ERR))?;
        }

        tx.commit().await.map_err(wrap(CREATE_ERR))?;
        log::info!("telll {} created by {}", telll.id, telll.author_id);
        Ok(telll)
    }

    async fn get_telll(&self, id: Uuid) -> Result<Option<Telll>> {
        let mut conn = self.pool.acquire().await.map_err(opaque(FETCH_ERR))?;
        find_telll(&mut conn, id).await.map_err(opaque(FETCH_ERR))
    }

    async fn fetch_telll_by_id(&self, id: Uuid) -> Result<Option<TelllView>> {
        let row = sqlx::query(&format!("{SELECT_VIEW} WHERE t.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(opaque(FETCH_ERR))?;

        let mut view = match row {
            Some(row) => view_from_row(&row).map_err(opaque(FETCH_ERR))?,
            None => return Ok(None),
        };

        self.attach_children(std::slice::from_mut(&mut view))
            .await
            .map_err(opaque(FETCH_ERR))?;
        self.attach_children(&mut view.children)
            .await
            .map_err(opaque(FETCH_ERR))?;

        Ok(Some(view))
    }

    async fn add_comment(&self, parent_id: Uuid, text: &str, author_id: Uuid) -> Result<Telll> {
        let mut tx = self.pool.begin().await.map_err(opaque(COMMENT_ERR))?;

        if find_telll(&mut tx, parent_id)
            .await
            .map_err(opaque(COMMENT_ERR))?
            .is_none()
        {
            return Err(AppError::not_found("Telll", parent_id));
        }

        let comment = Telll {
            id: Uuid::now_v7(),
            text: text.to_string(),
            author_id,
            community_id: None,
            parent_id: Some(parent_id),
            created_at: Utc::now(),
        };
        insert_telll(&mut tx, &comment).await.map_err(opaque(COMMENT_ERR))?;
        tx.commit().await.map_err(opaque(COMMENT_ERR))?;

        log::info!("comment {} added to telll {}", comment.id, parent_id);
        Ok(comment)
    }

    /// Deletes the telll and its whole comment subtree, then pulls the
    /// deleted ids out of every touched user and community list.
    async fn delete_telll(&self, id: Uuid) -> Result<DeleteSummary> {
        let mut tx = self.pool.begin().await.map_err(wrap(DELETE_ERR))?;

        let root = find_telll(&mut tx, id)
            .await
            .map_err(wrap(DELETE_ERR))?
            .ok_or_else(|| AppError::not_found("Telll", id))?;

        let mut walk = DescendantWalk::new(root.id);
        while let Some(parents) = walk.next_batch() {
            let mut qb = QueryBuilder::<Sqlite>::new(format!(
                "SELECT {TELLL_COLUMNS} FROM tellls WHERE parent_id IN ("
            ));
            push_ids(&mut qb, &parents);
            let rows = qb.build().fetch_all(&mut *tx).await.map_err(wrap(DELETE_ERR))?;
            let children = rows
                .iter()
                .map(telll_from_row)
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(wrap(DELETE_ERR))?;
            walk.record(children);
        }
        let plan = DeletePlan::build(&root, &walk.finish());

        let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM tellls WHERE id IN (");
        push_ids(&mut qb, &plan.telll_ids);
        qb.build().execute(&mut *tx).await.map_err(wrap(DELETE_ERR))?;

        pull_telll_ids(&mut tx, "user_tellls", "user_id", &plan.author_ids, &plan.telll_ids)
            .await
            .map_err(wrap(DELETE_ERR))?;
        pull_telll_ids(
            &mut tx,
            "community_tellls",
            "community_id",
            &plan.community_ids,
            &plan.telll_ids,
        )
        .await
        .map_err(wrap(DELETE_ERR))?;

        tx.commit().await.map_err(wrap(DELETE_ERR))?;
        log::info!(
            "telll {} deleted with {} descendants",
            id,
            plan.telll_ids.len() - 1
        );

        Ok(DeleteSummary {
            deleted: plan.telll_ids.len(),
            was_top_level: root.is_top_level(),
        })
    }
}
