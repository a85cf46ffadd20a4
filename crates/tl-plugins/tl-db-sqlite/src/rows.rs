//! Mapping between SQLite rows and `tl-core` domain models.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tl_core::models::{AuthorSummary, Community, CommunitySummary, Telll, TelllView, User};
use uuid::Uuid;

pub(crate) const TELLL_COLUMNS: &str =
    "id, text, author_id, community_id, parent_id, created_at";

/// A telll joined with its author and (optional) community.
pub(crate) const SELECT_VIEW: &str = "SELECT t.id, t.text, t.parent_id, t.created_at, \
     u.id AS author_id, u.username AS author_username, u.name AS author_name, \
     u.image AS author_image, \
     c.id AS community_id, c.slug AS community_slug, c.name AS community_name, \
     c.image AS community_image \
     FROM tellls t \
     JOIN users u ON u.id = t.author_id \
     LEFT JOIN communities c ON c.id = t.community_id";

pub(crate) fn telll_from_row(row: &SqliteRow) -> Result<Telll, sqlx::Error> {
    Ok(Telll {
        id: row.try_get("id")?,
        text: row.try_get("text")?,
        author_id: row.try_get("author_id")?,
        community_id: row.try_get("community_id")?,
        parent_id: row.try_get("parent_id")?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn view_from_row(row: &SqliteRow) -> Result<TelllView, sqlx::Error> {
    let community_id: Option<Uuid> = row.try_get("community_id")?;
    let community = match community_id {
        Some(id) => Some(CommunitySummary {
            id,
            slug: row.try_get("community_slug")?,
            name: row.try_get("community_name")?,
            image: row.try_get("community_image")?,
        }),
        None => None,
    };

    Ok(TelllView {
        id: row.try_get("id")?,
        text: row.try_get("text")?,
        parent_id: row.try_get("parent_id")?,
        author: AuthorSummary {
            id: row.try_get("author_id")?,
            username: row.try_get("author_username")?,
            name: row.try_get("author_name")?,
            image: row.try_get("author_image")?,
        },
        community,
        created_at: row.try_get("created_at")?,
        children: Vec::new(),
    })
}

pub(crate) fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        name: row.try_get("name")?,
        image: row.try_get("image")?,
        bio: row.try_get("bio")?,
        onboarded: row.try_get("onboarded")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn community_from_row(row: &SqliteRow) -> Result<Community, sqlx::Error> {
    Ok(Community {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        name: row.try_get("name")?,
        image: row.try_get("image")?,
        bio: row.try_get("bio")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
    })
}
