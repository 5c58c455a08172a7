//! Repository for the `videos` table.

use sqlx::PgPool;
use seqcraft_core::types::DbId;
use seqcraft_core::video::{CreateVideo, Role, UpdateVideo};

use crate::models::video::VideoRow;

/// Column list for the `videos` table.
pub(crate) const COLUMNS: &str = "id, user_id, title, description, url, thumbnail_url, \
    segment_category, duration_seconds, tags, created_at, updated_at";

/// Provides CRUD operations for videos.
pub struct VideoRepo;

impl VideoRepo {
    /// Insert a new video owned by `owner`.
    pub async fn create(
        pool: &PgPool,
        owner: DbId,
        input: &CreateVideo,
    ) -> Result<VideoRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO videos \
                (user_id, title, description, url, thumbnail_url, segment_category, \
                 duration_seconds, tags) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VideoRow>(&query)
            .bind(owner)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.url)
            .bind(&input.thumbnail_url)
            .bind(input.role.as_str())
            .bind(input.duration_seconds)
            .bind(&input.tags)
            .fetch_one(pool)
            .await
    }

    /// Find a video by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<VideoRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE id = $1");
        sqlx::query_as::<_, VideoRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List videos newest first, optionally restricted to one role.
    pub async fn list(pool: &PgPool, role: Option<Role>) -> Result<Vec<VideoRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM videos \
             WHERE ($1::TEXT IS NULL OR segment_category = $1) \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, VideoRow>(&query)
            .bind(role.map(Role::as_str))
            .fetch_all(pool)
            .await
    }

    /// Update a video. Only non-`None` fields are applied.
    ///
    /// `description`, `thumbnail_url` and `duration_seconds` are
    /// `Option<Option<_>>`: an outer `Some` writes the inner value, which
    /// may be `NULL`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateVideo,
    ) -> Result<Option<VideoRow>, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET \
                title = COALESCE($2, title), \
                description = CASE WHEN $3 THEN $4 ELSE description END, \
                url = COALESCE($5, url), \
                thumbnail_url = CASE WHEN $6 THEN $7 ELSE thumbnail_url END, \
                segment_category = COALESCE($8, segment_category), \
                duration_seconds = CASE WHEN $9 THEN $10 ELSE duration_seconds END, \
                tags = COALESCE($11, tags), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VideoRow>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.description.is_some())
            .bind(input.description.as_ref().and_then(|v| v.as_deref()))
            .bind(&input.url)
            .bind(input.thumbnail_url.is_some())
            .bind(input.thumbnail_url.as_ref().and_then(|v| v.as_deref()))
            .bind(input.role.map(Role::as_str))
            .bind(input.duration_seconds.is_some())
            .bind(input.duration_seconds.flatten())
            .bind(&input.tags)
            .fetch_optional(pool)
            .await
    }

    /// Delete a video. Its sequence items go with it (`ON DELETE CASCADE`).
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
