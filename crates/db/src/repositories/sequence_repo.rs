//! Repository for the `video_sequences` table.

use sqlx::PgPool;
use seqcraft_core::sequence::{CreateSequence, UpdateSequence};
use seqcraft_core::types::DbId;

use crate::models::sequence::SequenceRow;

/// Column list for the `video_sequences` table.
const COLUMNS: &str = "id, user_id, title, description, created_at, updated_at";

/// Provides CRUD operations for sequences.
pub struct SequenceRepo;

impl SequenceRepo {
    pub async fn create(
        pool: &PgPool,
        owner: DbId,
        input: &CreateSequence,
    ) -> Result<SequenceRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO video_sequences (user_id, title, description) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SequenceRow>(&query)
            .bind(owner)
            .bind(input.title.trim())
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SequenceRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM video_sequences WHERE id = $1");
        sqlx::query_as::<_, SequenceRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List sequences newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<SequenceRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM video_sequences ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, SequenceRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update a sequence. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSequence,
    ) -> Result<Option<SequenceRow>, sqlx::Error> {
        let query = format!(
            "UPDATE video_sequences SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SequenceRow>(&query)
            .bind(id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a sequence together with its items (`ON DELETE CASCADE`).
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM video_sequences WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
