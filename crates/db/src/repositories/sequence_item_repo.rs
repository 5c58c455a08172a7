//! Repository for the `sequence_items` table.

use sqlx::PgPool;
use seqcraft_core::types::DbId;

use crate::models::sequence_item::{SequenceEntryRow, SequenceItemRow};

/// Column list for the `sequence_items` table.
const COLUMNS: &str = "id, sequence_id, video_id, sort_order, created_at";

/// Item columns aliased for the video join, followed by the video columns.
const ENTRY_COLUMNS: &str = "si.id AS item_id, si.sequence_id, si.sort_order, \
    si.created_at AS item_created_at, \
    v.id, v.user_id, v.title, v.description, v.url, v.thumbnail_url, \
    v.segment_category, v.duration_seconds, v.tags, v.created_at, v.updated_at";

/// Provides item placement and bulk reordering for sequences.
pub struct SequenceItemRepo;

impl SequenceItemRepo {
    /// Insert an item. Fails on `uq_sequence_items_sequence_video` when the
    /// video is already in the sequence.
    pub async fn create(
        pool: &PgPool,
        sequence_id: DbId,
        video_id: DbId,
        sort_order: i32,
    ) -> Result<SequenceItemRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO sequence_items (sequence_id, video_id, sort_order) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SequenceItemRow>(&query)
            .bind(sequence_id)
            .bind(video_id)
            .bind(sort_order)
            .fetch_one(pool)
            .await
    }

    /// Items of a sequence joined with their videos, in playback order.
    pub async fn list_entries(
        pool: &PgPool,
        sequence_id: DbId,
    ) -> Result<Vec<SequenceEntryRow>, sqlx::Error> {
        let query = format!(
            "SELECT {ENTRY_COLUMNS} \
             FROM sequence_items si \
             JOIN videos v ON v.id = si.video_id \
             WHERE si.sequence_id = $1 \
             ORDER BY si.sort_order, si.id"
        );
        sqlx::query_as::<_, SequenceEntryRow>(&query)
            .bind(sequence_id)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sequence_items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set `sort_order = index` for every id, in one transaction.
    ///
    /// Returns the first id that does not belong to the sequence, in which
    /// case nothing is written.
    pub async fn set_sort_orders(
        pool: &PgPool,
        sequence_id: DbId,
        ordered_ids: &[DbId],
    ) -> Result<Option<DbId>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        for (index, id) in ordered_ids.iter().enumerate() {
            let result = sqlx::query(
                "UPDATE sequence_items SET sort_order = $1, updated_at = NOW() \
                 WHERE id = $2 AND sequence_id = $3",
            )
            .bind(index as i32)
            .bind(id)
            .bind(sequence_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                tx.rollback().await?;
                return Ok(Some(*id));
            }
        }

        tx.commit().await?;
        Ok(None)
    }
}
