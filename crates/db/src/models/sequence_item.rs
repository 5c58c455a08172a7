//! Row models for the `sequence_items` table.

use serde::Serialize;
use sqlx::FromRow;
use seqcraft_core::error::CoreError;
use seqcraft_core::sequence::{SequenceItem, SequenceItemWithVideo};
use seqcraft_core::types::{DbId, Timestamp};
use seqcraft_core::video::Video;

use super::video::VideoRow;

/// A row from the `sequence_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SequenceItemRow {
    pub id: DbId,
    pub sequence_id: DbId,
    pub video_id: DbId,
    pub sort_order: i32,
    pub created_at: Timestamp,
}

impl From<SequenceItemRow> for SequenceItem {
    fn from(row: SequenceItemRow) -> Self {
        SequenceItem {
            id: row.id,
            sequence_id: row.sequence_id,
            video_id: row.video_id,
            position: row.sort_order,
            created_at: row.created_at,
        }
    }
}

/// A sequence item joined with its video.
///
/// Item columns are aliased (`item_id`, `item_created_at`) so they do not
/// collide with the flattened video columns.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SequenceEntryRow {
    pub item_id: DbId,
    pub sequence_id: DbId,
    pub sort_order: i32,
    pub item_created_at: Timestamp,
    #[sqlx(flatten)]
    pub video: VideoRow,
}

impl TryFrom<SequenceEntryRow> for SequenceItemWithVideo {
    type Error = CoreError;

    fn try_from(row: SequenceEntryRow) -> Result<Self, Self::Error> {
        let video = Video::try_from(row.video)?;
        Ok(SequenceItemWithVideo {
            item: SequenceItem {
                id: row.item_id,
                sequence_id: row.sequence_id,
                video_id: video.id,
                position: row.sort_order,
                created_at: row.item_created_at,
            },
            video,
        })
    }
}
