//! Row model for the `video_sequences` table.

use serde::Serialize;
use sqlx::FromRow;
use seqcraft_core::sequence::Sequence;
use seqcraft_core::types::{DbId, Timestamp};

/// A row from the `video_sequences` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SequenceRow {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<SequenceRow> for Sequence {
    fn from(row: SequenceRow) -> Self {
        Sequence {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
