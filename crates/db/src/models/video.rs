//! Row model for the `videos` table.

use serde::Serialize;
use sqlx::FromRow;
use seqcraft_core::error::CoreError;
use seqcraft_core::types::{DbId, Timestamp};
use seqcraft_core::video::Video;

/// A row from the `videos` table.
///
/// The role is stored as text in `segment_category` and only parsed when
/// the row is converted into a [`Video`].
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VideoRow {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub segment_category: String,
    pub duration_seconds: Option<i32>,
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<VideoRow> for Video {
    type Error = CoreError;

    fn try_from(row: VideoRow) -> Result<Self, Self::Error> {
        let video = Video {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            url: row.url,
            thumbnail_url: row.thumbnail_url,
            role: row.segment_category.parse()?,
            duration_seconds: row.duration_seconds,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };
        video.ensure_well_formed()?;
        Ok(video)
    }
}
