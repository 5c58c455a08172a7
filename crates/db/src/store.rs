//! [`VideoCatalog`] and [`SequenceStore`] backed by PostgreSQL.

use async_trait::async_trait;
use seqcraft_core::error::CoreError;
use seqcraft_core::sequence::{
    CreateSequence, Sequence, SequenceItem, SequenceItemWithVideo, SequenceWithItems,
    UpdateSequence,
};
use seqcraft_core::store::{SequenceStore, VideoCatalog};
use seqcraft_core::types::DbId;
use seqcraft_core::video::{CreateVideo, Role, UpdateVideo, Video};
use sqlx::PgPool;
use validator::Validate;

use crate::error::{classify, foreign_key_violation};
use crate::repositories::{SequenceItemRepo, SequenceRepo, VideoRepo};

/// Record store over a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn video_not_found(id: DbId) -> CoreError {
    CoreError::NotFound { entity: "Video", id }
}

fn sequence_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Sequence",
        id,
    }
}

#[async_trait]
impl VideoCatalog for PgStore {
    async fn list_videos(&self, role: Option<Role>) -> Result<Vec<Video>, CoreError> {
        VideoRepo::list(&self.pool, role)
            .await
            .map_err(classify)?
            .into_iter()
            .map(Video::try_from)
            .collect()
    }

    async fn get_video(&self, id: DbId) -> Result<Video, CoreError> {
        let row = VideoRepo::find_by_id(&self.pool, id)
            .await
            .map_err(classify)?
            .ok_or_else(|| video_not_found(id))?;
        Video::try_from(row)
    }

    async fn create_video(&self, owner: DbId, input: &CreateVideo) -> Result<Video, CoreError> {
        input.validate()?;
        let row = VideoRepo::create(&self.pool, owner, input)
            .await
            .map_err(classify)?;
        tracing::debug!(video_id = row.id, role = %input.role, "Video created");
        Video::try_from(row)
    }

    async fn update_video(&self, id: DbId, input: &UpdateVideo) -> Result<Video, CoreError> {
        input.validate()?;
        let row = VideoRepo::update(&self.pool, id, input)
            .await
            .map_err(classify)?
            .ok_or_else(|| video_not_found(id))?;
        Video::try_from(row)
    }

    async fn delete_video(&self, id: DbId) -> Result<(), CoreError> {
        let deleted = VideoRepo::delete(&self.pool, id).await.map_err(classify)?;
        if !deleted {
            return Err(video_not_found(id));
        }
        tracing::debug!(video_id = id, "Video deleted");
        Ok(())
    }
}

#[async_trait]
impl SequenceStore for PgStore {
    async fn list_sequences(&self) -> Result<Vec<Sequence>, CoreError> {
        let rows = SequenceRepo::list(&self.pool).await.map_err(classify)?;
        Ok(rows.into_iter().map(Sequence::from).collect())
    }

    async fn get_sequence_with_items(&self, id: DbId) -> Result<SequenceWithItems, CoreError> {
        let sequence = SequenceRepo::find_by_id(&self.pool, id)
            .await
            .map_err(classify)?
            .ok_or_else(|| sequence_not_found(id))?;
        let items = SequenceItemRepo::list_entries(&self.pool, id)
            .await
            .map_err(classify)?
            .into_iter()
            .map(SequenceItemWithVideo::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        SequenceWithItems::new(sequence.into(), items)
    }

    async fn create_sequence(
        &self,
        owner: DbId,
        input: &CreateSequence,
    ) -> Result<Sequence, CoreError> {
        input.validate()?;
        let row = SequenceRepo::create(&self.pool, owner, input)
            .await
            .map_err(classify)?;
        Ok(row.into())
    }

    async fn update_sequence(
        &self,
        id: DbId,
        input: &UpdateSequence,
    ) -> Result<Sequence, CoreError> {
        input.validate()?;
        let row = SequenceRepo::update(&self.pool, id, input)
            .await
            .map_err(classify)?
            .ok_or_else(|| sequence_not_found(id))?;
        Ok(row.into())
    }

    async fn delete_sequence(&self, id: DbId) -> Result<(), CoreError> {
        let deleted = SequenceRepo::delete(&self.pool, id)
            .await
            .map_err(classify)?;
        if !deleted {
            return Err(sequence_not_found(id));
        }
        Ok(())
    }

    async fn add_item(
        &self,
        sequence_id: DbId,
        video_id: DbId,
        position: i32,
    ) -> Result<SequenceItem, CoreError> {
        if position < 0 {
            return Err(CoreError::Validation(format!(
                "position must be >= 0, got {position}"
            )));
        }
        match SequenceItemRepo::create(&self.pool, sequence_id, video_id, position).await {
            Ok(row) => Ok(row.into()),
            Err(err) => Err(match foreign_key_violation(&err).as_deref() {
                Some("fk_sequence_items_sequence") => sequence_not_found(sequence_id),
                Some("fk_sequence_items_video") => video_not_found(video_id),
                _ => classify(err),
            }),
        }
    }

    async fn remove_item(&self, item_id: DbId) -> Result<(), CoreError> {
        let deleted = SequenceItemRepo::delete(&self.pool, item_id)
            .await
            .map_err(classify)?;
        if !deleted {
            return Err(CoreError::NotFound {
                entity: "SequenceItem",
                id: item_id,
            });
        }
        Ok(())
    }

    async fn set_positions(
        &self,
        sequence_id: DbId,
        ordered_item_ids: &[DbId],
    ) -> Result<(), CoreError> {
        tracing::debug!(sequence_id, items = ordered_item_ids.len(), "Persisting item order");
        let unmatched = SequenceItemRepo::set_sort_orders(&self.pool, sequence_id, ordered_item_ids)
            .await
            .map_err(classify)?;
        match unmatched {
            Some(id) => Err(CoreError::NotFound {
                entity: "SequenceItem",
                id,
            }),
            None => Ok(()),
        }
    }
}
