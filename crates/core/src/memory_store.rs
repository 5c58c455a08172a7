//! In-process record store.
//!
//! Implements [`VideoCatalog`] and [`SequenceStore`] with the same
//! cascade and uniqueness rules as the PostgreSQL schema. Useful for
//! embedding the editor without a database and as the backing store in
//! tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use validator::Validate;

use crate::error::CoreError;
use crate::sequence::{
    CreateSequence, Sequence, SequenceItem, SequenceItemWithVideo, SequenceWithItems,
    UpdateSequence,
};
use crate::store::{SequenceStore, VideoCatalog};
use crate::types::DbId;
use crate::video::{CreateVideo, Role, UpdateVideo, Video};

#[derive(Debug, Default)]
struct Tables {
    next_id: DbId,
    videos: BTreeMap<DbId, Video>,
    sequences: BTreeMap<DbId, Sequence>,
    items: BTreeMap<DbId, SequenceItem>,
}

impl Tables {
    fn allocate_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

/// Thread-safe in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw item rows for a sequence in position order, for inspection.
    pub async fn items_of(&self, sequence_id: DbId) -> Vec<SequenceItem> {
        let tables = self.tables.lock().await;
        let mut items: Vec<SequenceItem> = tables
            .items
            .values()
            .filter(|i| i.sequence_id == sequence_id)
            .cloned()
            .collect();
        items.sort_by_key(|i| (i.position, i.id));
        items
    }
}

fn newest_first<T>(records: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<Utc>, DbId)) {
    records.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl VideoCatalog for MemoryStore {
    async fn list_videos(&self, role: Option<Role>) -> Result<Vec<Video>, CoreError> {
        let tables = self.tables.lock().await;
        let mut videos: Vec<Video> = tables
            .videos
            .values()
            .filter(|v| role.map_or(true, |r| v.role == r))
            .cloned()
            .collect();
        newest_first(&mut videos, |v| (v.created_at, v.id));
        Ok(videos)
    }

    async fn get_video(&self, id: DbId) -> Result<Video, CoreError> {
        let tables = self.tables.lock().await;
        tables
            .videos
            .get(&id)
            .cloned()
            .ok_or(CoreError::NotFound { entity: "Video", id })
    }

    async fn create_video(&self, owner: DbId, input: &CreateVideo) -> Result<Video, CoreError> {
        input.validate()?;
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let video = Video {
            id: tables.allocate_id(),
            user_id: owner,
            title: input.title.clone(),
            description: input.description.clone(),
            url: input.url.clone(),
            thumbnail_url: input.thumbnail_url.clone(),
            role: input.role,
            duration_seconds: input.duration_seconds,
            tags: input.tags.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.videos.insert(video.id, video.clone());
        Ok(video)
    }

    async fn update_video(&self, id: DbId, input: &UpdateVideo) -> Result<Video, CoreError> {
        input.validate()?;
        let mut tables = self.tables.lock().await;
        let video = tables
            .videos
            .get_mut(&id)
            .ok_or(CoreError::NotFound { entity: "Video", id })?;
        if let Some(title) = &input.title {
            video.title = title.clone();
        }
        if let Some(description) = &input.description {
            video.description = description.clone();
        }
        if let Some(url) = &input.url {
            video.url = url.clone();
        }
        if let Some(thumbnail_url) = &input.thumbnail_url {
            video.thumbnail_url = thumbnail_url.clone();
        }
        if let Some(role) = input.role {
            video.role = role;
        }
        if let Some(duration) = input.duration_seconds {
            video.duration_seconds = duration;
        }
        if let Some(tags) = &input.tags {
            video.tags = tags.clone();
        }
        video.updated_at = Utc::now();
        Ok(video.clone())
    }

    async fn delete_video(&self, id: DbId) -> Result<(), CoreError> {
        let mut tables = self.tables.lock().await;
        if tables.videos.remove(&id).is_none() {
            return Err(CoreError::NotFound { entity: "Video", id });
        }
        tables.items.retain(|_, item| item.video_id != id);
        Ok(())
    }
}

#[async_trait]
impl SequenceStore for MemoryStore {
    async fn list_sequences(&self) -> Result<Vec<Sequence>, CoreError> {
        let tables = self.tables.lock().await;
        let mut sequences: Vec<Sequence> = tables.sequences.values().cloned().collect();
        newest_first(&mut sequences, |s| (s.created_at, s.id));
        Ok(sequences)
    }

    async fn get_sequence_with_items(&self, id: DbId) -> Result<SequenceWithItems, CoreError> {
        let tables = self.tables.lock().await;
        let sequence = tables
            .sequences
            .get(&id)
            .cloned()
            .ok_or(CoreError::NotFound {
                entity: "Sequence",
                id,
            })?;
        let items = tables
            .items
            .values()
            .filter(|i| i.sequence_id == id)
            .map(|item| {
                let video = tables.videos.get(&item.video_id).cloned().ok_or_else(|| {
                    CoreError::Internal(format!(
                        "item {} references missing video {}",
                        item.id, item.video_id
                    ))
                })?;
                Ok(SequenceItemWithVideo {
                    item: item.clone(),
                    video,
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;
        SequenceWithItems::new(sequence, items)
    }

    async fn create_sequence(
        &self,
        owner: DbId,
        input: &CreateSequence,
    ) -> Result<Sequence, CoreError> {
        input.validate()?;
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let sequence = Sequence {
            id: tables.allocate_id(),
            user_id: owner,
            title: input.title.trim().to_string(),
            description: input.description.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.sequences.insert(sequence.id, sequence.clone());
        Ok(sequence)
    }

    async fn update_sequence(
        &self,
        id: DbId,
        input: &UpdateSequence,
    ) -> Result<Sequence, CoreError> {
        input.validate()?;
        let mut tables = self.tables.lock().await;
        let sequence = tables.sequences.get_mut(&id).ok_or(CoreError::NotFound {
            entity: "Sequence",
            id,
        })?;
        if let Some(title) = &input.title {
            sequence.title = title.trim().to_string();
        }
        if let Some(description) = &input.description {
            sequence.description = Some(description.clone());
        }
        sequence.updated_at = Utc::now();
        Ok(sequence.clone())
    }

    async fn delete_sequence(&self, id: DbId) -> Result<(), CoreError> {
        let mut tables = self.tables.lock().await;
        if tables.sequences.remove(&id).is_none() {
            return Err(CoreError::NotFound {
                entity: "Sequence",
                id,
            });
        }
        tables.items.retain(|_, item| item.sequence_id != id);
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
        let mut tables = self.tables.lock().await;
        if !tables.sequences.contains_key(&sequence_id) {
            return Err(CoreError::NotFound {
                entity: "Sequence",
                id: sequence_id,
            });
        }
        if !tables.videos.contains_key(&video_id) {
            return Err(CoreError::NotFound {
                entity: "Video",
                id: video_id,
            });
        }
        if tables
            .items
            .values()
            .any(|i| i.sequence_id == sequence_id && i.video_id == video_id)
        {
            return Err(CoreError::Conflict(format!(
                "video {video_id} is already in sequence {sequence_id}"
            )));
        }
        let item = SequenceItem {
            id: tables.allocate_id(),
            sequence_id,
            video_id,
            position,
            created_at: Utc::now(),
        };
        tables.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn remove_item(&self, item_id: DbId) -> Result<(), CoreError> {
        let mut tables = self.tables.lock().await;
        tables
            .items
            .remove(&item_id)
            .map(|_| ())
            .ok_or(CoreError::NotFound {
                entity: "SequenceItem",
                id: item_id,
            })
    }

    async fn set_positions(
        &self,
        sequence_id: DbId,
        ordered_item_ids: &[DbId],
    ) -> Result<(), CoreError> {
        let mut tables = self.tables.lock().await;
        // Check every id first so a bad id leaves nothing half-applied.
        for id in ordered_item_ids {
            match tables.items.get(id) {
                Some(item) if item.sequence_id == sequence_id => {}
                _ => {
                    return Err(CoreError::NotFound {
                        entity: "SequenceItem",
                        id: *id,
                    })
                }
            }
        }
        for (index, id) in ordered_item_ids.iter().enumerate() {
            if let Some(item) = tables.items.get_mut(id) {
                item.position = index as i32;
            }
        }
        Ok(())
    }
}
