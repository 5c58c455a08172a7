//! Shared fixtures for editor and controller tests.
//!
//! [`FlakyStore`] wraps [`MemoryStore`], records every call and can be told
//! to fail specific operations, including a reorder that is only partially
//! applied before it fails.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use seqcraft_core::error::CoreError;
use seqcraft_core::memory_store::MemoryStore;
use seqcraft_core::sequence::{
    CreateSequence, Sequence, SequenceItem, SequenceWithItems, UpdateSequence,
};
use seqcraft_core::store::{SequenceStore, VideoCatalog};
use seqcraft_core::types::DbId;
use seqcraft_core::video::{CreateVideo, Role, UpdateVideo, Video};

/// Sentinel meaning "no failure armed".
const DISARMED: usize = usize::MAX;

#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    calls: Mutex<Vec<&'static str>>,
    /// When armed, the next `set_positions` applies this many ids, then fails.
    set_positions_failure: AtomicUsize,
    fail_fetch: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            set_positions_failure: AtomicUsize::new(DISARMED),
            ..Default::default()
        }
    }

    /// Make the next `set_positions` fail after persisting `applied` ids.
    pub fn fail_next_set_positions(&self, applied: usize) {
        self.set_positions_failure.store(applied, Ordering::SeqCst);
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn log(&self, op: &'static str) {
        self.calls.lock().unwrap().push(op);
    }
}

#[async_trait]
impl VideoCatalog for FlakyStore {
    async fn list_videos(&self, role: Option<Role>) -> Result<Vec<Video>, CoreError> {
        self.log("list_videos");
        self.inner.list_videos(role).await
    }

    async fn get_video(&self, id: DbId) -> Result<Video, CoreError> {
        self.log("get_video");
        self.inner.get_video(id).await
    }

    async fn create_video(&self, owner: DbId, input: &CreateVideo) -> Result<Video, CoreError> {
        self.log("create_video");
        self.inner.create_video(owner, input).await
    }

    async fn update_video(&self, id: DbId, input: &UpdateVideo) -> Result<Video, CoreError> {
        self.log("update_video");
        self.inner.update_video(id, input).await
    }

    async fn delete_video(&self, id: DbId) -> Result<(), CoreError> {
        self.log("delete_video");
        self.inner.delete_video(id).await
    }
}

#[async_trait]
impl SequenceStore for FlakyStore {
    async fn list_sequences(&self) -> Result<Vec<Sequence>, CoreError> {
        self.log("list_sequences");
        self.inner.list_sequences().await
    }

    async fn get_sequence_with_items(&self, id: DbId) -> Result<SequenceWithItems, CoreError> {
        self.log("get_sequence_with_items");
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(CoreError::Store("connection reset".into()));
        }
        self.inner.get_sequence_with_items(id).await
    }

    async fn create_sequence(
        &self,
        owner: DbId,
        input: &CreateSequence,
    ) -> Result<Sequence, CoreError> {
        self.log("create_sequence");
        self.inner.create_sequence(owner, input).await
    }

    async fn update_sequence(
        &self,
        id: DbId,
        input: &UpdateSequence,
    ) -> Result<Sequence, CoreError> {
        self.log("update_sequence");
        self.inner.update_sequence(id, input).await
    }

    async fn delete_sequence(&self, id: DbId) -> Result<(), CoreError> {
        self.log("delete_sequence");
        self.inner.delete_sequence(id).await
    }

    async fn add_item(
        &self,
        sequence_id: DbId,
        video_id: DbId,
        position: i32,
    ) -> Result<SequenceItem, CoreError> {
        self.log("add_item");
        self.inner.add_item(sequence_id, video_id, position).await
    }

    async fn remove_item(&self, item_id: DbId) -> Result<(), CoreError> {
        self.log("remove_item");
        self.inner.remove_item(item_id).await
    }

    async fn set_positions(
        &self,
        sequence_id: DbId,
        ordered_item_ids: &[DbId],
    ) -> Result<(), CoreError> {
        self.log("set_positions");
        let applied = self.set_positions_failure.swap(DISARMED, Ordering::SeqCst);
        if applied != DISARMED {
            let prefix = &ordered_item_ids[..applied.min(ordered_item_ids.len())];
            self.inner.set_positions(sequence_id, prefix).await?;
            return Err(CoreError::Store("update timed out".into()));
        }
        self.inner.set_positions(sequence_id, ordered_item_ids).await
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub const OWNER: DbId = 7;

pub fn clip(title: &str, role: Role) -> CreateVideo {
    CreateVideo {
        title: title.to_string(),
        description: None,
        url: format!("https://cdn.example.com/{title}.mp4"),
        thumbnail_url: None,
        role,
        duration_seconds: Some(30),
        tags: vec![],
    }
}

/// Create a sequence holding one new video per `(title, role)`, in order.
pub async fn seed(store: &FlakyStore, clips: &[(&str, Role)]) -> (Sequence, Vec<Video>) {
    let sequence = store
        .inner
        .create_sequence(OWNER, &CreateSequence::from_form("Morning routine", ""))
        .await
        .unwrap();
    let mut videos = Vec::new();
    for (position, (title, role)) in clips.iter().enumerate() {
        let video = store.inner.create_video(OWNER, &clip(title, *role)).await.unwrap();
        store
            .inner
            .add_item(sequence.id, video.id, position as i32)
            .await
            .unwrap();
        videos.push(video);
    }
    (sequence, videos)
}

/// Titles of the items in display order.
pub fn titles(view: &SequenceWithItems) -> Vec<String> {
    view.items.iter().map(|i| i.video.title.clone()).collect()
}
