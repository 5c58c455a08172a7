//! Sequence assembly controller.
//!
//! Owns the sequence list, the video list and the active [`SequenceEditor`],
//! and decides what happens after a failure: a missing sequence clears the
//! selection, every error is kept as a user-visible message, and reorder
//! rollbacks are surfaced as errors even though the view was reconciled.

use std::sync::Arc;

use validator::Validate;

use crate::editor::{DragState, ReorderOutcome, SequenceEditor};
use crate::error::CoreError;
use crate::playback::Playback;
use crate::reorder::Direction;
use crate::sequence::{CreateSequence, Sequence, SequenceItem, SequenceWithItems, UpdateSequence};
use crate::sequence_validation::SequenceValidation;
use crate::store::{require_user, IdentityProvider, SequenceStore, VideoCatalog};
use crate::types::DbId;
use crate::video::{Role, Video};

/// Session-scoped controller for building sequences.
pub struct SequenceAssembly<S> {
    store: Arc<S>,
    identity: Arc<dyn IdentityProvider>,
    sequences: Vec<Sequence>,
    videos: Vec<Video>,
    active: Option<SequenceEditor>,
    playback: Option<Playback>,
    last_error: Option<String>,
}

impl<S> SequenceAssembly<S>
where
    S: SequenceStore + VideoCatalog,
{
    pub fn new(store: Arc<S>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            store,
            identity,
            sequences: Vec::new(),
            videos: Vec::new(),
            active: None,
            playback: None,
            last_error: None,
        }
    }

    // -- Read side -----------------------------------------------------------

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    pub fn active(&self) -> Option<&SequenceWithItems> {
        self.active.as_ref().map(SequenceEditor::sequence)
    }

    pub fn drag_state(&self) -> Option<DragState> {
        self.active.as_ref().map(SequenceEditor::drag_state)
    }

    /// Structural check of the active sequence, derived from its items.
    pub fn validation(&self) -> Option<SequenceValidation> {
        self.active.as_ref().map(SequenceEditor::validation)
    }

    /// Videos that can still be added to the active sequence.
    pub fn candidates(&self, role: Option<Role>) -> Vec<&Video> {
        self.videos
            .iter()
            .filter(|v| role.map_or(true, |r| v.role == r))
            .filter(|v| {
                self.active
                    .as_ref()
                    .map_or(true, |a| !a.sequence().contains_video(v.id))
            })
            .collect()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    // -- Loading & selection ---------------------------------------------------

    /// Load every sequence and every video.
    pub async fn load(&mut self) -> Result<(), CoreError> {
        let result = tokio::try_join!(self.store.list_sequences(), self.store.list_videos(None));
        let (sequences, videos) = self.record(result)?;
        self.sequences = sequences;
        self.videos = videos;
        Ok(())
    }

    /// Make `id` the active sequence.
    pub async fn select(&mut self, id: DbId) -> Result<(), CoreError> {
        let result = SequenceEditor::open(self.store.as_ref(), id).await;
        let editor = self.record(result)?;
        self.active = Some(editor);
        self.playback = None;
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.active = None;
        self.playback = None;
    }

    // -- Sequence CRUD -------------------------------------------------------

    /// Create a sequence, reload the list and select the new sequence.
    pub async fn create_sequence(&mut self, input: CreateSequence) -> Result<Sequence, CoreError> {
        let result = self.try_create(&input).await;
        let created = self.record(result)?;
        tracing::info!(sequence_id = created.id, "Sequence created");
        self.load().await?;
        self.select(created.id).await?;
        Ok(created)
    }

    async fn try_create(&self, input: &CreateSequence) -> Result<Sequence, CoreError> {
        input.validate()?;
        let owner = require_user(self.identity.as_ref()).await?;
        self.store.create_sequence(owner, input).await
    }

    /// Update a sequence and refresh whatever showed it.
    pub async fn update_sequence(
        &mut self,
        id: DbId,
        input: UpdateSequence,
    ) -> Result<Sequence, CoreError> {
        let result = match input.validate() {
            Ok(()) => self.store.update_sequence(id, &input).await,
            Err(e) => Err(e.into()),
        };
        let updated = self.record(result)?;
        self.load().await?;
        if self.active_id() == Some(id) {
            self.reload_active().await?;
        }
        Ok(updated)
    }

    /// Delete a sequence, clearing the selection if it was active.
    pub async fn delete_sequence(&mut self, id: DbId) -> Result<(), CoreError> {
        let result = self.store.delete_sequence(id).await;
        self.record(result)?;
        tracing::info!(sequence_id = id, "Sequence deleted");
        if self.active_id() == Some(id) {
            self.deselect();
        }
        self.load().await
    }

    // -- Items ---------------------------------------------------------------

    /// Append a video to the active sequence.
    ///
    /// Only videos offered by [`candidates`](Self::candidates) are accepted;
    /// anything else is refused before the store is contacted.
    pub async fn add_video(&mut self, video_id: DbId) -> Result<SequenceItem, CoreError> {
        let result = self.try_add(video_id).await;
        self.record(result)
    }

    async fn try_add(&mut self, video_id: DbId) -> Result<SequenceItem, CoreError> {
        let video = self
            .candidates(None)
            .into_iter()
            .find(|v| v.id == video_id)
            .cloned();
        let editor = self.active.as_mut().ok_or_else(no_selection)?;
        let video = match video {
            Some(v) => v,
            None if editor.sequence().contains_video(video_id) => {
                return Err(CoreError::Conflict(format!(
                    "video {video_id} is already in sequence {}",
                    editor.id()
                )))
            }
            None => {
                return Err(CoreError::NotFound {
                    entity: "Video",
                    id: video_id,
                })
            }
        };
        editor.add_video(self.store.as_ref(), &video).await
    }

    pub async fn remove_item(&mut self, item_id: DbId) -> Result<(), CoreError> {
        let store = Arc::clone(&self.store);
        let result = match self.active.as_mut() {
            Some(editor) => editor.remove_item(store.as_ref(), item_id).await,
            None => Err(no_selection()),
        };
        self.record(result)
    }

    // -- Reordering ----------------------------------------------------------

    pub fn drag_start(&mut self, index: usize) {
        if let Some(editor) = self.active.as_mut() {
            editor.drag_start(index);
        }
    }

    pub fn drag_over(&mut self, index: usize) {
        if let Some(editor) = self.active.as_mut() {
            editor.drag_over(index);
        }
    }

    pub async fn drop_at(&mut self, target: usize) -> Result<ReorderOutcome, CoreError> {
        let store = Arc::clone(&self.store);
        let result = match self.active.as_mut() {
            Some(editor) => editor.drop_at(store.as_ref(), target).await,
            None => Ok(ReorderOutcome::Unchanged),
        };
        self.record_reorder(result)
    }

    pub async fn move_item(
        &mut self,
        index: usize,
        direction: Direction,
    ) -> Result<ReorderOutcome, CoreError> {
        let store = Arc::clone(&self.store);
        let result = match self.active.as_mut() {
            Some(editor) => editor.move_item(store.as_ref(), index, direction).await,
            None => Ok(ReorderOutcome::Unchanged),
        };
        self.record_reorder(result)
    }

    // -- Playback ------------------------------------------------------------

    /// Start playing the active sequence from its first clip.
    pub fn play_all(&mut self) -> bool {
        self.playback = self.active().and_then(Playback::start);
        self.playback.is_some()
    }

    /// Advance after a clip ended; stops after the last one.
    pub fn clip_ended(&mut self) {
        let Some(sequence) = self.active.as_ref().map(SequenceEditor::sequence) else {
            self.playback = None;
            return;
        };
        let finished = match self.playback.as_mut() {
            Some(p) => !p.advance(sequence),
            None => false,
        };
        if finished {
            self.playback = None;
        }
    }

    pub fn stop_playback(&mut self) {
        self.playback = None;
    }

    /// Clip currently playing, if any.
    pub fn now_playing(&self) -> Option<&Video> {
        let sequence = self.active()?;
        self.playback?.current(sequence).map(|i| &i.video)
    }

    // -- Internals -----------------------------------------------------------

    fn active_id(&self) -> Option<DbId> {
        self.active.as_ref().map(SequenceEditor::id)
    }

    async fn reload_active(&mut self) -> Result<(), CoreError> {
        let store = Arc::clone(&self.store);
        let result = match self.active.as_mut() {
            Some(editor) => editor.reload(store.as_ref()).await,
            None => Ok(()),
        };
        self.record(result)
    }

    /// Keep the error for display; a vanished active sequence is deselected.
    fn record<T>(&mut self, result: Result<T, CoreError>) -> Result<T, CoreError> {
        if let Err(e) = &result {
            if let CoreError::NotFound {
                entity: "Sequence",
                id,
            } = e
            {
                if self.active_id() == Some(*id) {
                    self.deselect();
                }
            }
            tracing::debug!(error = %e, "Assembly operation failed");
            self.last_error = Some(e.to_string());
        }
        result
    }

    fn record_reorder(
        &mut self,
        result: Result<ReorderOutcome, CoreError>,
    ) -> Result<ReorderOutcome, CoreError> {
        let result = self.record(result)?;
        if let Some(error) = result.error() {
            self.last_error = Some(error.to_string());
        }
        Ok(result)
    }
}

fn no_selection() -> CoreError {
    CoreError::Validation("no sequence is selected".to_string())
}
