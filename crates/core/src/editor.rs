//! Editing session for one sequence: drag-and-drop, single-step moves,
//! item insertion and removal.
//!
//! Reorders are two-phase. The new order is computed and applied to the
//! in-memory view first, then persisted with
//! [`SequenceStore::set_positions`]. When persisting fails the view is
//! replaced by a fresh fetch from the store; no inverse operation is
//! attempted. Until such a fetch succeeds the session is *stale* and every
//! further reorder first tries to reload.
//!
//! Insertions and removals are not optimistic: they are persisted and the
//! whole sequence is fetched again.
//!
//! All mutating operations take `&mut self`, so one session never has
//! two mutations in flight.

use serde::Serialize;

use crate::error::CoreError;
use crate::reorder::{self, Direction};
use crate::sequence::{SequenceItem, SequenceItemWithVideo, SequenceWithItems};
use crate::sequence_validation::{validate_sequence, SequenceValidation};
use crate::store::SequenceStore;
use crate::types::DbId;
use crate::video::Video;

/// Presentation-only drag bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DragState {
    /// Index the current drag started from.
    pub source: Option<usize>,
    /// Index the pointer is hovering over.
    pub hover: Option<usize>,
}

/// Result of a reorder request that did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderOutcome {
    /// Nothing to do; the store was not contacted.
    Unchanged,
    /// The new order was applied and persisted.
    Committed,
    /// Persisting failed and the view now mirrors a fresh fetch.
    RolledBack { error: CoreError },
}

impl ReorderOutcome {
    /// The store error behind a rollback, if any.
    pub fn error(&self) -> Option<&CoreError> {
        match self {
            ReorderOutcome::RolledBack { error } => Some(error),
            _ => None,
        }
    }
}

/// Session state for the sequence being edited.
#[derive(Debug, Clone)]
pub struct SequenceEditor {
    current: SequenceWithItems,
    drag: DragState,
    stale: bool,
}

impl SequenceEditor {
    pub fn new(current: SequenceWithItems) -> Self {
        Self {
            current,
            drag: DragState::default(),
            stale: false,
        }
    }

    /// Fetch a sequence and start editing it.
    pub async fn open<S: SequenceStore + ?Sized>(store: &S, id: DbId) -> Result<Self, CoreError> {
        let current = store.get_sequence_with_items(id).await?;
        Ok(Self::new(current))
    }

    pub fn sequence(&self) -> &SequenceWithItems {
        &self.current
    }

    pub fn id(&self) -> DbId {
        self.current.id()
    }

    pub fn items(&self) -> &[SequenceItemWithVideo] {
        &self.current.items
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// `true` after a failed reorder whose reconciling fetch also failed.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Structural check of the current order. Recomputed on every call.
    pub fn validation(&self) -> SequenceValidation {
        validate_sequence(&self.current.items)
    }

    // -- Drag gestures -------------------------------------------------------

    pub fn drag_start(&mut self, index: usize) {
        self.drag.source = Some(index);
    }

    pub fn drag_over(&mut self, index: usize) {
        self.drag.hover = Some(index);
    }

    pub fn cancel_drag(&mut self) {
        self.drag = DragState::default();
    }

    /// Finish a drag by dropping onto `target`.
    ///
    /// Without a recorded drag source this does nothing. Dropping onto the
    /// source clears the drag and does nothing else.
    pub async fn drop_at<S: SequenceStore + ?Sized>(
        &mut self,
        store: &S,
        target: usize,
    ) -> Result<ReorderOutcome, CoreError> {
        let Some(source) = self.drag.source else {
            return Ok(ReorderOutcome::Unchanged);
        };
        self.cancel_drag();
        if source == target {
            return Ok(ReorderOutcome::Unchanged);
        }
        self.ensure_fresh(store).await?;
        let reordered = reorder::moved(&self.current.items, source, target)?;
        self.commit(store, reordered).await
    }

    /// Swap the item at `index` with its neighbour in `direction`.
    ///
    /// Moving the first item up or the last item down does nothing.
    pub async fn move_item<S: SequenceStore + ?Sized>(
        &mut self,
        store: &S,
        index: usize,
        direction: Direction,
    ) -> Result<ReorderOutcome, CoreError> {
        let Some(target) = reorder::step_target(index, direction, self.current.len()) else {
            return Ok(ReorderOutcome::Unchanged);
        };
        self.ensure_fresh(store).await?;
        let reordered = reorder::swapped(&self.current.items, index, target)?;
        self.commit(store, reordered).await
    }

    // -- Membership ----------------------------------------------------------

    /// Append `video` to the sequence, then reload.
    ///
    /// A video already in the sequence is refused before the store is
    /// contacted.
    pub async fn add_video<S: SequenceStore + ?Sized>(
        &mut self,
        store: &S,
        video: &Video,
    ) -> Result<SequenceItem, CoreError> {
        if self.current.contains_video(video.id) {
            return Err(CoreError::Conflict(format!(
                "video {} is already in sequence {}",
                video.id,
                self.id()
            )));
        }
        let position = self.current.next_position()?;
        let item = store.add_item(self.id(), video.id, position).await?;
        tracing::debug!(
            sequence_id = self.id(),
            video_id = video.id,
            position,
            "Item added"
        );
        self.reload(store).await?;
        Ok(item)
    }

    /// Remove an item, then reload. Positions are not compacted.
    pub async fn remove_item<S: SequenceStore + ?Sized>(
        &mut self,
        store: &S,
        item_id: DbId,
    ) -> Result<(), CoreError> {
        if !self.current.items.iter().any(|i| i.id() == item_id) {
            return Err(CoreError::NotFound {
                entity: "SequenceItem",
                id: item_id,
            });
        }
        store.remove_item(item_id).await?;
        tracing::debug!(sequence_id = self.id(), item_id, "Item removed");
        self.reload(store).await
    }

    /// Replace the view with the store's authoritative state.
    pub async fn reload<S: SequenceStore + ?Sized>(&mut self, store: &S) -> Result<(), CoreError> {
        match store.get_sequence_with_items(self.id()).await {
            Ok(fresh) => {
                self.current = fresh;
                self.stale = false;
                Ok(())
            }
            Err(e) => {
                self.stale = true;
                Err(e)
            }
        }
    }

    // -- Internals -----------------------------------------------------------

    async fn ensure_fresh<S: SequenceStore + ?Sized>(&mut self, store: &S) -> Result<(), CoreError> {
        if self.stale {
            tracing::info!(sequence_id = self.id(), "Reloading stale sequence before reorder");
            self.reload(store).await?;
        }
        Ok(())
    }

    async fn commit<S: SequenceStore + ?Sized>(
        &mut self,
        store: &S,
        reordered: Vec<SequenceItemWithVideo>,
    ) -> Result<ReorderOutcome, CoreError> {
        let sequence_id = self.id();
        let ids: Vec<DbId> = reordered.iter().map(SequenceItemWithVideo::id).collect();

        self.current.items = reordered;
        tracing::debug!(sequence_id, order = ?ids, "Applied reorder optimistically");

        match store.set_positions(sequence_id, &ids).await {
            Ok(()) => {
                for (index, entry) in self.current.items.iter_mut().enumerate() {
                    entry.item.position = index as i32;
                }
                tracing::info!(sequence_id, items = ids.len(), "Reorder committed");
                Ok(ReorderOutcome::Committed)
            }
            Err(error) => {
                tracing::warn!(sequence_id, error = %error, "Reorder failed, reconciling from store");
                self.stale = true;
                match self.reload(store).await {
                    Ok(()) => Ok(ReorderOutcome::RolledBack { error }),
                    Err(refetch) => {
                        tracing::error!(
                            sequence_id,
                            error = %error,
                            refetch_error = %refetch,
                            "Reconciliation fetch failed; sequence is stale"
                        );
                        Err(refetch)
                    }
                }
            }
        }
    }
}
