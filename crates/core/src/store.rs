//! Ports to the external record store and identity provider.
//!
//! The editor and controllers only talk to these traits. `seqcraft-db`
//! provides the PostgreSQL implementation; [`crate::memory_store`] keeps
//! everything in process.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::sequence::{CreateSequence, Sequence, SequenceItem, SequenceWithItems, UpdateSequence};
use crate::types::DbId;
use crate::video::{CreateVideo, Role, UpdateVideo, Video};

/// Resolves the user on whose behalf records are created.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `None` when nobody is signed in.
    async fn current_user(&self) -> Result<Option<DbId>, CoreError>;
}

/// Identity fixed at construction time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedIdentity(pub Option<DbId>);

#[async_trait]
impl IdentityProvider for FixedIdentity {
    async fn current_user(&self) -> Result<Option<DbId>, CoreError> {
        Ok(self.0)
    }
}

/// Resolve the current user or fail with [`CoreError::NotAuthenticated`].
pub async fn require_user<I: IdentityProvider + ?Sized>(identity: &I) -> Result<DbId, CoreError> {
    identity
        .current_user()
        .await?
        .ok_or(CoreError::NotAuthenticated)
}

/// Clip metadata CRUD.
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    /// Newest first, optionally restricted to one role.
    async fn list_videos(&self, role: Option<Role>) -> Result<Vec<Video>, CoreError>;

    /// Fails with [`CoreError::NotFound`] when the video does not exist.
    async fn get_video(&self, id: DbId) -> Result<Video, CoreError>;

    async fn create_video(&self, owner: DbId, input: &CreateVideo) -> Result<Video, CoreError>;

    async fn update_video(&self, id: DbId, input: &UpdateVideo) -> Result<Video, CoreError>;

    /// Removes every sequence item referencing the video as well.
    async fn delete_video(&self, id: DbId) -> Result<(), CoreError>;
}

/// Sequence and sequence-item CRUD.
#[async_trait]
pub trait SequenceStore: Send + Sync {
    /// Newest first.
    async fn list_sequences(&self) -> Result<Vec<Sequence>, CoreError>;

    /// Fails with [`CoreError::NotFound`] when the sequence does not exist.
    async fn get_sequence_with_items(&self, id: DbId) -> Result<SequenceWithItems, CoreError>;

    /// Fails with [`CoreError::Validation`] when the title is blank.
    async fn create_sequence(
        &self,
        owner: DbId,
        input: &CreateSequence,
    ) -> Result<Sequence, CoreError>;

    async fn update_sequence(
        &self,
        id: DbId,
        input: &UpdateSequence,
    ) -> Result<Sequence, CoreError>;

    /// Removes the sequence's items as well.
    async fn delete_sequence(&self, id: DbId) -> Result<(), CoreError>;

    /// Fails with [`CoreError::Conflict`] when the video is already in the sequence.
    async fn add_item(
        &self,
        sequence_id: DbId,
        video_id: DbId,
        position: i32,
    ) -> Result<SequenceItem, CoreError>;

    async fn remove_item(&self, item_id: DbId) -> Result<(), CoreError>;

    /// Assign `position = index` to every id, all or nothing.
    ///
    /// On failure the remote order is unknown and must be re-fetched.
    async fn set_positions(
        &self,
        sequence_id: DbId,
        ordered_item_ids: &[DbId],
    ) -> Result<(), CoreError>;
}
