//! Sequence records and the materialised `SequenceWithItems` view.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};
use crate::video::{not_blank, Role, Video};

/// An ordered collection of clips owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Placement of a video inside a sequence.
///
/// `position` ranks items for playback; only its relative order matters,
/// so gaps left by removals are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceItem {
    pub id: DbId,
    pub sequence_id: DbId,
    pub video_id: DbId,
    pub position: i32,
    pub created_at: Timestamp,
}

/// A [`SequenceItem`] joined with the video it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceItemWithVideo {
    #[serde(flatten)]
    pub item: SequenceItem,
    pub video: Video,
}

impl SequenceItemWithVideo {
    pub fn id(&self) -> DbId {
        self.item.id
    }

    pub fn role(&self) -> Role {
        self.video.role
    }
}

/// A sequence plus its items, ordered by `position` ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceWithItems {
    #[serde(flatten)]
    pub sequence: Sequence,
    pub items: Vec<SequenceItemWithVideo>,
}

impl SequenceWithItems {
    /// Build the view from store records, sorting items by position.
    ///
    /// Rejects items that belong to another sequence, whose joined video
    /// does not match `video_id`, with a negative position, or that repeat
    /// a video. Tied positions (possible after cross-session edits) are
    /// ordered by item id.
    pub fn new(
        sequence: Sequence,
        mut items: Vec<SequenceItemWithVideo>,
    ) -> Result<Self, CoreError> {
        let mut videos = HashSet::with_capacity(items.len());
        for entry in &items {
            let item = &entry.item;
            if item.sequence_id != sequence.id {
                return Err(CoreError::Validation(format!(
                    "item {} belongs to sequence {}, not {}",
                    item.id, item.sequence_id, sequence.id
                )));
            }
            if item.video_id != entry.video.id {
                return Err(CoreError::Validation(format!(
                    "item {} references video {} but was joined with video {}",
                    item.id, item.video_id, entry.video.id
                )));
            }
            if item.position < 0 {
                return Err(CoreError::Validation(format!(
                    "item {} has negative position {}",
                    item.id, item.position
                )));
            }
            if !videos.insert(item.video_id) {
                return Err(CoreError::Validation(format!(
                    "video {} appears twice in sequence {}",
                    item.video_id, sequence.id
                )));
            }
        }
        items.sort_by_key(|i| (i.item.position, i.item.id));
        Ok(Self { sequence, items })
    }

    pub fn id(&self) -> DbId {
        self.sequence.id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item ids in display order.
    pub fn item_ids(&self) -> Vec<DbId> {
        self.items.iter().map(SequenceItemWithVideo::id).collect()
    }

    pub fn contains_video(&self, video_id: DbId) -> bool {
        self.items.iter().any(|i| i.item.video_id == video_id)
    }

    /// Position assigned to a newly appended item.
    ///
    /// This is the item count, unless a removal left a gap that would make
    /// the count collide with the last item; then it is one past the last.
    ///
    /// Fails with [`CoreError::Internal`] when positions are exhausted.
    pub fn next_position(&self) -> Result<i32, CoreError> {
        let exhausted = || {
            CoreError::Internal(format!("sequence {} has no free position left", self.id()))
        };
        let count = i32::try_from(self.items.len()).map_err(|_| exhausted())?;
        match self.items.last() {
            Some(last) if last.item.position >= count => {
                last.item.position.checked_add(1).ok_or_else(exhausted)
            }
            _ => Ok(count),
        }
    }
}

/// DTO for creating a sequence.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateSequence {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    pub description: Option<String>,
}

impl CreateSequence {
    /// Trim form input; a blank description becomes `None`.
    pub fn from_form(title: &str, description: &str) -> Self {
        Self {
            title: title.trim().to_string(),
            description: trimmed(description),
        }
    }
}

/// DTO for updating a sequence. Only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateSequence {
    #[validate(custom(function = "not_blank"))]
    pub title: Option<String>,
    pub description: Option<String>,
}

impl UpdateSequence {
    pub fn from_form(title: &str, description: &str) -> Self {
        Self {
            title: Some(title.trim().to_string()),
            description: trimmed(description),
        }
    }
}

fn trimmed(value: &str) -> Option<String> {
    let t = value.trim();
    (!t.is_empty()).then(|| t.to_string())
}
