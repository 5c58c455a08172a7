//! "Play all" cursor over a sequence.

use crate::sequence::{SequenceItemWithVideo, SequenceWithItems};

/// Index of the clip currently playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playback {
    index: usize,
}

impl Playback {
    /// Start at the first clip. `None` for an empty sequence.
    pub fn start(sequence: &SequenceWithItems) -> Option<Self> {
        (!sequence.is_empty()).then_some(Self { index: 0 })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Move on after the current clip ended.
    ///
    /// Returns `false` once the last clip has finished; the caller should
    /// then drop the cursor.
    pub fn advance(&mut self, sequence: &SequenceWithItems) -> bool {
        if self.index + 1 < sequence.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn current<'a>(&self, sequence: &'a SequenceWithItems) -> Option<&'a SequenceItemWithVideo> {
        sequence.items.get(self.index)
    }
}
