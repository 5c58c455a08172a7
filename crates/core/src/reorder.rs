//! Order arithmetic for drag-and-drop and single-step moves.
//!
//! These helpers never touch the store; [`crate::editor`] applies their
//! output optimistically and persists it.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Direction of a single-step move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Neighbour index for a single-step move, or `None` when the move would
/// leave the list.
pub fn step_target(index: usize, direction: Direction, len: usize) -> Option<usize> {
    if index >= len {
        return None;
    }
    match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => (index + 1 < len).then_some(index + 1),
    }
}

/// Copy of `items` with the element at `from` removed and re-inserted at `to`.
pub fn moved<T: Clone>(items: &[T], from: usize, to: usize) -> Result<Vec<T>, CoreError> {
    check_index(from, items.len())?;
    check_index(to, items.len())?;
    let mut out = items.to_vec();
    let item = out.remove(from);
    out.insert(to, item);
    Ok(out)
}

/// Copy of `items` with the elements at `a` and `b` exchanged.
pub fn swapped<T: Clone>(items: &[T], a: usize, b: usize) -> Result<Vec<T>, CoreError> {
    check_index(a, items.len())?;
    check_index(b, items.len())?;
    let mut out = items.to_vec();
    out.swap(a, b);
    Ok(out)
}

fn check_index(index: usize, len: usize) -> Result<(), CoreError> {
    if index < len {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "index {index} is out of range for {len} items"
        )))
    }
}
