//! Structural validation of an ordered sequence.
//!
//! A complete sequence has exactly one beginning clip, placed first, and
//! exactly one end clip, placed last. Every rule is evaluated on its own,
//! so one defect can be reported by more than one rule. The result is a
//! warning for the editor, never an error that blocks edits.

use serde::{Deserialize, Serialize};

use crate::sequence::SequenceItemWithVideo;
use crate::video::Role;

/// One structural defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralIssue {
    MissingBeginning,
    MultipleBeginnings,
    MissingEnd,
    MultipleEnds,
    FirstNotBeginning,
    LastNotEnd,
}

impl StructuralIssue {
    pub fn message(self) -> &'static str {
        match self {
            StructuralIssue::MissingBeginning => "Sequence must start with a Beginning video.",
            StructuralIssue::MultipleBeginnings => {
                "Sequence should only have one Beginning video."
            }
            StructuralIssue::MissingEnd => "Sequence must end with an End video.",
            StructuralIssue::MultipleEnds => "Sequence should only have one End video.",
            StructuralIssue::FirstNotBeginning => "The first video must be a Beginning video.",
            StructuralIssue::LastNotEnd => "The last video must be an End video.",
        }
    }
}

/// Outcome of [`validate_roles`]. `valid` is true iff `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceValidation {
    pub valid: bool,
    pub errors: Vec<String>,
    pub issues: Vec<StructuralIssue>,
}

impl SequenceValidation {
    fn from_issues(issues: Vec<StructuralIssue>) -> Self {
        Self {
            valid: issues.is_empty(),
            errors: issues.iter().map(|i| i.message().to_string()).collect(),
            issues,
        }
    }

    pub fn has(&self, issue: StructuralIssue) -> bool {
        self.issues.contains(&issue)
    }
}

/// Validate roles listed in playback order.
pub fn validate_roles(roles: &[Role]) -> SequenceValidation {
    let mut issues = Vec::new();

    let beginnings = roles.iter().filter(|r| **r == Role::Beginning).count();
    let ends = roles.iter().filter(|r| **r == Role::End).count();

    match beginnings {
        0 => issues.push(StructuralIssue::MissingBeginning),
        1 => {}
        _ => issues.push(StructuralIssue::MultipleBeginnings),
    }
    match ends {
        0 => issues.push(StructuralIssue::MissingEnd),
        1 => {}
        _ => issues.push(StructuralIssue::MultipleEnds),
    }

    if let (Some(first), Some(last)) = (roles.first(), roles.last()) {
        if *first != Role::Beginning {
            issues.push(StructuralIssue::FirstNotBeginning);
        }
        if *last != Role::End {
            issues.push(StructuralIssue::LastNotEnd);
        }
    }

    SequenceValidation::from_issues(issues)
}

/// Validate items of a [`SequenceWithItems`](crate::sequence::SequenceWithItems)
/// in their current display order.
pub fn validate_sequence(items: &[SequenceItemWithVideo]) -> SequenceValidation {
    let roles: Vec<Role> = items.iter().map(SequenceItemWithVideo::role).collect();
    validate_roles(&roles)
}
