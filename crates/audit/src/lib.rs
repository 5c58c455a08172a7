//! Structural audit of stored sequences.
//!
//! Runs the sequence validator over every stored sequence (optionally of a
//! single owner) and collects the result per sequence.

pub mod config;

use serde::Serialize;
use seqcraft_core::error::CoreError;
use seqcraft_core::sequence_validation::validate_sequence;
use seqcraft_core::store::SequenceStore;
use seqcraft_core::types::DbId;

/// Validation result for one sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceReport {
    pub sequence_id: DbId,
    pub title: String,
    pub items: usize,
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Reports for every audited sequence, newest sequence first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    pub reports: Vec<SequenceReport>,
}

impl AuditSummary {
    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn invalid(&self) -> impl Iterator<Item = &SequenceReport> {
        self.reports.iter().filter(|r| !r.valid)
    }

    pub fn invalid_count(&self) -> usize {
        self.invalid().count()
    }
}

/// Validate every sequence, or only those of `owner`.
///
/// A sequence deleted between listing and fetching is skipped.
pub async fn audit<S: SequenceStore + ?Sized>(
    store: &S,
    owner: Option<DbId>,
) -> Result<AuditSummary, CoreError> {
    let sequences = store.list_sequences().await?;
    let mut summary = AuditSummary::default();

    for sequence in sequences
        .iter()
        .filter(|s| owner.map_or(true, |o| s.user_id == o))
    {
        let view = match store.get_sequence_with_items(sequence.id).await {
            Ok(view) => view,
            Err(e) if e.is_not_found() => {
                tracing::warn!(sequence_id = sequence.id, "Sequence vanished during audit");
                continue;
            }
            Err(e) => return Err(e),
        };
        let validation = validate_sequence(&view.items);
        tracing::debug!(
            sequence_id = sequence.id,
            items = view.len(),
            valid = validation.valid,
            "Sequence audited"
        );
        summary.reports.push(SequenceReport {
            sequence_id: sequence.id,
            title: view.sequence.title.clone(),
            items: view.len(),
            valid: validation.valid,
            errors: validation.errors,
        });
    }

    Ok(summary)
}
