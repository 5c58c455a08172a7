//! Row types for the PostgreSQL schema.
//!
//! Rows mirror the table columns one to one; conversion into the domain
//! records of `seqcraft_core` happens through `From`/`TryFrom` so that a
//! malformed row is rejected instead of leaking into the editor.

pub mod sequence;
pub mod sequence_item;
pub mod video;
