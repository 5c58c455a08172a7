//! Sequence composition and validation for role-tagged video clips.
//!
//! - [`video`] / [`sequence`]: record schemas and DTOs
//! - [`sequence_validation`]: structural check (one beginning first, one end last)
//! - [`reorder`] / [`editor`]: optimistic reordering with rollback by re-fetch
//! - [`assembly`] / [`library`]: session controllers driven by the UI layer
//! - [`store`]: ports to the record store, with [`memory_store`] as an in-process backend

pub mod assembly;
pub mod editor;
pub mod error;
pub mod library;
pub mod memory_store;
pub mod playback;
pub mod reorder;
pub mod sequence;
pub mod sequence_validation;
pub mod store;
pub mod types;
pub mod video;
