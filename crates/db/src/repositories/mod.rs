//! Zero-sized repositories, one per table. Every method takes a `&PgPool`
//! and returns raw rows; domain conversion happens in [`crate::store`].

pub mod sequence_item_repo;
pub mod sequence_repo;
pub mod video_repo;

pub use sequence_item_repo::SequenceItemRepo;
pub use sequence_repo::SequenceRepo;
pub use video_repo::VideoRepo;
