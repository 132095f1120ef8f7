//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async queries that
//! accept `&PgPool` as the first argument.

pub mod record_repo;

pub use record_repo::RecordRepo;
