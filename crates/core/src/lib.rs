//! Domain types shared by the ingest server and the processing worker.

pub mod detection;
pub mod error;
pub mod pagination;
pub mod types;
