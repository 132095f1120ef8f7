//! Processing worker.
//!
//! Listens for `new_file` notifications, then for each one fetches the
//! record, stages its payload on disk, runs detection and writes the
//! result back onto the same record. Records are processed one at a time.

pub mod config;
pub mod consumer;
pub mod processor;
pub mod staging;
pub mod subscriber;
