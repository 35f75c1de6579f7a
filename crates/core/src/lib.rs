//! Pure domain logic for the sportsync platform.
//!
//! This crate has no I/O dependencies (no DB, no HTTP, no async). It holds
//! the shared vocabulary (ids, statuses, batch results), the snapshot
//! reconciliation engine, and the string normalization rules used when
//! comparing provider data against stored records.

pub mod batch;
pub mod error;
pub mod normalize;
pub mod pagination;
pub mod reconcile;
pub mod types;
