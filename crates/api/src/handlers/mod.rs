//! Request handlers, grouped by resource.

pub mod health;
pub mod jobs;
pub mod sync;
pub mod sync_center;
