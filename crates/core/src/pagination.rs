//! Pagination defaults and clamp helpers shared by the repository and API
//! layers.

/// Default number of rows per page for list endpoints.
pub const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Maximum number of rows per page for list endpoints.
pub const MAX_PAGE_LIMIT: i64 = 200;

/// Clamp a caller-supplied limit to `[1, max]`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

/// Clamp a caller-supplied offset to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
