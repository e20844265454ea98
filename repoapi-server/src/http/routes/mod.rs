//! API route handlers

pub mod health;
pub mod orgs;
pub mod repos;

/// Default page size for listings
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest page size a client may ask for
pub const MAX_LIMIT: i64 = 50;

/// Page size from the `limit` query value (0 when absent)
pub fn page_size(limit: i64) -> i64 {
    if limit <= 0 {
        DEFAULT_LIMIT
    } else {
        limit.min(MAX_LIMIT)
    }
}
