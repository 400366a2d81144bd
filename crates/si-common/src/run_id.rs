//! Identifiers for calculation runs.
//!
//! Every result row written by one calculation carries the same run ID, so a
//! run can be listed or cleaned up as a unit. ULIDs sort by creation time.

use ulid::Ulid;

/// Generates a fresh run ID (26 characters, URL-safe).
#[inline]
pub fn generate() -> String {
    Ulid::new().to_string()
}
