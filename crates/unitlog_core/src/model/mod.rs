//! Domain records for users and their logged conversions.
//!
//! # Responsibility
//! - Define plain data structures persisted by the record store.
//! - Provide explicit validation functions run before persistence.
//!
//! # Invariants
//! - Every record is identified by a stable UUID assigned at creation.
//! - `Conversion::result_value` is derived, never set independently.

pub mod conversion;
pub mod user;
pub mod validation;

/// Current wall-clock time as Unix epoch milliseconds (UTC).
pub(crate) fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
