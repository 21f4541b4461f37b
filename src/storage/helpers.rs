//! Shared helpers for SQLite stores.

use chrono::{DateTime, Utc};

use crate::interfaces::order_repository::StorageError;

/// Parse an RFC 3339 timestamp column.
pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidValue(format!("invalid timestamp '{value}': {e}")))
}
