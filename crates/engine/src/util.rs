//! Internal helpers for collapsing store responses.
//!
//! These utilities are **not** part of the public API.

use api_types::response::RecordResult;
use chrono::NaiveDate;

use crate::{EngineError, EntityKind, RecordRejection, ResultEngine};

/// Return the first successful record of a single-record write, or turn the
/// per-record failures into [`EngineError::Rejected`].
pub(crate) fn first_written<T>(
    kind: EntityKind,
    action: &str,
    results: Vec<RecordResult<T>>,
) -> ResultEngine<T> {
    let mut rejections = Vec::new();
    for result in results {
        if result.success {
            if let Some(data) = result.data {
                return Ok(data);
            }
            continue;
        }
        tracing::warn!(
            "failed to {action} {kind} record: {}",
            result.message.as_deref().unwrap_or("no message")
        );
        rejections.extend(result.errors.into_iter().map(RecordRejection::from));
        if let Some(message) = result.message {
            rejections.push(RecordRejection {
                field: None,
                message,
            });
        }
    }

    if rejections.is_empty() {
        return Err(EngineError::Remote(format!(
            "store returned no {kind} record for {action}"
        )));
    }
    Err(EngineError::Rejected(rejections))
}

/// `true` when at least one record was deleted. Failures are logged.
pub(crate) fn any_deleted<T>(kind: EntityKind, results: &[RecordResult<T>]) -> bool {
    for failed in results.iter().filter(|r| !r.success) {
        tracing::warn!(
            "failed to delete {kind} record: {}",
            failed.message.as_deref().unwrap_or("no message")
        );
    }
    results.iter().any(|r| r.success)
}

/// Date in the `YYYY-MM-DD` form the store expects.
pub(crate) fn store_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidField(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}
