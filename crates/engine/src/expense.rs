//! Validated view over expense rows.
//!
//! The record store hands back loosely typed rows
//! ([`api_types::expense::Expense`]). The helpers here turn the fields the
//! engine reads into strong types, returning a validation error instead of
//! coercing bad values.

use api_types::expense::Expense;
use chrono::{DateTime, Datelike, NaiveDate};
use serde::Serialize;
use serde_json::Value;

use crate::{EngineError, MoneyCents, ResultEngine};

/// Label used for expenses stored without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// An expense row with every field validated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub farm_id: i64,
    pub amount: MoneyCents,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
}

impl TryFrom<&Expense> for ExpenseRecord {
    type Error = EngineError;

    fn try_from(row: &Expense) -> ResultEngine<Self> {
        Ok(Self {
            id: row.id,
            farm_id: farm_of(row)?,
            amount: amount_of(row)?,
            category: category_of(row)?.to_string(),
            description: row.description.clone().unwrap_or_default(),
            date: date_of(row)?,
        })
    }
}

pub(crate) fn amount_of(row: &Expense) -> ResultEngine<MoneyCents> {
    let value = row.amount.as_ref().ok_or_else(|| {
        EngineError::InvalidAmount(format!("expense {} has no amount", row.id))
    })?;
    MoneyCents::from_json(value).map_err(|err| match err {
        EngineError::InvalidAmount(msg) => {
            EngineError::InvalidAmount(format!("expense {}: {msg}", row.id))
        }
        other => other,
    })
}

/// The stored label, untouched. Missing or blank labels fall back to
/// [`UNCATEGORIZED`].
pub(crate) fn category_of(row: &Expense) -> ResultEngine<&str> {
    match &row.category {
        None | Some(Value::Null) => Ok(UNCATEGORIZED),
        Some(Value::String(label)) if label.trim().is_empty() => Ok(UNCATEGORIZED),
        Some(Value::String(label)) => Ok(label.as_str()),
        Some(other) => Err(EngineError::InvalidField(format!(
            "expense {}: category must be text, got {other}",
            row.id
        ))),
    }
}

pub(crate) fn farm_of(row: &Expense) -> ResultEngine<i64> {
    row.farm_id
        .as_ref()
        .map(|farm| farm.id())
        .ok_or_else(|| EngineError::InvalidField(format!("expense {} has no farm_id", row.id)))
}

pub(crate) fn date_of(row: &Expense) -> ResultEngine<NaiveDate> {
    let raw = match &row.date {
        None | Some(Value::Null) => {
            return Err(EngineError::InvalidDate(format!("expense {} has no date", row.id)));
        }
        Some(Value::String(raw)) => raw,
        Some(other) => {
            return Err(EngineError::InvalidDate(format!(
                "expense {}: date must be text, got {other}",
                row.id
            )));
        }
    };
    parse_date(raw).map_err(|err| match err {
        EngineError::InvalidDate(msg) => EngineError::InvalidDate(format!("expense {}: {msg}", row.id)),
        other => other,
    })
}

/// Parses a store date: either `YYYY-MM-DD` or an RFC 3339 timestamp, whose
/// calendar date is taken in the offset it carries.
///
/// Years outside `0000..=9999` are rejected so that period keys stay
/// fixed-width.
pub fn parse_date(raw: &str) -> ResultEngine<NaiveDate> {
    let trimmed = raw.trim();
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.date_naive()))
        .map_err(|_| EngineError::InvalidDate(format!("unparseable date {raw:?}")))?;

    if !(0..=9999).contains(&date.year()) {
        return Err(EngineError::InvalidDate(format!(
            "year out of range in {raw:?}"
        )));
    }
    Ok(date)
}
