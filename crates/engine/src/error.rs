//! The module contains the errors the engine can return.
//!
//! The errors fall in three families:
//!
//! - validation: [`InvalidAmount`], [`InvalidDate`], [`InvalidField`] and
//!   [`Rejected`] (the record store refused a write);
//! - lookup: [`KeyNotFound`];
//! - remote: [`Remote`], the record store could not be reached or reported a
//!   failure.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidDate`]: EngineError::InvalidDate
//!  [`InvalidField`]: EngineError::InvalidField
//!  [`Rejected`]: EngineError::Rejected
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Remote`]: EngineError::Remote
use std::fmt;

use api_types::response::FieldError;
use thiserror::Error;

/// A reason the record store gave for refusing a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordRejection {
    pub field: Option<String>,
    pub message: String,
}

impl fmt::Display for RecordRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{field}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl From<FieldError> for RecordRejection {
    fn from(value: FieldError) -> Self {
        Self {
            field: Some(value.field_label),
            message: value.message,
        }
    }
}

fn join_rejections(rejections: &[RecordRejection]) -> String {
    rejections
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid field: {0}")]
    InvalidField(String),
    #[error("Record rejected: {}", join_rejections(.0))]
    Rejected(Vec<RecordRejection>),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Record store failure: {0}")]
    Remote(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl EngineError {
    /// Returns `true` for errors caused by malformed input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_) | Self::InvalidDate(_) | Self::InvalidField(_) | Self::Rejected(_)
        )
    }

    /// Returns `true` for lookup misses.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound(_))
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidDate(a), Self::InvalidDate(b)) => a == b,
            (Self::InvalidField(a), Self::InvalidField(b)) => a == b,
            (Self::Rejected(a), Self::Rejected(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Remote(a), Self::Remote(b)) => a == b,
            (Self::Config(a), Self::Config(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_lists_every_field() {
        let err = EngineError::Rejected(vec![
            RecordRejection {
                field: Some("amount".to_string()),
                message: "is required".to_string(),
            },
            RecordRejection {
                field: None,
                message: "duplicate".to_string(),
            },
        ]);
        assert_eq!(err.to_string(), "Record rejected: amount: is required; duplicate");
        assert!(err.is_validation());
    }

    #[test]
    fn remote_is_not_validation() {
        let err = EngineError::Remote("timeout".to_string());
        assert!(!err.is_validation());
        assert!(!err.is_not_found());
    }
}
