//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidAmount`] thrown when a money value cannot be parsed or is out of range.
//! - [`InvalidCompetence`] thrown when a `YYYY/MM` bucket is malformed.
//! - [`InvalidDate`] thrown when a date falls outside the representable range.
//! - [`UnknownValue`] thrown when a closed enumeration receives an unknown label.
//! - [`Validation`] thrown when an entry draft misses a required field.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidCompetence`]: EngineError::InvalidCompetence
//!  [`InvalidDate`]: EngineError::InvalidDate
//!  [`UnknownValue`]: EngineError::UnknownValue
//!  [`Validation`]: EngineError::Validation
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid competence: {0}")]
    InvalidCompetence(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Unknown value: {0}")]
    UnknownValue(String),
    #[error("Validation failed: {0}")]
    Validation(String),
}
