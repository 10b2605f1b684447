//! Error types for datepicker operations.

use thiserror::Error;

use crate::selection::Mode;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PickerError {
    #[error("Unknown locale: {0}")]
    UnknownLocale(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("{operation} is not available in {mode} mode")]
    ModeMismatch { operation: &'static str, mode: Mode },

    #[error("Picker has been destroyed")]
    Destroyed,
}

pub type Result<T> = std::result::Result<T, PickerError>;
