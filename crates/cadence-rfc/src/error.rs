use thiserror::Error;

use crate::rfc::ical::expand::ConversionError;
use crate::rfc::ical::parse::ParseError;

/// Rule parsing, coercion and validation errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("Timezone conversion error: {0}")]
    ConversionError(#[from] ConversionError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    CoreError(#[from] cadence_core::error::CoreError),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;
