//! Error types for pack loading and conversion.
//!
//! Missing variants during pose composition are not errors and have no
//! variant here; they resolve to "draw nothing for this layer".

use thiserror::Error;

use crate::path_template::TemplateError;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("Could not fetch content pack {location}: {reason}")]
    Network { location: String, reason: String },

    #[error("Content pack is not valid json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Content pack is not in a valid format: {0}")]
    Schema(String),

    #[error(transparent)]
    UnsupportedFormatToken(#[from] TemplateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PackError {
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }
}

pub type Result<T> = std::result::Result<T, PackError>;
