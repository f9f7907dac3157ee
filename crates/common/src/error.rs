//! Common error types shared across crates.

use thiserror::Error;

use crate::payload::ErrorRecord;

/// Top-level error type for token issuance and reading.
///
/// Every variant carries a stable machine-readable [`code`](ShopCloudError::code)
/// so callers can branch on the failure without matching display strings.
#[derive(Debug, Error)]
pub enum ShopCloudError {
    /// The payload is not a well-formed structured object.
    #[error("malformed payload: {0}")]
    Structural(String),

    /// One or more field-level rule violations, in the order they were found.
    #[error("invalid payload: {} validation error(s)", .0.len())]
    Validation(Vec<ErrorRecord>),

    /// The token lacks the `@` separator or one of its two segments.
    #[error("malformed token: {0}")]
    TokenFormat(String),

    /// The token was issued for a different shop.
    #[error("invalid token: issued for shop {found:?}, expected {expected:?}")]
    TokenMismatch {
        /// Shop identifier this instance is configured with.
        expected: String,
        /// Shop identifier found in the token suffix.
        found: String,
    },

    /// The ciphertext failed to parse or authenticate.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// The shared secret cannot be used as key material.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The payload could not be serialised to JSON.
    #[error("serialisation failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The instance was constructed with unusable settings.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ShopCloudError {
    /// Returns the short machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            ShopCloudError::Structural(_) => "structural_error",
            ShopCloudError::Validation(_) => "validation_error",
            ShopCloudError::TokenFormat(_) => "token_format_error",
            ShopCloudError::TokenMismatch { .. } => "token_mismatch",
            ShopCloudError::Decryption(_) => "decryption_error",
            ShopCloudError::InvalidKey(_) => "invalid_key",
            ShopCloudError::Serialization(_) => "serialization_error",
            ShopCloudError::Config(_) => "config_error",
        }
    }

    /// Returns the accumulated error records when this is a validation failure.
    pub fn validation_errors(&self) -> Option<&[ErrorRecord]> {
        match self {
            ShopCloudError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Result type alias using [`ShopCloudError`].
pub type Result<T> = std::result::Result<T, ShopCloudError>;
