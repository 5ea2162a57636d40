//! # Errors
//!
//! Failure taxonomy shared by the catalog client, the favorites adapter, and
//! the state store.

use thiserror::Error;

/// Result alias for data-layer operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors surfaced by the data layer.
///
/// Partial failures (a missing evolution chain, an ability without a
/// description, a dropped batch item) never appear here: they are absorbed
/// where they happen and show up as empty or sentinel values.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The upstream resource does not exist (HTTP 404).
    #[error("{0}")]
    NotFound(String),

    /// Non-success HTTP status or a network-level failure.
    #[error("{0}")]
    Transport(String),

    /// Malformed caller input, e.g. empty search text.
    #[error("{0}")]
    Validation(String),

    /// The persisted favorites slot could not be understood.
    #[error("stored favorites are corrupted: {0}")]
    StorageCorruption(String),

    /// The durable key-value store failed to read or write.
    #[error("storage error: {0}")]
    Storage(String),

    /// A response body did not have the expected shape.
    #[error("failed to decode {context}: {reason}")]
    Decode { context: String, reason: String },
}

impl CatalogError {
    pub fn decode(context: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            context: context.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this is the upstream "resource absent" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(format!("Network request failed: {}", err))
    }
}

impl From<rusqlite::Error> for CatalogError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_is_verbatim() {
        let err = CatalogError::NotFound("Pokémon 9999 not found".to_string());
        assert_eq!(err.to_string(), "Pokémon 9999 not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_decode_error_formatting() {
        let err = CatalogError::decode("Pokémon list", "missing field `results`");
        assert_eq!(
            err.to_string(),
            "failed to decode Pokémon list: missing field `results`"
        );
        assert!(!err.is_not_found());
    }
}
