//! Engine error types.
//!
//! Store mutations deliberately do not error on stale ids (silent no-op);
//! these types cover the paths that genuinely need a user-facing message:
//! bad files and incompatible legacy data.

use thiserror::Error;

/// Failure while reading an interchange (`.cotm`) file.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Payload is JSON but lacks the required `fileType`/`content` fields
    #[error("Invalid file format: missing required properties")]
    InvalidFormat,

    /// Payload is not parseable at all, or its content does not match the
    /// declared file type
    #[error("Failed to parse file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure while migrating a legacy character file.
#[derive(Debug, Error)]
pub enum LegacyError {
    /// The legacy document declares a game system we cannot migrate.
    /// Distinct from parse failures so the caller can message it
    /// separately.
    #[error("Unsupported game system: {0}")]
    UnsupportedGameSystem(String),

    #[error("Failed to parse legacy file: {0}")]
    Parse(#[from] serde_json::Error),
}
