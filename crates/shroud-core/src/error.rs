//! Core error types.

use thiserror::Error;

/// Engine errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Schema declares something the engine cannot honor.
    #[error("schema violation for entity '{entity}': {reason}")]
    SchemaViolation {
        /// Offending entity.
        entity: String,
        /// What is missing or inconsistent.
        reason: String,
    },
}
