//! Engine failure type.

use thiserror::Error;

/// A failure the engine could not express as an outcome.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine cannot serve requests right now.
    #[error("engine unavailable: {0}")]
    Unavailable(String),
    /// Anything else.
    #[error("{0}")]
    Internal(String),
}
