//! Turn-level error types.

use banter_types::ModelError;
use thiserror::Error;

/// Errors that fail a whole turn.
///
/// Per-candidate problems (one generation call erroring, a classifier
/// call failing) drop that candidate and are not represented here; a
/// `TurnError` means no reply could be produced at all. A failed turn
/// never mutates session state.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("all {attempts} generation attempts failed: {source}")]
    GenerationFailed {
        attempts: usize,
        #[source]
        source: ModelError,
    },

    #[error("prompt encoding failed: {0}")]
    Prompt(#[source] ModelError),

    #[error("default answer encoding failed: {0}")]
    Fallback(#[source] ModelError),
}
