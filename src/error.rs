//! Errors reported by the reactor container.

use thiserror::Error;

/// Recoverable errors surfaced to callers of the container.
///
/// Folding never fails: change sets are closed enums matched exhaustively,
/// so an unknown change is rejected by the compiler rather than at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactorError {
    /// A string-tagged intent did not name any known intent.
    #[error("unrecognized intent '{tag}'")]
    UnrecognizedIntent { tag: String },

    /// The container was torn down; the intent was not enqueued.
    #[error("reactor container is closed")]
    Closed,
}
