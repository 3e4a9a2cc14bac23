//! Error taxonomy for the mining engine.

use thiserror::Error;

/// All fatal and per-item errors the mining engine can raise.
///
/// Per-item failures (a single file's undecodable patch, one path's context
/// analysis blowing up) are caught at their boundary and never reach this
/// type; they are logged as warnings instead. Variants here are the ones
/// that abort the whole run.
#[derive(Error, Debug)]
pub enum MinerError {
    /// The path given to `--repo` is not a Git repository, or could not be opened.
    #[error("failed to open git repository at '{path}': {source}")]
    RepoOpen {
        /// Path that was passed to `--repo`.
        path: String,
        /// Underlying libgit2 error.
        #[source]
        source: git2::Error,
    },

    /// `--context-days` (or any other CLI argument) failed validation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The output sink could not be written to.
    #[error("failed to write to output sink: {0}")]
    SinkWrite(#[source] std::io::Error),

    /// The output sink could not be opened for writing.
    #[error("failed to open output sink '{path}': {source}")]
    SinkOpen {
        /// Path that was passed to `--output`.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A record could not be serialized to JSON. Indicates a bug in the
    /// data model (every constructed `Record` is expected to serialize).
    #[error("failed to serialize record: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Wraps an otherwise-uncategorized libgit2 failure encountered while
    /// walking commits or computing a diff.
    #[error("git operation failed: {0}")]
    Git(#[from] git2::Error),

    /// A commit carried a timestamp outside the range `chrono` can represent.
    #[error("invalid commit timestamp on {0}")]
    InvalidTimestamp(String),
}
