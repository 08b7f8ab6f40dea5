//! Error types for pagebot-agent
//!
//! Round-level failures (provider errors, malformed turns, page errors,
//! timeouts) never surface here; they become transcript observations and
//! the turn ends normally. Only infrastructure failures are `Err`.

use thiserror::Error;

/// Result type alias using pagebot-agent Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during dispatcher operations
#[derive(Error, Debug)]
pub enum Error {
    /// Transcript persistence failed
    #[error("store error: {0}")]
    Store(#[from] std::io::Error),

    /// A transcript edit referenced an entry that does not exist
    #[error("no transcript entry at index {0}")]
    BadIndex(usize),
}
