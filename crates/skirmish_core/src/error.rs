//! Error types for the skirmish engine.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all engine errors.
///
/// Rejected moves and exhausted searches are ordinary game outcomes and are
/// not represented here; see [`crate::simulation::MoveRejection`].
#[derive(Debug, Error)]
pub enum GameError {
    /// Configuration values that cannot produce a playable game.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file parsing error.
    #[error("Failed to parse config file '{path}': {message}")]
    ConfigParse {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Underlying IO failure while reading or writing engine data.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The standard placement only knows a fixed number of map edges.
    #[error("Unsupported player count: {requested} (supported: {min}..={max})")]
    UnsupportedPlayerCount {
        /// Requested number of players.
        requested: usize,
        /// Smallest supported count.
        min: usize,
        /// Largest supported count.
        max: usize,
    },

    /// Action code outside the discrete action space.
    #[error("Invalid action code: {0}")]
    InvalidActionCode(u8),

    /// Replay could not be encoded or decoded.
    #[error("Replay codec error: {0}")]
    ReplayCodec(String),

    /// Replay produced a different final state than recorded.
    #[error("Replay mismatch after {actions} actions: expected hash {expected}, got {actual}")]
    ReplayMismatch {
        /// Number of actions replayed.
        actions: usize,
        /// Recorded final state hash.
        expected: u64,
        /// Final state hash of the re-run.
        actual: u64,
    },
}
