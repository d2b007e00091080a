//! Error types for the trainer core
//!
//! Each component returns its own typed failure; nothing here is fatal to the
//! process. The worst case is a game that needs an explicit restart.

use crate::domain::Move;

/// The Move Oracle rejected a move in the current position
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Illegal move {mv}: {reason}")]
pub struct IllegalMoveError {
    pub mv: String,
    pub reason: String,
}

impl IllegalMoveError {
    pub fn new(mv: &Move, reason: impl Into<String>) -> Self {
        Self {
            mv: mv.to_coordinate(),
            reason: reason.into(),
        }
    }
}

/// Errors from turning move text into a legal move
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// Text is neither coordinate nor algebraic notation
    #[error("Unrecognised move text: {input}")]
    InputFormat { input: String },

    #[error(transparent)]
    Illegal(#[from] IllegalMoveError),
}

/// Errors decoding FEN text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("FEN is empty")]
    Empty,

    #[error("Expected 8 ranks in placement, found {found}")]
    RankCount { found: usize },

    #[error("Rank {rank} does not describe exactly 8 squares")]
    RankWidth { rank: usize },

    #[error("Unknown piece character '{found}'")]
    Piece { found: char },

    #[error("Side to move must be 'w' or 'b', found '{found}'")]
    SideToMove { found: String },

    #[error("Rules library rejected position: {message}")]
    Position { message: String },
}

/// Errors from the engine session and its transport
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Engine I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Engine channel disconnected")]
    Disconnected,

    #[error("A search is already running")]
    AlreadyComputing,

    #[error("Engine session has not been initialized")]
    NotInitialized,
}

/// Errors surfaced by the game orchestrator
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Invalid input: {input}")]
    InputFormat { input: String },

    #[error(transparent)]
    IllegalMove(#[from] IllegalMoveError),

    /// The engine reported a move that does not fit the live position
    #[error("Engine reported {reported}, which does not fit the game: {reason}")]
    ProtocolDesync { reported: String, reason: String },

    #[error("Not your turn")]
    NotYourTurn,

    #[error("No game in progress")]
    NotStarted,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Fen(#[from] FenError),
}

impl From<MoveError> for GameError {
    fn from(err: MoveError) -> Self {
        match err {
            MoveError::InputFormat { input } => GameError::InputFormat { input },
            MoveError::Illegal(e) => GameError::IllegalMove(e),
        }
    }
}

/// A stored preference could not be decoded.
///
/// Only produced inside the preferences layer, which swaps in defaults.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Stored value for '{key}' is corrupt: {message}")]
    Corrupt { key: String, message: String },

    #[error("Preference storage failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors loading the trainer configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;
