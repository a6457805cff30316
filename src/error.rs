use thiserror::Error;

use crate::board::Terminal;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The rules collaborator rejected the input; search never starts.
    #[error("invalid position: {0}")]
    InvalidPosition(String),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// The side to move has no legal moves.
    #[error("no legal moves: {0}")]
    NoLegalMoves(Terminal),

    /// A second search was started while one is still running.
    #[error("a search is already running")]
    SearchInProgress,

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("search worker panicked")]
    WorkerPanicked,
}

pub type EngineResult<T> = Result<T, EngineError>;
