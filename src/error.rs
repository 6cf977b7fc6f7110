//! Error types for the chess core.
//!
//! Rule violations are local and recoverable; storage corruption and
//! orchestration contract violations are the only exceptional cases.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Why a requested move was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IllegalMoveReason {
    /// The piece on the origin square belongs to the side not on move.
    WrongTurn,
    NoPieceAtOrigin,
    /// The piece cannot reach the destination under its movement rules.
    DestinationUnreachable,
    /// The mover's king would remain or become attacked.
    KingInCheck,
    CastlingPreconditionUnmet,
    /// A pawn reached the last rank without a promotion choice.
    PromotionRequired,
    /// A promotion choice was given for a non-promoting move, or names a king or pawn.
    InvalidPromotion,
    GameOver,
}

impl fmt::Display for IllegalMoveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IllegalMoveReason::WrongTurn => "it is not that side's turn",
            IllegalMoveReason::NoPieceAtOrigin => "no piece on the origin square",
            IllegalMoveReason::DestinationUnreachable => "the piece cannot reach that square",
            IllegalMoveReason::KingInCheck => "the move leaves the king in check",
            IllegalMoveReason::CastlingPreconditionUnmet => "castling is not allowed here",
            IllegalMoveReason::PromotionRequired => "a promotion piece must be chosen",
            IllegalMoveReason::InvalidPromotion => "invalid promotion choice",
            IllegalMoveReason::GameOver => "the game is already over",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("illegal move {request}: {reason}")]
pub struct IllegalMoveError {
    pub request: String,
    pub reason: IllegalMoveReason,
}

impl IllegalMoveError {
    pub fn new(request: impl fmt::Display, reason: IllegalMoveReason) -> Self {
        Self { request: request.to_string(), reason }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("FEN must have at least 4 fields, got {0}")]
    MissingFields(usize),
    #[error("invalid piece placement: {0}")]
    Placement(String),
    #[error("invalid side to move: {0}")]
    SideToMove(String),
    #[error("invalid castling field: {0}")]
    Castling(String),
    #[error("invalid en passant square: {0}")]
    EnPassant(String),
    #[error("invalid move counter: {0}")]
    Counter(String),
    #[error("each side needs exactly one king")]
    KingCount,
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed brain document: {0}")]
    Format(#[from] serde_json::Error),
    #[error("brain document failed verification: {0}")]
    Verify(String),
    #[error("unsupported brain document version {0}")]
    UnsupportedVersion(u32),
    #[error("invalid fingerprint key: {0}")]
    Key(String),
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PersistenceError::Io { path: path.into(), source }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Search was asked to pick a move in a finished position. The
    /// orchestrator checks termination first, so this is a caller bug.
    #[error("search invoked on a position with no legal moves")]
    NoLegalMoves,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("the game is already over")]
    GameOver,
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Illegal(#[from] IllegalMoveError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
