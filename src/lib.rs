// Self-learning chess core: rules, evaluation, TD-learning brain and MCTS.
pub mod board;
pub mod brain;
pub mod config;
pub mod error;
pub mod eval;
pub mod fingerprint;
pub mod game;
pub mod perft;
pub mod record;
pub mod rules;
pub mod search;
pub mod selfplay;
pub mod uci;

pub use board::{Board, Color, Move, MoveRequest, Piece, PieceKind, Square};
pub use brain::{Brain, BrainConfig, BrainStore};
pub use config::Config;
pub use fingerprint::Fingerprint;
pub use game::{Game, GameState};
pub use rules::{GameOutcome, GameResult, Termination};
pub use search::{CancelToken, SearchBudget, SearchOutcome};
