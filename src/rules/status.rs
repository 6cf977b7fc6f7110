use serde::{Deserialize, Serialize};

use super::has_legal_move;
use crate::board::{Board, Color, PieceKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    WhiteWin,
    BlackWin,
    Draw,
}

impl GameResult {
    pub fn win_for(color: Color) -> Self {
        match color {
            Color::White => GameResult::WhiteWin,
            Color::Black => GameResult::BlackWin,
        }
    }

    pub fn winner(self) -> Option<Color> {
        match self {
            GameResult::WhiteWin => Some(Color::White),
            GameResult::BlackWin => Some(Color::Black),
            GameResult::Draw => None,
        }
    }

    /// +1 win, -1 loss, 0 draw for `color`.
    pub fn score_for(self, color: Color) -> f64 {
        match self.winner() {
            Some(w) if w == color => 1.0,
            Some(_) => -1.0,
            None => 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Termination {
    Checkmate,
    Stalemate,
    Repetition,
    FiftyMoveRule,
    InsufficientMaterial,
    /// A side ran out of clock time.
    Timeout,
}

/// How a finished game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameOutcome {
    pub result: GameResult,
    pub termination: Termination,
}

impl GameOutcome {
    pub fn draw(termination: Termination) -> Self {
        Self { result: GameResult::Draw, termination }
    }
}

/// Board-local terminal classification. Repetition needs the game history
/// and is detected by the orchestrator.
pub fn position_status(board: &Board) -> Option<GameOutcome> {
    if !has_legal_move(board) {
        return Some(if board.in_check() {
            GameOutcome {
                result: GameResult::win_for(board.side_to_move().opposite()),
                termination: Termination::Checkmate,
            }
        } else {
            GameOutcome::draw(Termination::Stalemate)
        });
    }
    if has_insufficient_material(board) {
        return Some(GameOutcome::draw(Termination::InsufficientMaterial));
    }
    if board.halfmove_clock() >= 100 {
        return Some(GameOutcome::draw(Termination::FiftyMoveRule));
    }
    None
}

/// Neither side can ever mate: bare kings, a single minor piece, or only
/// bishops that all stand on one square color.
pub fn has_insufficient_material(board: &Board) -> bool {
    let mut minors = 0;
    let mut knights = 0;
    let mut bishop_colors = [false; 2];
    for (sq, piece) in board.pieces() {
        match piece.kind {
            PieceKind::King => {}
            PieceKind::Knight => {
                minors += 1;
                knights += 1;
            }
            PieceKind::Bishop => {
                minors += 1;
                bishop_colors[sq.is_dark() as usize] = true;
            }
            PieceKind::Pawn | PieceKind::Rook | PieceKind::Queen => return false,
        }
    }
    match minors {
        0 | 1 => true,
        _ => knights == 0 && !(bishop_colors[0] && bishop_colors[1]),
    }
}
