//! Position evaluation: a static heuristic blended with the brain's learned
//! value. Scores lie in [-1, 1] and are from the side to move's point of view.

use serde::{Deserialize, Serialize};

use crate::board::{Board, Color, PieceKind, Square};
use crate::brain::Brain;
use crate::fingerprint::Fingerprint;
use crate::rules::movegen::mobility;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalWeights {
    /// Weight of the static heuristic (`w_h`).
    pub heuristic_weight: f64,
    /// Weight of the learned value at full confidence (`w_l`).
    pub learned_weight: f64,
    /// Visits at which the learned value is trusted at half weight.
    pub confidence_k: f64,
    /// Raw pawn units that map to tanh(1) ≈ 0.76.
    pub material_scale: f64,
    pub center_bonus: f64,
    pub mobility_weight: f64,
    pub king_shield_weight: f64,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            heuristic_weight: 1.0,
            learned_weight: 0.7,
            confidence_k: 30.0,
            material_scale: 10.0,
            center_bonus: 0.15,
            mobility_weight: 0.02,
            king_shield_weight: 0.10,
        }
    }
}

fn is_center(sq: Square) -> bool {
    (2..=5).contains(&sq.file()) && (2..=5).contains(&sq.rank())
}

/// Own pawns on the three squares directly in front of the king.
fn king_shield(board: &Board, color: Color) -> usize {
    let king = board.king_square(color);
    let pawn = Some(crate::board::Piece::new(color, PieceKind::Pawn));
    (-1..=1)
        .filter_map(|df| king.offset(df, color.forward()))
        .filter(|&sq| board.piece_at(sq) == pawn)
        .count()
}

/// White-relative heuristic in pawn units.
pub fn raw_heuristic(board: &Board, w: &EvalWeights) -> f64 {
    let mut score = 0.0;
    for (sq, piece) in board.pieces() {
        let mut v = piece.kind.value();
        if piece.kind != PieceKind::King && is_center(sq) {
            v += w.center_bonus;
        }
        score += piece.color.sign() * v;
    }
    if w.mobility_weight != 0.0 {
        let m = mobility(board, Color::White) as f64 - mobility(board, Color::Black) as f64;
        score += w.mobility_weight * m;
    }
    let shield = king_shield(board, Color::White) as f64 - king_shield(board, Color::Black) as f64;
    score + w.king_shield_weight * shield
}

/// Heuristic squashed to [-1, 1], side-to-move perspective.
pub fn heuristic(board: &Board, w: &EvalWeights) -> f64 {
    let raw = raw_heuristic(board, w) * board.side_to_move().sign();
    (raw / w.material_scale).tanh()
}

/// Reads the brain but never writes it; cheap to copy into search workers.
#[derive(Clone, Copy)]
pub struct Evaluator<'a> {
    brain: &'a Brain,
    weights: EvalWeights,
}

impl<'a> Evaluator<'a> {
    pub fn new(brain: &'a Brain, weights: EvalWeights) -> Self {
        Self { brain, weights }
    }

    pub fn weights(&self) -> &EvalWeights {
        &self.weights
    }

    pub fn brain(&self) -> &'a Brain {
        self.brain
    }

    /// `visits / (visits + k)`.
    pub fn confidence(&self, visits: u32) -> f64 {
        let v = visits as f64;
        if v <= 0.0 { 0.0 } else { v / (v + self.weights.confidence_k.max(0.0)) }
    }

    pub fn evaluate(&self, board: &Board, fingerprint: Fingerprint) -> f64 {
        let h = heuristic(board, &self.weights);
        let (learned, visits) = self.brain.value_of(fingerprint);
        let wh = self.weights.heuristic_weight.max(0.0);
        let wl = self.weights.learned_weight.max(0.0) * self.confidence(visits);
        if wh + wl <= 0.0 {
            return 0.0;
        }
        ((wh * h + wl * learned) / (wh + wl)).clamp(-1.0, 1.0)
    }

    pub fn evaluate_board(&self, board: &Board) -> f64 {
        self.evaluate(board, board.fingerprint())
    }
}
