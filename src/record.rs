use crate::board::{Board, Color, Move};
use crate::fingerprint::Fingerprint;
use crate::rules::GameOutcome;

/// One played move and the position it was played from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlyRecord {
    pub fingerprint: Fingerprint,
    pub side_to_move: Color,
    pub mv: Move,
    pub gives_check: bool,
    pub gives_mate: bool,
}

/// Everything a finished game leaves behind for learning and export.
#[derive(Clone, Debug)]
pub struct GameRecord {
    start_fen: String,
    plies: Vec<PlyRecord>,
    final_fingerprint: Fingerprint,
    final_side_to_move: Color,
    outcome: Option<GameOutcome>,
    ai_color: Option<Color>,
}

impl GameRecord {
    pub fn new(start: &Board) -> Self {
        Self {
            start_fen: start.to_fen(),
            plies: Vec::with_capacity(128),
            final_fingerprint: start.fingerprint(),
            final_side_to_move: start.side_to_move(),
            outcome: None,
            ai_color: None,
        }
    }

    /// Appends `mv`, played from `before`, reaching `after`.
    pub fn push(&mut self, before: &Board, mv: Move, after: &Board, gives_mate: bool) {
        self.plies.push(PlyRecord {
            fingerprint: before.fingerprint(),
            side_to_move: before.side_to_move(),
            mv,
            gives_check: after.in_check(),
            gives_mate,
        });
        self.final_fingerprint = after.fingerprint();
        self.final_side_to_move = after.side_to_move();
    }

    pub fn finish(&mut self, outcome: GameOutcome) {
        self.outcome = Some(outcome);
    }

    pub fn set_ai_color(&mut self, color: Option<Color>) {
        self.ai_color = color;
    }

    pub fn start_fen(&self) -> &str { &self.start_fen }
    pub fn plies(&self) -> &[PlyRecord] { &self.plies }
    pub fn outcome(&self) -> Option<GameOutcome> { self.outcome }
    pub fn ai_color(&self) -> Option<Color> { self.ai_color }
    pub fn final_fingerprint(&self) -> Fingerprint { self.final_fingerprint }

    /// Every position of the game in order, including the final one.
    pub fn positions(&self) -> impl DoubleEndedIterator<Item = (Fingerprint, Color)> + '_ {
        self.plies
            .iter()
            .map(|p| (p.fingerprint, p.side_to_move))
            .chain(std::iter::once((self.final_fingerprint, self.final_side_to_move)))
    }

    /// How often `fp` has appeared so far, the current position included.
    pub fn occurrences(&self, fp: Fingerprint) -> usize {
        self.positions().filter(|&(f, _)| f == fp).count()
    }

    /// Moves in UCI coordinate text.
    pub fn uci_moves(&self) -> Vec<String> {
        self.plies.iter().map(|p| p.mv.to_string()).collect()
    }
}
