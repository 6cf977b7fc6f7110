//! One game from setup to learning: turn order, legality, endings, AI moves.

use log::{info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::board::{Board, Color, Move, MoveRequest};
use crate::brain::{Brain, LearningReport};
use crate::config::Config;
use crate::error::{GameError, IllegalMoveError, IllegalMoveReason};
use crate::eval::EvalWeights;
use crate::record::GameRecord;
use crate::rules::{legal_moves, position_status, GameOutcome, GameResult, Termination};
use crate::search::{CancelToken, SearchBudget, SearchConfig, SearchOutcome, Searcher};

/// Snapshot returned after every accepted move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub last_move: Option<Move>,
    pub in_check: bool,
    pub outcome: Option<GameOutcome>,
}

impl GameState {
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }
}

pub struct Game<'b> {
    brain: &'b mut Brain,
    board: Board,
    legal: Vec<Move>,
    record: GameRecord,
    outcome: Option<GameOutcome>,
    last_move: Option<Move>,
    eval: EvalWeights,
    search: SearchConfig,
    rng: SmallRng,
    cancel: CancelToken,
    learned: Option<LearningReport>,
}

impl<'b> Game<'b> {
    /// A game from the standard starting position.
    pub fn new(brain: &'b mut Brain, config: &Config) -> Self {
        Self::from_board(brain, config, Board::startpos())
    }

    /// A game from an arbitrary position. A position that is already
    /// finished starts the game over and is learned from immediately.
    pub fn from_board(brain: &'b mut Brain, config: &Config, board: Board) -> Self {
        let mut game = Self {
            brain,
            board,
            legal: legal_moves(&board),
            record: GameRecord::new(&board),
            outcome: None,
            last_move: None,
            eval: config.eval,
            search: config.search,
            rng: SmallRng::seed_from_u64(config.search.seed),
            cancel: CancelToken::new(),
            learned: None,
        };
        if let Some(outcome) = position_status(&board) {
            game.finish(outcome);
        }
        game
    }

    /// Names the AI's side so the brain can keep AI win/loss counts.
    pub fn set_ai_color(&mut self, color: Option<Color>) {
        self.record.set_ai_color(color);
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    pub fn board(&self) -> &Board { &self.board }
    pub fn record(&self) -> &GameRecord { &self.record }
    pub fn brain(&self) -> &Brain { &*self.brain }
    pub fn side_to_move(&self) -> Color { self.board.side_to_move() }
    pub fn is_over(&self) -> bool { self.outcome.is_some() }
    /// Learning report for the finished game, once it has been recorded.
    pub fn learning_report(&self) -> Option<&LearningReport> { self.learned.as_ref() }

    /// A handle that stops an in-flight AI search from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> GameState {
        GameState {
            board: self.board,
            last_move: self.last_move,
            in_check: self.board.in_check(),
            outcome: self.outcome,
        }
    }

    /// Empty once the game is over.
    pub fn legal_moves_for_current_player(&self) -> &[Move] {
        if self.outcome.is_some() { &[] } else { self.legal.as_slice() }
    }

    pub fn current_result(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn attempt_move(&mut self, request: impl Into<MoveRequest>) -> Result<GameState, IllegalMoveError> {
        let request = request.into();
        if self.outcome.is_some() {
            return Err(IllegalMoveError::new(request, IllegalMoveReason::GameOver));
        }
        let mv = crate::rules::validate(&self.board, request)?;
        self.play(mv);
        Ok(self.state())
    }

    /// Parses UCI coordinate text and plays it.
    pub fn attempt_uci(&mut self, text: &str) -> Result<GameState, IllegalMoveError> {
        let request: MoveRequest = text
            .parse()
            .map_err(|_| IllegalMoveError::new(text, IllegalMoveReason::DestinationUnreachable))?;
        self.attempt_move(request)
    }

    fn play(&mut self, mv: Move) {
        let before = self.board;
        self.board.make(mv);
        self.last_move = Some(mv);
        self.legal = legal_moves(&self.board);

        let local = position_status(&self.board);
        let mate = local.is_some_and(|o| o.termination == Termination::Checkmate);
        self.record.push(&before, mv, &self.board, mate);

        let outcome = local.or_else(|| {
            (self.record.occurrences(self.board.fingerprint()) >= 3)
                .then(|| GameOutcome::draw(Termination::Repetition))
        });
        if let Some(outcome) = outcome {
            self.finish(outcome);
        }
    }

    /// Runs the search for the side to move without playing the result.
    /// A cancel raised before the call stops this search at once; the token
    /// is cleared once the search returns.
    pub fn request_ai_move(&mut self, budget: SearchBudget) -> Result<SearchOutcome, GameError> {
        if self.outcome.is_some() {
            return Err(GameError::GameOver);
        }
        let searcher = Searcher::new(&*self.brain, self.eval, self.search);
        let result = searcher.search(&self.board, budget, &self.cancel, &mut self.rng);
        self.cancel.reset();
        Ok(result?)
    }

    pub fn play_ai_move(&mut self, budget: SearchBudget) -> Result<(SearchOutcome, GameState), GameError> {
        let outcome = self.request_ai_move(budget)?;
        let state = self.attempt_move(outcome.best)?;
        Ok((outcome, state))
    }

    /// `color` ran out of time; the other side wins.
    pub fn forfeit_on_time(&mut self, color: Color) -> Result<GameOutcome, GameError> {
        if self.outcome.is_some() {
            return Err(GameError::GameOver);
        }
        let outcome = GameOutcome { result: GameResult::win_for(color.opposite()), termination: Termination::Timeout };
        self.finish(outcome);
        Ok(outcome)
    }

    fn finish(&mut self, outcome: GameOutcome) {
        self.outcome = Some(outcome);
        self.record.finish(outcome);
        info!(
            "game over after {} plies: {:?} ({:?})",
            self.record.plies().len(),
            outcome.result,
            outcome.termination
        );
        self.learned = self.brain.record_game(&self.record);
        match self.brain.save() {
            Ok(Some(report)) => info!("brain saved to {} ({} bytes)", report.path.display(), report.bytes),
            Ok(None) => {}
            Err(e) => warn!("brain save failed, will retry at the next checkpoint: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::BrainConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn moves_are_refused_after_the_game_ends() {
        let mut brain = Brain::new(BrainConfig::default());
        let mut game = Game::new(&mut brain, &Config::default());
        game.forfeit_on_time(Color::White).unwrap();
        assert_eq!(game.current_result().map(|o| o.result), Some(GameResult::BlackWin));
        assert!(game.legal_moves_for_current_player().is_empty());
        assert_eq!(game.attempt_uci("e2e4").unwrap_err().reason, IllegalMoveReason::GameOver);
        assert_eq!(game.request_ai_move(SearchBudget::iterations(5)).unwrap_err(), GameError::GameOver);
        assert_eq!(game.forfeit_on_time(Color::Black).unwrap_err(), GameError::GameOver);
    }

    #[test]
    fn cancel_before_the_search_is_honoured_once() {
        let mut brain = Brain::new(BrainConfig::default());
        let mut config = Config::default();
        config.search.root_exploration = false;
        let mut game = Game::new(&mut brain, &config);
        game.cancel_token().cancel();
        let stopped = game.request_ai_move(SearchBudget::iterations(50)).unwrap();
        assert_eq!(stopped.iterations, 0);
        assert!(game.legal_moves_for_current_player().contains(&stopped.best));
        assert!(!game.cancel_token().is_cancelled());
        let full = game.request_ai_move(SearchBudget::iterations(50)).unwrap();
        assert_eq!(full.iterations, 50);
    }

    #[test]
    fn finished_start_position_is_learned_at_once() {
        let mut brain = Brain::new(BrainConfig::default());
        let mated = Board::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
        let game = Game::from_board(&mut brain, &Config::default(), mated);
        assert_eq!(game.current_result().map(|o| o.termination), Some(Termination::Checkmate));
        assert!(game.learning_report().is_some());
        drop(game);
        assert_eq!(brain.games_played(), 1);
    }
}
