use pretty_assertions::assert_eq;
use tdchess::brain::{Brain, BrainConfig};
use tdchess::error::IllegalMoveReason;
use tdchess::{Board, Color, Config, Game, GameResult, MoveRequest, PieceKind, SearchBudget, Square, Termination};

fn brain() -> Brain {
    Brain::new(BrainConfig::default())
}

fn quiet_config() -> Config {
    let mut c = Config::default();
    c.search.root_exploration = false;
    c
}

fn from_fen<'b>(brain: &'b mut Brain, fen: &str) -> Game<'b> {
    Game::from_board(brain, &quiet_config(), Board::from_fen(fen).unwrap())
}

#[test]
fn opening_moves_update_the_board() {
    let mut b = brain();
    let mut game = Game::new(&mut b, &quiet_config());
    assert_eq!(game.legal_moves_for_current_player().len(), 20);
    game.attempt_uci("e2e4").unwrap();
    game.attempt_uci("e7e5").unwrap();
    let state = game.attempt_uci("g1f3").unwrap();

    let f3 = Square::new(5, 2);
    assert_eq!(state.board.piece_at(f3).map(|p| (p.color, p.kind)), Some((Color::White, PieceKind::Knight)));
    assert!(!state.in_check);
    assert!(state.outcome.is_none());
    assert_eq!(game.side_to_move(), Color::Black);
    assert_eq!(game.record().uci_moves(), vec!["e2e4", "e7e5", "g1f3"]);
    assert!(game.record().plies().iter().all(|p| !p.gives_check && !p.gives_mate));
}

#[test]
fn back_rank_mate_is_a_win() {
    let mut b = brain();
    let mut game = from_fen(&mut b, "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
    let state = game.attempt_uci("a1a8").unwrap();
    assert!(state.in_check);
    let outcome = state.outcome.unwrap();
    assert_eq!(outcome.result, GameResult::WhiteWin);
    assert_eq!(outcome.termination, Termination::Checkmate);
    assert!(game.record().plies()[0].gives_mate);
    assert!(game.legal_moves_for_current_player().is_empty());
    drop(game);
    assert_eq!(b.stats().white_wins, 1);
}

#[test]
fn stalemate_is_a_draw() {
    let mut b = brain();
    let mut game = from_fen(&mut b, "k7/8/8/1Q6/8/8/8/7K w - - 0 1");
    let outcome = game.attempt_uci("b5b6").unwrap().outcome.unwrap();
    assert_eq!(outcome.result, GameResult::Draw);
    assert_eq!(outcome.termination, Termination::Stalemate);
}

#[test]
fn bare_kings_are_insufficient_material() {
    let mut b = brain();
    let mut game = from_fen(&mut b, "4k3/8/8/8/8/8/3r4/4K3 w - - 0 1");
    let outcome = game.attempt_uci("e1d2").unwrap().outcome.unwrap();
    assert_eq!(outcome.termination, Termination::InsufficientMaterial);
}

#[test]
fn fifty_quiet_moves_draw() {
    let mut b = brain();
    let mut game = from_fen(&mut b, "4k3/8/8/8/8/8/8/R3K3 w - - 99 80");
    let outcome = game.attempt_uci("a1a2").unwrap().outcome.unwrap();
    assert_eq!(outcome.termination, Termination::FiftyMoveRule);
}

#[test]
fn third_repetition_draws() {
    let mut b = brain();
    let mut game = Game::new(&mut b, &quiet_config());
    let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
    for text in shuffle.iter().chain(&shuffle[..3]) {
        assert!(game.attempt_uci(text).unwrap().outcome.is_none(), "ended early at {text}");
    }
    let outcome = game.attempt_uci("f6g8").unwrap().outcome.unwrap();
    assert_eq!(outcome.termination, Termination::Repetition);
    assert_eq!(outcome.result, GameResult::Draw);
}

#[test]
fn illegal_moves_say_why() {
    let mut b = brain();
    let mut game = Game::new(&mut b, &quiet_config());
    let reason = |g: &mut Game<'_>, t: &str| g.attempt_uci(t).unwrap_err().reason;
    assert_eq!(reason(&mut game, "e7e5"), IllegalMoveReason::WrongTurn);
    assert_eq!(reason(&mut game, "e3e4"), IllegalMoveReason::NoPieceAtOrigin);
    assert_eq!(reason(&mut game, "e2e5"), IllegalMoveReason::DestinationUnreachable);
    assert_eq!(reason(&mut game, "e1g1"), IllegalMoveReason::CastlingPreconditionUnmet);
    assert_eq!(game.record().plies().len(), 0);
    assert_eq!(game.board(), &Board::startpos());
}

#[test]
fn pinned_piece_cannot_leave() {
    let mut b = brain();
    let mut game = from_fen(&mut b, "4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1");
    assert_eq!(game.attempt_uci("e2d3").unwrap_err().reason, IllegalMoveReason::KingInCheck);
}

#[test]
fn promotion_must_be_named() {
    let mut b = brain();
    let mut game = from_fen(&mut b, "8/4P3/8/8/8/8/k7/4K3 w - - 0 1");
    assert_eq!(game.attempt_uci("e7e8").unwrap_err().reason, IllegalMoveReason::PromotionRequired);
    let req = MoveRequest::new(Square::new(4, 6), Square::new(4, 7)).with_promotion(PieceKind::King);
    assert_eq!(game.attempt_move(req).unwrap_err().reason, IllegalMoveReason::InvalidPromotion);
    let state = game.attempt_uci("e7e8n").unwrap();
    assert_eq!(state.board.piece_at(Square::new(4, 7)).map(|p| p.kind), Some(PieceKind::Knight));
}

#[test]
fn time_forfeit_is_learned_as_a_loss() {
    let mut b = brain();
    let mut game = Game::new(&mut b, &quiet_config());
    game.set_ai_color(Some(Color::White));
    game.attempt_uci("e2e4").unwrap();
    let outcome = game.forfeit_on_time(Color::Black).unwrap();
    assert_eq!(outcome.result, GameResult::WhiteWin);
    assert_eq!(outcome.termination, Termination::Timeout);
    assert_eq!(game.learning_report().map(|r| r.positions), Some(2));
    drop(game);
    assert_eq!(b.stats().ai_wins, 1);
    assert_eq!(b.len(), 2);
}

#[test]
fn ai_plays_legal_moves_until_the_game_ends() {
    let mut b = brain();
    let mut game = from_fen(&mut b, "4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
    for _ in 0..60 {
        if game.is_over() {
            break;
        }
        let before = *game.board();
        let (outcome, state) = game.play_ai_move(SearchBudget::iterations(40)).unwrap();
        assert!(tdchess::rules::legal_moves(&before).contains(&outcome.best));
        assert_eq!(state.last_move, Some(outcome.best));
    }
}
