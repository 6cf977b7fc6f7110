use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tdchess::brain::{Brain, BrainConfig};
use tdchess::eval::EvalWeights;
use tdchess::rules::legal_moves;
use tdchess::search::{search, SearchConfig};
use tdchess::{Board, CancelToken, SearchBudget};

fn no_exploration(threads: usize) -> SearchConfig {
    SearchConfig { root_exploration: false, threads, ..SearchConfig::default() }
}

fn best(fen: &str, config: &SearchConfig, iterations: u32) -> String {
    let brain = Brain::new(BrainConfig::default());
    let board = Board::from_fen(fen).unwrap();
    let mut rng = SmallRng::seed_from_u64(9);
    let out = search(&board, &brain, config, &EvalWeights::default(), SearchBudget::iterations(iterations), &CancelToken::new(), &mut rng)
        .unwrap();
    out.best.to_string()
}

#[test]
fn finds_back_rank_mate_for_white() {
    assert_eq!(best("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", &no_exploration(1), 400), "a1a8");
}

#[test]
fn finds_back_rank_mate_for_black() {
    assert_eq!(best("r5k1/8/8/8/8/8/5PPP/6K1 b - - 0 1", &no_exploration(1), 400), "a8a1");
}

#[test]
fn parallel_search_finds_the_mate_too() {
    assert_eq!(best("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", &no_exploration(4), 800), "a1a8");
}

#[test]
fn fixed_seed_and_budget_are_deterministic() {
    let brain = Brain::new(BrainConfig::default());
    let board = Board::startpos();
    let config = SearchConfig::default();
    let run = || {
        let mut rng = SmallRng::seed_from_u64(1234);
        (0..5)
            .map(|_| {
                search(&board, &brain, &config, &EvalWeights::default(), SearchBudget::iterations(150), &CancelToken::new(), &mut rng)
                    .unwrap()
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn root_visits_add_up_across_workers() {
    let brain = Brain::new(BrainConfig::default());
    let board = Board::startpos();
    let mut rng = SmallRng::seed_from_u64(3);
    let out = search(&board, &brain, &no_exploration(3), &EvalWeights::default(), SearchBudget::iterations(301), &CancelToken::new(), &mut rng)
        .unwrap();
    assert_eq!(out.iterations, 301);
    assert_eq!(out.children.len(), 20);
    assert_eq!(out.children.iter().map(|c| c.visits).sum::<u32>(), 301);
    let order: Vec<_> = out.children.iter().map(|c| c.mv).collect();
    assert_eq!(order, legal_moves(&board));
}

#[test]
fn time_limit_stops_a_huge_budget() {
    let brain = Brain::new(BrainConfig::default());
    let board = Board::startpos();
    let mut rng = SmallRng::seed_from_u64(4);
    let budget = SearchBudget { iterations: Some(10_000_000), time_limit: Some(Duration::from_millis(50)) };
    let started = Instant::now();
    let out = search(&board, &brain, &no_exploration(1), &EvalWeights::default(), budget, &CancelToken::new(), &mut rng).unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(out.iterations < 10_000_000);
    assert!(legal_moves(&board).contains(&out.best));
}

#[test]
fn cancel_from_another_thread() {
    let brain = Brain::new(BrainConfig::default());
    let board = Board::startpos();
    let cancel = CancelToken::new();
    let remote = cancel.clone();
    let stopper = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(30));
        remote.cancel();
    });
    let mut rng = SmallRng::seed_from_u64(8);
    let out = search(&board, &brain, &no_exploration(1), &EvalWeights::default(), SearchBudget::iterations(10_000_000), &cancel, &mut rng)
        .unwrap();
    stopper.join().unwrap();
    assert!(out.iterations < 10_000_000);
    assert!(legal_moves(&board).contains(&out.best));
}

#[test]
fn learned_values_shape_the_priors() {
    let board = Board::startpos();
    let favourite = legal_moves(&board).into_iter().find(|m| m.to_string() == "a2a3").unwrap();
    let mut brain = Brain::new(BrainConfig::default());
    // The position after a2a3 is lost for black, so great for white.
    brain.set_value(board.apply(favourite).fingerprint(), -1.0, 10_000);
    let mut rng = SmallRng::seed_from_u64(5);
    let out = search(&board, &brain, &no_exploration(1), &EvalWeights::default(), SearchBudget::iterations(0), &CancelToken::new(), &mut rng)
        .unwrap();
    let top = out.children.iter().max_by(|a, b| a.prior.total_cmp(&b.prior)).unwrap();
    assert_eq!(top.mv, favourite);
    assert!(top.prior > 0.3);
}
