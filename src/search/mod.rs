//! Move selection by Monte Carlo tree search guided by the evaluator.

pub mod mcts;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use rand::rngs::SmallRng;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Move};
use crate::brain::Brain;
use crate::error::SearchError;
use crate::eval::{EvalWeights, Evaluator};
use crate::rules::legal_moves;

use mcts::Tree;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub exploration_constant: f64,
    pub base_iterations: u32,
    pub per_game_bonus: u32,
    pub max_iterations: u32,
    /// Root-split workers; 1 searches on the calling thread.
    pub threads: usize,
    /// Seed for the orchestrator's RNG (exploration picks).
    pub seed: u64,
    /// Allow the brain's exploration rate to pick a random root move.
    pub root_exploration: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exploration_constant: 1.41,
            base_iterations: 100,
            per_game_bonus: 5,
            max_iterations: 800,
            threads: 1,
            seed: 0x7D_C4E5,
            root_exploration: true,
        }
    }
}

impl SearchConfig {
    /// Iteration count that grows with experience, capped at `max_iterations`.
    pub fn iterations_for(&self, games_played: u64) -> u32 {
        let bonus = (self.per_game_bonus as u64).saturating_mul(games_played);
        let n = (self.base_iterations as u64).saturating_add(bonus);
        n.min(self.max_iterations as u64) as u32
    }
}

/// Per-call limits. Unset fields fall back to the configured defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchBudget {
    pub iterations: Option<u32>,
    pub time_limit: Option<Duration>,
}

impl SearchBudget {
    pub fn iterations(n: u32) -> Self {
        Self { iterations: Some(n), time_limit: None }
    }

    pub fn time(limit: Duration) -> Self {
        Self { iterations: None, time_limit: Some(limit) }
    }
}

/// Shared stop flag. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Statistics for one root move after the search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootChildStats {
    pub mv: Move,
    pub visits: u32,
    /// Mean value from the root mover's perspective, or the prior if unvisited.
    pub mean: f64,
    pub prior: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchOutcome {
    pub best: Move,
    /// The move was a random exploration pick, not the search result.
    pub explored: bool,
    pub iterations: u32,
    /// In legal move generation order.
    pub children: Vec<RootChildStats>,
}

/// Limits shared by every worker of one search call.
#[derive(Clone, Copy)]
pub(crate) struct Limits<'c> {
    pub deadline: Option<Instant>,
    pub cancel: &'c CancelToken,
}

impl Limits<'_> {
    pub fn expired(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Robust child: most visits, then higher mean, then coordinate order.
pub fn select_robust(children: &[RootChildStats]) -> Option<&RootChildStats> {
    children.iter().reduce(|best, c| {
        let better = c.visits > best.visits
            || (c.visits == best.visits && c.mean > best.mean)
            || (c.visits == best.visits && c.mean == best.mean && c.mv.coordinate_cmp(&best.mv).is_lt());
        if better { c } else { best }
    })
}

/// Splits `total` into `groups` round-robin slices of `moves` and hands each
/// a share of iterations proportional to its size.
fn partition(moves: &[Move], groups: usize, total: u32) -> Vec<(Vec<Move>, u32)> {
    let mut parts: Vec<Vec<Move>> = vec![Vec::new(); groups];
    for (i, &mv) in moves.iter().enumerate() {
        parts[i % groups].push(mv);
    }
    let n = moves.len() as u64;
    let mut assigned = 0u32;
    let mut out: Vec<(Vec<Move>, u32)> = parts
        .into_iter()
        .map(|p| {
            let share = (total as u64 * p.len() as u64 / n) as u32;
            assigned += share;
            (p, share)
        })
        .collect();
    for part in out.iter_mut().take((total - assigned) as usize) {
        part.1 += 1;
    }
    out
}

pub struct Searcher<'a> {
    evaluator: Evaluator<'a>,
    config: SearchConfig,
}

impl<'a> Searcher<'a> {
    pub fn new(brain: &'a Brain, weights: EvalWeights, config: SearchConfig) -> Self {
        Self { evaluator: Evaluator::new(brain, weights), config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Picks a move for the side to move on `board`.
    pub fn search(
        &self,
        board: &Board,
        budget: SearchBudget,
        cancel: &CancelToken,
        rng: &mut SmallRng,
    ) -> Result<SearchOutcome, SearchError> {
        let moves = legal_moves(board);
        if moves.is_empty() {
            return Err(SearchError::NoLegalMoves);
        }

        let brain = self.evaluator.brain();
        if self.config.root_exploration {
            let rate = brain.exploration_rate();
            if rng.gen::<f64>() < rate {
                let best = moves[rng.gen_range(0..moves.len())];
                debug!("exploration pick {best} (rate {:.3})", rate);
                let tree = Tree::new(board, &moves, self.evaluator, self.config.exploration_constant);
                return Ok(SearchOutcome { best, explored: true, iterations: 0, children: tree.root_stats() });
            }
        }

        let iterations = budget.iterations.unwrap_or_else(|| self.config.iterations_for(brain.games_played()));
        let limits = Limits { deadline: budget.time_limit.map(|d| Instant::now() + d), cancel };
        let started = Instant::now();

        let groups = self.config.threads.max(1).min(moves.len());
        let (children, done) = if groups > 1 {
            let evaluator = self.evaluator;
            let c = self.config.exploration_constant;
            let results: Vec<(Vec<RootChildStats>, u32)> = partition(&moves, groups, iterations)
                .par_iter()
                .map(|(part, share)| {
                    let mut tree = Tree::new(board, part, evaluator, c);
                    let done = tree.run(*share, &limits);
                    (tree.root_stats(), done)
                })
                .collect();
            let done = results.iter().map(|r| r.1).sum();
            let mut merged: Vec<RootChildStats> = results.into_iter().flat_map(|r| r.0).collect();
            merged.sort_by_key(|s| moves.iter().position(|m| *m == s.mv));
            (merged, done)
        } else {
            let mut tree = Tree::new(board, &moves, self.evaluator, self.config.exploration_constant);
            let done = tree.run(iterations, &limits);
            (tree.root_stats(), done)
        };

        let best = select_robust(&children).map(|s| s.mv).ok_or(SearchError::NoLegalMoves)?;
        debug!(
            "mcts: {done}/{iterations} iterations in {:?} over {} root moves ({groups} workers), best {best}",
            started.elapsed(),
            children.len()
        );
        Ok(SearchOutcome { best, explored: false, iterations: done, children })
    }
}

/// One-shot convenience over [`Searcher`].
pub fn search(
    board: &Board,
    brain: &Brain,
    config: &SearchConfig,
    weights: &EvalWeights,
    budget: SearchBudget,
    cancel: &CancelToken,
    rng: &mut SmallRng,
) -> Result<SearchOutcome, SearchError> {
    Searcher::new(brain, *weights, *config).search(board, budget, cancel, rng)
}
