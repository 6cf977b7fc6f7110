//! The learning brain: a fingerprint → value table trained with TD updates
//! at the end of every game and persisted between runs.

pub mod store;

use std::collections::HashMap;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::board::Color;
use crate::error::PersistenceError;
use crate::fingerprint::Fingerprint;
use crate::record::GameRecord;
use crate::rules::GameResult;

pub use store::{BrainStore, BrainSummary, SaveReport, StoreConfig};

/// Learning hyperparameters. Persisted with the value table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainConfig {
    pub learning_rate: f64,
    pub discount: f64,
    pub initial_exploration: f64,
    pub exploration_floor: f64,
    /// Linear decrease of the exploration rate per completed game.
    pub exploration_decay: f64,
    /// Per-ply weight applied walking back from the end; 1.0 disables it.
    pub recency_decay: f64,
    /// Copy the store aside every this many games; 0 disables backups.
    pub backup_every: u64,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.3,
            discount: 0.98,
            initial_exploration: 0.40,
            exploration_floor: 0.10,
            exploration_decay: 0.001,
            recency_decay: 1.0,
            backup_every: 10,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionStats {
    /// Expected result for the side to move, in [-1, 1].
    pub value: f64,
    pub visits: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainStats {
    pub games_played: u64,
    pub white_wins: u64,
    pub black_wins: u64,
    pub draws: u64,
    /// Results counted only for games that named the AI's color.
    pub ai_wins: u64,
    pub ai_losses: u64,
    pub ai_draws: u64,
}

impl BrainStats {
    /// AI win percentage over the games the AI is known to have played.
    pub fn ai_win_rate(&self) -> f64 {
        let total = self.ai_wins + self.ai_losses + self.ai_draws;
        if total == 0 { 0.0 } else { self.ai_wins as f64 * 100.0 / total as f64 }
    }
}

/// Summary of one learning session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LearningReport {
    pub positions: usize,
    pub new_positions: usize,
    pub result: GameResult,
    pub exploration_rate: f64,
}

pub struct Brain {
    config: BrainConfig,
    positions: HashMap<Fingerprint, PositionStats>,
    stats: BrainStats,
    store: Option<BrainStore>,
    dirty: bool,
}

impl Brain {
    /// An empty, in-memory brain.
    pub fn new(config: BrainConfig) -> Self {
        Self { config, positions: HashMap::new(), stats: BrainStats::default(), store: None, dirty: false }
    }

    /// Loads the brain from `store`. A missing or corrupt store is not fatal:
    /// the brain starts empty with `config` and the failure is logged.
    pub fn open(config: BrainConfig, store: BrainStore) -> Self {
        let mut brain = match store.load() {
            Ok(loaded) => {
                info!(
                    "loaded brain from {}: {} games, {} positions",
                    store.path().display(),
                    loaded.stats.games_played,
                    loaded.positions.len()
                );
                loaded
            }
            Err(PersistenceError::Io { ref source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                info!("no brain at {}, starting fresh", store.path().display());
                Brain::new(config)
            }
            Err(e) => {
                warn!("could not load brain from {}: {e}; starting fresh", store.path().display());
                Brain::new(config)
            }
        };
        brain.store = Some(store);
        brain
    }

    pub(crate) fn from_parts(config: BrainConfig, stats: BrainStats, positions: HashMap<Fingerprint, PositionStats>) -> Self {
        Self { config, positions, stats, store: None, dirty: false }
    }

    pub fn config(&self) -> &BrainConfig { &self.config }
    pub fn stats(&self) -> &BrainStats { &self.stats }
    pub fn games_played(&self) -> u64 { self.stats.games_played }
    pub fn store(&self) -> Option<&BrainStore> { self.store.as_ref() }
    /// True when learning happened since the last successful save.
    pub fn is_dirty(&self) -> bool { self.dirty }
    pub fn len(&self) -> usize { self.positions.len() }
    pub fn is_empty(&self) -> bool { self.positions.is_empty() }

    pub fn positions(&self) -> impl Iterator<Item = (&Fingerprint, &PositionStats)> {
        self.positions.iter()
    }

    pub fn total_visits(&self) -> u64 {
        self.positions.values().map(|p| p.visits as u64).sum()
    }

    /// Learned value and visit count; `(0.0, 0)` for unseen positions.
    pub fn value_of(&self, fp: Fingerprint) -> (f64, u32) {
        self.positions.get(&fp).map_or((0.0, 0), |p| (p.value, p.visits))
    }

    /// Overwrites one entry, e.g. to seed a brain in tests or tools.
    pub fn set_value(&mut self, fp: Fingerprint, value: f64, visits: u32) {
        self.positions.insert(fp, PositionStats { value: value.clamp(-1.0, 1.0), visits });
        self.dirty = true;
    }

    /// `max(floor, initial - decay * games_played)`.
    pub fn exploration_rate(&self) -> f64 {
        let c = &self.config;
        let decayed = c.initial_exploration - c.exploration_decay * self.stats.games_played as f64;
        decayed.max(c.exploration_floor)
    }

    /// TD(0) pass over a finished game, walking back from the final position.
    /// Returns `None` when the record has no outcome yet.
    pub fn record_game(&mut self, record: &GameRecord) -> Option<LearningReport> {
        let Some(outcome) = record.outcome() else {
            warn!("ignoring game record without an outcome");
            return None;
        };
        let result = outcome.result;
        let positions: Vec<(Fingerprint, Color)> = record.positions().collect();
        let n = positions.len();
        let BrainConfig { learning_rate, discount, recency_decay, .. } = self.config;

        let mut new_positions = 0;
        let mut next: Option<(f64, Color)> = None;
        for (i, &(fp, side)) in positions.iter().enumerate().rev() {
            let target = match next {
                None => result.score_for(side),
                Some((v, next_side)) => {
                    let sign = if next_side == side { 1.0 } else { -1.0 };
                    sign * discount * v
                }
            };
            let weight = recency_decay.powi((n - 1 - i) as i32);
            let entry = self.positions.entry(fp).or_insert_with(|| {
                new_positions += 1;
                PositionStats::default()
            });
            entry.value = (entry.value + learning_rate * weight * (target - entry.value)).clamp(-1.0, 1.0);
            entry.visits = entry.visits.saturating_add(1);
            next = Some((entry.value, side));
        }

        self.stats.games_played += 1;
        match result {
            GameResult::WhiteWin => self.stats.white_wins += 1,
            GameResult::BlackWin => self.stats.black_wins += 1,
            GameResult::Draw => self.stats.draws += 1,
        }
        if let Some(ai) = record.ai_color() {
            match result.winner() {
                Some(w) if w == ai => self.stats.ai_wins += 1,
                Some(_) => self.stats.ai_losses += 1,
                None => self.stats.ai_draws += 1,
            }
        }
        self.dirty = true;

        let report = LearningReport { positions: n, new_positions, result, exploration_rate: self.exploration_rate() };
        info!(
            "learned game #{} ({:?} by {:?}): {} positions, {} new, {} known, exploration {:.1}%",
            self.stats.games_played,
            result,
            outcome.termination,
            n,
            new_positions,
            self.positions.len(),
            report.exploration_rate * 100.0
        );
        Some(report)
    }

    /// Persists the brain atomically. Without a store this is a no-op.
    /// On failure the brain stays dirty so the next checkpoint retries.
    pub fn save(&mut self) -> Result<Option<SaveReport>, PersistenceError> {
        let Some(store) = self.store.as_ref() else { return Ok(None) };
        let report = store.save(self)?;
        self.dirty = false;
        Ok(Some(report))
    }

    /// Archives the current store (when there is one) and forgets everything
    /// learned, keeping the hyperparameters.
    pub fn reset(&mut self) -> Result<Option<std::path::PathBuf>, PersistenceError> {
        let archived = match self.store.as_ref() {
            Some(store) => store.archive()?,
            None => None,
        };
        self.positions.clear();
        self.stats = BrainStats::default();
        self.dirty = true;
        info!("brain reset{}", archived.as_ref().map(|p| format!(", old store archived to {}", p.display())).unwrap_or_default());
        Ok(archived)
    }
}
