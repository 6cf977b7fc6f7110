//! JSON persistence for the brain.
//!
//! Saves are atomic: the document is written to `<store>.tmp`, read back and
//! verified, optionally copied into the backup directory, and only then
//! renamed over the previous store. A human-readable summary is written next
//! to the store after every successful save.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{Brain, BrainConfig, BrainStats, PositionStats};
use crate::error::PersistenceError;
use crate::fingerprint::Fingerprint;

pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub backup_dir: PathBuf,
    pub summary_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("brain.json"),
            backup_dir: PathBuf::from("brain_backups"),
            summary_path: PathBuf::from("brain_summary.json"),
        }
    }
}

impl StoreConfig {
    /// Store at `path`, with the backup directory and summary placed beside it.
    pub fn beside(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self { backup_dir: dir.join("brain_backups"), summary_path: dir.join("brain_summary.json"), path }
    }
}

#[derive(Serialize, Deserialize)]
struct BrainDocument {
    version: u32,
    saved_at: String,
    hyperparameters: BrainConfig,
    stats: BrainStats,
    /// Current exploration rate, for inspection only.
    exploration_rate: f64,
    positions: BTreeMap<String, PositionStats>,
}

/// The companion summary written next to the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrainSummary {
    pub games: u64,
    pub white_wins: u64,
    pub black_wins: u64,
    pub draws: u64,
    pub ai_wins: u64,
    pub ai_losses: u64,
    pub ai_draws: u64,
    pub ai_win_rate: f64,
    pub positions_learned: usize,
    pub total_visits: u64,
    pub exploration_rate: f64,
    pub last_updated: String,
}

impl BrainSummary {
    pub fn of(brain: &Brain) -> Self {
        let s = brain.stats();
        Self {
            games: s.games_played,
            white_wins: s.white_wins,
            black_wins: s.black_wins,
            draws: s.draws,
            ai_wins: s.ai_wins,
            ai_losses: s.ai_losses,
            ai_draws: s.ai_draws,
            ai_win_rate: s.ai_win_rate(),
            positions_learned: brain.len(),
            total_visits: brain.total_visits(),
            exploration_rate: brain.exploration_rate(),
            last_updated: chrono::Local::now().to_rfc3339(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveReport {
    pub path: PathBuf,
    pub bytes: u64,
    pub backup: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrainStore {
    path: PathBuf,
    backup_dir: PathBuf,
    summary_path: PathBuf,
}

impl BrainStore {
    /// Store at `path`, with the backup directory and summary placed beside it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::from_config(&StoreConfig::beside(path))
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            path: config.path.clone(),
            backup_dir: config.backup_dir.clone(),
            summary_path: config.summary_path.clone(),
        }
    }

    pub fn path(&self) -> &Path { &self.path }
    pub fn backup_dir(&self) -> &Path { &self.backup_dir }
    pub fn summary_path(&self) -> &Path { &self.summary_path }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| "brain.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Backup file name for a given game count.
    pub fn backup_path(&self, games_played: u64) -> PathBuf {
        self.backup_dir.join(format!("brain_game{games_played:06}.json"))
    }

    fn ensure_parent(path: &Path) -> Result<(), PersistenceError> {
        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                fs::create_dir_all(dir).map_err(|e| PersistenceError::io(dir, e))
            }
            _ => Ok(()),
        }
    }

    fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<u64, PersistenceError> {
        Self::ensure_parent(path)?;
        let file = File::create(path).map_err(|e| PersistenceError::io(path, e))?;
        let mut w = BufWriter::new(file);
        if pretty {
            serde_json::to_writer_pretty(&mut w, value)?;
        } else {
            serde_json::to_writer(&mut w, value)?;
        }
        w.flush().map_err(|e| PersistenceError::io(path, e))?;
        let file = w.into_inner().map_err(|e| PersistenceError::io(path, e.into_error()))?;
        file.sync_all().map_err(|e| PersistenceError::io(path, e))?;
        let meta = file.metadata().map_err(|e| PersistenceError::io(path, e))?;
        Ok(meta.len())
    }

    fn read_document(path: &Path) -> Result<BrainDocument, PersistenceError> {
        let file = File::open(path).map_err(|e| PersistenceError::io(path, e))?;
        let doc: BrainDocument = serde_json::from_reader(BufReader::new(file))?;
        if doc.version != DOCUMENT_VERSION {
            return Err(PersistenceError::UnsupportedVersion(doc.version));
        }
        Ok(doc)
    }

    pub fn save(&self, brain: &Brain) -> Result<SaveReport, PersistenceError> {
        let positions: BTreeMap<String, PositionStats> =
            brain.positions().map(|(fp, stats)| (fp.to_string(), *stats)).collect();
        let doc = BrainDocument {
            version: DOCUMENT_VERSION,
            saved_at: chrono::Local::now().to_rfc3339(),
            hyperparameters: *brain.config(),
            stats: *brain.stats(),
            exploration_rate: brain.exploration_rate(),
            positions,
        };

        let tmp = self.tmp_path();
        let bytes = Self::write_json(&tmp, &doc, false)?;

        let check = Self::read_document(&tmp)?;
        if check.positions.len() != doc.positions.len() || check.stats != doc.stats {
            return Err(PersistenceError::Verify(format!(
                "{} holds {} positions, expected {}",
                tmp.display(),
                check.positions.len(),
                doc.positions.len()
            )));
        }

        let games = brain.stats().games_played;
        let every = brain.config().backup_every;
        let backup = if every > 0 && games > 0 && games % every == 0 {
            let dest = self.backup_path(games);
            Self::ensure_parent(&dest)?;
            fs::copy(&tmp, &dest).map_err(|e| PersistenceError::io(&dest, e))?;
            info!("brain backup written to {}", dest.display());
            Some(dest)
        } else {
            None
        };

        fs::rename(&tmp, &self.path).map_err(|e| PersistenceError::io(&self.path, e))?;
        Self::write_json(&self.summary_path, &BrainSummary::of(brain), true)?;
        debug!("brain saved to {} ({} bytes, {} positions)", self.path.display(), bytes, doc.positions.len());
        Ok(SaveReport { path: self.path.clone(), bytes, backup })
    }

    /// Strict load; callers that want degradation use [`Brain::open`].
    pub fn load(&self) -> Result<Brain, PersistenceError> {
        Self::load_file(&self.path)
    }

    /// Loads any brain document, e.g. a backup.
    pub fn load_file(path: &Path) -> Result<Brain, PersistenceError> {
        let doc = Self::read_document(path)?;
        let mut positions = HashMap::with_capacity(doc.positions.len());
        for (key, stats) in doc.positions {
            let fp: Fingerprint = key.parse().map_err(|_| PersistenceError::Key(key.clone()))?;
            positions.insert(fp, stats);
        }
        Ok(Brain::from_parts(doc.hyperparameters, doc.stats, positions))
    }

    /// Moves the current store into the backup directory under a timestamped
    /// name. Returns the archive path, or `None` when there was nothing to move.
    pub fn archive(&self) -> Result<Option<PathBuf>, PersistenceError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let dest = self.backup_dir.join(format!("brain_reset_{stamp}.json"));
        Self::ensure_parent(&dest)?;
        fs::rename(&self.path, &dest).map_err(|e| PersistenceError::io(&dest, e))?;
        Ok(Some(dest))
    }

    pub fn read_summary(&self) -> Result<BrainSummary, PersistenceError> {
        let file = File::open(&self.summary_path).map_err(|e| PersistenceError::io(&self.summary_path, e))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
