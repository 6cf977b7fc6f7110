//! The brain playing both sides, learning after every game.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::brain::Brain;
use crate::config::Config;
use crate::error::GameError;
use crate::game::Game;
use crate::rules::GameOutcome;
use crate::search::SearchBudget;

#[derive(Clone, Debug)]
pub struct SelfPlayParams {
    pub games: usize,
    /// Games still running at this many plies are abandoned and not learned.
    pub max_plies: usize,
    /// Fixed iterations per move; `None` uses the experience-scaled default.
    pub iterations: Option<u32>,
    pub movetime_ms: Option<u64>,
    pub seed: u64,
    /// Optional FEN/EPD list, one position per line.
    pub openings_path: Option<PathBuf>,
}

impl Default for SelfPlayParams {
    fn default() -> Self {
        Self { games: 10, max_plies: 300, iterations: None, movetime_ms: None, seed: 42, openings_path: None }
    }
}

/// A finished (or abandoned) self-play game, ready for export.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelfPlayGame {
    pub start_fen: String,
    pub moves: Vec<String>,
    /// `None` when the ply cap was hit first.
    pub outcome: Option<GameOutcome>,
    pub explored_moves: usize,
}

/// Plays one game. `on_ply` is called after every move.
pub fn play_game(
    brain: &mut Brain,
    config: &Config,
    start: Board,
    params: &SelfPlayParams,
    seed: u64,
    mut on_ply: impl FnMut(usize),
) -> Result<SelfPlayGame, GameError> {
    let budget = SearchBudget {
        iterations: params.iterations,
        time_limit: params.movetime_ms.map(Duration::from_millis),
    };
    let mut game = Game::from_board(brain, config, start);
    game.reseed(seed);
    let mut explored_moves = 0;
    let mut plies = 0;
    while !game.is_over() && plies < params.max_plies {
        let (search, _) = game.play_ai_move(budget)?;
        explored_moves += search.explored as usize;
        plies += 1;
        on_ply(plies);
    }
    if !game.is_over() {
        warn!("self-play game abandoned at the {} ply cap", params.max_plies);
    }
    Ok(SelfPlayGame {
        start_fen: game.record().start_fen().to_string(),
        moves: game.record().uci_moves(),
        outcome: game.current_result(),
        explored_moves,
    })
}

/// Plays `params.games` games in sequence on one brain.
pub fn generate_games(
    brain: &mut Brain,
    config: &Config,
    params: &SelfPlayParams,
    mut on_game: impl FnMut(usize, &SelfPlayGame),
) -> Result<Vec<SelfPlayGame>, GameError> {
    let mut rng = SmallRng::seed_from_u64(params.seed);
    let openings = load_openings(params);
    let mut games = Vec::with_capacity(params.games);
    for gi in 0..params.games {
        let start = if openings.is_empty() {
            Board::startpos()
        } else {
            openings[rng.gen_range(0..openings.len())]
        };
        let seed = rng.gen::<u64>() ^ gi as u64;
        let g = play_game(brain, config, start, params, seed, |_| {})?;
        on_game(gi, &g);
        games.push(g);
    }
    let s = brain.stats();
    info!(
        "self-play done: {} games, brain now {} games / {} positions (W {} B {} D {})",
        games.len(),
        s.games_played,
        brain.len(),
        s.white_wins,
        s.black_wins,
        s.draws
    );
    Ok(games)
}

/// Accepts full FEN or 4-field EPD; blank lines and `#` comments are skipped.
fn load_openings(params: &SelfPlayParams) -> Vec<Board> {
    let Some(ref p) = params.openings_path else { return Vec::new() };
    let text = match fs::read_to_string(p) {
        Ok(t) => t,
        Err(e) => {
            warn!("cannot read openings {}: {e}", p.display());
            return Vec::new();
        }
    };
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|raw| {
            let parts: Vec<&str> = raw.split_whitespace().collect();
            let fen = if parts.len() >= 6 { parts[0..6].join(" ") } else { raw.to_string() };
            match Board::from_fen(&fen) {
                Ok(b) => Some(b),
                Err(e) => {
                    warn!("skipping opening {raw:?}: {e}");
                    None
                }
            }
        })
        .collect()
}

/// One JSON object per line.
pub fn write_games_jsonl(games: &[SelfPlayGame], path: impl AsRef<Path>) -> std::io::Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let mut w = BufWriter::new(File::create(path)?);
    for g in games {
        serde_json::to_writer(&mut w, g)?;
        w.write_all(b"\n")?;
    }
    w.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::BrainConfig;

    #[test]
    fn openings_accept_fen_and_epd() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("open.epd");
        fs::write(
            &path,
            "# comment\n\nrnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1\n4k3/8/8/8/8/8/8/4K2R w K -\nnot a fen\n",
        )
        .unwrap();
        let params = SelfPlayParams { openings_path: Some(path), ..SelfPlayParams::default() };
        assert_eq!(load_openings(&params).len(), 2);
    }

    #[test]
    fn capped_games_are_not_learned() {
        let mut brain = Brain::new(BrainConfig::default());
        let params = SelfPlayParams { games: 1, max_plies: 4, iterations: Some(8), ..SelfPlayParams::default() };
        let games = generate_games(&mut brain, &Config::default(), &params, |_, _| {}).unwrap();
        assert_eq!(games[0].moves.len(), 4);
        assert!(games[0].outcome.is_none());
        assert_eq!(brain.games_played(), 0);
    }
}
