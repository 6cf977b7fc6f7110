use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tdchess::brain::{Brain, BrainStore, StoreConfig};
use tdchess::selfplay::{generate_games, write_games_jsonl, SelfPlayParams};
use tdchess::Config;

#[derive(Parser, Debug)]
#[command(name = "tdchess-selfplay", about = "Let the brain play itself and learn from every game")]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    brain: Option<PathBuf>,
    #[arg(long, default_value_t = 10)]
    games: usize,
    #[arg(long, default_value_t = 300)]
    max_plies: usize,
    /// Fixed iterations per move (default scales with experience)
    #[arg(long)]
    iterations: Option<u32>,
    #[arg(long)]
    movetime_ms: Option<u64>,
    #[arg(long)]
    threads: Option<usize>,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long)]
    openings: Option<PathBuf>,
    /// Write the games as JSON lines
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let a = Args::parse();
    let mut config = Config::load_or_default(a.config.as_deref()).context("loading config")?;
    if let Some(path) = a.brain {
        config.store = StoreConfig::beside(path);
    }
    if let Some(t) = a.threads {
        config.search.threads = t;
    }
    let params = SelfPlayParams {
        games: a.games,
        max_plies: a.max_plies,
        iterations: a.iterations,
        movetime_ms: a.movetime_ms,
        seed: a.seed,
        openings_path: a.openings,
    };

    let mut brain = Brain::open(config.brain, BrainStore::from_config(&config.store));
    let pb = ProgressBar::new(params.games as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    let games = generate_games(&mut brain, &config, &params, |_, g| {
        let result = g.outcome.map_or("abandoned".to_string(), |o| format!("{:?} by {:?}", o.result, o.termination));
        pb.set_message(format!("{} plies, {result}", g.moves.len()));
        pb.inc(1);
    })?;
    pb.finish_with_message("Self-play complete");

    let s = brain.stats();
    println!(
        "brain: {} games (W {} / B {} / D {}), {} positions, exploration {:.1}%",
        s.games_played,
        s.white_wins,
        s.black_wins,
        s.draws,
        brain.len(),
        brain.exploration_rate() * 100.0
    );
    if brain.is_dirty() {
        brain.save().context("final brain save")?;
    }
    if let Some(out) = a.out {
        write_games_jsonl(&games, &out).with_context(|| format!("writing {}", out.display()))?;
        println!("wrote {} games to {}", games.len(), out.display());
    }
    Ok(())
}
