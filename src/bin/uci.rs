use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tdchess::brain::{Brain, BrainStore, StoreConfig};
use tdchess::uci::UciEngine;
use tdchess::Config;

#[derive(Parser, Debug)]
#[command(name = "tdchess-uci", about = "UCI front end; the brain is read, never trained")]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    brain: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut config = Config::load_or_default(args.config.as_deref()).context("loading config")?;
    if let Some(path) = args.brain {
        config.store = StoreConfig::beside(path);
    }
    let brain = Brain::open(config.brain, BrainStore::from_config(&config.store));
    UciEngine::new(brain, config).run_loop()?;
    Ok(())
}
