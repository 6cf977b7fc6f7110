use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tdchess::brain::{Brain, BrainStore, StoreConfig};
use tdchess::error::IllegalMoveReason;
use tdchess::{Board, Color, Config, Game, GameResult, SearchBudget};

#[derive(Parser, Debug)]
#[command(author, version, about = "Play chess against the self-learning engine", long_about = None)]
struct Args {
    /// JSON config file; missing fields take defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Brain store; overrides the config
    #[arg(long)]
    brain: Option<PathBuf>,

    /// Your color: 'w' for white, 'b' for black
    #[arg(long, default_value = "w")]
    color: String,

    /// Fixed MCTS iterations per AI move (default scales with experience)
    #[arg(long)]
    iterations: Option<u32>,

    /// Time limit per AI move in milliseconds
    #[arg(long)]
    movetime: Option<u64>,

    /// Root-split search threads
    #[arg(long)]
    threads: Option<usize>,

    /// Print root statistics after each AI move
    #[arg(long)]
    verbose: bool,

    /// Starting FEN position
    #[arg(long)]
    fen: Option<String>,

    /// Archive the stored brain and start from scratch
    #[arg(long)]
    reset: bool,
}

fn parse_color(color_str: &str) -> Result<Color> {
    match color_str.to_lowercase().as_str() {
        "w" | "white" => Ok(Color::White),
        "b" | "black" => Ok(Color::Black),
        _ => bail!("Invalid color: use 'w' or 'b'"),
    }
}

fn read_line(prompt: &str) -> Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let human = parse_color(&args.color)?;

    let mut config = Config::load_or_default(args.config.as_deref()).context("loading config")?;
    if let Some(path) = args.brain {
        config.store = StoreConfig::beside(path);
    }
    if let Some(t) = args.threads {
        config.search.threads = t;
    }

    let mut brain = Brain::open(config.brain, BrainStore::from_config(&config.store));
    if args.reset {
        if let Some(archived) = brain.reset()? {
            println!("Old brain archived to {}", archived.display());
        }
    }
    println!(
        "Brain: {} games, {} positions, exploration {:.1}%",
        brain.games_played(),
        brain.len(),
        brain.exploration_rate() * 100.0
    );

    let board = match args.fen {
        Some(fen) => Board::from_fen(&fen).context("invalid FEN")?,
        None => Board::startpos(),
    };
    let budget = SearchBudget { iterations: args.iterations, time_limit: args.movetime.map(Duration::from_millis) };

    let mut game = Game::from_board(&mut brain, &config, board);
    game.set_ai_color(Some(human.opposite()));

    while !game.is_over() {
        println!("\n{}'s turn\n{}", game.side_to_move(), game.board());
        if game.board().in_check() {
            println!("Check!");
        }

        if game.side_to_move() == human {
            let Some(input) = read_line("Enter your move (e.g. e2e4, e7e8q), or 'resign': ")? else {
                break;
            };
            if input == "resign" {
                // Recorded as a time loss so the brain still learns from it.
                game.forfeit_on_time(human)?;
                break;
            }
            match game.attempt_uci(&input) {
                Ok(_) => {}
                Err(e) if e.reason == IllegalMoveReason::PromotionRequired => {
                    println!("Add the promotion piece, e.g. {input}q");
                }
                Err(e) => println!("Illegal move: {e}"),
            }
        } else {
            let started = Instant::now();
            let (outcome, _) = game.play_ai_move(budget)?;
            if args.verbose {
                let mut children = outcome.children.clone();
                children.sort_by(|a, b| b.visits.cmp(&a.visits));
                println!("|   move   |     N     |   mean    |   prior   |");
                for c in children.iter().take(10) {
                    println!("|{:^10}|{:^11}|{:^11.4}|{:^11.4}|", c.mv.to_string(), c.visits, c.mean, c.prior);
                }
                println!(
                    "{} iterations in {:.2}s{}",
                    outcome.iterations,
                    started.elapsed().as_secs_f32(),
                    if outcome.explored { " (exploration pick)" } else { "" }
                );
            }
            println!("Computer plays: {}", outcome.best);
        }
    }

    println!("\n{}", game.board());
    match game.current_result() {
        Some(o) => {
            let text = match o.result {
                GameResult::WhiteWin => "White wins",
                GameResult::BlackWin => "Black wins",
                GameResult::Draw => "Draw",
            };
            println!("{text} by {:?}", o.termination);
        }
        None => println!("Game abandoned; nothing learned."),
    }
    if let Some(report) = game.learning_report() {
        println!(
            "Learned {} positions ({} new); exploration now {:.1}%",
            report.positions,
            report.new_positions,
            report.exploration_rate * 100.0
        );
    }
    Ok(())
}
