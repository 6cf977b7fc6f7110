use clap::Parser;
use std::time::Instant;
use tdchess::perft::{divide, divide_parallel, perft};
use tdchess::Board;

#[derive(Parser, Debug)]
#[command(name = "perft", about = "Perft driver for tdchess")]
struct Args {
    /// Search depth
    #[arg(value_name = "DEPTH")]
    depth: u32,
    /// FEN string or "startpos"
    #[arg(value_name = "FEN", default_value = "startpos")]
    fen: String,
    /// Number of threads for root-split
    #[arg(long, default_value_t = 1)]
    threads: usize,
    /// Print per-move counts
    #[arg(long, default_value_t = false)]
    divide: bool,
    /// Report elapsed time and NPS
    #[arg(long, default_value_t = false)]
    nps: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let base = if args.fen == "startpos" { Board::startpos() } else { Board::from_fen(&args.fen)? };

    let pool = rayon::ThreadPoolBuilder::new().num_threads(args.threads.max(1)).build()?;
    let t0 = Instant::now();
    let (nodes, split) = pool.install(|| {
        if args.threads <= 1 && !args.divide {
            let mut b = base;
            (perft(&mut b, args.depth), Vec::new())
        } else {
            let split = if args.threads <= 1 { divide(&base, args.depth) } else { divide_parallel(&base, args.depth) };
            (split.iter().map(|s| s.1).sum(), split)
        }
    });
    let dt = t0.elapsed().as_secs_f64();

    if args.divide {
        for (mv, n) in &split {
            println!("{mv}: {n}");
        }
    }
    if args.nps {
        println!("nodes: {nodes} elapsed: {dt:.3}s nps: {:.1}", nodes as f64 / dt.max(f64::EPSILON));
    } else {
        println!("nodes: {nodes}");
    }
    Ok(())
}
