//! Minimal UCI front end over the learning search.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use log::warn;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::board::Board;
use crate::brain::Brain;
use crate::config::Config;
use crate::rules::find_move;
use crate::search::{CancelToken, SearchBudget, Searcher};

pub struct UciEngine {
    board: Board,
    brain: Brain,
    config: Config,
    rng: SmallRng,
    cancel: CancelToken,
}

impl UciEngine {
    pub fn new(brain: Brain, config: Config) -> Self {
        let rng = SmallRng::seed_from_u64(config.search.seed);
        Self { board: Board::startpos(), brain, config, rng, cancel: CancelToken::new() }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    fn cmd_uci(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "id name tdchess {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "id author tdchess developers")?;
        writeln!(out, "option name Threads type spin default {} min 1 max 512", self.config.search.threads)?;
        writeln!(out, "uciok")
    }

    fn cmd_setoption(&mut self, args: &str) {
        // setoption name Threads value N
        let mut tokens = args.split_whitespace();
        if tokens.next() != Some("name") {
            return;
        }
        let name: Vec<&str> = tokens.by_ref().take_while(|t| *t != "value").collect();
        let value = tokens.next();
        match (name.join(" ").as_str(), value.and_then(|v| v.parse::<usize>().ok())) {
            ("Threads", Some(n)) => self.config.search.threads = n.max(1),
            (other, _) => warn!("ignoring unknown option {other:?}"),
        }
    }

    /// `startpos [moves ...]` or `fen <6 fields> [moves ...]`.
    pub fn cmd_position(&mut self, args: &str) {
        let mut tokens = args.split_whitespace().peekable();
        let base = match tokens.next() {
            Some("startpos") => Board::startpos(),
            Some("fen") => {
                let fields: Vec<&str> = tokens.by_ref().take_while(|t| *t != "moves").collect();
                match Board::from_fen(&fields.join(" ")) {
                    Ok(b) => b,
                    Err(e) => {
                        warn!("bad fen in position command: {e}");
                        return;
                    }
                }
            }
            _ => return,
        };
        if tokens.peek() == Some(&"moves") {
            tokens.next();
        }
        let mut board = base;
        for text in tokens {
            match find_move(&board, text) {
                Some(mv) => {
                    board.make(mv);
                }
                None => {
                    warn!("illegal move {text} in position command");
                    return;
                }
            }
        }
        self.board = board;
    }

    /// Supports `iterations N` (alias `nodes`) and `movetime MS`.
    fn parse_go(args: &str) -> SearchBudget {
        let mut budget = SearchBudget::default();
        let mut tokens = args.split_whitespace();
        while let Some(tok) = tokens.next() {
            match tok {
                "iterations" | "nodes" => budget.iterations = tokens.next().and_then(|s| s.parse().ok()),
                "movetime" => {
                    budget.time_limit = tokens.next().and_then(|s| s.parse().ok()).map(Duration::from_millis)
                }
                _ => {}
            }
        }
        budget
    }

    fn best_move(&mut self, budget: SearchBudget) -> String {
        let searcher = Searcher::new(&self.brain, self.config.eval, self.config.search);
        match searcher.search(&self.board, budget, &self.cancel, &mut self.rng) {
            Ok(outcome) => format!("bestmove {}", outcome.best),
            Err(_) => "bestmove 0000".to_string(),
        }
    }

    /// Searches to completion on the calling thread.
    pub fn cmd_go(&mut self, args: &str) -> String {
        self.cancel.reset();
        self.best_move(Self::parse_go(args))
    }

    /// Searches on a worker thread while `input` keeps being served, so
    /// `stop` and `quit` interrupt the search. Returns the reply and whether
    /// `quit` arrived.
    fn go_interruptible(
        &mut self,
        args: &str,
        input: &Receiver<String>,
        out: &mut impl Write,
    ) -> io::Result<(String, bool)> {
        self.cancel.reset();
        let budget = Self::parse_go(args);
        let cancel = self.cancel.clone();
        let mut quit = false;
        let reply = thread::scope(|s| -> io::Result<String> {
            let worker = s.spawn(|| self.best_move(budget));
            while !worker.is_finished() {
                match input.recv_timeout(Duration::from_millis(5)) {
                    Ok(line) => match line.trim() {
                        "stop" => cancel.cancel(),
                        "quit" => {
                            cancel.cancel();
                            quit = true;
                        }
                        "isready" => {
                            writeln!(out, "readyok")?;
                            out.flush()?;
                        }
                        other => warn!("ignoring {other:?} while searching"),
                    },
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => {
                        cancel.cancel();
                        quit = true;
                    }
                }
            }
            Ok(worker.join().unwrap_or_else(|_| "bestmove 0000".to_string()))
        })?;
        Ok((reply, quit))
    }

    /// Serves commands from `input` until `quit` or end of input.
    pub fn serve(&mut self, input: Receiver<String>, out: &mut impl Write) -> io::Result<()> {
        while let Ok(line) = input.recv() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let command = line.split_whitespace().next().unwrap_or_default();
            let rest = line[command.len()..].trim_start();
            match command {
                "uci" => self.cmd_uci(out)?,
                "isready" => writeln!(out, "readyok")?,
                "ucinewgame" => self.board = Board::startpos(),
                "quit" => break,
                "stop" => {}
                "position" => self.cmd_position(rest),
                "setoption" => self.cmd_setoption(rest),
                "go" => {
                    let (reply, quit) = self.go_interruptible(rest, &input, out)?;
                    writeln!(out, "{reply}")?;
                    if quit {
                        out.flush()?;
                        break;
                    }
                }
                other => warn!("unknown command {other:?}"),
            }
            out.flush()?;
        }
        Ok(())
    }

    /// Reads stdin on its own thread so a running search can be stopped.
    pub fn run_loop(&mut self) -> io::Result<()> {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        self.serve(rx, &mut io::stdout())
    }
}
