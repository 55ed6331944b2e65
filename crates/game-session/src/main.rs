use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use game_session::config::Config;
use game_session::{GameHost, Input, KeyValueStore, MemoryStore, Session, SqliteStore, Status};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Debug, Parser)]
#[command(author, version, about = "Play 2048 in the terminal")]
struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// SQLite database for the saved game (overrides config)
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Keep the game in memory only
    #[arg(long)]
    memory: bool,

    /// Seed tile spawning for a reproducible game
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Log filter, e.g. "info", "debug"
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::from_toml(path)?,
        None => Config::default(),
    };
    if let Some(db) = cli.db {
        config.store_path = db;
    }
    if let Some(log) = cli.log {
        config.log = log;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    env_logger::Builder::from_env(Env::default().default_filter_or(config.log.as_str())).init();

    let store: Box<dyn KeyValueStore> = if cli.memory {
        Box::new(MemoryStore::new())
    } else {
        info!("saving to {}", config.store_path.display());
        let store = SqliteStore::open(&config.store_path)
            .with_context(|| format!("failed to open {}", config.store_path.display()))?;
        Box::new(store)
    };
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut host = GameHost::open(store, rng, config.state_key);
    play(&mut host)
}

fn play<S: KeyValueStore>(host: &mut GameHost<S, StdRng>) -> Result<()> {
    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    render(&mut out, host.session())?;
    for line in stdin.lock().lines() {
        let line = line.context("failed to read input")?;
        match Input::parse(&line) {
            Some(Input::Quit) => break,
            Some(input) => {
                host.handle(input);
            }
            None => {}
        }
        render(&mut out, host.session())?;
    }
    Ok(())
}

fn render(out: &mut impl Write, session: &Session) -> io::Result<()> {
    writeln!(out)?;
    write!(out, "{}", session.grid())?;
    writeln!(
        out,
        "score: {}   undos left: {}",
        session.score(),
        session.undos_remaining()
    )?;
    let hint = match session.status() {
        Status::Playing => "w/a/s/d or up/down/left/right, u undo, r reset, q quit",
        Status::Won => "You win! u to undo, r to play again, q to quit",
        Status::Lost => "Game over! u to undo, r to play again, q to quit",
    };
    writeln!(out, "{hint}")?;
    out.flush()
}
