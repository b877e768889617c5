use std::path::PathBuf;

use anyhow::{Context, Result};
use chess_core::{ClockState, FenPosition, UciMove, Variant};
use clap::Parser;
use log::info;
use openings_engine::{BookConfig, BookSession, ExplorerClient, SelectionMode};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Picks an opening move for a position from the Lichess opening explorer.
#[derive(Debug, Parser)]
#[command(name = "openings-bot", version)]
struct Cli {
    /// Position to move in
    #[arg(long)]
    fen: String,

    /// TOML file overriding the default explorer settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use this player's games as the book
    #[arg(long)]
    player: Option<String>,

    #[arg(long, default_value = "standard")]
    variant: Variant,

    /// Remaining time of the side to move, in milliseconds
    #[arg(long)]
    clock_ms: Option<u64>,

    #[arg(long, default_value_t = 0)]
    increment_ms: u64,

    /// Legal moves in UCI notation; book moves outside this set are ignored
    #[arg(long, num_args = 1..)]
    legal: Vec<UciMove>,

    /// Seed for the weighted move draw
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => BookConfig::load(path)?,
        None => BookConfig::default(),
    };
    let client = ExplorerClient::new(&config).context("failed to build HTTP client")?;
    let mut session = match cli.seed {
        Some(seed) => BookSession::new(&config, client, StdRng::seed_from_u64(seed)),
        None => BookSession::from_entropy(&config, client),
    };

    if let Some(player) = &cli.player {
        let report = session.track_opponent(player, cli.variant);
        info!(
            "Player book for {}: white {:?}, black {:?}, rating {}",
            player, report.white, report.black, report.rating
        );
    }

    let position = FenPosition::from_fen(&cli.fen)?
        .with_variant(cli.variant)
        .with_legal_moves(cli.legal);
    let clock = cli
        .clock_ms
        .map(|remaining| ClockState::from_millis(remaining, cli.increment_ms));

    match session.decide_move(&position, clock.as_ref()) {
        Some((mv, mode)) => println!("bestmove {} ({})", mv, mode),
        None => {
            session.record_mode(SelectionMode::EngineSearch);
            println!("no book move, the engine has to search");
        }
    }
    println!("{}", session.mode_description());
    Ok(())
}
