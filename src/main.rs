use anyhow::{bail, Context, Result};
use clap::Parser;
use risk_engine::game_config::GameConfig;
use risk_engine::view::{ActionLog, TracingView};
use risk_engine::Game;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Plays one game between computer players and reports the winner.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON game configuration. Overrides --players.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of computer players on the classic map
    #[arg(short, long, default_value_t = 4)]
    players: usize,

    /// Seed for the random generator
    #[arg(short, long)]
    seed: Option<u64>,

    /// Stop after this many rounds
    #[arg(long, default_value_t = 500)]
    max_rounds: u32,

    /// Write the timestamped action log to this file as JSON
    #[arg(long)]
    action_log: Option<PathBuf>,

    /// Print the map once the game stops
    #[arg(long)]
    show_map: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = match &args.config {
        Some(path) => GameConfig::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => GameConfig::ai_players(args.players),
    };
    if let Some(human) = config.players.iter().find(|p| !p.is_ai) {
        bail!(
            "player '{}' is not a computer player; this runner only plays computer games",
            human.name
        );
    }
    if args.seed.is_some() {
        config.settings.seed = args.seed;
    }
    if config.settings.max_rounds.is_none() {
        config.settings.max_rounds = Some(args.max_rounds);
    }

    let mut game = Game::from_config(&config)?;
    let log = ActionLog::new();
    game.subscribe(Box::new(log.clone()));
    game.subscribe(Box::new(TracingView));
    game.start();

    match game.winner() {
        Some(winner) => tracing::info!(
            winner = %winner.name,
            rounds = game.round(),
            "game finished"
        ),
        None => tracing::warn!(
            rounds = game.round(),
            active = game.active_players().len(),
            "round limit reached without a winner"
        ),
    }

    if args.show_map {
        println!("{}", game.map_report());
    }
    if let Some(path) = &args.action_log {
        std::fs::write(path, log.to_json()?)
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(entries = log.entries().len(), path = %path.display(), "action log written");
    }
    Ok(())
}
