use anyhow::Result;
use clap::Parser;
use itertools::Itertools;
use rayon::prelude::*;
use risk_engine::game_config::GameConfig;
use risk_engine::Game;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Runs many seeded computer games in parallel and prints a JSON summary.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of games to play
    #[arg(short, long, default_value_t = 100)]
    games: u64,

    /// Computer players per game
    #[arg(short, long, default_value_t = 4)]
    players: usize,

    /// Seed of the first game; game `i` uses `seed + i`
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Round limit per game
    #[arg(long, default_value_t = 500)]
    max_rounds: u32,
}

#[derive(Debug, Serialize)]
struct GameResult {
    seed: u64,
    winner: Option<String>,
    rounds: u32,
}

#[derive(Debug, Serialize)]
struct Summary {
    games: u64,
    players: usize,
    unfinished: usize,
    average_rounds: f64,
    wins: BTreeMap<String, usize>,
    elapsed_ms: u128,
}

fn play(config: &GameConfig, seed: u64) -> Result<GameResult> {
    let mut config = config.clone();
    config.settings.seed = Some(seed);
    let mut game = Game::from_config(&config)?;
    game.start();
    let result = GameResult {
        seed,
        winner: game.winner().map(|p| p.name.clone()),
        rounds: game.round(),
    };
    tracing::debug!(?result, "game played");
    Ok(result)
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let start = Instant::now();
    let mut config = GameConfig::ai_players(args.players);
    config.settings.max_rounds = Some(args.max_rounds);

    let results: Vec<GameResult> = (args.seed..args.seed + args.games)
        .into_par_iter()
        .map(|seed| play(&config, seed))
        .collect::<Result<_>>()?;

    let wins: BTreeMap<String, usize> = results
        .iter()
        .filter_map(|r| r.winner.clone())
        .counts()
        .into_iter()
        .collect();
    let average_rounds = if results.is_empty() {
        0.0
    } else {
        results.iter().map(|r| r.rounds as f64).sum::<f64>() / results.len() as f64
    };

    let summary = Summary {
        games: args.games,
        players: args.players,
        unfinished: results.iter().filter(|r| r.winner.is_none()).count(),
        average_rounds,
        wins,
        elapsed_ms: start.elapsed().as_millis(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
