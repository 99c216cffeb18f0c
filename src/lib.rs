// lib.rs
pub mod ai;
pub mod board;
pub mod combat;
pub mod continent;
pub mod defense;
pub mod error;
pub mod game;
pub mod game_config;
pub mod player;
pub mod setup;
pub mod snapshot;
pub mod territory;
pub mod turn_phase;
pub mod view;

pub use error::{ErrorCategory, GameError, SetupError, TopologyError};
pub use game::Game;
pub use game_config::GameConfig;
pub use turn_phase::TurnPhase;
