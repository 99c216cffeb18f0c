use crate::board::Board;
use crate::continent::Continent;
use crate::error::{ConfigError, TopologyError};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::path::Path;

lazy_static! {
    static ref CLASSIC_MAP: Vec<ContinentConfig> =
        serde_json::from_str(include_str!("classic_map.json"))
            .expect("embedded classic map is valid JSON");
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub players: Vec<PlayerConfig>,
    /// Custom topology. The classic world map is used when absent.
    #[serde(default)]
    pub continents: Option<Vec<ContinentConfig>>,
    #[serde(default)]
    pub settings: EngineSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub name: String,
    #[serde(default)]
    pub is_ai: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinentConfig {
    pub id: String,
    pub name: String,
    pub bonus_armies: u32,
    /// Ids are assigned by position: the first territory of `NA` is `NA1`.
    pub territories: Vec<TerritoryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerritoryConfig {
    pub name: String,
    pub adjacent: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Seed for the engine's random generator. Entropy is used when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Rounds after which the engine stops driving computer turns.
    #[serde(default)]
    pub max_rounds: Option<u32>,
}

impl GameConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(data)?)
    }

    /// A roster of `count` computer players on the classic map.
    pub fn ai_players(count: usize) -> Self {
        Self {
            players: (1..=count)
                .map(|i| PlayerConfig {
                    name: format!("Computer {}", i),
                    is_ai: true,
                })
                .collect(),
            continents: None,
            settings: EngineSettings::default(),
        }
    }

    /// Builds and validates the configured topology.
    pub fn board(&self) -> Result<Board, TopologyError> {
        match &self.continents {
            Some(continents) => build_board(continents),
            None => classic_board(),
        }
    }
}

pub fn build_board(continents: &[ContinentConfig]) -> Result<Board, TopologyError> {
    let mut board = Board::new();
    for config in continents {
        if board.continents.contains_key(&config.id) {
            return Err(TopologyError::DuplicateContinent(config.id.clone()));
        }
        let mut continent = Continent::new(&config.id, &config.name, config.bonus_armies);
        for territory in &config.territories {
            continent.add_territory(&territory.name);
            if let Some(added) = continent.territories.last_mut() {
                for adjacent in &territory.adjacent {
                    added.add_adjacent(adjacent);
                }
            }
        }
        board.add_continent(continent);
    }
    board.validate()?;
    Ok(board)
}

/// The 42-territory world map.
pub fn classic_board() -> Result<Board, TopologyError> {
    build_board(&CLASSIC_MAP)
}
