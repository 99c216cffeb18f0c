// error.rs
use thiserror::Error;

use crate::turn_phase::TurnPhase;

/// Broad class of a rejected engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidReference,
    Ownership,
    Adjacency,
    InsufficientResource,
    State,
}

/// Rejection of a write-surface call. The engine is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("unknown territory '{0}'")]
    UnknownTerritory(String),
    #[error("territory {territory} is not owned by {player}")]
    NotOwned { territory: String, player: String },
    #[error("{0} is already owned by the attacker")]
    OwnTerritory(String),
    #[error("{from} is not adjacent to {to}")]
    NotAdjacent { from: String, to: String },
    #[error("{territory} has {available} armies, at least {required} needed")]
    InsufficientArmies {
        territory: String,
        available: u32,
        required: u32,
    },
    #[error("cannot place {requested} armies, only {available} reinforcements left")]
    InsufficientReinforcements { requested: u32, available: u32 },
    #[error("cannot place zero armies on {0}")]
    EmptyPlacement(String),
    #[error("{dice} dice is outside the allowed range 1..={max}")]
    InvalidDice { dice: u32, max: u32 },
    #[error("must move between {min} and {max} armies, got {requested}")]
    InvalidTransfer { requested: u32, min: u32, max: u32 },
    #[error("operation not allowed during the {0:?} phase")]
    WrongPhase(TurnPhase),
    #[error("the conquest of {0} must be resolved first")]
    ConquestPending(String),
    #[error("no conquest is waiting to be resolved between {from} and {to}")]
    NoPendingConquest { from: String, to: String },
    #[error("the game is over")]
    GameOver,
}

impl GameError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GameError::UnknownTerritory(_) => ErrorCategory::InvalidReference,
            GameError::NotOwned { .. } | GameError::OwnTerritory(_) => ErrorCategory::Ownership,
            GameError::NotAdjacent { .. } => ErrorCategory::Adjacency,
            GameError::InsufficientArmies { .. }
            | GameError::InsufficientReinforcements { .. }
            | GameError::EmptyPlacement(_)
            | GameError::InvalidDice { .. }
            | GameError::InvalidTransfer { .. } => ErrorCategory::InsufficientResource,
            GameError::WrongPhase(_)
            | GameError::ConquestPending(_)
            | GameError::NoPendingConquest { .. }
            | GameError::GameOver => ErrorCategory::State,
        }
    }
}

/// Invalid map topology. Fatal to game startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("the map has no territories")]
    Empty,
    #[error("continent id '{0}' must be two uppercase letters")]
    InvalidContinentId(String),
    #[error("continent id {0} is used twice")]
    DuplicateContinent(String),
    #[error("continent {0} has no territories")]
    EmptyContinent(String),
    #[error("territory id {0} is not unique")]
    DuplicateTerritory(String),
    #[error("territory {0} has no adjacent territories")]
    NoAdjacent(String),
    #[error("territory {0} is adjacent to itself")]
    SelfAdjacent(String),
    #[error("territory {territory} lists unknown neighbour {adjacent}")]
    UnknownAdjacent { territory: String, adjacent: String },
    #[error("adjacency between {0} and {1} is not mutual")]
    AsymmetricAdjacency(String, String),
    #[error("territory {0} cannot be reached from the rest of the map")]
    Unreachable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("{0} players is not supported, the game needs 2 to 6")]
    PlayerCount(usize),
    #[error("player name must not be empty")]
    EmptyName,
    #[error("player name '{0}' is already taken")]
    DuplicateName(String),
    #[error("{territories} territories cannot hold a budget of {budget} armies")]
    BudgetTooSmall { territories: usize, budget: u32 },
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Setup(#[from] SetupError),
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot encoding failed: {0}")]
    Encoding(#[from] bincode::Error),
    #[error("snapshot is inconsistent: {0}")]
    Inconsistent(String),
}
