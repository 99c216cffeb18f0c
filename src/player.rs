// player.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Index of a player in the engine's roster. Stable for the whole game,
/// eliminated players keep their slot.
pub type PlayerId = usize;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    is_ai: bool,
    pub territories: BTreeSet<String>,
}

impl Player {
    pub fn new(id: PlayerId, name: &str, is_ai: bool) -> Self {
        Self {
            id,
            name: name.to_string(),
            is_ai,
            territories: BTreeSet::new(),
        }
    }

    pub fn is_ai(&self) -> bool {
        self.is_ai
    }

    pub fn add_territory(&mut self, territory: &str) {
        self.territories.insert(territory.to_string());
    }

    pub fn remove_territory(&mut self, territory: &str) {
        self.territories.remove(territory);
    }

    pub fn owns(&self, territory: &str) -> bool {
        self.territories.contains(territory)
    }

    pub fn territory_count(&self) -> usize {
        self.territories.len()
    }

    /// Case-insensitive name comparison used for roster uniqueness.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}
