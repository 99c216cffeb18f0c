// territory.rs
use crate::game::Game;
use crate::player::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Territory {
    pub id: String,
    pub name: String,
    pub armies: u32,
    pub owner: Option<PlayerId>,
    pub adjacent: BTreeSet<String>,
}

impl Territory {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            armies: 0,
            owner: None,
            adjacent: BTreeSet::new(),
        }
    }

    pub fn add_adjacent(&mut self, adjacent: &str) {
        self.adjacent.insert(adjacent.to_string());
    }

    pub fn is_adjacent(&self, territory: &str) -> bool {
        self.adjacent.contains(territory)
    }

    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }
}

impl Game {
    /// Neighbours of `id` sharing its owner, sorted by id.
    pub fn adjacent_friendly(&self, id: &str) -> Vec<&Territory> {
        self.adjacent_matching(id, true)
    }

    /// Neighbours of `id` held by someone else, sorted by id.
    pub fn adjacent_enemy(&self, id: &str) -> Vec<&Territory> {
        self.adjacent_matching(id, false)
    }

    fn adjacent_matching(&self, id: &str, friendly: bool) -> Vec<&Territory> {
        let Some(territory) = self.board.territory(id) else {
            return Vec::new();
        };
        territory
            .adjacent
            .iter()
            .filter_map(|adjacent| self.board.territory(adjacent))
            .filter(|adjacent| (adjacent.owner == territory.owner) == friendly)
            .collect()
    }

    /// Territories of `player` with more than one army and at least one enemy neighbour.
    pub fn attack_sources(&self, player: PlayerId) -> Vec<&Territory> {
        self.armed_territories(player)
            .filter(|t| !self.adjacent_enemy(&t.id).is_empty())
            .collect()
    }

    /// Territories of `player` with more than one army and at least one friendly neighbour.
    pub fn move_sources(&self, player: PlayerId) -> Vec<&Territory> {
        self.armed_territories(player)
            .filter(|t| !self.adjacent_friendly(&t.id).is_empty())
            .collect()
    }

    /// Territories of `player` bordering an enemy, regardless of army count.
    pub fn frontier(&self, player: PlayerId) -> Vec<&Territory> {
        self.owned_territories(player)
            .filter(|t| !self.adjacent_enemy(&t.id).is_empty())
            .collect()
    }

    pub fn owned_territories(&self, player: PlayerId) -> impl Iterator<Item = &Territory> {
        self.players[player]
            .territories
            .iter()
            .filter_map(|id| self.board.territory(id))
    }

    fn armed_territories(&self, player: PlayerId) -> impl Iterator<Item = &Territory> {
        self.owned_territories(player).filter(|t| t.armies > 1)
    }
}
