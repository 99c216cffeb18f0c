// continent.rs
use crate::player::PlayerId;
use crate::territory::Territory;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Continent {
    pub id: String,
    pub name: String,
    pub bonus_armies: u32,
    /// Member territories in ordinal order: `territories[i]` has id `{id}{i + 1}`.
    pub territories: Vec<Territory>,
}

impl Continent {
    pub fn new(id: &str, name: &str, bonus_armies: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            bonus_armies,
            territories: Vec::new(),
        }
    }

    /// Appends a territory and returns its generated id.
    pub fn add_territory(&mut self, name: &str) -> String {
        let id = format!("{}{}", self.id, self.territories.len() + 1);
        self.territories.push(Territory::new(&id, name));
        id
    }

    /// Looks up a member by its 1-based ordinal.
    pub fn territory_by_ordinal(&self, ordinal: usize) -> Option<&Territory> {
        ordinal.checked_sub(1).and_then(|i| self.territories.get(i))
    }

    pub fn territory_by_ordinal_mut(&mut self, ordinal: usize) -> Option<&mut Territory> {
        ordinal.checked_sub(1).and_then(move |i| self.territories.get_mut(i))
    }

    /// The single owner of every member territory, if there is one.
    pub fn conqueror(&self) -> Option<PlayerId> {
        let first = self.territories.first()?.owner?;
        self.territories
            .iter()
            .all(|t| t.owner == Some(first))
            .then_some(first)
    }

    pub fn get_bonus(&self) -> u32 {
        self.bonus_armies
    }
}
