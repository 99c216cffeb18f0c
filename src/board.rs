// board.rs
use crate::continent::Continent;
use crate::error::TopologyError;
use crate::territory::Territory;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};

lazy_static! {
    static ref TERRITORY_ID: Regex = Regex::new(r"^([A-Z]{2})([1-9][0-9]*)$").unwrap();
    static ref CONTINENT_ID: Regex = Regex::new(r"^[A-Z]{2}$").unwrap();
}

/// Continent-keyed map topology. Territories live inside their continent and
/// are addressed by `{continent id}{ordinal}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Board {
    pub continents: BTreeMap<String, Continent>,
}

impl Board {
    pub fn new() -> Self {
        Self {
            continents: BTreeMap::new(),
        }
    }

    pub fn add_continent(&mut self, continent: Continent) {
        self.continents.insert(continent.id.clone(), continent);
    }

    pub fn get_continent(&self, id: &str) -> Option<&Continent> {
        self.continents.get(id)
    }

    pub fn territory(&self, id: &str) -> Option<&Territory> {
        let (continent, ordinal) = split_territory_id(id)?;
        self.continents
            .get(continent)?
            .territory_by_ordinal(ordinal)
    }

    pub fn territory_mut(&mut self, id: &str) -> Option<&mut Territory> {
        let (continent, ordinal) = split_territory_id(id)?;
        self.continents
            .get_mut(continent)?
            .territory_by_ordinal_mut(ordinal)
    }

    pub fn territories(&self) -> impl Iterator<Item = &Territory> {
        self.continents.values().flat_map(|c| c.territories.iter())
    }

    pub fn territory_ids(&self) -> Vec<String> {
        self.territories().map(|t| t.id.clone()).collect()
    }

    pub fn territory_count(&self) -> usize {
        self.continents.values().map(|c| c.territories.len()).sum()
    }

    /// Checks the invariants every loaded map must satisfy: well-formed
    /// unique ids, at least one neighbour each, mutual non-reflexive
    /// adjacency and a single connected component.
    pub fn validate(&self) -> Result<(), TopologyError> {
        let mut ids = HashSet::new();
        for continent in self.continents.values() {
            if !CONTINENT_ID.is_match(&continent.id) {
                return Err(TopologyError::InvalidContinentId(continent.id.clone()));
            }
            if continent.territories.is_empty() {
                return Err(TopologyError::EmptyContinent(continent.id.clone()));
            }
            for (i, territory) in continent.territories.iter().enumerate() {
                let expected = format!("{}{}", continent.id, i + 1);
                if territory.id != expected || !ids.insert(territory.id.as_str()) {
                    return Err(TopologyError::DuplicateTerritory(territory.id.clone()));
                }
            }
        }
        if ids.is_empty() {
            return Err(TopologyError::Empty);
        }

        for territory in self.territories() {
            if territory.adjacent.is_empty() {
                return Err(TopologyError::NoAdjacent(territory.id.clone()));
            }
            for adjacent in &territory.adjacent {
                if adjacent == &territory.id {
                    return Err(TopologyError::SelfAdjacent(territory.id.clone()));
                }
                let other = self.territory(adjacent).ok_or_else(|| {
                    TopologyError::UnknownAdjacent {
                        territory: territory.id.clone(),
                        adjacent: adjacent.clone(),
                    }
                })?;
                if !other.is_adjacent(&territory.id) {
                    return Err(TopologyError::AsymmetricAdjacency(
                        territory.id.clone(),
                        adjacent.clone(),
                    ));
                }
            }
        }

        let reached = self.reachable_from(self.territories().next().map(|t| t.id.as_str()));
        match self.territories().find(|t| !reached.contains(t.id.as_str())) {
            Some(unreachable) => Err(TopologyError::Unreachable(unreachable.id.clone())),
            None => Ok(()),
        }
    }

    fn reachable_from<'a>(&'a self, start: Option<&'a str>) -> HashSet<&'a str> {
        let mut visited = HashSet::new();
        let mut queue: VecDeque<&str> = start.into_iter().collect();
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(territory) = self.territory(current) {
                queue.extend(
                    territory
                        .adjacent
                        .iter()
                        .map(String::as_str)
                        .filter(|id| !visited.contains(id)),
                );
            }
        }
        visited
    }
}

/// Splits `"NA3"` into `("NA", 3)`.
pub fn split_territory_id(id: &str) -> Option<(&str, usize)> {
    let captures = TERRITORY_ID.captures(id)?;
    let continent = captures.get(1)?.as_str();
    let ordinal = captures.get(2)?.as_str().parse().ok()?;
    Some((continent, ordinal))
}
