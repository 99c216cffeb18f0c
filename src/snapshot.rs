// snapshot.rs
use crate::error::SnapshotError;
use crate::game::Game;
use std::collections::HashSet;

impl Game {
    /// Encodes the full engine state, random generator included. Views and
    /// the defense provider are not part of the snapshot.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serialize(self)?)
    }

    /// Rebuilds an engine from `to_bytes` output. The restored engine has no
    /// subscribed views and defends human territories with the strongest roll.
    pub fn from_bytes(bytes: &[u8]) -> Result<Game, SnapshotError> {
        let game: Game = bincode::deserialize(bytes)?;
        game.check_consistency()?;
        Ok(game)
    }

    /// Cross-checks the decoded roster, ownership and turn order so that no
    /// accessor can index out of range later.
    fn check_consistency(&self) -> Result<(), SnapshotError> {
        self.board
            .validate()
            .map_err(|err| inconsistent(err.to_string()))?;

        for (slot, player) in self.players.iter().enumerate() {
            if player.id != slot {
                return Err(inconsistent(format!(
                    "player {} is stored in slot {}",
                    player.id, slot
                )));
            }
            for id in &player.territories {
                if !self.board.territory(id).map_or(false, |t| t.is_owned_by(slot)) {
                    return Err(inconsistent(format!(
                        "{} lists {} without owning it",
                        player.name, id
                    )));
                }
            }
        }
        for territory in self.board.territories() {
            let listed = territory
                .owner
                .and_then(|owner| self.players.get(owner))
                .map_or(false, |player| player.owns(&territory.id));
            if !listed {
                return Err(inconsistent(format!(
                    "territory {} has no valid owner",
                    territory.id
                )));
            }
        }

        let mut seen = HashSet::new();
        let valid_order = !self.active_players.is_empty()
            && self
                .active_players
                .iter()
                .all(|&id| id < self.players.len() && seen.insert(id));
        if !valid_order {
            return Err(inconsistent(format!(
                "invalid turn order {:?}",
                self.active_players
            )));
        }
        if !self.active_players.contains(&self.current_turn) {
            return Err(inconsistent(format!(
                "current player {} is not active",
                self.current_turn
            )));
        }
        if let Some(pending) = &self.pending_conquest {
            if self.board.territory(&pending.from).is_none()
                || self.board.territory(&pending.to).is_none()
            {
                return Err(inconsistent(format!(
                    "pending conquest {} -> {} names an unknown territory",
                    pending.from, pending.to
                )));
            }
        }
        Ok(())
    }
}

fn inconsistent(reason: String) -> SnapshotError {
    SnapshotError::Inconsistent(reason)
}
