use crate::board::Board;
use crate::combat::{self, BattleOutcome};
use crate::continent::Continent;
use crate::defense::{DefenseProvider, StrongestDefense};
use crate::error::{GameError, SetupError};
use crate::game_config::{EngineSettings, GameConfig, PlayerConfig};
use crate::player::{Player, PlayerId};
use crate::setup::{self, MAX_PLAYERS, MIN_PLAYERS};
use crate::territory::Territory;
use crate::turn_phase::TurnPhase;
use crate::view::GameView;
use itertools::Itertools;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// A battle the attacker has won but not yet occupied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingConquest {
    pub from: String,
    pub to: String,
    pub attack_dice: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackReport {
    pub outcome: BattleOutcome,
    /// The defender has no armies left; follow up with `resolve_conquest`.
    pub conquerable: bool,
}

/// The turn engine. Owns every player, territory and continent for the
/// lifetime of a game; all mutation goes through its write surface.
#[derive(Serialize, Deserialize)]
pub struct Game {
    pub(crate) players: Vec<Player>,
    pub(crate) board: Board,
    pub(crate) active_players: Vec<PlayerId>,
    pub(crate) current_turn: PlayerId,
    pub(crate) round: u32,
    pub(crate) turn_phase: TurnPhase,
    pub(crate) reinforcement_armies: u32,
    pub(crate) pending_conquest: Option<PendingConquest>,
    pub(crate) settings: EngineSettings,
    pub(crate) rng: ChaCha8Rng,
    #[serde(skip)]
    pub(crate) ai_driving: bool,
    #[serde(skip)]
    pub(crate) ai_turn_over: bool,
    #[serde(skip)]
    views: Vec<Box<dyn GameView>>,
    #[serde(skip, default = "default_defense")]
    defense: Box<dyn DefenseProvider>,
}

fn default_defense() -> Box<dyn DefenseProvider> {
    Box::new(StrongestDefense)
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("players", &self.players)
            .field("board", &self.board)
            .field("active_players", &self.active_players)
            .field("current_turn", &self.current_turn)
            .field("round", &self.round)
            .field("turn_phase", &self.turn_phase)
            .field("reinforcement_armies", &self.reinforcement_armies)
            .field("pending_conquest", &self.pending_conquest)
            .field("views", &self.views.len())
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Validates the map and roster, then deals out territories and armies.
    /// The first player in the roster starts in the `Place` phase.
    pub fn new(
        mut board: Board,
        roster: &[PlayerConfig],
        settings: EngineSettings,
    ) -> Result<Self, SetupError> {
        board.validate()?;
        validate_roster(roster)?;

        let mut rng = match settings.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut players: Vec<Player> = roster
            .iter()
            .enumerate()
            .map(|(id, p)| Player::new(id, p.name.trim(), p.is_ai))
            .collect();
        setup::distribute(&mut rng, &mut board, &mut players)?;

        let active_players = (0..players.len()).collect();
        let mut game = Self {
            players,
            board,
            active_players,
            current_turn: 0,
            round: 0,
            turn_phase: TurnPhase::Place,
            reinforcement_armies: 0,
            pending_conquest: None,
            settings,
            rng,
            ai_driving: false,
            ai_turn_over: false,
            views: Vec::new(),
            defense: default_defense(),
        };
        game.start_turn();
        Ok(game)
    }

    pub fn from_config(config: &GameConfig) -> Result<Self, SetupError> {
        let board = config.board()?;
        Self::new(board, &config.players, config.settings.clone())
    }

    /// Hands control to the computer if it is up first. Returns once a human
    /// player must act or the game is decided.
    pub fn start(&mut self) {
        if !self.ai_driving && !self.is_over() {
            self.hand_over(false);
        }
    }

    pub fn subscribe(&mut self, view: Box<dyn GameView>) {
        self.views.push(view);
    }

    /// Replaces the source of defending dice for human defenders.
    pub fn set_defense_provider(&mut self, provider: Box<dyn DefenseProvider>) {
        self.defense = provider;
    }

    // ----- read accessors -----

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn continents(&self) -> &BTreeMap<String, Continent> {
        &self.board.continents
    }

    pub fn territory(&self, id: &str) -> Option<&Territory> {
        self.board.territory(id)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.has_name(name))
    }

    pub fn active_players(&self) -> Vec<&Player> {
        self.active_players
            .iter()
            .map(|&id| &self.players[id])
            .collect()
    }

    pub fn is_active(&self, id: PlayerId) -> bool {
        self.active_players.contains(&id)
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_turn]
    }

    pub fn status(&self) -> TurnPhase {
        match self.turn_phase {
            TurnPhase::GameOver => TurnPhase::GameOver,
            _ if self.ai_driving => TurnPhase::Disabled,
            phase => phase,
        }
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn reinforcements_remaining(&self) -> u32 {
        self.reinforcement_armies
    }

    pub fn pending_conquest(&self) -> Option<&PendingConquest> {
        self.pending_conquest.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.turn_phase == TurnPhase::GameOver
    }

    /// The last active player. A game stopped by the round limit has none.
    pub fn winner(&self) -> Option<&Player> {
        match self.active_players.as_slice() {
            [last] if self.is_over() => Some(&self.players[*last]),
            _ => None,
        }
    }

    /// `max(3, owned / 3)` plus the bonus of every fully held continent.
    pub fn calculate_reinforcements(&self, player_id: PlayerId) -> u32 {
        let owned = self.players[player_id].territory_count() as u32;
        let base = std::cmp::max(owned / 3, 3);
        let continent_bonus: u32 = self
            .board
            .continents
            .values()
            .filter(|c| c.conqueror() == Some(player_id))
            .map(Continent::get_bonus)
            .sum();
        base + continent_bonus
    }

    // ----- write surface -----

    /// Adds reinforcements to territories of the current player.
    pub fn place(&mut self, allocations: &BTreeMap<String, u32>) -> Result<(), GameError> {
        self.ensure_running()?;
        if self.turn_phase != TurnPhase::Place {
            return Err(GameError::WrongPhase(self.status()));
        }
        for (id, &armies) in allocations {
            self.owned_territory(id)?;
            if armies == 0 {
                return Err(GameError::EmptyPlacement(id.clone()));
            }
        }
        let requested = allocations
            .values()
            .fold(0u32, |sum, &armies| sum.saturating_add(armies));
        if requested > self.reinforcement_armies {
            return Err(GameError::InsufficientReinforcements {
                requested,
                available: self.reinforcement_armies,
            });
        }

        let name = self.current_player().name.clone();
        for (id, &armies) in allocations {
            if let Some(territory) = self.board.territory_mut(id) {
                territory.armies += armies;
                let line = format!(
                    "{} placed {} armies in {} [{}]",
                    name, armies, territory.name, territory.id
                );
                self.log(line);
            }
        }
        self.reinforcement_armies -= requested;
        self.notify();
        Ok(())
    }

    /// Fights one battle. Losses are applied unless the defender is wiped
    /// out, in which case the conquest is left pending.
    pub fn attack(
        &mut self,
        from: &str,
        attack_dice: u32,
        to: &str,
        defend_dice: u32,
    ) -> Result<AttackReport, GameError> {
        self.ensure_turn_action()?;
        let attacking = self.owned_territory(from)?;
        let defending = self.territory_or_err(to)?;
        if defending.is_owned_by(self.current_turn) {
            return Err(GameError::OwnTerritory(to.to_string()));
        }
        if !attacking.is_adjacent(to) {
            return Err(GameError::NotAdjacent {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        if attacking.armies < 2 {
            return Err(GameError::InsufficientArmies {
                territory: from.to_string(),
                available: attacking.armies,
                required: 2,
            });
        }
        check_dice(attack_dice, combat::max_attack_dice(attacking.armies))?;
        check_dice(defend_dice, combat::max_defend_dice(defending.armies))?;

        let outcome = combat::resolve_battle(&mut self.rng, attack_dice, defend_dice);
        Ok(self.apply_battle(from, to, outcome))
    }

    pub(crate) fn apply_battle(&mut self, from: &str, to: &str, outcome: BattleOutcome) -> AttackReport {
        self.turn_phase = TurnPhase::Attack;
        let attacker = self.current_player().name.clone();
        self.log(format!(
            "{} attacks {} from {}: rolled {} against {}",
            attacker,
            to,
            from,
            outcome.attack_rolls.iter().join(", "),
            outcome.defend_rolls.iter().join(", ")
        ));

        let defender_armies = self.board.territory(to).map_or(0, |t| t.armies);
        let conquerable = outcome.defender_losses >= defender_armies;
        if conquerable {
            self.pending_conquest = Some(PendingConquest {
                from: from.to_string(),
                to: to.to_string(),
                attack_dice: outcome.attack_rolls.len() as u32,
            });
            self.log(format!("{} has no armies left and can be taken", to));
        } else {
            if let Some(attacking) = self.board.territory_mut(from) {
                attacking.armies -= outcome.attacker_losses;
            }
            if let Some(defending) = self.board.territory_mut(to) {
                defending.armies -= outcome.defender_losses;
            }
            self.log(format!(
                "{} lost {} and {} lost {}",
                from, outcome.attacker_losses, to, outcome.defender_losses
            ));
        }
        self.notify();
        AttackReport {
            outcome,
            conquerable,
        }
    }

    /// Occupies a territory won by the preceding `attack`.
    pub fn resolve_conquest(&mut self, from: &str, to: &str, armies: u32) -> Result<(), GameError> {
        self.ensure_running()?;
        let attack_dice = match &self.pending_conquest {
            Some(pending) if pending.from == from && pending.to == to => pending.attack_dice,
            _ => {
                return Err(GameError::NoPendingConquest {
                    from: from.to_string(),
                    to: to.to_string(),
                })
            }
        };
        let available = self.territory_or_err(from)?.armies;
        let max = available.saturating_sub(1);
        if armies < attack_dice || armies > max {
            return Err(GameError::InvalidTransfer {
                requested: armies,
                min: attack_dice,
                max,
            });
        }

        let winner = self.current_turn;
        let Some(defending) = self.board.territory_mut(to) else {
            return Err(GameError::UnknownTerritory(to.to_string()));
        };
        let loser = defending.owner.replace(winner);
        defending.armies = armies;
        if let Some(attacking) = self.board.territory_mut(from) {
            attacking.armies -= armies;
        }
        self.players[winner].add_territory(to);
        if let Some(loser) = loser {
            self.players[loser].remove_territory(to);
        }
        self.pending_conquest = None;
        self.log(format!(
            "{} conquered {} and moved in {} armies",
            self.players[winner].name, to, armies
        ));

        if let Some(loser) = loser {
            if self.players[loser].territories.is_empty() {
                self.active_players.retain(|&p| p != loser);
                self.log(format!(
                    "{} has lost all their territories and is eliminated",
                    self.players[loser].name
                ));
            }
        }
        if self.active_players.len() == 1 {
            self.turn_phase = TurnPhase::GameOver;
            self.log(format!("{} wins the game", self.players[winner].name));
        }
        self.notify();
        Ok(())
    }

    /// Moves armies between two adjacent territories and ends the turn.
    pub fn move_armies(&mut self, armies: u32, from: &str, to: &str) -> Result<(), GameError> {
        self.ensure_turn_action()?;
        let source = self.owned_territory(from)?;
        let available = source.armies;
        if !source.is_adjacent(to) {
            return Err(GameError::NotAdjacent {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.owned_territory(to)?;
        if armies == 0 || armies >= available {
            return Err(GameError::InvalidTransfer {
                requested: armies,
                min: 1,
                max: available.saturating_sub(1),
            });
        }

        if let Some(source) = self.board.territory_mut(from) {
            source.armies -= armies;
        }
        if let Some(destination) = self.board.territory_mut(to) {
            destination.armies += armies;
        }
        self.log(format!(
            "{} moved {} armies from {} to {}",
            self.current_player().name,
            armies,
            from,
            to
        ));
        self.notify();
        self.finish_turn();
        Ok(())
    }

    /// Ends the current turn. A conquest left pending is abandoned.
    pub fn done(&mut self) -> Result<(), GameError> {
        self.ensure_running()?;
        self.pending_conquest = None;
        self.log(format!("{} ended their turn", self.current_player().name));
        self.finish_turn();
        Ok(())
    }

    /// Asks the owner of `territory` how many dice to defend with: a random
    /// choice for computer players, the defense provider for humans. A
    /// provider answer outside `1..=max` is rejected with `InvalidDice`.
    pub fn defend_dice_for(&mut self, territory: &str) -> Result<u32, GameError> {
        let defending = self
            .board
            .territory(territory)
            .ok_or_else(|| GameError::UnknownTerritory(territory.to_string()))?;
        let max = combat::max_defend_dice(defending.armies).max(1);
        let Some(owner) = defending.owner.and_then(|id| self.players.get(id)) else {
            return Ok(max);
        };
        if owner.is_ai() {
            Ok(self.rng.gen_range(1..=max))
        } else {
            let dice = self.defense.defend_dice(owner, defending, max);
            check_dice(dice, max)?;
            Ok(dice)
        }
    }

    // ----- helpers -----

    fn ensure_running(&self) -> Result<(), GameError> {
        if self.is_over() {
            Err(GameError::GameOver)
        } else {
            Ok(())
        }
    }

    fn ensure_turn_action(&self) -> Result<(), GameError> {
        self.ensure_running()?;
        if let Some(pending) = &self.pending_conquest {
            return Err(GameError::ConquestPending(pending.to.clone()));
        }
        match self.turn_phase {
            TurnPhase::Place | TurnPhase::Attack => Ok(()),
            _ => Err(GameError::WrongPhase(self.status())),
        }
    }

    fn territory_or_err(&self, id: &str) -> Result<&Territory, GameError> {
        self.board
            .territory(id)
            .ok_or_else(|| GameError::UnknownTerritory(id.to_string()))
    }

    fn owned_territory(&self, id: &str) -> Result<&Territory, GameError> {
        let territory = self.territory_or_err(id)?;
        if territory.is_owned_by(self.current_turn) {
            Ok(territory)
        } else {
            Err(GameError::NotOwned {
                territory: id.to_string(),
                player: self.current_player().name.clone(),
            })
        }
    }

    pub(crate) fn log(&mut self, line: String) {
        tracing::info!("{}", line);
        for view in self.views.iter_mut() {
            view.print_line(&line);
        }
    }

    /// Runs every view's update in registration order. Views only get a
    /// shared reference, so they cannot write back into the engine.
    pub(crate) fn notify(&mut self) {
        let mut views = std::mem::take(&mut self.views);
        for view in views.iter_mut() {
            view.update_view(self);
        }
        self.views = views;
    }
}

fn check_dice(dice: u32, max: u32) -> Result<(), GameError> {
    if (1..=max).contains(&dice) {
        Ok(())
    } else {
        Err(GameError::InvalidDice { dice, max })
    }
}

fn validate_roster(roster: &[PlayerConfig]) -> Result<(), SetupError> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&roster.len()) {
        return Err(SetupError::PlayerCount(roster.len()));
    }
    let mut seen = HashSet::new();
    for player in roster {
        let name = player.name.trim();
        if name.is_empty() {
            return Err(SetupError::EmptyName);
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(SetupError::DuplicateName(name.to_string()));
        }
    }
    Ok(())
}
