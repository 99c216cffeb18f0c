// ai.rs
use crate::combat;
use crate::error::GameError;
use crate::game::Game;
use crate::player::PlayerId;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

/// Range of the per-step decision roll.
pub const AI_MAX: u32 = 20;
/// Rolls at or above this (and below `AI_MAX - 1`) prefer moving.
pub const AI_THRESHOLD: u32 = 16;

/// Rejected actions tolerated in a single turn before giving up.
const MAX_REJECTIONS: u32 = AI_MAX;

pub(crate) fn play_turn(game: &mut Game) {
    let player = game.current_turn;
    tracing::debug!(player = %game.players[player].name, "computer turn started");

    if let Err(err) = reinforce(game, player) {
        tracing::warn!(%err, "computer reinforcement rejected");
    }

    let mut rejections = 0;
    while !game.ai_turn_over && !game.is_over() && has_spare_armies(game, player) {
        let roll = game.rng.gen_range(0..AI_MAX);
        if let Err(err) = step(game, player, roll) {
            rejections += 1;
            tracing::warn!(%err, rejections, "computer action rejected");
            if rejections >= MAX_REJECTIONS {
                break;
            }
        }
    }

    if !game.ai_turn_over && !game.is_over() {
        if let Err(err) = game.done() {
            tracing::warn!(%err, "computer could not end its turn");
        }
    }
}

/// One decision of the turn loop for a roll in `0..AI_MAX`. High rolls move
/// and end the turn, the top roll ends it outright, anything else attacks.
fn step(game: &mut Game, player: PlayerId, roll: u32) -> Result<(), GameError> {
    if (AI_THRESHOLD..AI_MAX - 1).contains(&roll) && !game.move_sources(player).is_empty() {
        random_move(game, player)
    } else if roll < AI_MAX - 1 && !game.attack_sources(player).is_empty() {
        random_attack(game, player)
    } else if roll == AI_MAX - 1 {
        tracing::debug!(roll, "computer stalls");
        game.done()
    } else {
        Ok(())
    }
}

/// Spreads the turn's reinforcements over territories bordering an enemy.
fn reinforce(game: &mut Game, player: PlayerId) -> Result<(), GameError> {
    let frontier: Vec<String> = game.frontier(player).iter().map(|t| t.id.clone()).collect();
    let mut remaining = game.reinforcements_remaining();
    let mut allocations: BTreeMap<String, u32> = BTreeMap::new();

    while remaining > 0 {
        let Some(territory) = frontier.choose(&mut game.rng) else {
            break;
        };
        let share = game.rng.gen_range(1..=remaining);
        *allocations.entry(territory.clone()).or_insert(0) += share;
        remaining -= share;
    }

    if allocations.is_empty() {
        return Ok(());
    }
    tracing::debug!(?allocations, "computer places reinforcements");
    game.place(&allocations)
}

fn random_attack(game: &mut Game, player: PlayerId) -> Result<(), GameError> {
    let sources: Vec<(String, u32)> = game
        .attack_sources(player)
        .iter()
        .map(|t| (t.id.clone(), t.armies))
        .collect();
    let Some((from, armies)) = sources.choose(&mut game.rng).cloned() else {
        return Ok(());
    };
    let targets: Vec<String> = game
        .adjacent_enemy(&from)
        .iter()
        .map(|t| t.id.clone())
        .collect();
    let Some(to) = targets.choose(&mut game.rng).cloned() else {
        return Ok(());
    };

    let attack_dice = game.rng.gen_range(1..=combat::max_attack_dice(armies));
    let defend_dice = game.defend_dice_for(&to)?;
    tracing::debug!(%from, %to, attack_dice, defend_dice, "computer attacks");

    let report = game.attack(&from, attack_dice, &to, defend_dice)?;
    if report.conquerable {
        let available = game.territory(&from).map_or(0, |t| t.armies);
        let armies = game.rng.gen_range(attack_dice..=available - 1);
        game.resolve_conquest(&from, &to, armies)?;
    }
    Ok(())
}

fn random_move(game: &mut Game, player: PlayerId) -> Result<(), GameError> {
    let sources: Vec<(String, u32)> = game
        .move_sources(player)
        .iter()
        .map(|t| (t.id.clone(), t.armies))
        .collect();
    let Some((from, armies)) = sources.choose(&mut game.rng).cloned() else {
        return Ok(());
    };
    let targets: Vec<String> = game
        .adjacent_friendly(&from)
        .iter()
        .map(|t| t.id.clone())
        .collect();
    let Some(to) = targets.choose(&mut game.rng).cloned() else {
        return Ok(());
    };

    let count = game.rng.gen_range(1..armies);
    tracing::debug!(%from, %to, count, "computer moves armies");
    game.move_armies(count, &from, &to)
}

fn has_spare_armies(game: &Game, player: PlayerId) -> bool {
    game.owned_territories(player).any(|t| t.armies > 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tests::{set_territory, south_america_standoff};
    use crate::game_config::{EngineSettings, GameConfig, PlayerConfig};
    use crate::turn_phase::TurnPhase;
    use crate::view::ActionLog;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn roster(players: &[(&str, bool)]) -> Vec<PlayerConfig> {
        players
            .iter()
            .map(|&(name, is_ai)| PlayerConfig {
                name: name.to_string(),
                is_ai,
            })
            .collect()
    }

    fn game(players: &[(&str, bool)], seed: u64, max_rounds: Option<u32>) -> Game {
        let config = GameConfig {
            players: roster(players),
            continents: None,
            settings: EngineSettings {
                seed: Some(seed),
                max_rounds,
            },
        };
        Game::from_config(&config).unwrap()
    }

    fn assert_consistent(game: &Game) {
        for territory in game.board().territories() {
            let owner = territory.owner.expect("every territory is owned");
            assert!(territory.armies >= 1, "{} has no armies", territory.id);
            assert!(game.players()[owner].owns(&territory.id));
        }
        let owned: usize = game.players().iter().map(|p| p.territory_count()).sum();
        assert_eq!(owned, game.board().territory_count());
    }

    #[test]
    fn test_computer_turn_returns_control_to_human() {
        let mut game = game(&[("Human", false), ("Computer", true)], 21, None);
        game.done().unwrap();

        if !game.is_over() {
            assert_eq!(game.current_player().name, "Human");
            assert_eq!(game.status(), TurnPhase::Place);
            assert_eq!(game.round(), 1);
        }
        assert_consistent(&game);
    }

    #[test]
    fn test_start_plays_computer_opening() {
        let mut game = game(&[("Computer", true), ("Human", false)], 4, None);
        assert_eq!(game.current_player().name, "Computer");
        game.start();
        if !game.is_over() {
            assert_eq!(game.current_player().name, "Human");
            assert_eq!(game.status(), TurnPhase::Place);
        }
        assert_consistent(&game);
    }

    #[test]
    fn test_all_computer_game_terminates() {
        for seed in 0..5 {
            let mut game = game(&[("A", true), ("B", true), ("C", true)], seed, Some(300));
            game.start();
            assert!(game.is_over());
            match game.winner() {
                Some(winner) => assert_eq!(winner.territory_count(), 42),
                None => assert_eq!(game.round(), 300),
            }
            assert_consistent(&game);
        }
    }

    #[test]
    fn test_same_seed_same_game() {
        let play = |seed| {
            let mut game = game(&[("A", true), ("B", true)], seed, Some(50));
            game.start();
            (game.round(), game.board().clone())
        };
        assert_eq!(play(77), play(77));
    }

    /// The standoff position with P1 under computer control and a fixed rng.
    fn driven_standoff(seed: u64) -> (Game, ActionLog) {
        let mut game = south_america_standoff();
        let log = ActionLog::new();
        game.subscribe(Box::new(log.clone()));
        game.ai_driving = true;
        game.ai_turn_over = false;
        game.rng = ChaCha8Rng::seed_from_u64(seed);
        (game, log)
    }

    fn armies(game: &Game, id: &str) -> u32 {
        game.territory(id).unwrap().armies
    }

    fn total_armies(game: &Game, player: PlayerId) -> u32 {
        game.owned_territories(player).map(|t| t.armies).sum()
    }

    fn south_america(game: &Game) -> Vec<(Option<PlayerId>, u32)> {
        ["SA1", "SA2", "SA3", "SA4"]
            .iter()
            .map(|id| {
                let t = game.territory(id).unwrap();
                (t.owner, t.armies)
            })
            .collect()
    }

    #[test]
    fn test_reinforce_places_everything_on_the_frontier() {
        for seed in 0..20 {
            let (mut game, _) = driven_standoff(seed);
            assert_eq!(game.reinforcements_remaining(), 34);
            reinforce(&mut game, 0).unwrap();

            assert_eq!(game.reinforcements_remaining(), 0);
            assert_eq!(armies(&game, "NA3") + armies(&game, "AF5"), 2 + 34);
            for territory in game.owned_territories(0) {
                if territory.id != "NA3" && territory.id != "AF5" {
                    assert_eq!(territory.armies, 1, "{} was reinforced", territory.id);
                }
            }
        }
    }

    #[test]
    fn test_move_roll_makes_one_move_and_ends_turn() {
        for seed in 0..10 {
            let (mut game, log) = driven_standoff(seed);
            set_territory(&mut game, "NA1", 0, 5);
            set_territory(&mut game, "NA3", 0, 5);
            let before = total_armies(&game, 0);
            let defenders = south_america(&game);

            step(&mut game, 0, AI_THRESHOLD + 1).unwrap();

            assert!(game.ai_turn_over);
            let moves = log.lines().iter().filter(|l| l.contains(" armies from ")).count();
            assert_eq!(moves, 1);
            assert!(!log.lines().iter().any(|l| l.contains(" attacks ")));
            assert_eq!(total_armies(&game, 0), before);
            assert_eq!(south_america(&game), defenders);
        }
    }

    #[test]
    fn test_move_roll_without_move_source_attacks() {
        let (mut game, log) = driven_standoff(8);
        // Argentina only borders Brazil and Peru.
        set_territory(&mut game, "SA1", 0, 3);

        step(&mut game, 0, AI_THRESHOLD + 1).unwrap();

        assert!(!game.ai_turn_over);
        assert!(log.lines().iter().any(|l| l.contains(" attacks SA")));
        assert!(!log.lines().iter().any(|l| l.contains(" armies from ")));
    }

    #[test]
    fn test_top_roll_ends_turn_without_acting() {
        let (mut game, log) = driven_standoff(2);
        set_territory(&mut game, "NA1", 0, 5);
        set_territory(&mut game, "NA3", 0, 5);
        let board = game.board().clone();

        step(&mut game, 0, AI_MAX - 1).unwrap();

        assert!(game.ai_turn_over);
        assert_eq!(game.board(), &board);
        assert_eq!(log.lines(), vec!["P1 ended their turn"]);
    }

    #[test]
    fn test_low_roll_without_attack_source_does_nothing() {
        let (mut game, log) = driven_standoff(5);
        let board = game.board().clone();

        step(&mut game, 0, 3).unwrap();

        assert!(!game.ai_turn_over);
        assert_eq!(game.board(), &board);
        assert!(log.lines().is_empty());
    }

    #[test]
    fn test_conquest_moves_between_dice_and_all_but_one() {
        let mut conquered = 0;
        for seed in 0..40 {
            let (mut game, log) = driven_standoff(seed);
            set_territory(&mut game, "NA3", 0, 10);

            step(&mut game, 0, 0).unwrap();

            let lines = log.lines();
            let attack = lines
                .iter()
                .find(|l| l.contains(" attacks SA4 from NA3"))
                .expect("the only attack source is Central America");
            let dice = attack
                .split(": rolled ")
                .nth(1)
                .and_then(|rolls| rolls.split(" against ").next())
                .map(|rolls| rolls.split(", ").count() as u32)
                .unwrap();

            assert_eq!(armies(&game, "NA3") + armies(&game, "SA4"), 10);
            if game.territory("SA4").unwrap().owner == Some(0) {
                conquered += 1;
                let moved = armies(&game, "SA4");
                assert!((dice..=9).contains(&moved), "moved {} with {} dice", moved, dice);
                assert!(game.pending_conquest().is_none());
            } else {
                assert_eq!(armies(&game, "NA3"), 9);
            }
        }
        assert!(conquered > 0);
    }
}
