use proptest::prelude::*;
use risk_engine::defense::DefenseProvider;
use risk_engine::game_config::{EngineSettings, GameConfig, PlayerConfig};
use risk_engine::player::Player;
use risk_engine::territory::Territory;
use risk_engine::view::ActionLog;
use risk_engine::{ErrorCategory, Game, GameError, SetupError, TurnPhase};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

fn config(players: &[(&str, bool)], seed: u64) -> GameConfig {
    GameConfig {
        players: players
            .iter()
            .map(|&(name, is_ai)| PlayerConfig {
                name: name.to_string(),
                is_ai,
            })
            .collect(),
        continents: None,
        settings: EngineSettings {
            seed: Some(seed),
            max_rounds: Some(200),
        },
    }
}

fn humans(count: usize, seed: u64) -> Game {
    let names: Vec<String> = (1..=count).map(|i| format!("Player {}", i)).collect();
    let players: Vec<(&str, bool)> = names.iter().map(|n| (n.as_str(), false)).collect();
    Game::from_config(&config(&players, seed)).unwrap()
}

fn budget(players: usize) -> u32 {
    [0, 0, 50, 35, 30, 25, 20][players]
}

proptest! {
    #[test]
    fn setup_conserves_armies_and_territories(players in 2usize..=6, seed in any::<u64>()) {
        let game = humans(players, seed);

        let counts: Vec<usize> = game.players().iter().map(|p| p.territory_count()).collect();
        prop_assert_eq!(counts.iter().sum::<usize>(), 42);
        let min = counts.iter().min().copied().unwrap_or(0);
        let max = counts.iter().max().copied().unwrap_or(0);
        prop_assert!(max - min <= 1);

        for player in game.players() {
            let armies: u32 = game.owned_territories(player.id).map(|t| t.armies).sum();
            prop_assert_eq!(armies, budget(players));
        }
        for territory in game.board().territories() {
            prop_assert!(territory.armies >= 1);
            let owner = territory.owner.unwrap();
            prop_assert!(game.players()[owner].owns(&territory.id));
        }
    }
}

#[test]
fn first_turn_starts_with_reinforcements() {
    let game = humans(3, 5);
    assert_eq!(game.current_player().name, "Player 1");
    assert_eq!(game.status(), TurnPhase::Place);
    assert_eq!(game.round(), 0);
    assert_eq!(game.reinforcements_remaining(), game.calculate_reinforcements(0));
    assert!(game.reinforcements_remaining() >= 3);
    assert!(game.winner().is_none());
}

#[test]
fn rejected_calls_report_their_category() {
    let mut game = humans(2, 12);
    let own = game.current_player().territories.iter().next().cloned().unwrap();
    let enemy = game.players()[1].territories.iter().next().cloned().unwrap();

    let err = game.place(&BTreeMap::from([(enemy.clone(), 1)])).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Ownership);

    let err = game.move_armies(1, &own, "QQ7").unwrap_err();
    assert!(matches!(
        err.category(),
        ErrorCategory::Adjacency | ErrorCategory::InsufficientResource
    ));

    let err = game.resolve_conquest(&own, &enemy, 1).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::State);
}

#[test]
fn invalid_rosters_are_refused() {
    let seven: Vec<(&str, bool)> = ["a", "b", "c", "d", "e", "f", "g"]
        .iter()
        .map(|&n| (n, false))
        .collect();
    assert_eq!(
        Game::from_config(&config(&seven, 1)).unwrap_err(),
        SetupError::PlayerCount(7)
    );
    assert_eq!(
        Game::from_config(&config(&[("Zed", false), ("ZED", true)], 1)).unwrap_err(),
        SetupError::DuplicateName("ZED".to_string())
    );
}

#[test]
fn computer_games_finish_with_a_single_survivor() {
    for players in 2..=6 {
        let mut game =
            Game::from_config(&GameConfig {
                settings: EngineSettings {
                    seed: Some(players as u64 * 31),
                    max_rounds: Some(400),
                },
                ..GameConfig::ai_players(players)
            })
            .unwrap();
        game.start();

        if let Some(winner) = game.winner() {
            assert_eq!(winner.territory_count(), 42);
            assert_eq!(game.active_players().len(), 1);
            assert_eq!(game.status(), TurnPhase::GameOver);
        } else {
            assert!(game.round() >= 400);
        }
        let armies_everywhere = game.board().territories().all(|t| t.armies >= 1);
        assert!(armies_everywhere);
    }
}

#[test]
fn human_defender_is_asked_for_dice() {
    let mut game = Game::from_config(&config(&[("Human", false), ("Machine", true)], 17)).unwrap();
    let asked = Rc::new(Cell::new(0));
    let counter = asked.clone();
    game.set_defense_provider(Box::new(
        move |defender: &Player, territory: &Territory, max_dice: u32| {
            assert_eq!(defender.name, "Human");
            assert_eq!(territory.owner, Some(defender.id));
            assert!((1..=2).contains(&max_dice));
            counter.set(counter.get() + 1);
            1
        },
    ));

    let log = ActionLog::new();
    game.subscribe(Box::new(log.clone()));
    game.done().unwrap();

    let attacks = log.lines().iter().filter(|l| l.starts_with("Machine attacks")).count();
    assert_eq!(asked.get(), attacks);
    if !game.is_over() {
        assert_eq!(game.current_player().name, "Human");
    }
}

struct Fixed(u32);

impl DefenseProvider for Fixed {
    fn defend_dice(&mut self, _defender: &Player, _territory: &Territory, _max_dice: u32) -> u32 {
        self.0
    }
}

#[test]
fn out_of_range_provider_answers_are_rejected() {
    let mut game = humans(2, 3);
    let territory = game.players()[1].territories.iter().next().cloned().unwrap();
    let max = game.territory(&territory).unwrap().armies.min(2);

    game.set_defense_provider(Box::new(Fixed(9)));
    assert_eq!(
        game.defend_dice_for(&territory),
        Err(GameError::InvalidDice { dice: 9, max })
    );
    game.set_defense_provider(Box::new(Fixed(0)));
    assert_eq!(
        game.defend_dice_for(&territory),
        Err(GameError::InvalidDice { dice: 0, max })
    );
    game.set_defense_provider(Box::new(Fixed(1)));
    assert_eq!(game.defend_dice_for(&territory), Ok(1));
}

#[test]
fn snapshot_survives_mid_turn() {
    let mut game = humans(2, 99);
    let territory = game.current_player().territories.iter().next().cloned().unwrap();
    game.place(&BTreeMap::from([(territory.clone(), 2)])).unwrap();

    let restored = Game::from_bytes(&game.to_bytes().unwrap()).unwrap();
    assert_eq!(restored.reinforcements_remaining(), game.reinforcements_remaining());
    assert_eq!(restored.territory(&territory), game.territory(&territory));
    assert_eq!(restored.current_player().name, "Player 1");
}
