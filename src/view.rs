// view.rs
use crate::game::Game;
use crate::turn_phase::TurnPhase;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;
use std::cell::RefCell;
use std::fmt::Write;
use std::rc::Rc;

/// Subscriber notified after every mutation of the engine.
pub trait GameView {
    fn update_view(&mut self, game: &Game);

    fn print_line(&mut self, _line: &str) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub line: String,
}

/// Records every log line with a timestamp. Clones share the same log, so a
/// caller can keep one handle and subscribe the other.
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    entries: Rc<RefCell<Vec<LogEntry>>>,
    updates: Rc<RefCell<usize>>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries.borrow().iter().map(|e| e.line.clone()).collect()
    }

    /// Number of notifications received so far.
    pub fn updates(&self) -> usize {
        *self.updates.borrow()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&*self.entries.borrow())
    }
}

impl GameView for ActionLog {
    fn update_view(&mut self, _game: &Game) {
        *self.updates.borrow_mut() += 1;
    }

    fn print_line(&mut self, line: &str) {
        self.entries.borrow_mut().push(LogEntry {
            at: Utc::now(),
            line: line.to_string(),
        });
    }
}

/// Emits a debug event describing the engine after each notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingView;

impl GameView for TracingView {
    fn update_view(&mut self, game: &Game) {
        tracing::debug!(
            player = %game.current_player().name,
            status = ?game.status(),
            round = game.round(),
            reinforcements = game.reinforcements_remaining(),
            "engine updated"
        );
    }
}

impl Game {
    /// Human readable overview of the players and every continent.
    pub fn map_report(&self) -> String {
        let mut report = String::new();
        let status = match self.status() {
            TurnPhase::GameOver => "game over".to_string(),
            phase => format!("{:?}", phase),
        };
        let _ = writeln!(
            report,
            "Round {}, {} to act ({})",
            self.round(),
            self.current_player().name,
            status
        );
        let _ = writeln!(
            report,
            "Active players: {}",
            self.active_players()
                .iter()
                .map(|p| format!("{} ({} territories)", p.name, p.territory_count()))
                .join(", ")
        );

        for continent in self.continents().values() {
            let holder = continent
                .conqueror()
                .and_then(|id| self.player(id))
                .map(|p| format!(", held by {}", p.name))
                .unwrap_or_default();
            let _ = writeln!(
                report,
                "{} [{}] +{}{}",
                continent.name, continent.id, continent.bonus_armies, holder
            );
            for territory in &continent.territories {
                let owner = territory
                    .owner
                    .and_then(|id| self.player(id))
                    .map_or("nobody", |p| p.name.as_str());
                let _ = writeln!(
                    report,
                    "  {:<5} {:<40} {:>3}  {}",
                    territory.id, territory.name, territory.armies, owner
                );
            }
        }
        report
    }
}
