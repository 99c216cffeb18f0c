// turn_phase.rs
use crate::ai;
use crate::game::Game;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum TurnPhase {
    Place,
    Attack,
    Done,
    /// A computer player is taking its turn; human input is suspended.
    Disabled,
    GameOver,
}

impl Game {
    pub(crate) fn start_turn(&mut self) {
        self.reinforcement_armies = self.calculate_reinforcements(self.current_turn);
        self.pending_conquest = None;
        self.turn_phase = TurnPhase::Place;
        let name = self.players[self.current_turn].name.clone();
        self.log(format!(
            "{}'s turn (round {}): {} armies to place",
            name, self.round, self.reinforcement_armies
        ));
        self.notify();
    }

    /// Ends the current turn and moves on to the next active player.
    pub(crate) fn end_turn(&mut self) {
        self.pending_conquest = None;
        self.turn_phase = TurnPhase::Done;
        self.notify();

        if let Some(current_index) = self
            .active_players
            .iter()
            .position(|&p| p == self.current_turn)
        {
            let next_index = (current_index + 1) % self.active_players.len();
            self.current_turn = self.active_players[next_index];
            if next_index == 0 {
                self.round += 1;
            }
        }

        self.start_turn();
    }

    /// Called by `done` and `move_armies`. While a computer player is
    /// driving, this only flags its turn as finished; the driving loop in
    /// `hand_over` does the rotation.
    pub(crate) fn finish_turn(&mut self) {
        if self.ai_driving {
            self.ai_turn_over = true;
            return;
        }
        self.hand_over(true);
    }

    /// Plays computer turns one after another until a human is up or the game
    /// is over. Reaching the round limit ends the game.
    pub(crate) fn hand_over(&mut self, mut rotate: bool) {
        loop {
            if self.is_over() {
                break;
            }
            if rotate {
                self.end_turn();
            }
            rotate = true;

            if self.round_limit_reached() {
                self.end_at_round_limit();
                break;
            }
            if !self.players[self.current_turn].is_ai() {
                break;
            }

            self.ai_driving = true;
            self.ai_turn_over = false;
            self.notify();
            ai::play_turn(self);
            self.ai_driving = false;
        }
        self.notify();
    }

    /// Ends the game without a winner. Every player still active stays active.
    fn end_at_round_limit(&mut self) {
        self.pending_conquest = None;
        self.turn_phase = TurnPhase::GameOver;
        tracing::warn!(round = self.round, "round limit reached");
        self.log(format!(
            "Round limit of {} reached, the game ends without a winner",
            self.round
        ));
    }

    fn round_limit_reached(&self) -> bool {
        self.settings
            .max_rounds
            .map_or(false, |limit| self.round >= limit)
    }
}
