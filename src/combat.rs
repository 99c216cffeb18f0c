// combat.rs
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const MAX_ATTACK_DICE: u32 = 3;
pub const MAX_DEFEND_DICE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleOutcome {
    /// Attacker dice, sorted descending.
    pub attack_rolls: Vec<u8>,
    /// Defender dice, sorted descending.
    pub defend_rolls: Vec<u8>,
    pub attacker_losses: u32,
    pub defender_losses: u32,
}

pub fn roll_dice<R: Rng>(rng: &mut R, dice: u32) -> Vec<u8> {
    (0..dice).map(|_| rng.gen_range(1..=6)).collect()
}

/// Rolls both sides and scores the result.
pub fn resolve_battle<R: Rng>(
    rng: &mut R,
    attack_dice: u32,
    defend_dice: u32,
) -> BattleOutcome {
    let attack_rolls = roll_dice(rng, attack_dice);
    let defend_rolls = roll_dice(rng, defend_dice);
    score_rolls(attack_rolls, defend_rolls)
}

/// Scores already rolled dice. The i-th highest attacking die meets the i-th
/// highest defending die, ties go to the defender and unpaired dice score
/// nothing.
pub fn score_rolls(mut attack_rolls: Vec<u8>, mut defend_rolls: Vec<u8>) -> BattleOutcome {
    attack_rolls.sort_unstable_by(|a, b| b.cmp(a));
    defend_rolls.sort_unstable_by(|a, b| b.cmp(a));

    let mut attacker_losses = 0;
    let mut defender_losses = 0;
    for (attack, defend) in attack_rolls.iter().zip(defend_rolls.iter()) {
        if attack > defend {
            defender_losses += 1;
        } else {
            attacker_losses += 1;
        }
    }

    BattleOutcome {
        attack_rolls,
        defend_rolls,
        attacker_losses,
        defender_losses,
    }
}

/// Most dice an attacking territory may roll.
pub fn max_attack_dice(armies: u32) -> u32 {
    armies.saturating_sub(1).min(MAX_ATTACK_DICE)
}

/// Most dice a defending territory may roll.
pub fn max_defend_dice(armies: u32) -> u32 {
    armies.min(MAX_DEFEND_DICE)
}
