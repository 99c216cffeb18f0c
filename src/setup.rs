// setup.rs
use crate::board::Board;
use crate::error::SetupError;
use crate::player::Player;
use rand::seq::SliceRandom;
use rand::Rng;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;

/// Starting armies per player for a given player count.
pub fn army_budget(num_players: usize) -> Result<u32, SetupError> {
    match num_players {
        2 => Ok(50),
        3 => Ok(35),
        4 => Ok(30),
        5 => Ok(25),
        6 => Ok(20),
        n => Err(SetupError::PlayerCount(n)),
    }
}

/// Territory counts per player: `total / n` each, plus one for a random
/// subset of `total % n` players.
pub fn territory_shares<R: Rng>(
    rng: &mut R,
    total: usize,
    num_players: usize,
) -> Vec<usize> {
    let mut shares = vec![total / num_players; num_players];
    let mut order: Vec<usize> = (0..num_players).collect();
    order.shuffle(rng);
    for &player in order.iter().take(total % num_players) {
        shares[player] += 1;
    }
    shares
}

/// Splits `total` into `parts` positive integers summing to `total`.
pub fn partition_armies<R: Rng>(
    rng: &mut R,
    total: u32,
    parts: usize,
) -> Result<Vec<u32>, SetupError> {
    let budget = u32::try_from(parts)
        .ok()
        .and_then(|parts| total.checked_sub(parts))
        .ok_or(SetupError::BudgetTooSmall {
            territories: parts,
            budget: total,
        })?;
    if parts == 0 {
        return Ok(Vec::new());
    }
    let mut cuts: Vec<u32> = (0..parts - 1).map(|_| rng.gen_range(0..=budget)).collect();
    cuts.push(budget);
    cuts.sort_unstable();

    let mut previous = 0;
    Ok(cuts
        .into_iter()
        .map(|cut| {
            let share = cut - previous;
            previous = cut;
            share + 1
        })
        .collect())
}

/// Hands out every territory on `board` to `players` and places their
/// starting armies. The board must already be validated.
pub fn distribute<R: Rng>(
    rng: &mut R,
    board: &mut Board,
    players: &mut [Player],
) -> Result<(), SetupError> {
    let budget = army_budget(players.len())?;
    let shares = territory_shares(rng, board.territory_count(), players.len());
    if let Some(&largest) = shares.iter().max() {
        if largest as u32 > budget {
            return Err(SetupError::BudgetTooSmall {
                territories: largest,
                budget,
            });
        }
    }

    let mut pool = board.territory_ids();
    pool.shuffle(rng);

    for (player, share) in players.iter_mut().zip(shares) {
        let armies = partition_armies(rng, budget, share)?;
        for army in armies {
            // shares sum to the pool size, so the pool never runs dry here
            let Some(id) = pool.pop() else { break };
            if let Some(territory) = board.territory_mut(&id) {
                territory.owner = Some(player.id);
                territory.armies = army;
                player.add_territory(&id);
            }
        }
        tracing::debug!(
            player = %player.name,
            territories = player.territory_count(),
            armies = budget,
            "allocated starting position"
        );
    }
    Ok(())
}
