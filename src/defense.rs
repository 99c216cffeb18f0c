// defense.rs
use crate::player::Player;
use crate::territory::Territory;

/// Chooses how many dice a human defender rolls. The engine only asks when
/// the defending territory belongs to a non-computer player, and always
/// passes a `max_dice` of at least one.
pub trait DefenseProvider {
    fn defend_dice(&mut self, defender: &Player, territory: &Territory, max_dice: u32) -> u32;
}

/// Always defends with as many dice as allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrongestDefense;

impl DefenseProvider for StrongestDefense {
    fn defend_dice(&mut self, _defender: &Player, _territory: &Territory, max_dice: u32) -> u32 {
        max_dice
    }
}

impl<F> DefenseProvider for F
where
    F: FnMut(&Player, &Territory, u32) -> u32,
{
    fn defend_dice(&mut self, defender: &Player, territory: &Territory, max_dice: u32) -> u32 {
        self(defender, territory, max_dice)
    }
}
