//! Damage resolution (spec §4.2.2).

use crate::entity::{Entity, EntityFlags};
use crate::map::{Cell, Map};
use crate::rng::Rng;

/// `max(1, attacker_damage - defender_armor)`.
pub fn compute_damage(attacker_damage: i32, defender_armor: i32) -> i32 {
    (attacker_damage - defender_armor).max(1)
}

/// Whether the shot misses due to the elevation rule: if the attacker is on
/// lower elevation than the defender, as derived from the tile under the
/// defender's cell and the attacker's cell *before* it last moved, the shot
/// has a 50% miss chance, realized with exactly one RNG draw.
///
/// Always consumes one draw when the elevation condition holds, so replays
/// stay in lockstep regardless of whether the shot actually misses.
pub fn resolve_elevation_miss(
    map: &Map,
    attacker_previous_cell: Cell,
    defender_cell: Cell,
    rng: &mut Rng,
) -> bool {
    let attacker_elevation = map.tile_at(attacker_previous_cell).map(|t| t.elevation).unwrap_or(0);
    let defender_elevation = map.tile_at(defender_cell).map(|t| t.elevation).unwrap_or(0);
    if attacker_elevation < defender_elevation {
        !rng.chance_percent(50)
    } else {
        false
    }
}

/// Applies damage to `defender`, clamping health at zero and arming the
/// damage-flicker flag and timer. Returns the defender's health after the
/// hit.
pub fn apply_damage(defender: &mut Entity, amount: i32, flicker_duration: u32) -> i32 {
    defender.health = (defender.health - amount).max(0);
    defender.flags.insert(EntityFlags::DAMAGE_FLICKER);
    defender.taking_damage_timer = flicker_duration;
    defender.taking_damage_counter += 1;
    defender.health
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_floor_is_one() {
        assert_eq!(compute_damage(2, 5), 1);
        assert_eq!(compute_damage(4, 1), 3);
    }

    #[test]
    fn same_elevation_never_misses() {
        let map = Map::new(4, 4);
        let mut rng = Rng::new(1);
        assert!(!resolve_elevation_miss(&map, Cell::new(0, 0), Cell::new(1, 0), &mut rng));
    }
}
