//! Bleed, fire and mine passive damage ticks (spec §4.2.6, §9 open question).
//!
//! The original's bleed/fire mutation rules are scattered across files and
//! only partially discoverable; this re-derives the behavior from what the
//! checksum and spec both observe: a periodic damage tick clamped to zero
//! health, for a bounded duration.

use crate::entity::Entity;
use crate::map::Cell;

/// Per-tick bleed damage. Ticks every `period` ticks while `bleed_timer` is
/// nonzero; each tick deals `amount` damage and decrements the remaining
/// duration counter (`bleed_damage_timer`).
pub fn tick_bleed(entity: &mut Entity, period: u32, amount: i32) -> bool {
    if entity.bleed_timer == 0 {
        return false;
    }
    entity.bleed_timer -= 1;
    if entity.bleed_damage_timer == 0 {
        entity.bleed_damage_timer = period;
    }
    entity.bleed_damage_timer -= 1;
    if entity.bleed_damage_timer == 0 {
        entity.health = (entity.health - amount).max(0);
        true
    } else {
        false
    }
}

/// Per-tick fire damage on a building, ticking every `period` ticks.
pub fn tick_fire_damage(entity: &mut Entity, fire_damage_timer: &mut u32, period: u32, amount: i32) -> bool {
    if *fire_damage_timer == 0 {
        *fire_damage_timer = period;
    }
    *fire_damage_timer -= 1;
    if *fire_damage_timer == 0 {
        entity.health = (entity.health - amount).max(0);
        true
    } else {
        false
    }
}

/// A single burning cell, tracked in `Simulation::fire_cells`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fire {
    pub cell: Cell,
    pub ticks_remaining: u32,
}

/// Candidate adjacent cells fire may spread to this tick, at a bounded rate:
/// at most one new cell per burning cell per `spread_period` ticks.
pub fn spread_candidates(fire: &Fire, tick: u32, spread_period: u32) -> Vec<Cell> {
    if spread_period == 0 || tick % spread_period != 0 {
        return Vec::new();
    }
    fire.cell.neighbors8().to_vec()
}

/// A placed land mine, detonating on proximity of an enemy to an adjacent
/// cell and applying area damage at the mine's own cell.
pub fn mine_should_detonate(mine_cell: Cell, enemy_cells: &[Cell]) -> bool {
    enemy_cells.iter().any(|&c| c.is_adjacent(mine_cell) || c == mine_cell)
}
