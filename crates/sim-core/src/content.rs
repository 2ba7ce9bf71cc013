//! Static per-type combat/movement data.
//!
//! The original game keeps this as a `type -> data` table looked up at use
//! time rather than duplicated on every entity (`ENTITY_DATA`/`BUILDING_DATA`
//! in the source this was distilled from). We do the same: `Entity` stores
//! only its `kind` and mutable runtime fields, and callers fetch stats here.

use crate::config::SimConfig;
use crate::entity::target::{BuildingType, QueueItem, UnitType};
use crate::fixed::Fixed32;

/// Combat, movement and footprint data for one unit or building type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stats {
    pub cell_size: u8,
    pub max_health: i32,
    pub sight: u32,
    pub armor: i32,
    pub damage: i32,
    pub attack_cooldown: u32,
    /// Movement speed in cells/tick, `Fixed32::ZERO` for buildings.
    pub speed_raw: i32,
}

impl Stats {
    pub const fn speed(&self) -> Fixed32 {
        Fixed32::from_raw(self.speed_raw)
    }

    pub const fn can_attack(&self) -> bool {
        self.damage > 0
    }
}

pub fn unit_stats(unit_type: UnitType) -> Stats {
    match unit_type {
        UnitType::Miner => Stats {
            cell_size: 1,
            max_health: 30,
            sight: 7,
            armor: 0,
            damage: 0,
            attack_cooldown: 0,
            speed_raw: 200,
        },
        UnitType::Cowboy => Stats {
            cell_size: 1,
            max_health: 40,
            sight: 8,
            armor: 1,
            damage: 4,
            attack_cooldown: 16,
            speed_raw: 180,
        },
        UnitType::Wagon => Stats {
            cell_size: 1,
            max_health: 80,
            sight: 6,
            armor: 2,
            damage: 0,
            attack_cooldown: 0,
            speed_raw: 150,
        },
    }
}

pub fn building_stats(building_type: BuildingType) -> Stats {
    match building_type {
        BuildingType::House => Stats {
            cell_size: 2,
            max_health: 200,
            sight: 5,
            armor: 0,
            damage: 0,
            attack_cooldown: 0,
            speed_raw: 0,
        },
        BuildingType::Camp => Stats {
            cell_size: 3,
            max_health: 400,
            sight: 6,
            armor: 2,
            damage: 0,
            attack_cooldown: 0,
            speed_raw: 0,
        },
        BuildingType::Saloon => Stats {
            cell_size: 3,
            max_health: 300,
            sight: 6,
            armor: 1,
            damage: 0,
            attack_cooldown: 0,
            speed_raw: 0,
        },
    }
}

/// Gold cost to enqueue a unit or upgrade; charged on `BUILDING_ENQUEUE`,
/// refunded exactly once on a not-yet-completed `BUILDING_DEQUEUE` (spec §8
/// property 6).
pub fn unit_gold_cost(unit_type: UnitType) -> u32 {
    match unit_type {
        UnitType::Miner => 50,
        UnitType::Cowboy => 100,
        UnitType::Wagon => 150,
    }
}

pub fn unit_population_cost(unit_type: UnitType) -> u32 {
    match unit_type {
        UnitType::Miner => 1,
        UnitType::Cowboy => 2,
        UnitType::Wagon => 2,
    }
}

pub fn building_gold_cost(building_type: BuildingType) -> u32 {
    match building_type {
        BuildingType::House => 100,
        BuildingType::Camp => 150,
        BuildingType::Saloon => 200,
    }
}

/// Ticks a building's production queue head counts down from when this unit
/// becomes the queue head (spec §4.2.4).
pub fn unit_build_ticks(unit_type: UnitType) -> u32 {
    match unit_type {
        UnitType::Miner => 50,
        UnitType::Cowboy => 80,
        UnitType::Wagon => 90,
    }
}

/// Ticks a queue head counts down for, regardless of item kind.
pub fn queue_item_ticks(item: QueueItem) -> u32 {
    match item {
        QueueItem::Unit(unit_type) => unit_build_ticks(unit_type),
        QueueItem::Upgrade(_) => SimConfig::UPGRADE_TICK_DURATION,
    }
}
