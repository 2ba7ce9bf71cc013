//! Discriminated union describing what a unit is trying to do (spec §3.4).

use crate::entity::EntityId;
use crate::map::Cell;

/// What a unit is currently trying to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Target {
    None,
    Cell { cell: Cell },
    AttackMove { cell: Cell },
    Entity { id: EntityId },
    Repair { id: EntityId },
    Build {
        building_type: BuildingType,
        building_cell: Cell,
        unit_cell: Cell,
        building_id: EntityId,
    },
    BuildAssist { builder_id: EntityId },
    Unload { cell: Cell },
    Molotov { cell: Cell },
    Gold { mine_id: EntityId },
    Camp { camp_id: EntityId },
    /// Alternates between `cell_a`/`cell_b` forever; `going_to_b` tracks
    /// which leg is currently in flight (spec §4.4 `PATROL`).
    Patrol { cell_a: Cell, cell_b: Cell, going_to_b: bool },
}

impl Default for Target {
    fn default() -> Self {
        Target::None
    }
}

impl Target {
    pub fn is_none(&self) -> bool {
        matches!(self, Target::None)
    }
}

/// Production-queue item for buildings (spec §4.2.4).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QueueItem {
    Unit(UnitType),
    Upgrade(u16),
}

/// Unit subtypes. A small representative catalog; gameplay balance data
/// (cost, stats) lives in content tables outside the simulation core, keyed
/// by this discriminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitType {
    Miner,
    Cowboy,
    Wagon,
}

/// Building subtypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BuildingType {
    House,
    Camp,
    Saloon,
}
