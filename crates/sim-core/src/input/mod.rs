//! The input model: what a player can command in a single turn (spec §4.4).

mod codec;

pub use codec::{decode_batch, encode_into, DecodeError};

use arrayvec::ArrayVec;

use crate::config::SimConfig;
use crate::entity::target::{BuildingType, UnitType};
use crate::entity::EntityId;
use crate::map::Cell;

/// Bounded list of entity ids a single input may carry (spec §6.4
/// `SELECTION_LIMIT`).
pub type EntityIdList = ArrayVec<EntityId, { SimConfig::SELECTION_LIMIT }>;

/// A single player-issued command for one turn (spec §4.4).
///
/// Non-shift variants replace a targeted unit's `target` and clear its
/// `target_queue`; shift commands append to `target_queue` instead. This
/// flag is carried per-input, not per-unit.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchInput {
    None,
    MoveCell {
        shift: bool,
        target_cell: Cell,
        entity_ids: EntityIdList,
    },
    MoveEntity {
        shift: bool,
        target_id: EntityId,
        entity_ids: EntityIdList,
    },
    MoveAttackCell {
        shift: bool,
        target_cell: Cell,
        entity_ids: EntityIdList,
    },
    MoveAttackEntity {
        shift: bool,
        target_id: EntityId,
        entity_ids: EntityIdList,
    },
    MoveRepair {
        shift: bool,
        target_id: EntityId,
        entity_ids: EntityIdList,
    },
    MoveUnload {
        shift: bool,
        target_cell: Cell,
        entity_ids: EntityIdList,
    },
    MoveMolotov {
        shift: bool,
        target_cell: Cell,
        entity_ids: EntityIdList,
    },
    Stop {
        entity_ids: EntityIdList,
    },
    Defend {
        entity_ids: EntityIdList,
    },
    Build {
        shift: bool,
        building_type: BuildingType,
        target_cell: Cell,
        entity_ids: EntityIdList,
    },
    BuildCancel {
        building_id: EntityId,
    },
    BuildingEnqueue {
        item: QueueItemRequest,
        building_ids: EntityIdList,
    },
    BuildingDequeue {
        building_id: EntityId,
        /// `None` means "pop the front of the queue".
        index: Option<u8>,
    },
    Rally {
        rally_point: Cell,
        building_ids: EntityIdList,
    },
    SingleUnload {
        entity_id: EntityId,
    },
    Unload {
        carrier_ids: EntityIdList,
    },
    Camo {
        unit_ids: EntityIdList,
    },
    Decamo {
        unit_ids: EntityIdList,
    },
    Patrol {
        cell_a: Cell,
        cell_b: Cell,
        unit_ids: EntityIdList,
    },
}

impl Default for MatchInput {
    fn default() -> Self {
        MatchInput::None
    }
}

/// Payload of `BUILDING_ENQUEUE`: which unit type or upgrade to add.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QueueItemRequest {
    Unit(UnitType),
    Upgrade(u16),
}
