//! Carrier/passenger garrisoning (spec §4.2.5).

use crate::entity::{Entity, EntityFlags, EntityId, Mode};
use crate::map::Cell;

/// Outcome of attempting to board a passenger onto a carrier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoardOutcome {
    Boarded,
    CarrierFull,
}

/// Removes `passenger` from the grid and adds it to `carrier`'s roster.
/// Caller clears the passenger's grid cells first; `EntityId`s come from the
/// pool since an entity does not know its own id.
pub fn board(
    carrier: &mut Entity,
    carrier_id: EntityId,
    passenger: &mut Entity,
    passenger_id: EntityId,
    capacity: usize,
) -> BoardOutcome {
    if carrier.garrisoned_units.len() >= capacity {
        return BoardOutcome::CarrierFull;
    }
    carrier.garrisoned_units.push(passenger_id);
    passenger.flags.insert(EntityFlags::IS_GARRISONED);
    passenger.garrison_id = carrier_id;
    passenger.mode = Mode::Ferry;
    BoardOutcome::Boarded
}

/// Outcome of attempting to unload a carrier's passengers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnloadOutcome {
    Unloaded(Cell),
    ExitBlocked,
}

/// Finds the nearest free cell around `carrier_cell` for a disembarking
/// passenger, trying the 8-neighborhood first and then expanding rings.
pub fn find_unload_cell(
    carrier_cell: Cell,
    max_ring: i32,
    mut is_free: impl FnMut(Cell) -> bool,
) -> Option<Cell> {
    for ring in 1..=max_ring {
        for dy in -ring..=ring {
            for dx in -ring..=ring {
                if dx.abs() != ring && dy.abs() != ring {
                    continue;
                }
                let cell = Cell::new(carrier_cell.x + dx, carrier_cell.y + dy);
                if is_free(cell) {
                    return Some(cell);
                }
            }
        }
    }
    None
}

/// Removes `passenger_id` from `carrier`'s roster and restores the
/// passenger to normal ground movement at `cell`.
pub fn disembark(carrier: &mut Entity, passenger: &mut Entity, passenger_id: EntityId, cell: Cell) {
    carrier.garrisoned_units.retain(|id| *id != passenger_id);
    passenger.flags.remove(EntityFlags::IS_GARRISONED);
    passenger.garrison_id = EntityId::NONE;
    passenger.cell = cell;
    passenger.position = crate::fixed::Vec2Fixed::from_cell(cell.x, cell.y);
    passenger.mode = Mode::Idle;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::target::UnitType;

    #[test]
    fn board_then_disembark_roundtrips() {
        let mut carrier = Entity::new_unit(UnitType::Wagon, 0, Cell::new(0, 0));
        let mut passenger = Entity::new_unit(UnitType::Miner, 0, Cell::new(1, 0));
        let carrier_id = EntityId::NONE; // placeholder id for the test
        let passenger_id = EntityId::NONE;

        let outcome = board(&mut carrier, carrier_id, &mut passenger, passenger_id, 4);
        assert_eq!(outcome, BoardOutcome::Boarded);
        assert!(passenger.is_garrisoned());

        disembark(&mut carrier, &mut passenger, passenger_id, Cell::new(2, 0));
        assert!(!passenger.is_garrisoned());
        assert_eq!(passenger.cell, Cell::new(2, 0));
    }

    #[test]
    fn full_carrier_rejects_boarding() {
        let mut carrier = Entity::new_unit(UnitType::Wagon, 0, Cell::new(0, 0));
        let mut passenger = Entity::new_unit(UnitType::Miner, 0, Cell::new(1, 0));
        for _ in 0..2 {
            carrier.garrisoned_units.push(EntityId::NONE);
        }
        let outcome = board(&mut carrier, EntityId::NONE, &mut passenger, EntityId::NONE, 2);
        assert_eq!(outcome, BoardOutcome::CarrierFull);
    }
}
