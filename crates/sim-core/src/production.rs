//! Building production/research queues (spec §4.2.4).

use crate::entity::target::QueueItem;
use crate::entity::Entity;
use crate::player::Player;

/// Outcome of ticking a building's production queue head for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueTick {
    /// Nothing queued.
    Empty,
    /// Still counting down normally.
    InProgress,
    /// Head item cannot proceed: population cap would be exceeded.
    Blocked,
    /// Head item is ready but no adjacent spawn cell is free.
    ExitBlocked,
    /// Head item's timer reached zero; caller should spawn/apply it and pop
    /// the queue.
    Complete(QueueItem),
}

/// Building-specific production timers live on the entity's generic
/// `timer`/`cooldown_timer` fields; this module only decides state, the
/// caller (tick dispatch) owns mutating them and spawning units.
pub fn tick_queue(building: &Entity, player: &Player, spawn_cell_free: bool) -> QueueTick {
    let Some(item) = building.queue.first().copied() else {
        return QueueTick::Empty;
    };

    if let QueueItem::Unit(unit_type) = item {
        let cost = crate::content::unit_population_cost(unit_type);
        if cost > player.population_headroom() {
            return QueueTick::Blocked;
        }
        if !spawn_cell_free {
            return QueueTick::ExitBlocked;
        }
    }

    if building.timer == 0 {
        QueueTick::Complete(item)
    } else {
        QueueTick::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::target::{BuildingType, UnitType};
    use crate::map::Cell;

    #[test]
    fn blocked_when_population_capped() {
        let mut building = Entity::new_building(BuildingType::Saloon, 0, Cell::new(0, 0));
        building.queue.push(QueueItem::Unit(UnitType::Cowboy));
        let mut player = Player::new("p", 0, 0);
        player.max_population = 1;
        player.population = 1;
        assert_eq!(tick_queue(&building, &player, true), QueueTick::Blocked);
    }

    #[test]
    fn exit_blocked_when_no_spawn_cell() {
        let mut building = Entity::new_building(BuildingType::Saloon, 0, Cell::new(0, 0));
        building.queue.push(QueueItem::Unit(UnitType::Cowboy));
        let mut player = Player::new("p", 0, 0);
        player.max_population = 10;
        assert_eq!(tick_queue(&building, &player, false), QueueTick::ExitBlocked);
    }

    #[test]
    fn completes_when_timer_elapsed() {
        let mut building = Entity::new_building(BuildingType::Saloon, 0, Cell::new(0, 0));
        building.queue.push(QueueItem::Unit(UnitType::Cowboy));
        building.timer = 0;
        let mut player = Player::new("p", 0, 0);
        player.max_population = 10;
        assert_eq!(
            tick_queue(&building, &player, true),
            QueueTick::Complete(QueueItem::Unit(UnitType::Cowboy))
        );
    }
}
