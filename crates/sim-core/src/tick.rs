//! Per-tick entity update dispatch (spec §4.2).
//!
//! Entities are updated in ascending slot order. Each update runs an inner
//! loop of mode transitions until movement budget is exhausted or the mode
//! settles into a waiting state, mirroring the original `unit_update`'s
//! transition table.

use crate::combat;
use crate::config::SimConfig;
use crate::entity::target::{BuildingType, Target, UnitType};
use crate::entity::{Animation, AnimationName, Direction, Entity, EntityFlags, EntityId, EntityKind, EntityPool, Mode};
use crate::fixed::Vec2Fixed;
use crate::map::{CellValue, Layer, Map, pathfind, PathRequest};
use crate::rng::Rng;

/// Advances one entity by one tick. Returns events the caller may surface to
/// the UI (alerts, "cannot build", etc) or apply to shared state the tick
/// dispatch doesn't own (player gold); the simulation applies `GoldDelta`
/// after every entity has ticked.
pub fn update_entity(id: EntityId, pool: &mut EntityPool, map: &mut Map, rng: &mut Rng) -> Vec<TickEvent> {
    let mut events = Vec::new();
    let Some(entity) = pool.get(id) else { return events };
    if entity.is_garrisoned() {
        return events;
    }

    match entity.kind.is_unit() {
        true => update_unit(id, pool, map, rng, &mut events),
        false => update_building(id, pool, map, &mut events),
    }
    events
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickEvent {
    CantBuild(EntityId),
    UnderAttack(EntityId),
    ExitBlocked(EntityId),
    QueueBlocked(EntityId),
    /// A gold change to apply to `player_id`'s treasury; `tick.rs` functions
    /// only see the pool/map/rng, never `Player`, so charges (building,
    /// repair) and credits (mine deposits) flow back through here.
    GoldDelta { player_id: u8, amount: i32 },
}

fn update_unit(id: EntityId, pool: &mut EntityPool, map: &mut Map, rng: &mut Rng, events: &mut Vec<TickEvent>) {
    {
        let entity = pool.get_mut(id).unwrap();
        if entity.health == 0 && !matches!(entity.mode, Mode::Death | Mode::DeathFade) {
            entity.mode = Mode::Death;
            entity.animation = Animation::start(AnimationName::Death, 1);
        }
    }

    let speed = {
        let entity = pool.get(id).unwrap();
        match entity.kind {
            EntityKind::Unit(t) => crate::content::unit_stats(t).speed(),
            _ => return,
        }
    };
    let mut movement_left = speed;
    let mut guard = 0;

    loop {
        guard += 1;
        if guard > 8 {
            break; // bound the inner transition loop; avoids infinite cycling on malformed state
        }
        let mode = pool.get(id).unwrap().mode;
        match mode {
            Mode::Idle => {
                if !step_idle(id, pool, map) {
                    break;
                }
            }
            Mode::MoveBlocked => {
                step_move_blocked(id, pool);
                break;
            }
            Mode::Move => {
                if movement_left.raw() <= 0 {
                    break;
                }
                let consumed = step_move(id, pool, map, &mut movement_left);
                if !consumed {
                    break;
                }
            }
            Mode::MoveFinished => {
                step_move_finished(id, pool, map, rng, events);
                break;
            }
            Mode::AttackWindup => {
                step_attack_windup(id, pool, map, rng, events);
                break;
            }
            Mode::AttackCooldown => {
                step_attack_cooldown(id, pool);
                break;
            }
            Mode::MineIn => {
                step_mine_in(id, pool);
                break;
            }
            Mode::Build => {
                step_build(id, pool, events);
                break;
            }
            Mode::Repair => {
                step_repair(id, pool, events);
                break;
            }
            Mode::Death => {
                step_death(id, pool, map);
                break;
            }
            Mode::DeathFade => {
                if pool.get(id).unwrap().animation.is_done() {
                    pool.remove(id);
                }
                break;
            }
            Mode::Ferry | Mode::BuildingInProgress | Mode::BuildingFinished | Mode::BuildingDestroyed => break,
        }
    }
}

fn clear_target(id: EntityId, pool: &mut EntityPool) {
    let entity = pool.get_mut(id).unwrap();
    entity.target = Target::None;
    entity.mode = Mode::Idle;
}

/// Returns true if another transition should be attempted this tick.
fn step_idle(id: EntityId, pool: &mut EntityPool, map: &mut Map) -> bool {
    let (target, own_cell) = {
        let entity = pool.get(id).unwrap();
        (entity.target, entity.cell)
    };

    // Most target kinds name a moving or absent entity, so the destination
    // cell has to be resolved fresh every idle tick rather than cached.
    let (target_cell, allow_blocked_goal) = match target {
        Target::None => return false,
        Target::Cell { cell } | Target::AttackMove { cell } | Target::Unload { cell } | Target::Molotov { cell } => (cell, false),
        Target::Patrol { cell_a, cell_b, going_to_b } => (if going_to_b { cell_b } else { cell_a }, false),
        Target::Entity { id: other } | Target::Repair { id: other } => match pool.get(other) {
            Some(e) => (e.cell, true),
            None => {
                clear_target(id, pool);
                return false;
            }
        },
        Target::BuildAssist { builder_id } => match pool.get(builder_id) {
            Some(e) => (e.cell, true),
            None => {
                clear_target(id, pool);
                return false;
            }
        },
        Target::Build { building_cell, .. } => (building_cell, true),
        Target::Gold { mine_id } => match pool.get(mine_id) {
            Some(e) => (e.cell, true),
            None => {
                clear_target(id, pool);
                return false;
            }
        },
        Target::Camp { camp_id } => match pool.get(camp_id) {
            Some(e) => (e.cell, true),
            None => {
                clear_target(id, pool);
                return false;
            }
        },
    };

    let arrived = if allow_blocked_goal {
        target_cell == own_cell || target_cell.is_adjacent(own_cell)
    } else {
        target_cell == own_cell
    };
    if arrived {
        let entity = pool.get_mut(id).unwrap();
        entity.mode = Mode::MoveFinished;
        return true;
    }

    let entity = pool.get_mut(id).unwrap();
    let size = entity.kind.cell_size();
    let from = entity.cell;
    match pathfind(map, PathRequest { from, to: target_cell, size, allow_blocked_goal }) {
        Some(path) if !path.is_empty() => {
            entity.path.clear();
            for cell in path.into_iter().take(SimConfig::MAX_PATH_LEN as usize) {
                let _ = entity.path.try_push(cell);
            }
            entity.pathfind_attempts = 0;
            entity.mode = Mode::Move;
            true
        }
        _ => {
            entity.pathfind_attempts += 1;
            entity.timer = SimConfig::PATH_PAUSE_DURATION;
            entity.mode = Mode::MoveBlocked;
            false
        }
    }
}

fn step_move_blocked(id: EntityId, pool: &mut EntityPool) {
    let entity = pool.get_mut(id).unwrap();
    if entity.timer == 0 {
        entity.mode = Mode::Idle;
    } else {
        entity.timer -= 1;
    }
}

/// Returns true if movement this tick should continue being processed.
fn step_move(
    id: EntityId,
    pool: &mut EntityPool,
    map: &mut Map,
    movement_left: &mut crate::fixed::Fixed32,
) -> bool {
    let size = pool.get(id).unwrap().kind.cell_size();
    let entity = pool.get_mut(id).unwrap();

    let Some(&next_cell) = entity.path.first() else {
        entity.mode = Mode::MoveFinished;
        return false;
    };

    if map.is_blocked(Layer::Ground, next_cell) {
        entity.mode = Mode::MoveBlocked;
        entity.timer = SimConfig::PATH_PAUSE_DURATION;
        return false;
    }

    entity.direction = Direction::from_step(entity.cell, next_cell, entity.direction);
    let next_position = Vec2Fixed::from_cell(next_cell.x, next_cell.y);
    let step_dist = Vec2Fixed::distance(entity.position, next_position);
    let arrived = step_dist.raw() <= movement_left.raw();

    if arrived {
        map.set_cell_rect(Layer::Ground, entity.cell, size, CellValue::Empty);
        map.set_cell_rect(Layer::Ground, next_cell, size, CellValue::Occupied(id));
        *movement_left = *movement_left - step_dist;
        entity.position = next_position;
        entity.cell = next_cell;
        entity.path.remove(0);
        if entity.path.is_empty() {
            entity.mode = Mode::MoveFinished;
            false
        } else {
            true
        }
    } else {
        entity.position = entity.position.step_toward(next_position, *movement_left);
        *movement_left = crate::fixed::Fixed32::ZERO;
        false
    }
}

fn is_repairable_building(entity: &Entity) -> bool {
    match entity.kind {
        EntityKind::Building(building_type) => entity.health < crate::content::building_stats(building_type).max_health,
        _ => false,
    }
}

fn step_move_finished(id: EntityId, pool: &mut EntityPool, map: &mut Map, rng: &mut Rng, events: &mut Vec<TickEvent>) {
    let _ = rng;
    let target = pool.get(id).unwrap().target;
    match target {
        Target::Entity { id: target_id } => {
            let attacker_player = pool.get(id).unwrap().player_id;
            let is_carrier = pool
                .get(target_id)
                .is_some_and(|t| t.player_id == attacker_player && matches!(t.kind, EntityKind::Unit(UnitType::Wagon)));

            if is_carrier {
                if let Some((carrier, passenger)) = pool.get_two_mut(target_id, id) {
                    match crate::garrison::board(carrier, target_id, passenger, id, SimConfig::MAX_GARRISON) {
                        crate::garrison::BoardOutcome::Boarded => {
                            let size = passenger.kind.cell_size();
                            let cell = passenger.cell;
                            map.set_cell_rect(Layer::Ground, cell, size, CellValue::Empty);
                        }
                        crate::garrison::BoardOutcome::CarrierFull => {
                            passenger.target = Target::None;
                            passenger.mode = Mode::Idle;
                        }
                    }
                }
                return;
            }

            let repair = pool
                .get(target_id)
                .is_some_and(|t| t.player_id == attacker_player && is_repairable_building(t));
            let entity = pool.get_mut(id).unwrap();
            if repair {
                entity.mode = Mode::Repair;
                entity.timer = SimConfig::BUILD_TICK_DURATION;
            } else {
                entity.mode = Mode::AttackWindup;
                entity.animation = Animation::start(AnimationName::Attack, 1);
            }
        }
        Target::Repair { .. } => {
            let entity = pool.get_mut(id).unwrap();
            entity.mode = Mode::Repair;
            entity.timer = SimConfig::BUILD_TICK_DURATION;
        }
        Target::Gold { mine_id } => {
            let entity = pool.get_mut(id).unwrap();
            entity.goldmine_id = mine_id;
            entity.mode = Mode::MineIn;
            entity.timer = SimConfig::MINE_IN_DURATION;
        }
        Target::Camp { .. } => {
            let entity = pool.get_mut(id).unwrap();
            let amount = entity.gold_held as i32;
            entity.gold_held = 0;
            entity.flags.remove(EntityFlags::GOLD_HELD);
            let player_id = entity.player_id;
            let mine_id = entity.goldmine_id;
            entity.target = if mine_id.is_some() { Target::Gold { mine_id } } else { Target::None };
            entity.mode = Mode::Idle;
            if amount > 0 {
                events.push(TickEvent::GoldDelta { player_id, amount });
            }
        }
        Target::Build { building_type, building_cell, building_id, .. } if building_id.is_none() => {
            let player_id = pool.get(id).unwrap().player_id;
            let cost = crate::content::building_gold_cost(building_type);
            let new_building = Entity::new_building(building_type, player_id, building_cell);
            let size = new_building.kind.cell_size();
            let new_id = pool.insert(new_building);
            map.set_cell_rect(Layer::Ground, building_cell, size, CellValue::Occupied(new_id));
            events.push(TickEvent::GoldDelta { player_id, amount: -(cost as i32) });

            let entity = pool.get_mut(id).unwrap();
            let unit_cell = entity.cell;
            entity.target = Target::Build { building_type, building_cell, unit_cell, building_id: new_id };
            entity.mode = Mode::Build;
            entity.timer = SimConfig::BUILD_TICK_DURATION;
        }
        Target::Build { .. } => {
            let entity = pool.get_mut(id).unwrap();
            entity.mode = Mode::Build;
            entity.timer = SimConfig::BUILD_TICK_DURATION;
        }
        Target::Patrol { cell_a, cell_b, going_to_b } => {
            let entity = pool.get_mut(id).unwrap();
            entity.target = Target::Patrol { cell_a, cell_b, going_to_b: !going_to_b };
            entity.mode = Mode::Idle;
        }
        _ => {
            let entity = pool.get_mut(id).unwrap();
            entity.mode = Mode::Idle;
            entity.target = Target::None;
        }
    }
}

fn step_attack_windup(id: EntityId, pool: &mut EntityPool, map: &Map, rng: &mut Rng, events: &mut Vec<TickEvent>) {
    let attacker_cell;
    let attacker_damage;
    let cooldown;
    let target_id;
    {
        let attacker = pool.get_mut(id).unwrap();
        attacker.animation.tick(1, 4);
        if !attacker.animation.is_done() {
            return;
        }
        attacker_cell = attacker.cell;
        target_id = match attacker.target {
            Target::Entity { id } => id,
            _ => {
                attacker.mode = Mode::Idle;
                return;
            }
        };
        attacker_damage = match attacker.kind {
            EntityKind::Unit(t) => crate::content::unit_stats(t).damage,
            EntityKind::Building(t) => crate::content::building_stats(t).damage,
            _ => 0,
        };
        cooldown = match attacker.kind {
            EntityKind::Unit(t) => crate::content::unit_stats(t).attack_cooldown,
            EntityKind::Building(t) => crate::content::building_stats(t).attack_cooldown,
            _ => 0,
        };
    }

    let Some(defender) = pool.get(target_id) else {
        let attacker = pool.get_mut(id).unwrap();
        attacker.target = Target::None;
        attacker.mode = Mode::Idle;
        return;
    };
    let defender_armor = match defender.kind {
        EntityKind::Unit(t) => crate::content::unit_stats(t).armor,
        EntityKind::Building(t) => crate::content::building_stats(t).armor,
        _ => 0,
    };
    let defender_cell = defender.cell;

    let missed = combat::resolve_elevation_miss(map, attacker_cell, defender_cell, rng);
    if !missed {
        let damage = combat::compute_damage(attacker_damage, defender_armor);
        if let Some(defender) = pool.get_mut(target_id) {
            combat::apply_damage(defender, damage, 10);
            events.push(TickEvent::UnderAttack(target_id));
        }
    }

    let attacker = pool.get_mut(id).unwrap();
    attacker.mode = Mode::AttackCooldown;
    attacker.cooldown_timer = cooldown;
}

fn step_attack_cooldown(id: EntityId, pool: &mut EntityPool) {
    let entity = pool.get_mut(id).unwrap();
    if entity.cooldown_timer == 0 {
        entity.mode = match entity.target {
            Target::Entity { .. } => Mode::AttackWindup,
            _ => Mode::Idle,
        };
    } else {
        entity.cooldown_timer -= 1;
    }
}

fn step_mine_in(id: EntityId, pool: &mut EntityPool) {
    let done = pool.get(id).unwrap().timer == 0;
    if !done {
        pool.get_mut(id).unwrap().timer -= 1;
        return;
    }

    let (player_id, own_cell) = {
        let entity = pool.get_mut(id).unwrap();
        entity.gold_held = SimConfig::GOLD_PER_TRIP;
        entity.flags.insert(EntityFlags::GOLD_HELD);
        (entity.player_id, entity.cell)
    };

    let camp_id = pool
        .iter()
        .filter(|(_, e)| {
            e.player_id == player_id
                && e.mode == Mode::BuildingFinished
                && matches!(e.kind, EntityKind::Building(BuildingType::Camp))
        })
        .min_by_key(|(_, e)| e.cell.manhattan_distance(own_cell))
        .map(|(id, _)| id);

    let entity = pool.get_mut(id).unwrap();
    match camp_id {
        Some(camp_id) => {
            entity.target = Target::Camp { camp_id };
            entity.mode = Mode::Idle;
        }
        None => {
            entity.target = Target::None;
            entity.mode = Mode::Idle;
        }
    }
}

fn step_build(id: EntityId, pool: &mut EntityPool, _events: &mut Vec<TickEvent>) {
    let (done, building_id) = {
        let entity = pool.get(id).unwrap();
        let building_id = match entity.target {
            Target::Build { building_id, .. } => building_id,
            _ => EntityId::NONE,
        };
        (entity.timer == 0, building_id)
    };
    if !done {
        pool.get_mut(id).unwrap().timer -= 1;
        return;
    }

    let finished = if let Some(building) = pool.get_mut(building_id) {
        let max_health = match building.kind {
            EntityKind::Building(t) => crate::content::building_stats(t).max_health,
            _ => building.health,
        };
        building.health = (building.health + SimConfig::BUILD_HEALTH_PER_TICK).min(max_health);
        if building.health >= max_health {
            building.mode = Mode::BuildingFinished;
        }
        building.mode == Mode::BuildingFinished
    } else {
        true
    };

    let entity = pool.get_mut(id).unwrap();
    if finished {
        entity.mode = Mode::Idle;
        entity.target = Target::None;
    } else {
        entity.timer = SimConfig::BUILD_TICK_DURATION;
    }
}

fn step_repair(id: EntityId, pool: &mut EntityPool, events: &mut Vec<TickEvent>) {
    let (done, repair_target) = {
        let entity = pool.get(id).unwrap();
        let repair_target = match entity.target {
            Target::Entity { id: t } | Target::Repair { id: t } => t,
            _ => EntityId::NONE,
        };
        (entity.timer == 0, repair_target)
    };
    if !done {
        pool.get_mut(id).unwrap().timer -= 1;
        return;
    }

    let player_id = pool.get(id).unwrap().player_id;
    let still_damaged = if let Some(target) = pool.get_mut(repair_target) {
        let max_health = match target.kind {
            EntityKind::Building(t) => crate::content::building_stats(t).max_health,
            EntityKind::Unit(t) => crate::content::unit_stats(t).max_health,
            _ => target.health,
        };
        if target.health < max_health {
            target.health = (target.health + SimConfig::REPAIR_HEALTH_PER_TICK).min(max_health);
            events.push(TickEvent::GoldDelta { player_id, amount: -(SimConfig::REPAIR_GOLD_PER_TICK as i32) });
            target.health < max_health
        } else {
            false
        }
    } else {
        false
    };

    let entity = pool.get_mut(id).unwrap();
    if still_damaged {
        entity.timer = SimConfig::BUILD_TICK_DURATION;
    } else {
        entity.mode = Mode::Idle;
        entity.target = Target::None;
    }
}

fn step_death(id: EntityId, pool: &mut EntityPool, map: &mut Map) {
    let entity = pool.get_mut(id).unwrap();
    if entity.animation.is_done() {
        let size = entity.kind.cell_size();
        let cell = entity.cell;
        map.set_cell_rect(Layer::Ground, cell, size, CellValue::Empty);
        entity.mode = Mode::DeathFade;
        entity.animation = Animation::start(AnimationName::DeathFade, 1);
    } else {
        entity.animation.tick(1, 4);
    }
}

fn update_building(id: EntityId, pool: &mut EntityPool, map: &mut Map, _events: &mut Vec<TickEvent>) {
    let entity = pool.get_mut(id).unwrap();
    if entity.health == 0 && entity.mode != Mode::BuildingDestroyed {
        entity.mode = Mode::BuildingDestroyed;
        let size = entity.kind.cell_size();
        let cell = entity.cell;
        map.set_cell_rect(Layer::Ground, cell, size, CellValue::Empty);
    }
    // Production-queue ticking needs simultaneous pool+player access this
    // dispatcher doesn't have; `Simulation::tick_production` handles it.
}
