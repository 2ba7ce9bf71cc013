//! The simulation aggregate (spec §3.6, §9): the single mutable state that
//! the turn engine drives forward one tick at a time.

use crate::checksum::Checksum;
use crate::combat;
use crate::config::SimConfig;
use crate::entity::target::{BuildingType, QueueItem, Target, UnitType};
use crate::entity::{Entity, EntityId, EntityKind, EntityPool, Mode};
use crate::garrison;
use crate::input::MatchInput;
use crate::map::{Cell, CellValue, Layer, Map};
use crate::passives::{self, Fire};
use crate::player::Player;
use crate::production::{self, QueueTick};
use crate::rng::Rng;
use crate::tick::TickEvent;

/// A transient visual-only particle; advanced each tick, never read back by
/// the simulation (spec §3.6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Particle {
    pub cell: Cell,
    pub ticks_remaining: u32,
}

/// An in-flight projectile: source, target, and the impact it applies on
/// arrival (spec §3.6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Projectile {
    pub source: Cell,
    pub target: Cell,
    pub target_id: EntityId,
    pub damage: i32,
}

/// A snapshot of an enemy building the player last observed, used to render
/// "ghost" buildings under fog; the simulation never reads this back
/// (spec §4.3.3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RememberedEntity {
    pub cell: Cell,
    pub building_type: BuildingType,
    pub is_destroyed: bool,
}

/// A scheduled fog reveal (e.g. from a scouted flare); counts down to zero
/// then expires (spec §4.3.3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FogReveal {
    pub cell: Cell,
    pub radius: u32,
    pub ticks_remaining: u32,
}

/// The simulation's entire mutable state (spec §9: "fold these into a
/// `Simulation` aggregate, pass by mutable reference").
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Simulation {
    pub map: Map,
    pub pool: EntityPool,
    pub players: [Player; SimConfig::MAX_PLAYERS as usize],
    pub rng: Rng,
    pub tick_counter: u32,
    pub particles: [Vec<Particle>; 2],
    pub projectiles: Vec<Projectile>,
    pub fires: Vec<Fire>,
    pub fire_cells: Vec<Cell>,
    pub fog_reveals: Vec<FogReveal>,
    pub remembered_entities: [Vec<(EntityId, RememberedEntity)>; SimConfig::MAX_PLAYERS as usize],
    pub is_fog_dirty: bool,
    pub game_seed: i32,
}

impl Simulation {
    pub fn new(seed: i32, width: u32, height: u32) -> Self {
        Self {
            map: Map::new(width, height),
            pool: EntityPool::new(),
            players: core::array::from_fn(|_| Player::default()),
            rng: Rng::new(seed),
            tick_counter: 0,
            particles: [Vec::new(), Vec::new()],
            projectiles: Vec::new(),
            fires: Vec::new(),
            fire_cells: Vec::new(),
            fog_reveals: Vec::new(),
            remembered_entities: core::array::from_fn(|_| Vec::new()),
            is_fog_dirty: true,
            game_seed: seed,
        }
    }

    /// Applies one player's input immediately (spec §4.4). The turn engine
    /// is responsible for ordering calls across players (ascending
    /// player-id) and within a player (send order); this function does not
    /// reorder anything itself.
    pub fn apply_input(&mut self, player_id: u8, input: &MatchInput) {
        match input {
            MatchInput::None => {}
            MatchInput::MoveCell { shift, target_cell, entity_ids } => {
                for &id in entity_ids {
                    self.set_or_queue_target(id, player_id, *shift, Target::Cell { cell: *target_cell });
                }
            }
            MatchInput::MoveAttackCell { shift, target_cell, entity_ids } => {
                for &id in entity_ids {
                    self.set_or_queue_target(id, player_id, *shift, Target::AttackMove { cell: *target_cell });
                }
            }
            MatchInput::MoveEntity { shift, target_id, entity_ids } | MatchInput::MoveAttackEntity { shift, target_id, entity_ids } => {
                for &id in entity_ids {
                    self.set_or_queue_target(id, player_id, *shift, Target::Entity { id: *target_id });
                }
            }
            MatchInput::MoveRepair { shift, target_id, entity_ids } => {
                for &id in entity_ids {
                    self.set_or_queue_target(id, player_id, *shift, Target::Repair { id: *target_id });
                }
            }
            MatchInput::MoveUnload { shift, target_cell, entity_ids } => {
                for &id in entity_ids {
                    self.set_or_queue_target(id, player_id, *shift, Target::Unload { cell: *target_cell });
                }
            }
            MatchInput::MoveMolotov { shift, target_cell, entity_ids } => {
                for &id in entity_ids {
                    self.set_or_queue_target(id, player_id, *shift, Target::Molotov { cell: *target_cell });
                }
            }
            MatchInput::Stop { entity_ids } => {
                for &id in entity_ids {
                    if let Some(entity) = self.owned_entity_mut(id, player_id) {
                        entity.target = Target::None;
                        entity.target_queue.clear();
                        entity.mode = Mode::Idle;
                    }
                }
            }
            MatchInput::Defend { entity_ids } => {
                for &id in entity_ids {
                    if let Some(entity) = self.owned_entity_mut(id, player_id) {
                        entity.flags.insert(crate::entity::EntityFlags::HOLD_POSITION);
                    }
                }
            }
            MatchInput::Build { shift, building_type, target_cell, entity_ids } => {
                for &id in entity_ids {
                    let target = Target::Build {
                        building_type: *building_type,
                        building_cell: *target_cell,
                        unit_cell: self.pool.get(id).map(|e| e.cell).unwrap_or_default(),
                        building_id: EntityId::NONE,
                    };
                    self.set_or_queue_target(id, player_id, *shift, target);
                }
            }
            MatchInput::BuildCancel { building_id } => {
                if let Some(building) = self.owned_entity_mut(*building_id, player_id) {
                    if building.mode == Mode::BuildingInProgress {
                        building.mode = Mode::BuildingDestroyed;
                    }
                }
            }
            MatchInput::BuildingEnqueue { item, building_ids } => {
                self.enqueue_shortest_queue(player_id, item, building_ids);
            }
            MatchInput::BuildingDequeue { building_id, index } => {
                self.dequeue(player_id, *building_id, *index);
            }
            MatchInput::Rally { rally_point, building_ids } => {
                for &id in building_ids {
                    if let Some(building) = self.owned_entity_mut(id, player_id) {
                        building.rally_point = Some(*rally_point);
                    }
                }
            }
            MatchInput::SingleUnload { entity_id } => {
                self.unload_one(player_id, *entity_id);
            }
            MatchInput::Unload { carrier_ids } => {
                for &carrier_id in carrier_ids {
                    self.unload_all(player_id, carrier_id);
                }
            }
            MatchInput::Camo { unit_ids } => {
                for &id in unit_ids {
                    if let Some(entity) = self.owned_entity_mut(id, player_id) {
                        entity.flags.insert(crate::entity::EntityFlags::INVISIBLE);
                    }
                }
            }
            MatchInput::Decamo { unit_ids } => {
                for &id in unit_ids {
                    if let Some(entity) = self.owned_entity_mut(id, player_id) {
                        entity.flags.remove(crate::entity::EntityFlags::INVISIBLE);
                    }
                }
            }
            MatchInput::Patrol { cell_a, cell_b, unit_ids } => {
                for &id in unit_ids {
                    let target = Target::Patrol { cell_a: *cell_a, cell_b: *cell_b, going_to_b: true };
                    self.set_or_queue_target(id, player_id, false, target);
                }
            }
        }
    }

    fn owned_entity_mut(&mut self, id: EntityId, player_id: u8) -> Option<&mut Entity> {
        self.pool.get_mut(id).filter(|e| e.player_id == player_id)
    }

    fn set_or_queue_target(&mut self, id: EntityId, player_id: u8, shift: bool, target: Target) {
        let Some(entity) = self.owned_entity_mut(id, player_id) else { return };
        if shift {
            let _ = entity.target_queue.try_push(target);
        } else {
            entity.target = target;
            entity.target_queue.clear();
            entity.mode = Mode::Idle;
        }
    }

    fn unload_one(&mut self, player_id: u8, carrier_id: EntityId) {
        let Some(passenger_id) = self
            .pool
            .get(carrier_id)
            .filter(|c| c.player_id == player_id)
            .and_then(|c| c.garrisoned_units.first().copied())
        else {
            return;
        };
        self.disembark_passenger(carrier_id, passenger_id);
    }

    fn unload_all(&mut self, player_id: u8, carrier_id: EntityId) {
        let Some(passengers) = self
            .pool
            .get(carrier_id)
            .filter(|c| c.player_id == player_id)
            .map(|c| c.garrisoned_units.iter().copied().collect::<Vec<_>>())
        else {
            return;
        };
        for passenger_id in passengers {
            self.disembark_passenger(carrier_id, passenger_id);
        }
    }

    /// Finds a free cell around the carrier and moves one garrisoned
    /// passenger back onto the ground there (spec §4.2.5).
    fn disembark_passenger(&mut self, carrier_id: EntityId, passenger_id: EntityId) {
        let Some(carrier_cell) = self.pool.get(carrier_id).map(|c| c.cell) else { return };
        let unload_cell = {
            let map = &self.map;
            garrison::find_unload_cell(carrier_cell, 4, |c| {
                map.in_bounds(c) && map.rect_is_free(Layer::Ground, c, 1)
            })
        };
        let Some(cell) = unload_cell else { return };

        let size = {
            let Some((carrier, passenger)) = self.pool.get_two_mut(carrier_id, passenger_id) else { return };
            garrison::disembark(carrier, passenger, passenger_id, cell);
            passenger.kind.cell_size()
        };
        self.map.set_cell_rect(Layer::Ground, cell, size, CellValue::Occupied(passenger_id));
    }

    fn enqueue_shortest_queue(&mut self, player_id: u8, item: &crate::input::QueueItemRequest, building_ids: &[EntityId]) {
        let Some(&shortest_id) = building_ids
            .iter()
            .filter(|&&id| self.pool.get(id).is_some_and(|e| e.player_id == player_id && !e.queue.is_full()))
            .min_by_key(|&&id| self.pool.get(id).map(|e| e.queue.len()).unwrap_or(usize::MAX))
        else {
            return;
        };

        let (cost, queue_item) = match item {
            crate::input::QueueItemRequest::Unit(unit_type) => {
                (crate::content::unit_gold_cost(*unit_type), QueueItem::Unit(*unit_type))
            }
            crate::input::QueueItemRequest::Upgrade(upgrade_id) => (0, QueueItem::Upgrade(*upgrade_id)),
        };

        let player = &mut self.players[player_id as usize];
        if player.gold < cost {
            return;
        }
        player.gold -= cost;

        if let Some(building) = self.pool.get_mut(shortest_id) {
            let was_empty = building.queue.is_empty();
            if building.queue.try_push(queue_item).is_ok() && was_empty {
                building.timer = crate::content::queue_item_ticks(queue_item);
            }
        }
    }

    fn dequeue(&mut self, player_id: u8, building_id: EntityId, index: Option<u8>) {
        let Some(building) = self.owned_entity_mut(building_id, player_id) else { return };
        let idx = index.map(|i| i as usize).unwrap_or(0);
        if idx >= building.queue.len() {
            return;
        }
        let removed = building.queue.remove(idx);
        let refund = match removed {
            QueueItem::Unit(unit_type) => crate::content::unit_gold_cost(unit_type),
            QueueItem::Upgrade(_) => 0,
        };
        self.players[player_id as usize].gold += refund;
    }

    /// Advances the simulation by one tick: entity updates in ascending slot
    /// order, then production/passives/fog bookkeeping (spec §4.2, §5).
    pub fn tick(&mut self) {
        let ids = self.pool.ids();
        for id in ids {
            let events = crate::tick::update_entity(id, &mut self.pool, &mut self.map, &mut self.rng);
            self.apply_tick_events(events);
        }
        self.tick_production();
        self.tick_passives();
        self.recompute_fog();
        self.tick_counter += 1;
    }

    fn apply_tick_events(&mut self, events: Vec<TickEvent>) {
        for event in events {
            if let TickEvent::GoldDelta { player_id, amount } = event {
                let player = &mut self.players[player_id as usize];
                player.gold = (i64::from(player.gold) + i64::from(amount)).max(0) as u32;
            }
        }
    }

    /// Ticks every finished building's production queue (spec §4.2.4):
    /// counts the head item down, and on completion spawns the unit or
    /// grants the upgrade and starts the next item's timer.
    fn tick_production(&mut self) {
        let building_ids: Vec<EntityId> = self
            .pool
            .iter()
            .filter(|(_, e)| e.mode == Mode::BuildingFinished && !e.queue.is_empty())
            .map(|(id, _)| id)
            .collect();

        for building_id in building_ids {
            let Some(building) = self.pool.get(building_id) else { continue };
            let player_id = building.player_id;
            let cell = building.cell;

            let spawn_cell = {
                let map = &self.map;
                garrison::find_unload_cell(cell, 4, |c| map.in_bounds(c) && map.rect_is_free(Layer::Ground, c, 1))
            };

            let result = {
                let building = self.pool.get(building_id).unwrap();
                let player = &self.players[player_id as usize];
                production::tick_queue(building, player, spawn_cell.is_some())
            };

            match result {
                QueueTick::Empty | QueueTick::Blocked | QueueTick::ExitBlocked => {}
                QueueTick::InProgress => {
                    if let Some(building) = self.pool.get_mut(building_id) {
                        building.timer = building.timer.saturating_sub(1);
                    }
                }
                QueueTick::Complete(item) => {
                    if let Some(building) = self.pool.get_mut(building_id) {
                        building.queue.remove(0);
                    }
                    match item {
                        QueueItem::Unit(unit_type) => {
                            if let Some(spawn_cell) = spawn_cell {
                                self.spawn_unit(unit_type, player_id, spawn_cell);
                                self.players[player_id as usize].population += crate::content::unit_population_cost(unit_type);
                            }
                        }
                        QueueItem::Upgrade(upgrade_id) => {
                            self.players[player_id as usize].grant_upgrade(upgrade_id);
                        }
                    }
                    if let Some(building) = self.pool.get_mut(building_id) {
                        if let Some(&next) = building.queue.first() {
                            building.timer = crate::content::queue_item_ticks(next);
                        }
                    }
                }
            }
        }
    }

    /// Ticks bleed/fire passive damage and land-mine detonation
    /// (spec §4.2.6).
    fn tick_passives(&mut self) {
        for id in self.pool.ids() {
            if let Some(entity) = self.pool.get_mut(id) {
                if entity.bleed_timer > 0 {
                    passives::tick_bleed(entity, SimConfig::BLEED_TICK_PERIOD, SimConfig::BLEED_DAMAGE_AMOUNT);
                }
            }
        }

        let mut still_burning = Vec::with_capacity(self.fires.len());
        for mut fire in std::mem::take(&mut self.fires) {
            if fire.ticks_remaining == 0 {
                continue;
            }
            if let Some(occupant_id) = self.map.occupant_at(Layer::Ground, fire.cell) {
                if let Some(entity) = self.pool.get_mut(occupant_id) {
                    let mut timer = entity.fire_damage_timer;
                    passives::tick_fire_damage(entity, &mut timer, SimConfig::FIRE_TICK_PERIOD, SimConfig::FIRE_DAMAGE_AMOUNT);
                    entity.fire_damage_timer = timer;
                }
            }
            for spread_cell in passives::spread_candidates(&fire, self.tick_counter, SimConfig::FIRE_SPREAD_PERIOD) {
                if !self.fire_cells.contains(&spread_cell) {
                    self.fire_cells.push(spread_cell);
                    still_burning.push(Fire { cell: spread_cell, ticks_remaining: SimConfig::FIRE_DURATION });
                }
            }
            fire.ticks_remaining -= 1;
            still_burning.push(fire);
        }
        self.fires = still_burning;

        let mine_ids: Vec<EntityId> = self
            .pool
            .iter()
            .filter(|(_, e)| matches!(e.kind, EntityKind::LandMine))
            .map(|(id, _)| id)
            .collect();
        for mine_id in mine_ids {
            let Some(mine) = self.pool.get(mine_id) else { continue };
            let mine_cell = mine.cell;
            let mine_player = mine.player_id;
            let enemy_cells: Vec<Cell> = self
                .pool
                .iter()
                .filter(|(_, e)| e.player_id != mine_player && e.kind.is_unit() && e.is_alive())
                .map(|(_, e)| e.cell)
                .collect();
            if !passives::mine_should_detonate(mine_cell, &enemy_cells) {
                continue;
            }

            let victim_ids: Vec<EntityId> = self
                .pool
                .iter()
                .filter(|(_, e)| {
                    e.player_id != mine_player
                        && e.kind.is_unit()
                        && (e.cell == mine_cell || e.cell.is_adjacent(mine_cell))
                })
                .map(|(id, _)| id)
                .collect();
            for victim_id in victim_ids {
                if let Some(victim) = self.pool.get_mut(victim_id) {
                    combat::apply_damage(victim, SimConfig::MINE_DAMAGE, 10);
                }
            }
            self.map.set_cell_rect(Layer::Ground, mine_cell, 1, CellValue::Empty);
            self.pool.remove(mine_id);
        }
    }

    fn recompute_fog(&mut self) {
        for player_id in 0..SimConfig::MAX_PLAYERS as usize {
            let sources: Vec<(Cell, u32)> = self
                .pool
                .iter()
                .filter(|(_, e)| e.player_id == player_id as u8 && e.is_alive() && !e.is_garrisoned())
                .map(|(_, e)| (e.cell, e.sight()))
                .collect();
            crate::map::fog::recompute_player_fog(&mut self.map, player_id, &sources);
        }
        self.is_fog_dirty = false;
    }

    /// Spawns a new entity, occupying its footprint on the ground layer.
    pub fn spawn_unit(&mut self, unit_type: UnitType, player_id: u8, cell: Cell) -> EntityId {
        let entity = Entity::new_unit(unit_type, player_id, cell);
        let size = entity.kind.cell_size();
        let id = self.pool.insert(entity);
        self.map.set_cell_rect(Layer::Ground, cell, size, CellValue::Occupied(id));
        id
    }

    pub fn spawn_building(&mut self, building_type: BuildingType, player_id: u8, cell: Cell) -> EntityId {
        let entity = Entity::new_building(building_type, player_id, cell);
        let size = entity.kind.cell_size();
        let id = self.pool.insert(entity);
        self.map.set_cell_rect(Layer::Ground, cell, size, CellValue::Occupied(id));
        id
    }

    /// Computes the canonical checksum over the entire simulation state, in
    /// the field order mandated by spec §4.5 (see DESIGN.md for the
    /// original-source field list this mirrors exactly).
    pub fn checksum(&self) -> u32 {
        let mut checksum = Checksum::new();
        checksum.write_i32(self.rng.seed());

        checksum.write_i32(self.map.width as i32);
        checksum.write_i32(self.map.height as i32);
        checksum.write_seq(&self.map.tiles, |c, tile| {
            c.write_u8(tile.elevation);
            c.write_bool(tile.has_decoration);
        });
        for layer in crate::map::Layer::ALL {
            let area = (self.map.width * self.map.height) as usize;
            checksum.write_usize(area);
            for y in 0..self.map.height {
                for x in 0..self.map.width {
                    let cell = Cell::new(x as i32, y as i32);
                    match self.map.cell_at(layer, cell) {
                        CellValue::Empty => checksum.write_u32(0),
                        CellValue::Blocked => checksum.write_u32(1),
                        CellValue::Unreachable => checksum.write_u32(2),
                        CellValue::Decoration(k) => {
                            checksum.write_u32(3);
                            checksum.write_u8(k);
                        }
                        CellValue::Occupied(id) => {
                            checksum.write_u32(4);
                            checksum.write_u32(id.0);
                        }
                    }
                }
            }
        }

        checksum.write_seq(&self.map.regions, |c, region| c.write_u32(*region));
        checksum.write_seq(&self.map.region_connections, |c, conn| {
            c.write_seq(&conn.left, |c, cell| {
                c.write_i32(cell.x);
                c.write_i32(cell.y);
            });
            c.write_seq(&conn.right, |c, cell| {
                c.write_i32(cell.x);
                c.write_i32(cell.y);
            });
        });

        for player_fog in &self.map.fog {
            checksum.write_seq(player_fog, |c, fog| {
                c.write_u32(match fog {
                    crate::map::FogState::Hidden => 0,
                    crate::map::FogState::Explored => 1,
                    crate::map::FogState::Visible => 2,
                })
            });
        }
        for player_detection in &self.map.detection {
            checksum.write_seq(player_detection, |c, d| c.write_u32(*d));
        }

        for remembered in &self.remembered_entities {
            let mut sorted: Vec<_> = remembered.clone();
            sorted.sort_by_key(|(id, _)| *id);
            checksum.write_seq(&sorted, |c, (id, snapshot)| {
                c.write_u32(id.0);
                c.write_i32(snapshot.cell.x);
                c.write_i32(snapshot.cell.y);
                c.write_bool(snapshot.is_destroyed);
            });
        }

        checksum.write_bool(self.is_fog_dirty);

        let ids = self.pool.ids();
        checksum.write_usize(ids.len());
        for id in ids {
            let entity = self.pool.get(id).unwrap();
            checksum.write_u32(id.0);
            checksum.write_u32(entity.kind.type_id());
            checksum.write_u32(mode_id(entity.mode));
            checksum.write_u8(entity.player_id);
            checksum.write_u32(entity.flags.bits());
            checksum.write_i32(entity.cell.x);
            checksum.write_i32(entity.cell.y);
            checksum.write_i32(entity.position.x.raw());
            checksum.write_i32(entity.position.y.raw());
            checksum.write_u32(direction_id(entity.direction));
            checksum.write_i32(entity.health);
            checksum.write_u32(entity.energy);
            checksum.write_u32(entity.timer);
            checksum.write_u32(entity.energy_regen_timer);
            checksum.write_u32(entity.health_regen_timer);
            write_animation(&mut checksum, &entity.animation);
            checksum.write_seq(&entity.garrisoned_units, |c, g| c.write_u32(g.0));
            checksum.write_u32(entity.garrison_id.0);
            checksum.write_u32(entity.goldmine_id.0);
            checksum.write_u32(entity.gold_held);
            write_target(&mut checksum, &entity.target);
            checksum.write_seq(&entity.target_queue, |c, t| write_target(c, t));
            checksum.write_seq(&entity.path, |c, cell| {
                c.write_i32(cell.x);
                c.write_i32(cell.y);
            });
            checksum.write_u32(entity.pathfind_attempts);
            checksum.write_seq(&entity.queue, |c, item| match item {
                QueueItem::Unit(t) => {
                    c.write_u8(0);
                    c.write_u32(*t as u32);
                }
                QueueItem::Upgrade(id) => {
                    c.write_u8(1);
                    c.write_u32(*id as u32);
                }
            });
            let rally = entity.rally_point.unwrap_or(Cell::new(-1, -1));
            checksum.write_i32(rally.x);
            checksum.write_i32(rally.y);
            checksum.write_u32(entity.cooldown_timer);
            let attack_move_cell = entity.attack_move_cell.unwrap_or(Cell::new(-1, -1));
            checksum.write_i32(attack_move_cell.x);
            checksum.write_i32(attack_move_cell.y);
            checksum.write_u32(entity.taking_damage_counter);
            checksum.write_u32(entity.taking_damage_timer);
            checksum.write_u32(entity.fire_damage_timer);
            checksum.write_u32(entity.bleed_timer);
            checksum.write_u32(entity.bleed_damage_timer);
            write_animation(&mut checksum, &entity.bleed_animation);
        }

        for layer_particles in &self.particles {
            checksum.write_seq(layer_particles, |c, p| {
                c.write_i32(p.cell.x);
                c.write_i32(p.cell.y);
                c.write_u32(p.ticks_remaining);
            });
        }
        checksum.write_seq(&self.projectiles, |c, p| {
            c.write_i32(p.source.x);
            c.write_i32(p.source.y);
            c.write_i32(p.target.x);
            c.write_i32(p.target.y);
            c.write_u32(p.target_id.0);
            c.write_i32(p.damage);
        });
        checksum.write_seq(&self.fires, |c, fire| {
            c.write_i32(fire.cell.x);
            c.write_i32(fire.cell.y);
            c.write_u32(fire.ticks_remaining);
        });
        checksum.write_seq(&self.fire_cells, |c, cell| {
            c.write_i32(cell.x);
            c.write_i32(cell.y);
        });
        checksum.write_seq(&self.fog_reveals, |c, reveal| {
            c.write_i32(reveal.cell.x);
            c.write_i32(reveal.cell.y);
            c.write_u32(reveal.radius);
            c.write_u32(reveal.ticks_remaining);
        });

        for player in &self.players {
            checksum.write_bool(player.active);
            checksum.write_bytes(&player.name);
            checksum.write_u32(player.team);
            checksum.write_i32(player.recolor_id);
            checksum.write_u32(player.gold);
            checksum.write_u32(player.upgrades);
            checksum.write_u32(player.population);
            checksum.write_u32(player.max_population);
            checksum.write_bool(player.has_surrendered);
        }

        checksum.finish()
    }
}

fn mode_id(mode: Mode) -> u32 {
    match mode {
        Mode::Idle => 0,
        Mode::Move => 1,
        Mode::MoveBlocked => 2,
        Mode::MoveFinished => 3,
        Mode::Build => 4,
        Mode::Repair => 5,
        Mode::AttackWindup => 6,
        Mode::AttackCooldown => 7,
        Mode::MineIn => 8,
        Mode::Ferry => 9,
        Mode::Death => 10,
        Mode::DeathFade => 11,
        Mode::BuildingInProgress => 12,
        Mode::BuildingFinished => 13,
        Mode::BuildingDestroyed => 14,
    }
}

fn direction_id(direction: crate::entity::Direction) -> u32 {
    use crate::entity::Direction::*;
    match direction {
        North => 0,
        NorthEast => 1,
        East => 2,
        SouthEast => 3,
        South => 4,
        SouthWest => 5,
        West => 6,
        NorthWest => 7,
    }
}

fn write_animation(checksum: &mut Checksum, animation: &crate::entity::Animation) {
    checksum.write_u32(match animation.name {
        crate::entity::AnimationName::Idle => 0,
        crate::entity::AnimationName::Move => 1,
        crate::entity::AnimationName::Build => 2,
        crate::entity::AnimationName::Attack => 3,
        crate::entity::AnimationName::Death => 4,
        crate::entity::AnimationName::DeathFade => 5,
        crate::entity::AnimationName::Bleed => 6,
    });
    checksum.write_u32(animation.frame_index);
    checksum.write_u32(animation.timer);
    checksum.write_u32(animation.loops_remaining);
}

fn write_target(checksum: &mut Checksum, target: &Target) {
    match target {
        Target::None => checksum.write_u8(0),
        Target::Cell { cell } => {
            checksum.write_u8(1);
            checksum.write_i32(cell.x);
            checksum.write_i32(cell.y);
        }
        Target::AttackMove { cell } => {
            checksum.write_u8(2);
            checksum.write_i32(cell.x);
            checksum.write_i32(cell.y);
        }
        Target::Entity { id } => {
            checksum.write_u8(3);
            checksum.write_u32(id.0);
        }
        Target::Repair { id } => {
            checksum.write_u8(4);
            checksum.write_u32(id.0);
        }
        Target::Build { building_type, building_cell, unit_cell, building_id } => {
            checksum.write_u8(5);
            checksum.write_u32(*building_type as u32);
            checksum.write_i32(building_cell.x);
            checksum.write_i32(building_cell.y);
            checksum.write_i32(unit_cell.x);
            checksum.write_i32(unit_cell.y);
            checksum.write_u32(building_id.0);
        }
        Target::BuildAssist { builder_id } => {
            checksum.write_u8(6);
            checksum.write_u32(builder_id.0);
        }
        Target::Unload { cell } => {
            checksum.write_u8(7);
            checksum.write_i32(cell.x);
            checksum.write_i32(cell.y);
        }
        Target::Molotov { cell } => {
            checksum.write_u8(8);
            checksum.write_i32(cell.x);
            checksum.write_i32(cell.y);
        }
        Target::Gold { mine_id } => {
            checksum.write_u8(9);
            checksum.write_u32(mine_id.0);
        }
        Target::Camp { camp_id } => {
            checksum.write_u8(10);
            checksum.write_u32(camp_id.0);
        }
        Target::Patrol { cell_a, cell_b, going_to_b } => {
            checksum.write_u8(11);
            checksum.write_i32(cell_a.x);
            checksum.write_i32(cell_a.y);
            checksum.write_i32(cell_b.x);
            checksum.write_i32(cell_b.y);
            checksum.write_bool(*going_to_b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_simulation_checksum_is_stable() {
        let sim = Simulation::new(42, 8, 8);
        let first = sim.checksum();
        let second = sim.checksum();
        assert_eq!(first, second);
    }

    #[test]
    fn ticking_an_empty_map_is_a_no_op_on_checksum() {
        let mut sim = Simulation::new(42, 8, 8);
        let before = sim.checksum();
        sim.tick();
        let after = sim.checksum();
        assert_eq!(before, after);
    }

    #[test]
    fn spawning_a_unit_changes_the_checksum() {
        let mut sim = Simulation::new(42, 8, 8);
        let before = sim.checksum();
        sim.spawn_unit(UnitType::Miner, 0, Cell::new(2, 2));
        let after = sim.checksum();
        assert_ne!(before, after);
    }

    #[test]
    fn same_seed_and_inputs_reproduce_checksum_sequence() {
        let run = |seed: i32| {
            let mut sim = Simulation::new(seed, 16, 16);
            sim.spawn_unit(UnitType::Miner, 0, Cell::new(1, 1));
            let mut history = Vec::new();
            for _ in 0..10 {
                sim.tick();
                history.push(sim.checksum());
            }
            history
        };
        assert_eq!(run(7), run(7));
    }
}
