//! The entity record shared by units, buildings, gold mines and land mines
//! (spec §3.3, §9).

use arrayvec::ArrayVec;
use bitflags::bitflags;

use super::id::EntityId;
use super::target::{BuildingType, QueueItem, Target, UnitType};
use crate::config::SimConfig;
use crate::fixed::Vec2Fixed;
use crate::map::Cell;

bitflags! {
    /// Per-entity boolean flags (spec §3.3).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct EntityFlags: u32 {
        const IS_GARRISONED   = 1 << 0;
        const HOLD_POSITION   = 1 << 1;
        const INVISIBLE       = 1 << 2;
        const DAMAGE_FLICKER  = 1 << 3;
        const GOLD_HELD       = 1 << 4;
    }
}

/// 8-way facing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    #[default]
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// The direction of travel from `from` to an orthogonally/diagonally
    /// adjacent `to`. Falls back to the current direction if they are not
    /// one step apart (callers only invoke this for path steps).
    pub fn from_step(from: Cell, to: Cell, fallback: Direction) -> Direction {
        match (to.x - from.x, to.y - from.y) {
            (0, -1) => Direction::North,
            (1, -1) => Direction::NorthEast,
            (1, 0) => Direction::East,
            (1, 1) => Direction::SouthEast,
            (0, 1) => Direction::South,
            (-1, 1) => Direction::SouthWest,
            (-1, 0) => Direction::West,
            (-1, -1) => Direction::NorthWest,
            _ => fallback,
        }
    }
}

/// Mode-machine state for units and buildings (spec §3.3). A single enum
/// covers both subsets; a building only ever occupies the `Building*`
/// variants and a unit only the rest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    #[default]
    Idle,
    Move,
    MoveBlocked,
    MoveFinished,
    Build,
    Repair,
    AttackWindup,
    AttackCooldown,
    MineIn,
    Ferry,
    Death,
    DeathFade,
    BuildingInProgress,
    BuildingFinished,
    BuildingDestroyed,
}

/// A small, integer-driven animation record (spec §3.3). Kept in the
/// simulation because some mode transitions depend on "animation done"
/// (e.g. death fade completing before the pool removes the entity); this is
/// never driven by wall-clock time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Animation {
    pub name: AnimationName,
    pub frame_index: u32,
    pub timer: u32,
    pub loops_remaining: u32,
}

impl Animation {
    pub fn is_done(&self) -> bool {
        self.loops_remaining == 0
    }

    pub fn start(name: AnimationName, loops: u32) -> Self {
        Self {
            name,
            frame_index: 0,
            timer: 0,
            loops_remaining: loops,
        }
    }

    /// Advances the animation by one tick's worth of frames.
    pub fn tick(&mut self, frames: u32, ticks_per_frame: u32) {
        if self.loops_remaining == 0 {
            return;
        }
        self.timer += 1;
        if self.timer >= ticks_per_frame {
            self.timer = 0;
            self.frame_index += 1;
            if self.frame_index >= frames {
                self.frame_index = 0;
                self.loops_remaining = self.loops_remaining.saturating_sub(1);
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnimationName {
    #[default]
    Idle,
    Move,
    Build,
    Attack,
    Death,
    DeathFade,
    Bleed,
}

/// What kind of thing an entity is (spec §9: variants share one record plus
/// a `kind` discriminator instead of inheritance/virtual dispatch).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityKind {
    Unit(UnitType),
    Building(BuildingType),
    GoldMine,
    LandMine,
}

impl EntityKind {
    /// Stable `u32` discriminant, used only for the checksum byte stream.
    pub fn type_id(self) -> u32 {
        match self {
            EntityKind::Unit(UnitType::Miner) => 0,
            EntityKind::Unit(UnitType::Cowboy) => 1,
            EntityKind::Unit(UnitType::Wagon) => 2,
            EntityKind::Building(BuildingType::House) => 3,
            EntityKind::Building(BuildingType::Camp) => 4,
            EntityKind::Building(BuildingType::Saloon) => 5,
            EntityKind::GoldMine => 6,
            EntityKind::LandMine => 7,
        }
    }

    pub fn is_unit(self) -> bool {
        matches!(self, EntityKind::Unit(_))
    }

    pub fn is_building(self) -> bool {
        matches!(self, EntityKind::Building(_))
    }

    pub fn cell_size(self) -> u8 {
        match self {
            EntityKind::Unit(t) => crate::content::unit_stats(t).cell_size,
            EntityKind::Building(t) => crate::content::building_stats(t).cell_size,
            EntityKind::GoldMine => 3,
            EntityKind::LandMine => 1,
        }
    }
}

/// Every field that participates in the deterministic checksum, in the
/// exact order the checksum writer visits them.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    pub kind: EntityKind,
    pub mode: Mode,
    pub player_id: u8,
    pub flags: EntityFlags,
    pub cell: Cell,
    pub position: Vec2Fixed,
    pub direction: Direction,
    pub health: i32,
    pub energy: u32,
    pub timer: u32,
    pub energy_regen_timer: u32,
    pub health_regen_timer: u32,
    pub animation: Animation,
    pub garrisoned_units: ArrayVec<EntityId, { SimConfig::MAX_GARRISON }>,
    pub garrison_id: EntityId,
    pub goldmine_id: EntityId,
    pub gold_held: u32,
    pub target: Target,
    pub target_queue: ArrayVec<Target, { SimConfig::MAX_TARGET_QUEUE }>,
    pub path: ArrayVec<Cell, { SimConfig::MAX_PATH_LEN }>,
    pub pathfind_attempts: u32,
    pub queue: ArrayVec<QueueItem, { SimConfig::BUILDING_QUEUE_MAX }>,
    pub rally_point: Option<Cell>,
    pub cooldown_timer: u32,
    pub attack_move_cell: Option<Cell>,
    pub taking_damage_counter: u32,
    pub taking_damage_timer: u32,
    pub fire_damage_timer: u32,
    pub bleed_timer: u32,
    pub bleed_damage_timer: u32,
    pub bleed_animation: Animation,
}

impl Entity {
    fn base(kind: EntityKind, player_id: u8, cell: Cell, health: i32, mode: Mode) -> Self {
        Self {
            kind,
            mode,
            player_id,
            flags: EntityFlags::empty(),
            cell,
            position: Vec2Fixed::from_cell(cell.x, cell.y),
            direction: Direction::South,
            health,
            energy: 0,
            timer: 0,
            energy_regen_timer: 0,
            health_regen_timer: 0,
            animation: Animation::default(),
            garrisoned_units: ArrayVec::new(),
            garrison_id: EntityId::NONE,
            goldmine_id: EntityId::NONE,
            gold_held: 0,
            target: Target::None,
            target_queue: ArrayVec::new(),
            path: ArrayVec::new(),
            pathfind_attempts: 0,
            queue: ArrayVec::new(),
            rally_point: None,
            cooldown_timer: 0,
            attack_move_cell: None,
            taking_damage_counter: 0,
            taking_damage_timer: 0,
            fire_damage_timer: 0,
            bleed_timer: 0,
            bleed_damage_timer: 0,
            bleed_animation: Animation::default(),
        }
    }

    pub fn new_unit(unit_type: UnitType, player_id: u8, cell: Cell) -> Self {
        let stats = crate::content::unit_stats(unit_type);
        Self::base(EntityKind::Unit(unit_type), player_id, cell, stats.max_health, Mode::Idle)
    }

    /// A newly placed building starts `InProgress` at `max_health / 10`
    /// (spec §8, scenario S2).
    pub fn new_building(building_type: BuildingType, player_id: u8, cell: Cell) -> Self {
        let stats = crate::content::building_stats(building_type);
        let starting_health = (stats.max_health / 10).max(1);
        Self::base(
            EntityKind::Building(building_type),
            player_id,
            cell,
            starting_health,
            Mode::BuildingInProgress,
        )
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0 && !matches!(self.mode, Mode::Death | Mode::DeathFade)
    }

    pub fn is_garrisoned(&self) -> bool {
        self.flags.contains(EntityFlags::IS_GARRISONED)
    }

    pub fn sight(&self) -> u32 {
        match self.kind {
            EntityKind::Unit(t) => crate::content::unit_stats(t).sight,
            EntityKind::Building(t) => crate::content::building_stats(t).sight,
            EntityKind::GoldMine | EntityKind::LandMine => 0,
        }
    }
}
