//! Deterministic lockstep simulation core, shared by host and clients.
//!
//! `sim-core` defines the canonical rules (entities, map, combat, production,
//! input) and exposes a pure API centered on [`sim::Simulation`]. All state
//! mutation flows through it; `sim-runtime` layers networking, replay and
//! turn scheduling on top.
#![forbid(unsafe_code)]

pub mod checksum;
pub mod combat;
pub mod config;
pub mod content;
pub mod entity;
pub mod error;
pub mod fixed;
pub mod garrison;
pub mod input;
pub mod map;
pub mod passives;
pub mod player;
pub mod production;
pub mod rng;
pub mod sim;
pub mod tick;

pub use checksum::Checksum;
pub use combat::{apply_damage, compute_damage, resolve_elevation_miss};
pub use config::SimConfig;
pub use content::{building_stats, unit_stats, Stats};
pub use entity::{Animation, AnimationName, Direction, Entity, EntityFlags, EntityId, EntityKind, EntityPool, Mode, Target};
pub use entity::target::{BuildingType, QueueItem, UnitType};
pub use error::{ErrorContext, ErrorSeverity, SimError};
pub use fixed::{Fixed32, Vec2Fixed};
pub use input::{decode_batch, encode_into, DecodeError, MatchInput, QueueItemRequest};
pub use map::{pathfind, Cell, CellValue, FogState, Layer, Map, PathRequest, RegionConnection, Tile};
pub use player::Player;
pub use rng::Rng;
pub use sim::{FogReveal, Particle, Projectile, RememberedEntity, Simulation};
pub use tick::TickEvent;
