//! Entities: the generational pool, the entity record, and targets.

mod component;
mod id;
mod pool;
pub mod target;

pub use component::{Animation, AnimationName, Direction, Entity, EntityFlags, EntityKind, Mode};
pub use id::EntityId;
pub use pool::EntityPool;
pub use target::Target;
