//! Compile-time constants and tunable parameters for the simulation.

/// Simulation configuration constants.
///
/// Mirrors `GameConfig` in spirit: compile-time bounds live as associated
/// consts (used as const generics for bounded collections), while the few
/// values a host may legitimately tune live as fields with a `Default` impl.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Turns a peer may miss before "waiting for players" is surfaced to the UI.
    pub disconnect_grace: u32,
}

impl SimConfig {
    // ===== compile-time constants (§6.4) =====
    pub const MAX_PLAYERS: usize = 4;
    pub const TICKS_PER_SECOND: u32 = 60;
    pub const TICKS_PER_TURN: u32 = 4;
    pub const TURN_OFFSET: u32 = 3;
    pub const INPUT_BUFFER_SIZE: usize = 1024;
    pub const BUILDING_QUEUE_MAX: usize = 5;
    pub const SELECTION_LIMIT: usize = 40;

    // ===== entity-local bounds =====
    pub const MAX_GARRISON: usize = 8;
    pub const MAX_PATH_LEN: usize = 64;
    pub const MAX_TARGET_QUEUE: usize = 8;

    // ===== gameplay timings (ticks) =====
    pub const PATH_PAUSE_DURATION: u32 = 30;
    pub const BUILD_TICK_DURATION: u32 = 10;
    pub const MINE_IN_DURATION: u32 = 20;
    pub const GOLD_PER_TRIP: u32 = 10;
    pub const UPGRADE_TICK_DURATION: u32 = 200;

    // ===== construction/repair amounts =====
    pub const BUILD_HEALTH_PER_TICK: i32 = 20;
    pub const REPAIR_HEALTH_PER_TICK: i32 = 10;
    pub const REPAIR_GOLD_PER_TICK: u32 = 1;

    // ===== passive damage (bleed/fire/mines) =====
    pub const BLEED_TICK_PERIOD: u32 = 15;
    pub const BLEED_DAMAGE_AMOUNT: i32 = 2;
    pub const FIRE_TICK_PERIOD: u32 = 30;
    pub const FIRE_DAMAGE_AMOUNT: i32 = 5;
    pub const FIRE_SPREAD_PERIOD: u32 = 60;
    pub const FIRE_DURATION: u32 = 300;
    pub const MINE_DAMAGE: i32 = 50;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_DISCONNECT_GRACE: u32 = 30;

    pub const fn new() -> Self {
        Self {
            disconnect_grace: Self::DEFAULT_DISCONNECT_GRACE,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}
