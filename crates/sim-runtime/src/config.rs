//! Runtime-tunable configuration, layered on top of `sim-core`'s compile-time
//! [`SimConfig`] (spec §6.4). Mirrors `runtime::RuntimeConfig`: a plain struct
//! with a `Default` impl, not a builder.

use sim_core::SimConfig;

/// Settings the host process may tune without touching simulation rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub sim: SimConfig,
    /// This peer's player slot.
    pub local_player_id: u8,
    /// Turns between checksum exchanges (1 = every turn).
    pub checksum_cadence: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            sim: SimConfig::default(),
            local_player_id: 0,
            checksum_cadence: 1,
        }
    }
}
