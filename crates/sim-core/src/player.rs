//! Per-player record (spec §3.5).

/// One player's match-visible state. `players[0..MAX_PLAYERS]` is part of
/// the checksum, so this struct's field order matters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Player {
    pub active: bool,
    pub name: [u8; 36],
    pub team: u32,
    pub recolor_id: i32,
    pub gold: u32,
    pub upgrades: u32,
    pub population: u32,
    pub max_population: u32,
    pub has_surrendered: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            active: bool::default(),
            name: [0u8; 36],
            team: u32::default(),
            recolor_id: i32::default(),
            gold: u32::default(),
            upgrades: u32::default(),
            population: u32::default(),
            max_population: u32::default(),
            has_surrendered: bool::default(),
        }
    }
}

impl Player {
    pub fn new(name: &str, team: u32, recolor_id: i32) -> Self {
        let mut bytes = [0u8; 36];
        let trimmed = &name.as_bytes()[..name.len().min(35)];
        bytes[..trimmed.len()].copy_from_slice(trimmed);
        Self {
            active: true,
            name: bytes,
            team,
            recolor_id,
            gold: 0,
            upgrades: 0,
            population: 0,
            max_population: 0,
            has_surrendered: false,
        }
    }

    pub fn has_upgrade(&self, id: u16) -> bool {
        id < 32 && self.upgrades & (1 << id) != 0
    }

    pub fn grant_upgrade(&mut self, id: u16) {
        if id < 32 {
            self.upgrades |= 1 << id;
        }
    }

    pub fn population_headroom(&self) -> u32 {
        self.max_population.saturating_sub(self.population)
    }
}
