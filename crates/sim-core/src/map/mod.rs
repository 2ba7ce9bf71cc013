//! The match map: tiles, layered cell grid, fog of war, and pathfinding.

mod cell;
pub mod fog;
mod pathfind;

pub use cell::{Cell, CellValue, FogState, Layer, Tile};
pub use pathfind::{pathfind, PathRequest};

use crate::config::SimConfig;
use crate::entity::EntityId;

/// Left/right reachable-cell pair linking two adjacent regions (spec §3.2,
/// §4.3.2).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionConnection {
    pub left: Vec<Cell>,
    pub right: Vec<Cell>,
}

/// Fixed-at-start-of-match grid: tiles, multi-layer cell contents, per-player
/// fog/detection, and precomputed pathing regions (spec §3.2).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Map {
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<Tile>,
    cells: [Vec<CellValue>; Layer::COUNT],
    pub fog: Vec<Vec<FogState>>,
    pub detection: Vec<Vec<u32>>,
    pub regions: Vec<u32>,
    pub region_connections: Vec<RegionConnection>,
}

impl Map {
    pub fn new(width: u32, height: u32) -> Self {
        let area = (width * height) as usize;
        let mut map = Self {
            width,
            height,
            tiles: vec![Tile::default(); area],
            cells: core::array::from_fn(|_| vec![CellValue::Empty; area]),
            fog: (0..SimConfig::MAX_PLAYERS)
                .map(|_| vec![FogState::Hidden; area])
                .collect(),
            detection: (0..SimConfig::MAX_PLAYERS).map(|_| vec![0u32; area]).collect(),
            regions: vec![0; area],
            region_connections: Vec::new(),
        };
        map.recompute_regions();
        map
    }

    /// Whether writing `value` to the Ground layer can change connectivity
    /// and so needs a region recompute. Dynamic unit occupancy (`Occupied`,
    /// `Empty`) never does; only terrain writes do.
    fn affects_regions(value: CellValue) -> bool {
        matches!(value, CellValue::Blocked | CellValue::Unreachable | CellValue::Decoration(_))
    }

    /// Flood-fills the Ground layer into connected components, assigning
    /// each reachable cell a region id and recording the boundary pairs
    /// between adjacent regions that a layer change (e.g. a cleared
    /// obstacle) could reconnect (spec §3.2, §4.3.2).
    pub fn recompute_regions(&mut self) {
        let area = (self.width * self.height) as usize;
        self.regions = vec![u32::MAX; area];
        self.region_connections.clear();

        let is_blocked = |cells: &[CellValue], idx: usize| {
            matches!(cells[idx], CellValue::Blocked | CellValue::Unreachable | CellValue::Decoration(_))
        };
        let ground = &self.cells[Layer::Ground.index()];

        let mut next_region = 0u32;
        let mut queue = std::collections::VecDeque::new();
        for start_idx in 0..area {
            if self.regions[start_idx] != u32::MAX || is_blocked(ground, start_idx) {
                continue;
            }
            let region_id = next_region;
            next_region += 1;
            self.regions[start_idx] = region_id;
            queue.push_back(start_idx);
            while let Some(idx) = queue.pop_front() {
                let cell = Cell::new((idx % self.width as usize) as i32, (idx / self.width as usize) as i32);
                for neighbor in cell.neighbors8() {
                    if !self.in_bounds(neighbor) {
                        continue;
                    }
                    let neighbor_idx = self.index(neighbor);
                    if self.regions[neighbor_idx] == u32::MAX && !is_blocked(ground, neighbor_idx) {
                        self.regions[neighbor_idx] = region_id;
                        queue.push_back(neighbor_idx);
                    }
                }
            }
        }
    }

    #[inline]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.width && (cell.y as u32) < self.height
    }

    #[inline]
    fn index(&self, cell: Cell) -> usize {
        cell.y as usize * self.width as usize + cell.x as usize
    }

    pub fn tile_at(&self, cell: Cell) -> Option<&Tile> {
        self.in_bounds(cell).then(|| &self.tiles[self.index(cell)])
    }

    pub fn cell_at(&self, layer: Layer, cell: Cell) -> CellValue {
        if !self.in_bounds(cell) {
            return CellValue::Unreachable;
        }
        self.cells[layer.index()][self.index(cell)]
    }

    pub fn is_blocked(&self, layer: Layer, cell: Cell) -> bool {
        !self.cell_at(layer, cell).is_empty()
    }

    /// Writes an `S`×`S` rectangular patch atomically, starting at `cell`.
    pub fn set_cell_rect(&mut self, layer: Layer, cell: Cell, size: u8, value: CellValue) {
        let layer_idx = layer.index();
        for dy in 0..size as i32 {
            for dx in 0..size as i32 {
                let target = Cell::new(cell.x + dx, cell.y + dy);
                if self.in_bounds(target) {
                    let idx = self.index(target);
                    self.cells[layer_idx][idx] = value;
                }
            }
        }
        if layer == Layer::Ground && Self::affects_regions(value) {
            self.recompute_regions();
        }
    }

    /// Whether every cell of the `S`×`S` footprint at `cell` is empty.
    pub fn rect_is_free(&self, layer: Layer, cell: Cell, size: u8) -> bool {
        for dy in 0..size as i32 {
            for dx in 0..size as i32 {
                let target = Cell::new(cell.x + dx, cell.y + dy);
                if !self.in_bounds(target) || !self.cell_at(layer, target).is_empty() {
                    return false;
                }
            }
        }
        true
    }

    pub fn region_of(&self, cell: Cell) -> Option<u32> {
        self.in_bounds(cell).then(|| self.regions[self.index(cell)])
    }

    /// Quick reachability pre-check used before running A* (spec §4.3.2).
    pub fn regions_connected(&self, from: Cell, to: Cell) -> bool {
        let (Some(from_region), Some(to_region)) = (self.region_of(from), self.region_of(to)) else {
            return false;
        };
        if from_region == to_region {
            return true;
        }
        self.region_connections.iter().any(|conn| {
            (conn.left.iter().any(|c| self.region_of(*c) == Some(from_region))
                && conn.right.iter().any(|c| self.region_of(*c) == Some(to_region)))
                || (conn.left.iter().any(|c| self.region_of(*c) == Some(to_region))
                    && conn.right.iter().any(|c| self.region_of(*c) == Some(from_region)))
        })
    }

    pub fn is_detected(&self, player: usize, cell: Cell) -> bool {
        self.in_bounds(cell) && self.detection[player][self.index(cell)] > 0
    }

    pub fn fog_at(&self, player: usize, cell: Cell) -> FogState {
        if !self.in_bounds(cell) {
            return FogState::Hidden;
        }
        self.fog[player][self.index(cell)]
    }

    /// Finds the occupant of `cell` on `layer`, if any.
    pub fn occupant_at(&self, layer: Layer, cell: Cell) -> Option<EntityId> {
        self.cell_at(layer, cell).occupant()
    }
}
