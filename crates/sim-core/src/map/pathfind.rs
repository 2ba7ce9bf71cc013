//! A* pathfinding over the layered cell grid (spec §4.3.2).

use std::collections::BTreeMap;
use std::collections::BinaryHeap;
use std::cmp::Reverse;

use super::{Cell, CellValue, Layer, Map};
use crate::fixed::Fixed32;

const ORTHOGONAL_COST: Fixed32 = Fixed32::ONE;
const DIAGONAL_COST: Fixed32 = Fixed32::from_raw(384); // 1.5 in Q8.8
const UNIT_BLOCK_TOLERANCE_TILES: i32 = 3;
const MAX_EXPLORED_NODES: usize = 4096;

/// Parameters for a single pathfinding call.
#[derive(Clone, Copy, Debug)]
pub struct PathRequest {
    pub from: Cell,
    pub to: Cell,
    pub size: u8,
    pub allow_blocked_goal: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Node {
    cost: Fixed32,
    cell: Cell,
}

/// Returns the best available path from `request.from` toward
/// `request.to`, or `None` if `from == to` or the map has no cells at all.
///
/// When the goal is fully reachable, returns the complete path. When
/// `allow_blocked_goal` is set and the goal itself is blocked, the path ends
/// one cell short, at the goal's nearest reachable neighbor. When the goal
/// is unreachable (wrong region, or the explored-node cap is hit first),
/// returns the path to the explored cell with the lowest heuristic distance
/// to the goal, so the unit still makes progress.
pub fn pathfind(map: &Map, request: PathRequest) -> Option<Vec<Cell>> {
    if request.from == request.to {
        return None;
    }
    if !map.in_bounds(request.from) || !map.in_bounds(request.to) {
        return None;
    }
    if !request.allow_blocked_goal
        && map.region_of(request.from).is_some()
        && !map.regions_connected(request.from, request.to)
    {
        return None;
    }

    let mut open = BinaryHeap::new();
    let mut g_score: BTreeMap<Cell, Fixed32> = BTreeMap::new();
    let mut came_from: BTreeMap<Cell, Cell> = BTreeMap::new();
    let mut best_effort = request.from;
    let mut best_effort_h = heuristic(request.from, request.to);

    g_score.insert(request.from, Fixed32::ZERO);
    open.push(Reverse(Node {
        cost: heuristic(request.from, request.to),
        cell: request.from,
    }));

    let mut explored = 0usize;
    while let Some(Reverse(Node { cell: current, .. })) = open.pop() {
        if current == request.to {
            return Some(reconstruct_path(&came_from, current));
        }
        if request.allow_blocked_goal && current.is_adjacent(request.to) {
            return Some(reconstruct_path(&came_from, current));
        }

        explored += 1;
        if explored > MAX_EXPLORED_NODES {
            break;
        }

        let current_g = *g_score.get(&current).unwrap_or(&Fixed32::ZERO);
        let current_h = heuristic(current, request.to);
        if current_h.raw() < best_effort_h.raw() {
            best_effort = current;
            best_effort_h = current_h;
        }

        for (neighbor, is_diagonal) in traversable_neighbors(map, current, request) {
            let step = if is_diagonal { DIAGONAL_COST } else { ORTHOGONAL_COST };
            let tentative_g = current_g + step;
            let better = g_score.get(&neighbor).is_none_or(|&existing| tentative_g.raw() < existing.raw());
            if better {
                came_from.insert(neighbor, current);
                g_score.insert(neighbor, tentative_g);
                open.push(Reverse(Node {
                    cost: tentative_g + heuristic(neighbor, request.to),
                    cell: neighbor,
                }));
            }
        }
    }

    if best_effort == request.from {
        None
    } else {
        Some(reconstruct_path(&came_from, best_effort))
    }
}

fn heuristic(a: Cell, b: Cell) -> Fixed32 {
    Fixed32::from_int(a.manhattan_distance(b))
}

fn reconstruct_path(came_from: &BTreeMap<Cell, Cell>, mut current: Cell) -> Vec<Cell> {
    let mut path = Vec::new();
    while let Some(&prev) = came_from.get(&current) {
        path.push(current);
        current = prev;
    }
    path.reverse();
    path
}

/// Yields `(neighbor, is_diagonal)` for every cell reachable in one step from
/// `from`, applying diagonal-crack prevention and unit-blocking tolerance.
fn traversable_neighbors(map: &Map, from: Cell, request: PathRequest) -> Vec<(Cell, bool)> {
    let offsets: [(i32, i32, bool); 8] = [
        (1, 0, false),
        (-1, 0, false),
        (0, 1, false),
        (0, -1, false),
        (1, 1, true),
        (1, -1, true),
        (-1, 1, true),
        (-1, -1, true),
    ];

    let mut result = Vec::new();
    for (dx, dy, is_diagonal) in offsets {
        let neighbor = Cell::new(from.x + dx, from.y + dy);
        if !map.in_bounds(neighbor) {
            continue;
        }
        if is_diagonal {
            let crack_a = Cell::new(from.x + dx, from.y);
            let crack_b = Cell::new(from.x, from.y + dy);
            if is_effectively_blocked(map, crack_a, request)
                && is_effectively_blocked(map, crack_b, request)
            {
                continue;
            }
        }
        let goal_exception = request.allow_blocked_goal && neighbor == request.to;
        if !goal_exception && is_effectively_blocked(map, neighbor, request) {
            continue;
        }
        result.push((neighbor, is_diagonal));
    }
    result
}

/// A cell counts as blocked for pathing unless it's a unit-occupied cell far
/// enough from the path's origin that the blocker is assumed to have moved
/// on by the time the path is walked (spec §4.3.2).
fn is_effectively_blocked(map: &Map, cell: Cell, request: PathRequest) -> bool {
    if request.size > 1 {
        return !map.rect_is_free(Layer::Ground, cell, request.size);
    }
    match map.cell_at(Layer::Ground, cell) {
        CellValue::Empty => false,
        CellValue::Occupied(_) => {
            cell.manhattan_distance(request.from) <= UNIT_BLOCK_TOLERANCE_TILES
        }
        CellValue::Blocked | CellValue::Unreachable | CellValue::Decoration(_) => true,
    }
}
