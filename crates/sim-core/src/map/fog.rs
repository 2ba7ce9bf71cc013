//! Per-player fog-of-war update (spec §4.3.3).

use super::{Cell, FogState, Map};

/// Recomputes one player's fog for the current tick.
///
/// `sight_sources` are the cells and sight radii of that player's living,
/// non-garrisoned entities. Any cell within `sight` (chebyshev distance)
/// becomes `Visible`; a cell that was `Visible` last tick but falls outside
/// every source's radius this tick demotes to `Explored`. `Hidden` cells
/// that gain vision become `Explored` immediately and `Visible` in the same
/// pass; `Hidden` is never revisited once a cell has been seen.
pub fn recompute_player_fog(map: &mut Map, player: usize, sight_sources: &[(Cell, u32)]) {
    let width = map.width as i32;
    let height = map.height as i32;
    let area = (map.width * map.height) as usize;

    let mut newly_visible = vec![false; area];
    for &(origin, sight) in sight_sources {
        let sight = sight as i32;
        for dy in -sight..=sight {
            for dx in -sight..=sight {
                let cell = Cell::new(origin.x + dx, origin.y + dy);
                if cell.chebyshev_distance(origin) > sight {
                    continue;
                }
                if cell.x < 0 || cell.y < 0 || cell.x >= width || cell.y >= height {
                    continue;
                }
                let idx = cell.y as usize * map.width as usize + cell.x as usize;
                newly_visible[idx] = true;
            }
        }
    }

    let fog = &mut map.fog[player];
    for (idx, state) in fog.iter_mut().enumerate() {
        *state = match (*state, newly_visible[idx]) {
            (_, true) => FogState::Visible,
            (FogState::Visible, false) => FogState::Explored,
            (other, false) => other,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Map;

    #[test]
    fn vision_then_loss_demotes_to_explored_not_hidden() {
        let mut map = Map::new(8, 8);
        let origin = Cell::new(4, 4);
        recompute_player_fog(&mut map, 0, &[(origin, 2)]);
        assert_eq!(map.fog_at(0, origin), FogState::Visible);

        recompute_player_fog(&mut map, 0, &[]);
        assert_eq!(map.fog_at(0, origin), FogState::Explored);
    }

    #[test]
    fn cells_outside_radius_stay_hidden() {
        let mut map = Map::new(8, 8);
        recompute_player_fog(&mut map, 0, &[(Cell::new(0, 0), 1)]);
        assert_eq!(map.fog_at(0, Cell::new(7, 7)), FogState::Hidden);
    }
}
