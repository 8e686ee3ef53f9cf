//! A* pathfinding over navigable hexes.
//!
//! Step cost is 1 per tile and the heuristic is exact hex distance, so the
//! search is admissible and returns shortest paths. Equal-cost frontier
//! nodes are tie-broken by coordinate order: path shape is stable for a
//! fixed input, which order producers rely on for reproducibility.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::hex::HexCoord;
use crate::map::HexGrid;

/// A node in the A* open set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct AStarNode {
    coord: HexCoord,
    /// g_score + heuristic.
    f_score: u32,
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse for min-heap behavior.
        // Lower f_score = higher priority, ties broken by coordinate order.
        match other.f_score.cmp(&self.f_score) {
            Ordering::Equal => other.coord.cmp(&self.coord),
            ord => ord,
        }
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find a shortest navigable path from `start` to `goal`.
///
/// Returns the ordered coordinate sequence from `start` to `goal`
/// inclusive, or `None` if either endpoint is non-navigable or no path
/// exists within `max_distance` steps.
#[must_use]
pub fn find_path(
    grid: &HexGrid,
    start: HexCoord,
    goal: HexCoord,
    max_distance: u32,
) -> Option<Vec<HexCoord>> {
    if !grid.is_navigable(start) || !grid.is_navigable(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }
    if start.distance(goal) > max_distance {
        return None;
    }

    let mut open_set: BinaryHeap<AStarNode> = BinaryHeap::new();
    let mut came_from: HashMap<HexCoord, HexCoord> = HashMap::new();
    let mut g_score: HashMap<HexCoord, u32> = HashMap::new();

    g_score.insert(start, 0);
    open_set.push(AStarNode {
        coord: start,
        f_score: start.distance(goal),
    });

    while let Some(current) = open_set.pop() {
        if current.coord == goal {
            return Some(reconstruct_path(&came_from, goal));
        }

        let current_g = g_score.get(&current.coord).copied().unwrap_or(u32::MAX);
        if current_g >= max_distance {
            continue;
        }

        for neighbor in grid.navigable_neighbors(current.coord) {
            let tentative_g = current_g + 1;
            // Prune neighbors that cannot reach the goal within budget.
            if tentative_g + neighbor.distance(goal) > max_distance {
                continue;
            }

            let neighbor_g = g_score.get(&neighbor).copied().unwrap_or(u32::MAX);
            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.coord);
                g_score.insert(neighbor, tentative_g);
                open_set.push(AStarNode {
                    coord: neighbor,
                    f_score: tentative_g + neighbor.distance(goal),
                });
            }
        }
    }

    None
}

/// Reconstruct path from the came_from map.
fn reconstruct_path(came_from: &HashMap<HexCoord, HexCoord>, goal: HexCoord) -> Vec<HexCoord> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Tile, TileKind};

    /// All-sea hex disk of the given radius.
    fn sea_disk(radius: i32) -> HexGrid {
        let mut grid = HexGrid::new();
        for q in -radius..=radius {
            for r in (-radius).max(-q - radius)..=radius.min(-q + radius) {
                grid.insert(Tile::new(HexCoord::new(q, r), TileKind::Sea, None));
            }
        }
        grid
    }

    fn block(grid: &mut HexGrid, coord: HexCoord) {
        grid.insert(Tile::new(coord, TileKind::Land, Some(0)));
    }

    #[test]
    fn straight_path_has_distance_steps() {
        let grid = sea_disk(5);
        let start = HexCoord::new(-3, 0);
        let goal = HexCoord::new(3, 0);

        let path = find_path(&grid, start, goal, 10).unwrap();
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert_eq!(path.len() as u32 - 1, start.distance(goal));
    }

    #[test]
    fn path_steps_are_adjacent_and_navigable() {
        let mut grid = sea_disk(5);
        // Wall with a gap.
        for r in -3..=2 {
            block(&mut grid, HexCoord::new(0, r));
        }

        let path = find_path(&grid, HexCoord::new(-3, 1), HexCoord::new(3, -1), 12).unwrap();
        for pair in path.windows(2) {
            assert_eq!(pair[0].distance(pair[1]), 1);
        }
        for step in &path {
            assert!(grid.is_navigable(*step));
        }
    }

    #[test]
    fn no_path_when_walled_off() {
        let mut grid = sea_disk(3);
        let start = HexCoord::ORIGIN;
        for n in start.neighbors() {
            block(&mut grid, n);
        }
        assert!(find_path(&grid, start, HexCoord::new(3, 0), 10).is_none());
    }

    #[test]
    fn non_navigable_endpoints_rejected() {
        let mut grid = sea_disk(3);
        block(&mut grid, HexCoord::new(1, 0));

        assert!(find_path(&grid, HexCoord::new(1, 0), HexCoord::ORIGIN, 5).is_none());
        assert!(find_path(&grid, HexCoord::ORIGIN, HexCoord::new(1, 0), 5).is_none());
        // Off-grid goal.
        assert!(find_path(&grid, HexCoord::ORIGIN, HexCoord::new(9, 9), 50).is_none());
    }

    #[test]
    fn max_distance_cuts_off() {
        let grid = sea_disk(6);
        let start = HexCoord::new(-4, 0);
        let goal = HexCoord::new(4, 0);

        assert!(find_path(&grid, start, goal, 7).is_none());
        assert!(find_path(&grid, start, goal, 8).is_some());
    }

    #[test]
    fn detour_respects_budget() {
        let mut grid = sea_disk(4);
        // Wall forcing a detour longer than the crow-flies distance.
        for r in -2..=2 {
            block(&mut grid, HexCoord::new(0, r));
        }
        let start = HexCoord::new(-2, 0);
        let goal = HexCoord::new(2, 0);
        assert_eq!(start.distance(goal), 4);

        let path = find_path(&grid, start, goal, 12).unwrap();
        assert!(path.len() as u32 - 1 > 4);
        assert!(find_path(&grid, start, goal, 4).is_none());
    }

    #[test]
    fn path_to_same_tile() {
        let grid = sea_disk(2);
        let path = find_path(&grid, HexCoord::ORIGIN, HexCoord::ORIGIN, 0).unwrap();
        assert_eq!(path, vec![HexCoord::ORIGIN]);
    }

    #[test]
    fn path_shape_is_stable() {
        let grid = sea_disk(6);
        let start = HexCoord::new(-4, 2);
        let goal = HexCoord::new(4, -2);

        let a = find_path(&grid, start, goal, 20).unwrap();
        let b = find_path(&grid, start, goal, 20).unwrap();
        let c = find_path(&grid, start, goal, 20).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }
}
