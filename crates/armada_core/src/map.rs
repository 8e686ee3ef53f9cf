//! Hex map model and seeded archipelago generation.
//!
//! The grid is generated once per game session and never mutated afterward.
//! Structure occupancy is tracked by the structure store, not on tiles.
//!
//! Generation is fully deterministic: a [`MapConfig`] with a fixed seed
//! always produces the identical grid, so clients can regenerate the map
//! from the seed instead of shipping tile data.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::hex::{Direction, HexCoord};

/// Identifier for an island on the map.
pub type IslandId = u16;

/// Terrain classification of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileKind {
    /// Open water, navigable.
    #[default]
    Sea,
    /// Island interior, not navigable.
    Land,
    /// Coastal anchorage, navigable; structures deploy here.
    Harbor,
}

impl TileKind {
    /// Whether ships can occupy and traverse this tile.
    #[must_use]
    pub const fn is_navigable(self) -> bool {
        matches!(self, Self::Sea | Self::Harbor)
    }
}

/// A single map tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Position of this tile.
    pub coord: HexCoord,
    /// Terrain kind.
    pub kind: TileKind,
    /// Island this tile belongs to (`None` = open sea).
    pub island: Option<IslandId>,
}

impl Tile {
    /// Create a new tile.
    #[must_use]
    pub const fn new(coord: HexCoord, kind: TileKind, island: Option<IslandId>) -> Self {
        Self {
            coord,
            kind,
            island,
        }
    }

    /// Whether ships can occupy this tile.
    #[must_use]
    pub const fn is_navigable(&self) -> bool {
        self.kind.is_navigable()
    }
}

/// Static spatial index of tiles keyed by axial coordinate.
///
/// Immutable after generation. Queries never allocate except
/// [`HexGrid::navigable_neighbors`], whose result order follows
/// [`Direction::ALL`] for determinism.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HexGrid {
    tiles: HashMap<HexCoord, Tile>,
}

impl HexGrid {
    /// Create an empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tiles: HashMap::new(),
        }
    }

    /// Insert a tile, replacing any tile already at its coordinate.
    pub fn insert(&mut self, tile: Tile) {
        self.tiles.insert(tile.coord, tile);
    }

    /// Look up the tile at a coordinate.
    #[must_use]
    pub fn tile(&self, coord: HexCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    /// Whether a coordinate holds a navigable tile.
    #[must_use]
    pub fn is_navigable(&self, coord: HexCoord) -> bool {
        self.tiles.get(&coord).is_some_and(Tile::is_navigable)
    }

    /// Navigable neighbors of a coordinate, in fixed direction order.
    #[must_use]
    pub fn navigable_neighbors(&self, coord: HexCoord) -> Vec<HexCoord> {
        Direction::ALL
            .into_iter()
            .map(|d| coord.neighbor(d))
            .filter(|c| self.is_navigable(*c))
            .collect()
    }

    /// Number of tiles on the grid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the grid has no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// All coordinates in deterministic (sorted) order.
    #[must_use]
    pub fn sorted_coords(&self) -> Vec<HexCoord> {
        let mut coords: Vec<_> = self.tiles.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// Iterate over all tiles (not in deterministic order).
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }
}

/// Parameters for map generation.
///
/// These are an external input to grid construction, not part of the
/// resolution core proper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Approximate number of sea tiles on the finished map.
    pub sea_tiles: u32,
    /// Number of islands to grow.
    pub island_count: u32,
    /// Minimum tiles per island.
    pub island_size_min: u32,
    /// Maximum tiles per island.
    pub island_size_max: u32,
    /// Number of players to place starting harbors for.
    pub player_count: u32,
    /// Random seed for deterministic generation.
    pub seed: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            sea_tiles: 330,
            island_count: 5,
            island_size_min: 3,
            island_size_max: 8,
            player_count: 2,
            seed: 12345,
        }
    }
}

impl MapConfig {
    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the player count.
    #[must_use]
    pub const fn with_players(mut self, players: u32) -> Self {
        self.player_count = players;
        self
    }

    /// Radius of the hex disk holding at least `sea_tiles` tiles.
    #[must_use]
    pub fn disk_radius(&self) -> i32 {
        let mut radius = 1i32;
        while 1 + 3 * radius * (radius + 1) < self.sea_tiles as i32 {
            radius += 1;
        }
        radius
    }
}

/// Generated map data: the grid plus one starting harbor per player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedMap {
    /// Configuration used.
    pub config: MapConfig,
    /// The finished grid.
    pub grid: HexGrid,
    /// One starting harbor per player, maximally separated.
    pub starting_harbors: Vec<HexCoord>,
}

/// Generate a map with the given configuration.
///
/// The map is a hex disk of sea with `island_count` islands grown by
/// seeded random walk; each island gets one harbor tile on its coast, and
/// `player_count` of those harbors become starting positions.
#[must_use]
pub fn generate_map(config: MapConfig) -> GeneratedMap {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let radius = config.disk_radius();

    // Sea disk around the origin.
    let mut grid = HexGrid::new();
    for q in -radius..=radius {
        for r in (-radius).max(-q - radius)..=radius.min(-q + radius) {
            let coord = HexCoord::new(q, r);
            grid.insert(Tile::new(coord, TileKind::Sea, None));
        }
    }

    // Grow islands from random interior seeds. Interior means at least two
    // tiles from the rim so every island keeps a sea ring around it.
    let interior: Vec<HexCoord> = grid
        .sorted_coords()
        .into_iter()
        .filter(|c| c.distance(HexCoord::ORIGIN) + 2 <= radius as u32)
        .collect();

    for island in 0..config.island_count {
        let island_id = island as IslandId;
        let Some(seed_coord) = pick_island_seed(&grid, &interior, &mut rng) else {
            tracing::debug!(island = island_id, "no room left for island seed");
            continue;
        };

        let target = rng.gen_range(config.island_size_min..=config.island_size_max.max(config.island_size_min));
        grow_island(&mut grid, seed_coord, island_id, target, radius, &mut rng);
    }

    // One harbor per island: the smallest-coordinate sea tile touching it.
    let mut harbors: Vec<HexCoord> = Vec::new();
    for island in 0..config.island_count as IslandId {
        if let Some(coord) = harbor_site(&grid, island) {
            if let Some(tile) = grid.tiles.get_mut(&coord) {
                tile.kind = TileKind::Harbor;
                tile.island = Some(island);
                harbors.push(coord);
            }
        }
    }
    harbors.sort_unstable();

    let starting_harbors = pick_starting_harbors(&harbors, config.player_count as usize);

    GeneratedMap {
        config,
        grid,
        starting_harbors,
    }
}

/// Pick a sea tile for a new island seed, keeping one sea tile between islands.
fn pick_island_seed(grid: &HexGrid, interior: &[HexCoord], rng: &mut ChaCha8Rng) -> Option<HexCoord> {
    let open: Vec<HexCoord> = interior
        .iter()
        .copied()
        .filter(|c| {
            grid.tile(*c).is_some_and(|t| t.kind == TileKind::Sea)
                && c.neighbors()
                    .into_iter()
                    .all(|n| grid.tile(n).map_or(true, |t| t.kind == TileKind::Sea))
        })
        .collect();
    if open.is_empty() {
        return None;
    }
    Some(open[rng.gen_range(0..open.len())])
}

/// Convert up to `target` sea tiles to land by random walk from `seed_coord`.
fn grow_island(
    grid: &mut HexGrid,
    seed_coord: HexCoord,
    island_id: IslandId,
    target: u32,
    radius: i32,
    rng: &mut ChaCha8Rng,
) {
    let mut frontier = vec![seed_coord];
    let mut grown = 0u32;

    while grown < target && !frontier.is_empty() {
        let idx = rng.gen_range(0..frontier.len());
        let coord = frontier.swap_remove(idx);

        let convertible = grid
            .tile(coord)
            .is_some_and(|t| t.kind == TileKind::Sea)
            && coord.distance(HexCoord::ORIGIN) + 1 <= radius as u32
            && coord.neighbors().into_iter().all(|n| {
                grid.tile(n)
                    .map_or(true, |t| t.kind == TileKind::Sea || t.island == Some(island_id))
            });
        if !convertible {
            continue;
        }

        grid.insert(Tile::new(coord, TileKind::Land, Some(island_id)));
        grown += 1;

        let mut next: Vec<HexCoord> = coord
            .neighbors()
            .into_iter()
            .filter(|n| grid.tile(*n).is_some_and(|t| t.kind == TileKind::Sea))
            .collect();
        next.sort_unstable();
        frontier.extend(next);
    }
}

/// The smallest-coordinate sea tile adjacent to the given island's land.
fn harbor_site(grid: &HexGrid, island: IslandId) -> Option<HexCoord> {
    grid.sorted_coords().into_iter().find(|c| {
        grid.tile(*c).is_some_and(|t| t.kind == TileKind::Sea)
            && c.neighbors().into_iter().any(|n| {
                grid.tile(n)
                    .is_some_and(|t| t.kind == TileKind::Land && t.island == Some(island))
            })
    })
}

/// Greedy max-min-distance selection of `count` starting harbors.
fn pick_starting_harbors(harbors: &[HexCoord], count: usize) -> Vec<HexCoord> {
    if harbors.is_empty() || count == 0 {
        return Vec::new();
    }

    // Anchor on the harbor furthest from the origin; ties break by Ord.
    let first = harbors
        .iter()
        .copied()
        .max_by_key(|c| (c.distance(HexCoord::ORIGIN), *c))
        .expect("non-empty harbor list");

    let mut chosen = vec![first];
    while chosen.len() < count {
        let next = harbors
            .iter()
            .copied()
            .filter(|c| !chosen.contains(c))
            .max_by_key(|c| {
                let min_dist = chosen.iter().map(|s| s.distance(*c)).min().unwrap_or(0);
                (min_dist, *c)
            });
        match next {
            Some(c) => chosen.push(c),
            None => break,
        }
    }
    chosen
}
