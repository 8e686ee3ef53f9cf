//! Test fixtures and helpers.
//!
//! Pre-built grids and game states for consistent testing across crates.

use armada_core::config::RulesConfig;
use armada_core::hex::HexCoord;
use armada_core::map::{HexGrid, Tile, TileKind};
use armada_core::players::{Controller, PlayerId};
use armada_core::state::GameState;
use armada_core::structures::StructureKind;
use armada_core::units::UnitId;

/// An all-sea hex disk of the given radius.
#[must_use]
pub fn sea_disk(radius: i32) -> HexGrid {
    let mut grid = HexGrid::new();
    for q in -radius..=radius {
        for r in (-radius).max(-q - radius)..=radius.min(-q + radius) {
            grid.insert(Tile::new(HexCoord::new(q, r), TileKind::Sea, None));
        }
    }
    grid
}

/// A two-player duel scenario.
pub struct Duel {
    /// The assembled state.
    pub state: GameState,
    /// First player.
    pub p1: PlayerId,
    /// Second player.
    pub p2: PlayerId,
    /// First player's ship, west of the origin.
    pub ship1: UnitId,
    /// Second player's ship, east of the origin.
    pub ship2: UnitId,
}

/// Build a two-player duel on an all-sea disk: one ship each, facing off
/// across the origin at the given separation.
#[must_use]
pub fn duel(radius: i32, separation: i32) -> Duel {
    let mut state = GameState::new(sea_disk(radius), RulesConfig::default());
    let p1 = state.players.add_player("Anne", Controller::Human, 300);
    let p2 = state.players.add_player("Bart", Controller::Ai, 300);
    let ship1 = state
        .units
        .create_unit(p1, HexCoord::new(-separation, 0), &state.config);
    let ship2 = state
        .units
        .create_unit(p2, HexCoord::new(separation, 0), &state.config);
    Duel {
        state,
        p1,
        p2,
        ship1,
        ship2,
    }
}

/// Add a harbor tile and a shipyard for `owner` at `position`.
pub fn add_shipyard(
    state: &mut GameState,
    owner: PlayerId,
    position: HexCoord,
) -> armada_core::structures::StructureId {
    state
        .grid
        .insert(Tile::new(position, TileKind::Harbor, Some(0)));
    let max_health = state.config.structure_max_health(StructureKind::Shipyard);
    state
        .structures
        .create_structure(Some(owner), position, StructureKind::Shipyard, max_health)
}
