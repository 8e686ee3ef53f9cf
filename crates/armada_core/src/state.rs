//! The top-level game-state aggregate.
//!
//! One [`GameState`] owns every store for the duration of a session; the
//! resolver mutates it, everything else reads it. No store is reachable
//! except through the aggregate, so there are no cross-references that
//! could outlive it.
//!
//! # Determinism
//!
//! [`GameState::state_hash`] folds the entire state in sorted-id order.
//! Two sessions that applied the same order batches to the same initial
//! state produce identical hashes — the primary desync check for replays
//! and lockstep sync.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::config::RulesConfig;
use crate::construction::ConstructionState;
use crate::error::{GameError, Result};
use crate::map::HexGrid;
use crate::players::PlayerManager;
use crate::structures::StructureManager;
use crate::units::UnitManager;

/// All authoritative game state for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Numeric rules for this session.
    pub config: RulesConfig,
    /// The immutable map.
    pub grid: HexGrid,
    /// All living units.
    pub units: UnitManager,
    /// All standing structures.
    pub structures: StructureManager,
    /// All players.
    pub players: PlayerManager,
    /// All build queues.
    pub construction: ConstructionState,
    /// Completed turn count; the next turn to resolve.
    turn: u32,
}

impl GameState {
    /// Create a fresh state over a generated grid.
    #[must_use]
    pub fn new(grid: HexGrid, config: RulesConfig) -> Self {
        Self {
            config,
            grid,
            units: UnitManager::new(),
            structures: StructureManager::new(),
            players: PlayerManager::new(),
            construction: ConstructionState::new(),
            turn: 0,
        }
    }

    /// The current turn index.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Advance the turn counter. Called once by the resolver at the end of
    /// each resolved turn.
    pub fn advance_turn(&mut self) {
        self.turn += 1;
    }

    /// Hash of the full state, for desync detection.
    ///
    /// Everything is folded in sorted-id order so two identical states
    /// always produce the same hash regardless of map insertion history.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.turn.hash(&mut hasher);

        let unit_ids = self.units.sorted_ids();
        unit_ids.len().hash(&mut hasher);
        for id in unit_ids {
            if let Some(u) = self.units.get(id) {
                id.hash(&mut hasher);
                u.owner.hash(&mut hasher);
                u.position.hash(&mut hasher);
                u.health.hash(&mut hasher);
                u.max_health.hash(&mut hasher);
                u.movement_remaining.hash(&mut hasher);
                u.sails.hash(&mut hasher);
                u.cannons.hash(&mut hasher);
                u.facing.hash(&mut hasher);
                u.in_combat.hash(&mut hasher);
            }
        }

        let structure_ids = self.structures.sorted_ids();
        structure_ids.len().hash(&mut hasher);
        for id in structure_ids {
            if let Some(s) = self.structures.get(id) {
                id.hash(&mut hasher);
                s.owner.hash(&mut hasher);
                s.position.hash(&mut hasher);
                s.kind.hash(&mut hasher);
                s.tier.hash(&mut hasher);
                s.health.hash(&mut hasher);
            }
        }

        let player_ids = self.players.sorted_ids();
        player_ids.len().hash(&mut hasher);
        for id in player_ids {
            if let Some(p) = self.players.get(id) {
                id.hash(&mut hasher);
                p.gold.hash(&mut hasher);
                p.eliminated.hash(&mut hasher);
            }
        }

        let job_ids = self.construction.sorted_job_ids();
        job_ids.len().hash(&mut hasher);
        for id in job_ids {
            if let Some(j) = self.construction.job(id) {
                id.hash(&mut hasher);
                j.shipyard.hash(&mut hasher);
                j.owner.hash(&mut hasher);
                j.turns_remaining.hash(&mut hasher);
                j.status.hash(&mut hasher);
            }
        }

        hasher.finish()
    }

    /// Serialize the state for snapshots and replays.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize state: {e}")))
    }

    /// Deserialize a state snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize state: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::HexCoord;
    use crate::map::{Tile, TileKind};
    use crate::players::Controller;

    fn small_state() -> GameState {
        let mut grid = HexGrid::new();
        for q in -2..=2i32 {
            for r in (-2).max(-q - 2)..=2.min(-q + 2) {
                grid.insert(Tile::new(HexCoord::new(q, r), TileKind::Sea, None));
            }
        }
        GameState::new(grid, RulesConfig::default())
    }

    #[test]
    fn identical_histories_hash_identically() {
        let build = || {
            let mut state = small_state();
            let p = state
                .players
                .add_player("Anne", Controller::Human, 300);
            state.units.create_unit(p, HexCoord::ORIGIN, &state.config);
            state
        };
        assert_eq!(build().state_hash(), build().state_hash());
    }

    #[test]
    fn hash_changes_with_state() {
        let mut state = small_state();
        let p = state.players.add_player("Anne", Controller::Human, 300);
        let before = state.state_hash();

        state.units.create_unit(p, HexCoord::ORIGIN, &state.config);
        assert_ne!(state.state_hash(), before);
    }

    #[test]
    fn snapshot_roundtrip_preserves_hash() {
        let mut state = small_state();
        let p = state.players.add_player("Anne", Controller::Ai, 300);
        state.units.create_unit(p, HexCoord::new(1, 0), &state.config);
        state.advance_turn();

        let bytes = state.serialize().unwrap();
        let restored = GameState::deserialize(&bytes).unwrap();
        assert_eq!(restored.turn(), state.turn());
        assert_eq!(restored.state_hash(), state.state_hash());
    }
}
