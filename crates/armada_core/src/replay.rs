//! Game recording for deterministic re-runs.
//!
//! A replay stores the combat seed, a snapshot of the initial state, and
//! every per-turn order batch plus the encounter decisions made between
//! turns. Re-running the batches against the restored snapshot with the
//! same seed reproduces the identical event log and final state hash —
//! which [`Replay::verify`] checks.
//!
//! This is the recording side only; parsing textual log files and
//! playback UI belong to external tooling.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::encounter::{EncounterDecision, EncounterId};
use crate::error::{GameError, Result};
use crate::orders::Order;
use crate::resolver::TurnResolver;
use crate::state::GameState;
use crate::units::UnitId;

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// One encounter decision made between turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// The encounter answered.
    pub encounter: EncounterId,
    /// The answering unit.
    pub unit: UnitId,
    /// The answer.
    pub decision: EncounterDecision,
}

/// One turn's recorded input: the order batch, then the decisions that
/// arrived before the next turn, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TurnRecord {
    /// Orders resolved this turn.
    pub orders: Vec<Order>,
    /// Decisions recorded after this turn resolved.
    pub decisions: Vec<DecisionRecord>,
}

/// Complete recording of one game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Scenario identifier or name.
    pub scenario_id: String,
    /// Combat seed used for the game.
    pub seed: u64,
    /// Serialized initial game state.
    pub initial_state: Vec<u8>,
    /// Per-turn inputs, in turn order.
    pub turns: Vec<TurnRecord>,
    /// Final state hash for verification.
    pub final_hash: u64,
}

impl Replay {
    /// Create a replay from a game's initial state.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial state cannot be serialized.
    pub fn new(scenario_id: impl Into<String>, seed: u64, initial_state: &GameState) -> Result<Self> {
        Ok(Self {
            version: REPLAY_VERSION,
            scenario_id: scenario_id.into(),
            seed,
            initial_state: initial_state.serialize()?,
            turns: Vec::new(),
            final_hash: 0,
        })
    }

    /// Record a turn's order batch.
    pub fn record_turn(&mut self, orders: Vec<Order>) {
        self.turns.push(TurnRecord {
            orders,
            decisions: Vec::new(),
        });
    }

    /// Record an encounter decision made after the last recorded turn.
    pub fn record_decision(&mut self, encounter: EncounterId, unit: UnitId, decision: EncounterDecision) {
        if let Some(turn) = self.turns.last_mut() {
            turn.decisions.push(DecisionRecord {
                encounter,
                unit,
                decision,
            });
        }
    }

    /// Finalize with the end-of-game state hash.
    pub fn finalize(&mut self, final_hash: u64) {
        self.final_hash = final_hash;
    }

    /// Restore the initial game state.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be deserialized.
    pub fn restore_initial_state(&self) -> Result<GameState> {
        GameState::deserialize(&self.initial_state)
    }

    /// Re-run the recorded game and check the final hash matches.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if the re-run diverges from the
    /// recorded final hash, or if any recorded decision no longer applies.
    pub fn verify(&self) -> Result<()> {
        let mut state = self.restore_initial_state()?;
        let mut resolver = TurnResolver::new(self.seed);

        for record in &self.turns {
            resolver.resolve_turn(&mut state, &record.orders);
            for d in &record.decisions {
                resolver.record_decision(&mut state, d.encounter, d.unit, d.decision)?;
            }
        }

        let replayed = state.state_hash();
        if replayed != self.final_hash {
            return Err(GameError::InvalidState(format!(
                "replay diverged: recorded hash {}, replayed hash {replayed}",
                self.final_hash
            )));
        }
        Ok(())
    }

    /// Save the replay to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize replay: {e}")))?;
        std::fs::write(path.as_ref(), bytes)
            .map_err(|e| GameError::InvalidState(format!("Failed to write replay file: {e}")))?;
        Ok(())
    }

    /// Load a replay from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails, or on a
    /// version mismatch.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| GameError::InvalidState(format!("Failed to read replay file: {e}")))?;
        let replay: Self = bincode::deserialize(&bytes)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize replay: {e}")))?;

        if replay.version != REPLAY_VERSION {
            return Err(GameError::InvalidState(format!(
                "Replay version mismatch: expected {REPLAY_VERSION}, got {}",
                replay.version
            )));
        }
        Ok(replay)
    }

    /// Number of recorded turns.
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::hex::HexCoord;
    use crate::map::{HexGrid, Tile, TileKind};
    use crate::players::Controller;

    fn fixture() -> (GameState, Vec<Order>) {
        let mut grid = HexGrid::new();
        for q in -3..=3i32 {
            for r in (-3).max(-q - 3)..=3.min(-q + 3) {
                grid.insert(Tile::new(HexCoord::new(q, r), TileKind::Sea, None));
            }
        }
        let mut state = GameState::new(grid, RulesConfig::default());
        let p1 = state.players.add_player("Anne", Controller::Human, 300);
        let p2 = state.players.add_player("Bart", Controller::Ai, 300);
        let a = state.units.create_unit(p1, HexCoord::new(-2, 0), &state.config);
        let _b = state.units.create_unit(p2, HexCoord::new(2, 0), &state.config);

        let orders = vec![Order::Move {
            unit: a,
            owner: p1,
            path: vec![HexCoord::new(-2, 0), HexCoord::new(-1, 0)],
        }];
        (state, orders)
    }

    #[test]
    fn verify_accepts_a_faithful_recording() {
        let (mut state, orders) = fixture();
        let mut replay = Replay::new("duel", 42, &state).unwrap();
        let mut resolver = TurnResolver::new(42);

        replay.record_turn(orders.clone());
        resolver.resolve_turn(&mut state, &orders);
        replay.record_turn(Vec::new());
        resolver.resolve_turn(&mut state, &[]);
        replay.finalize(state.state_hash());

        assert_eq!(replay.turn_count(), 2);
        replay.verify().unwrap();
    }

    #[test]
    fn verify_rejects_a_tampered_hash() {
        let (mut state, orders) = fixture();
        let mut replay = Replay::new("duel", 42, &state).unwrap();
        let mut resolver = TurnResolver::new(42);

        replay.record_turn(orders.clone());
        resolver.resolve_turn(&mut state, &orders);
        replay.finalize(state.state_hash() ^ 1);

        assert!(replay.verify().is_err());
    }

    #[test]
    fn restored_state_matches_original() {
        let (state, _) = fixture();
        let replay = Replay::new("duel", 7, &state).unwrap();
        let restored = replay.restore_initial_state().unwrap();
        assert_eq!(restored.state_hash(), state.state_hash());
    }
}
