//! # Armada Core
//!
//! Deterministic turn-resolution core for a simultaneous-turn naval
//! strategy game on a hex grid.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No network IO
//! - No ambient randomness (combat dice are explicitly seeded)
//! - Sorted-id iteration everywhere the order can matter
//!
//! Given a map seed, an initial state and a per-turn order batch, the
//! resolver produces exactly one ordered event log, byte-for-byte
//! reproducible. That separation enables:
//! - Lockstep multiplayer (identical resolution across clients)
//! - Headless AI harnesses
//! - Replay verification
//!
//! ## Crate Structure
//!
//! - [`hex`] - axial coordinates and directions
//! - [`map`] - tiles, the grid, seeded map generation
//! - [`pathfinding`] - A* over navigable hexes
//! - [`units`], [`structures`], [`players`] - entity stores
//! - [`construction`] - per-shipyard build queues
//! - [`orders`], [`events`] - the external boundary types
//! - [`validator`] - pure order admission checks
//! - [`combat`] - seeded dice resolution
//! - [`encounter`] - movement-conflict state machine
//! - [`resolver`] - the turn orchestrator
//! - [`state`] - the owning aggregate, hashing, snapshots
//! - [`replay`] - game recording and verification

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod config;
pub mod construction;
pub mod encounter;
pub mod error;
pub mod events;
pub mod hex;
pub mod map;
pub mod orders;
pub mod pathfinding;
pub mod players;
pub mod replay;
pub mod resolver;
pub mod state;
pub mod structures;
pub mod units;
pub mod validator;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat::{CombatOutcome, CombatResolver};
    pub use crate::config::RulesConfig;
    pub use crate::construction::{BuildItem, ConstructionJob, ConstructionState, JobId, JobStatus};
    pub use crate::encounter::{
        Encounter, EncounterDecision, EncounterId, EncounterKind, EncounterOutcome,
    };
    pub use crate::error::{GameError, Result};
    pub use crate::events::Event;
    pub use crate::hex::{Direction, HexCoord};
    pub use crate::map::{generate_map, GeneratedMap, HexGrid, MapConfig, Tile, TileKind};
    pub use crate::orders::Order;
    pub use crate::pathfinding::find_path;
    pub use crate::players::{Controller, Player, PlayerId, PlayerManager};
    pub use crate::replay::Replay;
    pub use crate::resolver::TurnResolver;
    pub use crate::state::GameState;
    pub use crate::structures::{Structure, StructureId, StructureKind, StructureManager};
    pub use crate::units::{Unit, UnitId, UnitKind, UnitManager, UpgradeKind};
    pub use crate::validator::{validate_order, RejectReason};
}
