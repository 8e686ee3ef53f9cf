//! The turn event log.
//!
//! Events are the sole artifact external consumers (animation, textual
//! log writers, network sync) see; each variant carries the turn number
//! and enough data to reconstruct the transition without re-deriving it.
//! The enum is closed and serde-serializable so a writer can emit JSON
//! lines without extra mapping.

use serde::{Deserialize, Serialize};

use crate::construction::{BuildItem, JobId};
use crate::encounter::{EncounterId, EncounterKind, EncounterOutcome};
use crate::hex::HexCoord;
use crate::players::PlayerId;
use crate::structures::StructureId;
use crate::units::{UnitId, UpgradeKind};
use crate::validator::RejectReason;

/// One resolved state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A unit moved to a new tile.
    UnitMoved {
        /// Turn of the transition.
        turn: u32,
        /// The moved unit.
        unit: UnitId,
        /// Position before the move.
        from: HexCoord,
        /// Position after the move.
        to: HexCoord,
    },
    /// Multiple units claimed one tile and nobody moved.
    UnitsCollided {
        /// Turn of the transition.
        turn: u32,
        /// The contested tile.
        tile: HexCoord,
        /// All claimants, in id order.
        units: Vec<UnitId>,
    },
    /// A unit was destroyed.
    UnitDestroyed {
        /// Turn of the transition.
        turn: u32,
        /// The destroyed unit.
        unit: UnitId,
        /// Its owner.
        owner: PlayerId,
    },
    /// A construction job finished and its ship entered play.
    ShipBuilt {
        /// Turn of the transition.
        turn: u32,
        /// The producing shipyard.
        shipyard: StructureId,
        /// The new ship.
        unit: UnitId,
        /// Its owner.
        owner: PlayerId,
        /// Spawn tile.
        position: HexCoord,
    },
    /// A ship was consumed to found a shipyard.
    ShipyardDeployed {
        /// Turn of the transition.
        turn: u32,
        /// The consumed ship.
        unit: UnitId,
        /// The new shipyard.
        structure: StructureId,
        /// Its owner.
        owner: PlayerId,
        /// The harbor tile.
        position: HexCoord,
    },
    /// A ship was repaired.
    ShipRepaired {
        /// Turn of the transition.
        turn: u32,
        /// The repaired ship.
        unit: UnitId,
        /// Health restored.
        amount: u32,
        /// Gold spent.
        cost: u32,
    },
    /// A ship bought an upgrade.
    ShipUpgraded {
        /// Turn of the transition.
        turn: u32,
        /// The upgraded ship.
        unit: UnitId,
        /// Which upgrade.
        upgrade: UpgradeKind,
        /// Gold spent.
        cost: u32,
    },
    /// Two hostile units fought.
    CombatOccurred {
        /// Turn of the transition.
        turn: u32,
        /// The attacking unit (rolls three dice).
        attacker: UnitId,
        /// The defending unit (rolls two dice).
        defender: UnitId,
        /// Attacker's rolls, as rolled.
        attacker_rolls: [u8; 3],
        /// Defender's rolls, as rolled.
        defender_rolls: [u8; 2],
        /// Damage dealt to the attacker.
        damage_to_attacker: u32,
        /// Damage dealt to the defender.
        damage_to_defender: u32,
    },
    /// Movement resolution found a conflict and opened an encounter.
    ConflictDetected {
        /// Turn of the transition.
        turn: u32,
        /// The new encounter.
        encounter: EncounterId,
        /// Its shape.
        kind: EncounterKind,
        /// Involved units, in id order.
        units: Vec<UnitId>,
    },
    /// An open encounter is waiting for player decisions.
    CollisionNeedsResolution {
        /// Turn of the transition.
        turn: u32,
        /// The waiting encounter.
        encounter: EncounterId,
    },
    /// An encounter resolved.
    CollisionResolved {
        /// Turn of the transition.
        turn: u32,
        /// The resolved encounter.
        encounter: EncounterId,
        /// How it ended.
        outcome: EncounterOutcome,
    },
    /// A job was queued at a shipyard.
    ConstructionQueued {
        /// Turn of the transition.
        turn: u32,
        /// The new job.
        job: JobId,
        /// Its shipyard.
        shipyard: StructureId,
        /// Its owner.
        owner: PlayerId,
        /// What it builds.
        item: BuildItem,
        /// Gold paid.
        cost: u32,
    },
    /// A building job advanced by one turn.
    ConstructionProgressed {
        /// Turn of the transition.
        turn: u32,
        /// The advancing job.
        job: JobId,
        /// Its shipyard.
        shipyard: StructureId,
        /// Turns left after the advance.
        turns_remaining: u32,
    },
    /// A job completed (the paired [`Event::ShipBuilt`] names the ship).
    ConstructionCompleted {
        /// Turn of the transition.
        turn: u32,
        /// The finished job.
        job: JobId,
        /// Its shipyard.
        shipyard: StructureId,
    },
    /// A job was cancelled.
    ConstructionCancelled {
        /// Turn of the transition.
        turn: u32,
        /// The cancelled job.
        job: JobId,
        /// Its shipyard.
        shipyard: StructureId,
        /// Gold refunded to the owner.
        refund: u32,
    },
    /// A structure took damage.
    StructureDamaged {
        /// Turn of the transition.
        turn: u32,
        /// The damaged structure.
        structure: StructureId,
        /// The bombarding unit.
        attacker: UnitId,
        /// Damage dealt.
        damage: u32,
    },
    /// A structure was destroyed.
    StructureDestroyed {
        /// Turn of the transition.
        turn: u32,
        /// The destroyed structure.
        structure: StructureId,
    },
    /// An order failed resolution-time validation and was skipped.
    OrderRejected {
        /// Turn of the transition.
        turn: u32,
        /// The issuing player.
        owner: PlayerId,
        /// Why the order was skipped.
        reason: RejectReason,
    },
    /// A player lost their last unit.
    PlayerEliminated {
        /// Turn of the transition.
        turn: u32,
        /// The eliminated player.
        player: PlayerId,
    },
    /// Exactly one active player remains.
    GameWon {
        /// Turn of the transition.
        turn: u32,
        /// The winner.
        player: PlayerId,
    },
}

impl Event {
    /// The turn this event belongs to.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        match self {
            Event::UnitMoved { turn, .. }
            | Event::UnitsCollided { turn, .. }
            | Event::UnitDestroyed { turn, .. }
            | Event::ShipBuilt { turn, .. }
            | Event::ShipyardDeployed { turn, .. }
            | Event::ShipRepaired { turn, .. }
            | Event::ShipUpgraded { turn, .. }
            | Event::CombatOccurred { turn, .. }
            | Event::ConflictDetected { turn, .. }
            | Event::CollisionNeedsResolution { turn, .. }
            | Event::CollisionResolved { turn, .. }
            | Event::ConstructionQueued { turn, .. }
            | Event::ConstructionProgressed { turn, .. }
            | Event::ConstructionCompleted { turn, .. }
            | Event::ConstructionCancelled { turn, .. }
            | Event::StructureDamaged { turn, .. }
            | Event::StructureDestroyed { turn, .. }
            | Event::OrderRejected { turn, .. }
            | Event::PlayerEliminated { turn, .. }
            | Event::GameWon { turn, .. } => *turn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_accessor_covers_variants() {
        let e = Event::UnitMoved {
            turn: 3,
            unit: UnitId(1),
            from: HexCoord::ORIGIN,
            to: HexCoord::new(1, 0),
        };
        assert_eq!(e.turn(), 3);

        let e = Event::GameWon {
            turn: 9,
            player: PlayerId(2),
        };
        assert_eq!(e.turn(), 9);
    }

    #[test]
    fn events_serialize_to_json() {
        let e = Event::CombatOccurred {
            turn: 4,
            attacker: UnitId(1),
            defender: UnitId(2),
            attacker_rolls: [6, 3, 1],
            defender_rolls: [5, 5],
            damage_to_attacker: 2,
            damage_to_defender: 2,
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("CombatOccurred"));
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
