//! Encounter state machine for movement conflicts between hostile units.
//!
//! The core invariant is that two hostile units never occupy one tile.
//! When movement resolution would violate it, the violation is converted
//! into an [`Encounter`]: a pending multi-party decision. Players answer
//! per unit; once no decision is missing the encounter resolves — or, for
//! a contested ENTRY, persists into the next turn and is re-offered.
//!
//! Encounters only track intent. Applying the outcome (moves, combat)
//! is the resolver's job.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::hex::HexCoord;
use crate::units::UnitId;

/// Unique identifier for an encounter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EncounterId(pub u32);

impl std::fmt::Display for EncounterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "encounter_{}", self.0)
    }
}

/// Shape of the conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncounterKind {
    /// Two hostile units attempting to swap tiles.
    Passing,
    /// Two or more units claiming one tile.
    Entry,
}

impl EncounterKind {
    /// Human-readable name, used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Passing => "PASSING",
            Self::Entry => "ENTRY",
        }
    }
}

/// A per-unit answer to an open encounter.
///
/// `Proceed` is only valid for PASSING encounters, `Yield` only for ENTRY.
/// An absent answer is the NONE state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncounterDecision {
    /// Allow the peaceful swap (PASSING only).
    Proceed,
    /// Give up the claim and stay at the previous position (ENTRY only).
    Yield,
    /// Hold the claim / cancel the swap and fight.
    Attack,
}

impl EncounterDecision {
    /// Name for error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Proceed => "PROCEED",
            Self::Yield => "YIELD",
            Self::Attack => "ATTACK",
        }
    }

    /// Whether this decision belongs to the given encounter family.
    #[must_use]
    pub const fn valid_for(self, kind: EncounterKind) -> bool {
        match (self, kind) {
            (Self::Proceed, EncounterKind::Passing)
            | (Self::Yield, EncounterKind::Entry)
            | (Self::Attack, _) => true,
            _ => false,
        }
    }
}

/// Where the conflict happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterSite {
    /// The single tile claimed by an ENTRY encounter.
    Tile(HexCoord),
    /// The two swapped tiles of a PASSING encounter, in coordinate order.
    Edge(HexCoord, HexCoord),
}

impl EncounterSite {
    /// The smaller coordinate of the site, used for deterministic ordering.
    #[must_use]
    pub const fn anchor(self) -> HexCoord {
        match self {
            Self::Tile(c) => c,
            Self::Edge(a, _) => a,
        }
    }
}

/// How a resolved encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterOutcome {
    /// PASSING: both proceeded, positions swapped.
    Swapped,
    /// ENTRY: a single attacker took the tile.
    TileTaken(UnitId),
    /// ENTRY: everyone yielded; nobody moved.
    AllYielded,
    /// A unit pressed its claim against a defender; combat replaced movement.
    CombatTriggered,
}

/// A pending conflict between hostile units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encounter {
    /// Stable identifier.
    pub id: EncounterId,
    /// Conflict shape.
    pub kind: EncounterKind,
    /// Turn the encounter was created.
    pub created_turn: u32,
    /// Conflict location.
    pub site: EncounterSite,
    /// Involved units in id order (2 for PASSING, >= 2 for ENTRY).
    pub units: Vec<UnitId>,
    /// Position of each involved unit when the encounter was created.
    pub previous_positions: BTreeMap<UnitId, HexCoord>,
    /// Decision per involved unit; `None` until the player answers.
    pub decisions: BTreeMap<UnitId, Option<EncounterDecision>>,
    /// ENTRY only: two or more units held their claim; the encounter
    /// carries over to the next turn.
    pub contested: bool,
    /// Set once the encounter is applied; resolved encounters leave
    /// active tracking.
    pub resolved: bool,
}

impl Encounter {
    /// Whether any involved unit has not answered yet.
    #[must_use]
    pub fn awaiting_choices(&self) -> bool {
        self.decisions.values().any(Option::is_none)
    }

    /// Units that chose ATTACK, in id order.
    #[must_use]
    pub fn attackers(&self) -> Vec<UnitId> {
        self.decisions
            .iter()
            .filter(|(_, d)| **d == Some(EncounterDecision::Attack))
            .map(|(u, _)| *u)
            .collect()
    }

    /// Record a unit's decision.
    ///
    /// # Errors
    ///
    /// Rejects units that are not party to the encounter and decisions of
    /// the wrong family for the encounter kind.
    pub fn record_decision(&mut self, unit: UnitId, decision: EncounterDecision) -> Result<()> {
        if !decision.valid_for(self.kind) {
            return Err(GameError::WrongDecisionKind {
                kind: self.kind.name(),
                decision: decision.name(),
            });
        }
        match self.decisions.get_mut(&unit) {
            Some(slot) => {
                *slot = Some(decision);
                Ok(())
            }
            None => Err(GameError::UnitNotInvolved {
                encounter: self.id,
                unit,
            }),
        }
    }

    /// Clear all decisions for the next turn's re-offer of a contested
    /// encounter.
    pub fn reoffer(&mut self) {
        for slot in self.decisions.values_mut() {
            *slot = None;
        }
        self.contested = false;
    }

    /// Deterministic ordering key: site anchor, kind, smallest unit id.
    #[must_use]
    pub fn ordering_key(&self) -> (HexCoord, u8, UnitId) {
        let kind = match self.kind {
            EncounterKind::Passing => 0,
            EncounterKind::Entry => 1,
        };
        let smallest = self.units.first().copied().unwrap_or(UnitId(u32::MAX));
        (self.site.anchor(), kind, smallest)
    }
}

/// Active encounters, keyed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncounterTracker {
    encounters: BTreeMap<EncounterId, Encounter>,
    next_id: u32,
}

impl EncounterTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            encounters: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Create a new awaiting encounter and return its id.
    ///
    /// `units` are sorted and deduplicated; every unit starts with no
    /// decision recorded.
    pub fn create(
        &mut self,
        kind: EncounterKind,
        site: EncounterSite,
        turn: u32,
        units_with_positions: &[(UnitId, HexCoord)],
    ) -> EncounterId {
        let id = EncounterId(self.next_id);
        self.next_id += 1;

        let mut units: Vec<UnitId> = units_with_positions.iter().map(|(u, _)| *u).collect();
        units.sort_unstable();
        units.dedup();

        let previous_positions: BTreeMap<UnitId, HexCoord> =
            units_with_positions.iter().copied().collect();
        let decisions: BTreeMap<UnitId, Option<EncounterDecision>> =
            units.iter().map(|u| (*u, None)).collect();

        self.encounters.insert(
            id,
            Encounter {
                id,
                kind,
                created_turn: turn,
                site,
                units,
                previous_positions,
                decisions,
                contested: false,
                resolved: false,
            },
        );
        id
    }

    /// Get an active encounter.
    #[must_use]
    pub fn get(&self, id: EncounterId) -> Option<&Encounter> {
        self.encounters.get(&id)
    }

    /// Get an active encounter mutably.
    pub fn get_mut(&mut self, id: EncounterId) -> Option<&mut Encounter> {
        self.encounters.get_mut(&id)
    }

    /// Remove a resolved encounter from active tracking.
    pub fn remove(&mut self, id: EncounterId) -> Option<Encounter> {
        self.encounters.remove(&id)
    }

    /// Ids of all open encounters, in stable resolution order
    /// (site anchor, kind, smallest involved unit id).
    #[must_use]
    pub fn open_in_order(&self) -> Vec<EncounterId> {
        let mut ids: Vec<(_, EncounterId)> = self
            .encounters
            .values()
            .filter(|e| !e.resolved)
            .map(|e| (e.ordering_key(), e.id))
            .collect();
        ids.sort();
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Whether a unit is party to any open encounter.
    #[must_use]
    pub fn unit_engaged(&self, unit: UnitId) -> bool {
        self.encounters
            .values()
            .any(|e| !e.resolved && e.units.contains(&unit))
    }

    /// Number of open encounters.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.encounters.values().filter(|e| !e.resolved).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_at(tracker: &mut EncounterTracker, tile: HexCoord, units: &[(UnitId, HexCoord)]) -> EncounterId {
        tracker.create(EncounterKind::Entry, EncounterSite::Tile(tile), 1, units)
    }

    #[test]
    fn new_encounter_awaits_everyone() {
        let mut tracker = EncounterTracker::new();
        let id = entry_at(
            &mut tracker,
            HexCoord::ORIGIN,
            &[
                (UnitId(2), HexCoord::new(1, 0)),
                (UnitId(1), HexCoord::new(0, 1)),
            ],
        );

        let e = tracker.get(id).unwrap();
        assert!(e.awaiting_choices());
        assert_eq!(e.units, vec![UnitId(1), UnitId(2)]); // sorted
        assert_eq!(
            e.previous_positions.get(&UnitId(2)),
            Some(&HexCoord::new(1, 0))
        );
    }

    #[test]
    fn decisions_compose_across_arrivals() {
        let mut tracker = EncounterTracker::new();
        let id = entry_at(
            &mut tracker,
            HexCoord::ORIGIN,
            &[
                (UnitId(1), HexCoord::new(1, 0)),
                (UnitId(2), HexCoord::new(0, 1)),
            ],
        );

        let e = tracker.get_mut(id).unwrap();
        e.record_decision(UnitId(1), EncounterDecision::Attack).unwrap();
        assert!(e.awaiting_choices());
        e.record_decision(UnitId(2), EncounterDecision::Yield).unwrap();
        assert!(!e.awaiting_choices());
        assert_eq!(e.attackers(), vec![UnitId(1)]);
    }

    #[test]
    fn outsider_decisions_rejected() {
        let mut tracker = EncounterTracker::new();
        let id = entry_at(
            &mut tracker,
            HexCoord::ORIGIN,
            &[
                (UnitId(1), HexCoord::new(1, 0)),
                (UnitId(2), HexCoord::new(0, 1)),
            ],
        );

        let err = tracker
            .get_mut(id)
            .unwrap()
            .record_decision(UnitId(7), EncounterDecision::Attack)
            .unwrap_err();
        assert!(matches!(err, GameError::UnitNotInvolved { .. }));
    }

    #[test]
    fn wrong_family_decision_rejected() {
        let mut tracker = EncounterTracker::new();
        let passing = tracker.create(
            EncounterKind::Passing,
            EncounterSite::Edge(HexCoord::ORIGIN, HexCoord::new(1, 0)),
            1,
            &[
                (UnitId(1), HexCoord::ORIGIN),
                (UnitId(2), HexCoord::new(1, 0)),
            ],
        );

        let e = tracker.get_mut(passing).unwrap();
        let err = e
            .record_decision(UnitId(1), EncounterDecision::Yield)
            .unwrap_err();
        assert!(matches!(err, GameError::WrongDecisionKind { .. }));
        // PROCEED is fine for PASSING.
        e.record_decision(UnitId(1), EncounterDecision::Proceed).unwrap();
    }

    #[test]
    fn reoffer_clears_decisions() {
        let mut tracker = EncounterTracker::new();
        let id = entry_at(
            &mut tracker,
            HexCoord::ORIGIN,
            &[
                (UnitId(1), HexCoord::new(1, 0)),
                (UnitId(2), HexCoord::new(0, 1)),
            ],
        );

        let e = tracker.get_mut(id).unwrap();
        e.record_decision(UnitId(1), EncounterDecision::Attack).unwrap();
        e.record_decision(UnitId(2), EncounterDecision::Attack).unwrap();
        e.contested = true;
        e.reoffer();
        assert!(e.awaiting_choices());
        assert!(!e.contested);
    }

    #[test]
    fn open_ordering_is_site_kind_then_unit() {
        let mut tracker = EncounterTracker::new();
        let b = entry_at(
            &mut tracker,
            HexCoord::new(1, 0),
            &[
                (UnitId(3), HexCoord::new(2, 0)),
                (UnitId(4), HexCoord::new(1, 1)),
            ],
        );
        let a = entry_at(
            &mut tracker,
            HexCoord::new(0, 0),
            &[
                (UnitId(5), HexCoord::new(0, 1)),
                (UnitId(6), HexCoord::new(-1, 0)),
            ],
        );

        assert_eq!(tracker.open_in_order(), vec![a, b]);
        assert!(tracker.unit_engaged(UnitId(4)));
        assert!(!tracker.unit_engaged(UnitId(9)));
    }
}
