//! Structure entities and their authoritative store.
//!
//! At most one structure per tile. That invariant is enforced by the
//! validators, not by the store — the store will happily hold whatever the
//! resolver puts in it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::hex::HexCoord;
use crate::players::PlayerId;

/// Unique identifier for a structure.
///
/// Rendered `structure_N` in logs and events; ordered numerically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct StructureId(pub u32);

impl std::fmt::Display for StructureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "structure_{}", self.0)
    }
}

/// Classification of a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    /// Player-deployed shipbuilding dock.
    Shipyard,
    /// Upgraded shipyard.
    NavalYard,
    /// Fortified yard, heaviest structure.
    NavalFortress,
    /// Neutral pirate base.
    PirateCove,
}

impl StructureKind {
    /// Whether this structure can build and repair ships.
    #[must_use]
    pub const fn is_shipyard_class(self) -> bool {
        matches!(self, Self::Shipyard | Self::NavalYard | Self::NavalFortress)
    }
}

/// A structure on the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    /// Stable identifier.
    pub id: StructureId,
    /// Owning player; `None` = neutral.
    pub owner: Option<PlayerId>,
    /// Tile the structure occupies.
    pub position: HexCoord,
    /// Structure classification.
    pub kind: StructureKind,
    /// Upgrade tier.
    pub tier: u8,
    /// Current health.
    pub health: u32,
    /// Maximum health, fixed by kind.
    pub max_health: u32,
}

impl Structure {
    /// Apply damage, saturating at zero health.
    pub fn apply_damage(&mut self, damage: u32) {
        self.health = self.health.saturating_sub(damage);
    }

    /// Whether health has reached zero.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.health == 0
    }
}

/// Authoritative store of all standing structures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructureManager {
    structures: HashMap<StructureId, Structure>,
    next_id: u32,
}

impl StructureManager {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            structures: HashMap::new(),
            next_id: 1,
        }
    }

    /// Create a structure. `max_health` comes from the rules config.
    pub fn create_structure(
        &mut self,
        owner: Option<PlayerId>,
        position: HexCoord,
        kind: StructureKind,
        max_health: u32,
    ) -> StructureId {
        let id = StructureId(self.next_id);
        self.next_id += 1;
        self.structures.insert(
            id,
            Structure {
                id,
                owner,
                position,
                kind,
                tier: 1,
                health: max_health,
                max_health,
            },
        );
        id
    }

    /// Get a structure by id.
    #[must_use]
    pub fn get(&self, id: StructureId) -> Option<&Structure> {
        self.structures.get(&id)
    }

    /// Get a structure mutably by id.
    pub fn get_mut(&mut self, id: StructureId) -> Option<&mut Structure> {
        self.structures.get_mut(&id)
    }

    /// The structure on a tile, if any.
    #[must_use]
    pub fn at_position(&self, position: HexCoord) -> Option<&Structure> {
        self.sorted_ids()
            .into_iter()
            .filter_map(|id| self.structures.get(&id))
            .find(|s| s.position == position)
    }

    /// All structures owned by `owner`, in id order.
    #[must_use]
    pub fn for_owner(&self, owner: PlayerId) -> Vec<&Structure> {
        self.sorted_ids()
            .into_iter()
            .filter_map(|id| self.structures.get(&id))
            .filter(|s| s.owner == Some(owner))
            .collect()
    }

    /// Remove a structure.
    pub fn remove(&mut self, id: StructureId) -> Option<Structure> {
        self.structures.remove(&id)
    }

    /// Whether a structure exists.
    #[must_use]
    pub fn contains(&self, id: StructureId) -> bool {
        self.structures.contains_key(&id)
    }

    /// Number of standing structures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.structures.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    /// Sorted structure ids for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<StructureId> {
        let mut ids: Vec<_> = self.structures.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over all structures (not in deterministic order).
    pub fn iter(&self) -> impl Iterator<Item = &Structure> {
        self.structures.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipyard_classes() {
        assert!(StructureKind::Shipyard.is_shipyard_class());
        assert!(StructureKind::NavalYard.is_shipyard_class());
        assert!(StructureKind::NavalFortress.is_shipyard_class());
        assert!(!StructureKind::PirateCove.is_shipyard_class());
    }

    #[test]
    fn create_and_lookup() {
        let mut structures = StructureManager::new();
        let id = structures.create_structure(
            Some(PlayerId(1)),
            HexCoord::new(2, -1),
            StructureKind::Shipyard,
            20,
        );

        assert_eq!(id.to_string(), "structure_1");
        let s = structures.get(id).unwrap();
        assert_eq!(s.health, 20);
        assert_eq!(s.tier, 1);
        assert_eq!(
            structures.at_position(HexCoord::new(2, -1)).unwrap().id,
            id
        );
        assert!(structures.at_position(HexCoord::ORIGIN).is_none());
    }

    #[test]
    fn neutral_structures_have_no_owner() {
        let mut structures = StructureManager::new();
        let id =
            structures.create_structure(None, HexCoord::ORIGIN, StructureKind::PirateCove, 25);
        assert_eq!(structures.get(id).unwrap().owner, None);
        assert!(structures.for_owner(PlayerId(1)).is_empty());
    }

    #[test]
    fn damage_destroys_at_zero() {
        let mut structures = StructureManager::new();
        let id = structures.create_structure(
            Some(PlayerId(1)),
            HexCoord::ORIGIN,
            StructureKind::Shipyard,
            20,
        );
        let s = structures.get_mut(id).unwrap();
        s.apply_damage(19);
        assert!(!s.is_destroyed());
        s.apply_damage(5);
        assert!(s.is_destroyed());
    }
}
