//! Ship entities and their authoritative store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::RulesConfig;
use crate::hex::{Direction, HexCoord};
use crate::players::PlayerId;

/// Unique identifier for a unit, stable for the entity's lifetime.
///
/// Rendered `unit_N` in logs and events; ordered numerically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitId(pub u32);

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unit_{}", self.0)
    }
}

/// Classification of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitKind {
    /// A sailing ship — the only mobile unit in the game.
    #[default]
    Ship,
}

/// Repeatable or one-shot improvements purchased for a ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    /// +1 movement per turn.
    Sails,
    /// +1 structure damage per attack.
    Cannons,
    /// Raises max health (and with it, possibly the movement tier).
    MaxLife,
}

impl std::fmt::Display for UpgradeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sails => write!(f, "sails"),
            Self::Cannons => write!(f, "cannons"),
            Self::MaxLife => write!(f, "max_life"),
        }
    }
}

/// A ship on the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Stable identifier.
    pub id: UnitId,
    /// Owning player.
    pub owner: PlayerId,
    /// Current position; always a navigable tile.
    pub position: HexCoord,
    /// Unit classification.
    pub kind: UnitKind,
    /// Current health, `0..=max_health`.
    pub health: u32,
    /// Maximum health; drives the movement tier.
    pub max_health: u32,
    /// Movement steps left this turn; reset at turn start.
    pub movement_remaining: u32,
    /// Sails upgrades purchased.
    pub sails: u32,
    /// Cannons upgrades purchased.
    pub cannons: u32,
    /// Facing, recomputed on every move. Presentation-only.
    pub facing: Direction,
    /// Set while the unit is party to an unresolved encounter.
    pub in_combat: bool,
}

impl Unit {
    /// Per-turn movement capacity under the given rules.
    #[must_use]
    pub fn movement_capacity(&self, config: &RulesConfig) -> u32 {
        config.movement_capacity(self.max_health, self.sails)
    }

    /// Reset movement to full capacity (called at turn start).
    pub fn reset_movement(&mut self, config: &RulesConfig) {
        self.movement_remaining = self.movement_capacity(config);
    }

    /// Apply damage, saturating at zero health.
    pub fn apply_damage(&mut self, damage: u32) {
        self.health = self.health.saturating_sub(damage);
    }

    /// Restore health, capped at max health.
    pub fn heal(&mut self, amount: u32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Whether health has reached zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.health == 0
    }
}

/// Authoritative store of all living units.
///
/// Ids are monotonically increasing and never reused. Iteration for
/// resolution always goes through [`UnitManager::sorted_ids`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitManager {
    units: HashMap<UnitId, Unit>,
    next_id: u32,
}

impl UnitManager {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            units: HashMap::new(),
            next_id: 1,
        }
    }

    /// Create a ship for `owner` at `position` with rule-default stats.
    pub fn create_unit(
        &mut self,
        owner: PlayerId,
        position: HexCoord,
        config: &RulesConfig,
    ) -> UnitId {
        let id = UnitId(self.next_id);
        self.next_id += 1;

        let max_health = config.ship_base_health;
        let mut unit = Unit {
            id,
            owner,
            position,
            kind: UnitKind::Ship,
            health: max_health,
            max_health,
            movement_remaining: 0,
            sails: 0,
            cannons: 0,
            facing: Direction::East,
            in_combat: false,
        };
        unit.reset_movement(config);
        self.units.insert(id, unit);
        id
    }

    /// Get a unit by id.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Get a unit mutably by id.
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// The unit occupying a tile, if any.
    #[must_use]
    pub fn at_position(&self, position: HexCoord) -> Option<&Unit> {
        // Linear scan; entity counts are tens to low hundreds. Smallest id
        // wins so the answer is deterministic even in transient states.
        self.sorted_ids()
            .into_iter()
            .filter_map(|id| self.units.get(&id))
            .find(|u| u.position == position)
    }

    /// All units owned by `owner`, in id order.
    #[must_use]
    pub fn for_owner(&self, owner: PlayerId) -> Vec<&Unit> {
        self.sorted_ids()
            .into_iter()
            .filter_map(|id| self.units.get(&id))
            .filter(|u| u.owner == owner)
            .collect()
    }

    /// Move a unit and recompute its facing.
    ///
    /// Facing only changes when the step is to an adjacent tile; longer
    /// teleports (swaps) keep the previous facing.
    pub fn move_unit(&mut self, id: UnitId, new_position: HexCoord) -> bool {
        let Some(unit) = self.units.get_mut(&id) else {
            return false;
        };
        if let Some(direction) = unit.position.direction_to(new_position) {
            unit.facing = direction;
        }
        unit.position = new_position;
        true
    }

    /// Remove a unit (death or consumption).
    pub fn remove(&mut self, id: UnitId) -> Option<Unit> {
        self.units.remove(&id)
    }

    /// Whether a unit exists.
    #[must_use]
    pub fn contains(&self, id: UnitId) -> bool {
        self.units.contains_key(&id)
    }

    /// Number of living units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Sorted unit ids for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<UnitId> {
        let mut ids: Vec<_> = self.units.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over all units (not in deterministic order).
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }
}
