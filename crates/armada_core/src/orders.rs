//! Player orders.
//!
//! Orders are a closed sum type so the resolver and serializers match
//! exhaustively; adding a kind is a compile-time-checked exercise. Each
//! order carries the issuing player so ownership can be re-checked at
//! resolution time without trusting the producer.

use serde::{Deserialize, Serialize};

use crate::construction::BuildItem;
use crate::hex::HexCoord;
use crate::players::PlayerId;
use crate::structures::StructureId;
use crate::units::{UnitId, UpgradeKind};

/// One player order for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    /// Move a ship along a pre-planned path of adjacent navigable tiles.
    Move {
        /// Acting ship.
        unit: UnitId,
        /// Issuing player.
        owner: PlayerId,
        /// Full path, starting at the ship's current position.
        path: Vec<HexCoord>,
    },
    /// Consume a ship to found a shipyard on its harbor tile.
    DeployShipyard {
        /// Ship to consume.
        unit: UnitId,
        /// Issuing player.
        owner: PlayerId,
    },
    /// Queue a build job at a shipyard.
    BuildShip {
        /// Shipyard to build at.
        shipyard: StructureId,
        /// Issuing player.
        owner: PlayerId,
        /// What to build.
        item: BuildItem,
    },
    /// Repair a ship docked at or beside a friendly shipyard.
    RepairShip {
        /// Ship to repair.
        unit: UnitId,
        /// Issuing player.
        owner: PlayerId,
    },
    /// Purchase an upgrade for a ship.
    UpgradeShip {
        /// Ship to upgrade.
        unit: UnitId,
        /// Issuing player.
        owner: PlayerId,
        /// Which upgrade.
        upgrade: UpgradeKind,
    },
    /// Bombard an adjacent hostile structure.
    AttackShipyard {
        /// Attacking ship.
        unit: UnitId,
        /// Issuing player.
        owner: PlayerId,
        /// Target structure.
        structure: StructureId,
    },
}

impl Order {
    /// Fixed per-kind resolution priority; lower resolves first.
    ///
    /// Deploy < Build < Repair < Upgrade < Move; structure attacks resolve
    /// last, during the combat phase.
    #[must_use]
    pub const fn priority(&self) -> u8 {
        match self {
            Order::DeployShipyard { .. } => 0,
            Order::BuildShip { .. } => 1,
            Order::RepairShip { .. } => 2,
            Order::UpgradeShip { .. } => 3,
            Order::Move { .. } => 4,
            Order::AttackShipyard { .. } => 5,
        }
    }

    /// The issuing player.
    #[must_use]
    pub const fn owner(&self) -> PlayerId {
        match self {
            Order::Move { owner, .. }
            | Order::DeployShipyard { owner, .. }
            | Order::BuildShip { owner, .. }
            | Order::RepairShip { owner, .. }
            | Order::UpgradeShip { owner, .. }
            | Order::AttackShipyard { owner, .. } => *owner,
        }
    }

    /// Numeric id of the acting entity, for deterministic tie-breaking
    /// within one priority class.
    #[must_use]
    pub const fn actor_index(&self) -> u32 {
        match self {
            Order::Move { unit, .. }
            | Order::DeployShipyard { unit, .. }
            | Order::RepairShip { unit, .. }
            | Order::UpgradeShip { unit, .. }
            | Order::AttackShipyard { unit, .. } => unit.0,
            Order::BuildShip { shipyard, .. } => shipyard.0,
        }
    }

    /// Sort key making resolution order independent of submission order.
    #[must_use]
    pub const fn sort_key(&self) -> (u8, u32) {
        (self.priority(), self.actor_index())
    }
}

/// Sort a batch of orders into deterministic resolution order.
pub fn sort_orders(orders: &mut [Order]) {
    orders.sort_by_key(Order::sort_key);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_is_priority_then_actor() {
        let mut orders = vec![
            Order::Move {
                unit: UnitId(1),
                owner: PlayerId(1),
                path: vec![],
            },
            Order::BuildShip {
                shipyard: StructureId(2),
                owner: PlayerId(2),
                item: BuildItem::Ship,
            },
            Order::DeployShipyard {
                unit: UnitId(9),
                owner: PlayerId(1),
            },
            Order::BuildShip {
                shipyard: StructureId(1),
                owner: PlayerId(1),
                item: BuildItem::Ship,
            },
            Order::Move {
                unit: UnitId(3),
                owner: PlayerId(2),
                path: vec![],
            },
        ];
        sort_orders(&mut orders);

        let keys: Vec<(u8, u32)> = orders.iter().map(Order::sort_key).collect();
        assert_eq!(keys, vec![(0, 9), (1, 1), (1, 2), (4, 1), (4, 3)]);
    }

    #[test]
    fn sort_ignores_submission_order() {
        let a = Order::RepairShip {
            unit: UnitId(4),
            owner: PlayerId(1),
        };
        let b = Order::UpgradeShip {
            unit: UnitId(2),
            owner: PlayerId(2),
            upgrade: UpgradeKind::Sails,
        };

        let mut forward = vec![a.clone(), b.clone()];
        let mut backward = vec![b, a];
        sort_orders(&mut forward);
        sort_orders(&mut backward);
        assert_eq!(forward, backward);
    }
}
