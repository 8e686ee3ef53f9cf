//! Data-driven rules configuration.
//!
//! Every tunable number in the core lives here: costs, build times, health
//! pools, movement tiers, refund rates. Consumers take the config by
//! reference — there are no global constants for game rules, so a scenario
//! can swap in different rules without recompiling.
//!
//! The config is plain serde data and loads from RON, matching the
//! data-file format used for scenario definitions.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::structures::StructureKind;
use crate::units::UpgradeKind;

/// Numeric rules for a game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Gold each player starts with.
    pub starting_gold: u32,
    /// Gold cost to queue one ship.
    pub ship_cost: u32,
    /// Turns from queue head promotion to completion for one ship.
    pub ship_build_turns: u32,
    /// Max health of a freshly built ship.
    pub ship_base_health: u32,
    /// Gold cost to deploy a ship as a shipyard (the ship is consumed).
    pub deploy_cost: u32,
    /// Gold cost of one repair order.
    pub repair_cost: u32,
    /// Health restored by one repair order (capped at max health).
    pub repair_amount: u32,
    /// Gold cost of a sails upgrade.
    pub sails_cost: u32,
    /// Gold cost of a cannons upgrade.
    pub cannons_cost: u32,
    /// Gold cost of a max-life upgrade.
    pub max_life_cost: u32,
    /// Max-health gained per max-life upgrade.
    pub max_life_amount: u32,
    /// Maximum count for each repeatable upgrade (sails, cannons).
    pub upgrade_limit: u32,
    /// Maximum jobs queued per shipyard.
    pub queue_capacity: usize,
    /// Percentage of cost paid refunded on cancellation (0-100).
    pub refund_percent: u32,
    /// Max health at or above which a ship is tier 2.
    pub tier2_health: u32,
    /// Max health at or above which a ship is tier 3.
    pub tier3_health: u32,
    /// Movement capacity at tier 1 (before sails).
    pub base_movement: u32,
    /// Base damage dealt to structures by an attack order, before cannons.
    pub structure_attack_damage: u32,
    /// Max health of a shipyard.
    pub shipyard_health: u32,
    /// Max health of a naval yard.
    pub naval_yard_health: u32,
    /// Max health of a naval fortress.
    pub naval_fortress_health: u32,
    /// Max health of a pirate cove.
    pub pirate_cove_health: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            starting_gold: 300,
            ship_cost: 100,
            ship_build_turns: 3,
            ship_base_health: 10,
            deploy_cost: 100,
            repair_cost: 20,
            repair_amount: 4,
            sails_cost: 50,
            cannons_cost: 50,
            max_life_cost: 75,
            max_life_amount: 4,
            upgrade_limit: 3,
            queue_capacity: 5,
            refund_percent: 50,
            tier2_health: 14,
            tier3_health: 18,
            base_movement: 2,
            structure_attack_damage: 2,
            shipyard_health: 20,
            naval_yard_health: 30,
            naval_fortress_health: 40,
            pirate_cove_health: 25,
        }
    }
}

impl RulesConfig {
    /// Parse a config from a RON string.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ConfigParse`] if the string is not valid RON
    /// for this schema.
    pub fn from_ron_str(s: &str) -> Result<Self> {
        ron::from_str(s).map_err(|e| GameError::ConfigParse(e.to_string()))
    }

    /// Movement tier for a ship with the given max health (1, 2 or 3).
    #[must_use]
    pub fn tier_for(&self, max_health: u32) -> u32 {
        if max_health >= self.tier3_health {
            3
        } else if max_health >= self.tier2_health {
            2
        } else {
            1
        }
    }

    /// Per-turn movement capacity for a ship: tier bonus plus sails count.
    #[must_use]
    pub fn movement_capacity(&self, max_health: u32, sails: u32) -> u32 {
        self.base_movement + (self.tier_for(max_health) - 1) + sails
    }

    /// Gold cost of the given upgrade.
    #[must_use]
    pub fn upgrade_cost(&self, upgrade: UpgradeKind) -> u32 {
        match upgrade {
            UpgradeKind::Sails => self.sails_cost,
            UpgradeKind::Cannons => self.cannons_cost,
            UpgradeKind::MaxLife => self.max_life_cost,
        }
    }

    /// Max health for a structure of the given kind.
    #[must_use]
    pub fn structure_max_health(&self, kind: StructureKind) -> u32 {
        match kind {
            StructureKind::Shipyard => self.shipyard_health,
            StructureKind::NavalYard => self.naval_yard_health,
            StructureKind::NavalFortress => self.naval_fortress_health,
            StructureKind::PirateCove => self.pirate_cove_health,
        }
    }

    /// Refund for cancelling a job that paid `cost_paid`, rounded to the
    /// nearest whole gold piece.
    #[must_use]
    pub fn refund_for(&self, cost_paid: u32) -> u32 {
        (cost_paid * self.refund_percent + 50) / 100
    }
}
