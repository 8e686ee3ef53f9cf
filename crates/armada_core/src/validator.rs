//! Pure admission checks for player orders.
//!
//! One function per order kind, each returning the first failed check as a
//! typed [`RejectReason`]. Nothing here mutates state. Checks are layered
//! and short-circuit in a fixed order: existence, ownership, kind,
//! spatial preconditions, resource preconditions.
//!
//! The validator is advisory: state can change between submission and
//! resolution, so the resolver runs the same checks again and skips orders
//! that fail.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hex::HexCoord;
use crate::orders::Order;
use crate::players::PlayerId;
use crate::state::GameState;
use crate::structures::StructureId;
use crate::units::{UnitId, UnitKind, UpgradeKind};

/// Why an order was not admitted.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RejectReason {
    /// Referenced unit does not exist.
    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),
    /// Referenced structure does not exist.
    #[error("unknown structure {0}")]
    UnknownStructure(StructureId),
    /// Issuing player does not exist.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
    /// The issuer does not own the acting entity.
    #[error("issuer does not own the target")]
    NotOwner,
    /// The acting entity is the wrong kind for this order.
    #[error("wrong entity kind for this order")]
    WrongKind,
    /// The target structure cannot build or repair ships.
    #[error("structure is not a shipyard")]
    NotAShipyard,
    /// A move order carried no path.
    #[error("empty movement path")]
    EmptyPath,
    /// The path does not start at the unit's position.
    #[error("path does not start at the unit's position")]
    PathDoesNotStartAtUnit,
    /// A path step is non-navigable or not adjacent to its predecessor.
    #[error("path step is broken at {0}")]
    BrokenPath(HexCoord),
    /// The path is longer than the unit's remaining movement.
    #[error("insufficient movement: need {required}, have {available}")]
    InsufficientMovement {
        /// Steps required.
        required: u32,
        /// Movement remaining.
        available: u32,
    },
    /// Deployment requires a harbor tile.
    #[error("tile is not a harbor")]
    NotAHarbor,
    /// The tile already holds a structure.
    #[error("tile already holds a structure")]
    TileOccupied,
    /// Repair requires a friendly shipyard on or beside the ship.
    #[error("no friendly shipyard in range")]
    NotAdjacentToShipyard,
    /// The ship has nothing to repair.
    #[error("ship is at full health")]
    AtFullHealth,
    /// Structure attacks require a hostile target.
    #[error("target structure is not hostile")]
    TargetNotHostile,
    /// The target is too far away.
    #[error("target out of range")]
    OutOfRange,
    /// The upgrade is already at its maximum count.
    #[error("upgrade limit reached")]
    UpgradeLimitReached,
    /// The issuer cannot afford the order.
    #[error("insufficient gold: need {required}, have {available}")]
    InsufficientGold {
        /// Gold required.
        required: u32,
        /// Gold available.
        available: u32,
    },
    /// The shipyard's build queue is at capacity.
    #[error("build queue is full")]
    QueueFull,
    /// The unit is party to an unresolved encounter.
    #[error("unit is engaged in an unresolved encounter")]
    UnitEngaged,
}

/// Validate any order against the current state.
pub fn validate_order(order: &Order, state: &GameState) -> Result<(), RejectReason> {
    match order {
        Order::Move { unit, owner, path } => validate_move(*unit, *owner, path, state),
        Order::DeployShipyard { unit, owner } => validate_deploy(*unit, *owner, state),
        Order::BuildShip {
            shipyard, owner, ..
        } => validate_build(*shipyard, *owner, state),
        Order::RepairShip { unit, owner } => validate_repair(*unit, *owner, state),
        Order::UpgradeShip {
            unit,
            owner,
            upgrade,
        } => validate_upgrade(*unit, *owner, *upgrade, state),
        Order::AttackShipyard {
            unit,
            owner,
            structure,
        } => validate_attack_structure(*unit, *owner, *structure, state),
    }
}

fn owned_ship<'a>(
    unit: UnitId,
    owner: PlayerId,
    state: &'a GameState,
) -> Result<&'a crate::units::Unit, RejectReason> {
    let u = state
        .units
        .get(unit)
        .ok_or(RejectReason::UnknownUnit(unit))?;
    if u.owner != owner {
        return Err(RejectReason::NotOwner);
    }
    if u.kind != UnitKind::Ship {
        return Err(RejectReason::WrongKind);
    }
    Ok(u)
}

fn check_gold(owner: PlayerId, cost: u32, state: &GameState) -> Result<(), RejectReason> {
    let player = state
        .players
        .get(owner)
        .ok_or(RejectReason::UnknownPlayer(owner))?;
    if player.gold < cost {
        return Err(RejectReason::InsufficientGold {
            required: cost,
            available: player.gold,
        });
    }
    Ok(())
}

/// Validate a move order: path continuity, navigability, movement budget.
pub fn validate_move(
    unit: UnitId,
    owner: PlayerId,
    path: &[HexCoord],
    state: &GameState,
) -> Result<(), RejectReason> {
    let u = owned_ship(unit, owner, state)?;

    let Some(first) = path.first() else {
        return Err(RejectReason::EmptyPath);
    };
    if *first != u.position {
        return Err(RejectReason::PathDoesNotStartAtUnit);
    }
    for pair in path.windows(2) {
        if pair[0].distance(pair[1]) != 1 || !state.grid.is_navigable(pair[1]) {
            return Err(RejectReason::BrokenPath(pair[1]));
        }
    }

    let steps = (path.len() - 1) as u32;
    if steps > u.movement_remaining {
        return Err(RejectReason::InsufficientMovement {
            required: steps,
            available: u.movement_remaining,
        });
    }
    Ok(())
}

/// Validate deploying a ship as a shipyard on its harbor tile.
pub fn validate_deploy(
    unit: UnitId,
    owner: PlayerId,
    state: &GameState,
) -> Result<(), RejectReason> {
    let u = owned_ship(unit, owner, state)?;

    let on_harbor = state
        .grid
        .tile(u.position)
        .is_some_and(|t| t.kind == crate::map::TileKind::Harbor);
    if !on_harbor {
        return Err(RejectReason::NotAHarbor);
    }
    if state.structures.at_position(u.position).is_some() {
        return Err(RejectReason::TileOccupied);
    }

    check_gold(owner, state.config.deploy_cost, state)
}

/// Validate queueing a ship at a shipyard.
pub fn validate_build(
    shipyard: StructureId,
    owner: PlayerId,
    state: &GameState,
) -> Result<(), RejectReason> {
    let s = state
        .structures
        .get(shipyard)
        .ok_or(RejectReason::UnknownStructure(shipyard))?;
    if s.owner != Some(owner) {
        return Err(RejectReason::NotOwner);
    }
    if !s.kind.is_shipyard_class() {
        return Err(RejectReason::NotAShipyard);
    }

    check_gold(owner, state.config.ship_cost, state)?;

    if state.construction.queue_len(shipyard) >= state.config.queue_capacity {
        return Err(RejectReason::QueueFull);
    }
    Ok(())
}

/// Validate repairing a ship at a friendly shipyard.
pub fn validate_repair(
    unit: UnitId,
    owner: PlayerId,
    state: &GameState,
) -> Result<(), RejectReason> {
    let u = owned_ship(unit, owner, state)?;

    if u.health >= u.max_health {
        return Err(RejectReason::AtFullHealth);
    }

    let near_friendly_yard = state.structures.iter().any(|s| {
        s.owner == Some(owner)
            && s.kind.is_shipyard_class()
            && s.position.distance(u.position) <= 1
    });
    if !near_friendly_yard {
        return Err(RejectReason::NotAdjacentToShipyard);
    }

    check_gold(owner, state.config.repair_cost, state)
}

/// Validate purchasing an upgrade.
pub fn validate_upgrade(
    unit: UnitId,
    owner: PlayerId,
    upgrade: UpgradeKind,
    state: &GameState,
) -> Result<(), RejectReason> {
    let u = owned_ship(unit, owner, state)?;

    let at_limit = match upgrade {
        UpgradeKind::Sails => u.sails >= state.config.upgrade_limit,
        UpgradeKind::Cannons => u.cannons >= state.config.upgrade_limit,
        UpgradeKind::MaxLife => false,
    };
    if at_limit {
        return Err(RejectReason::UpgradeLimitReached);
    }

    check_gold(owner, state.config.upgrade_cost(upgrade), state)
}

/// Validate bombarding an adjacent hostile structure.
pub fn validate_attack_structure(
    unit: UnitId,
    owner: PlayerId,
    structure: StructureId,
    state: &GameState,
) -> Result<(), RejectReason> {
    let u = owned_ship(unit, owner, state)?;

    let s = state
        .structures
        .get(structure)
        .ok_or(RejectReason::UnknownStructure(structure))?;
    if s.owner == Some(owner) {
        return Err(RejectReason::TargetNotHostile);
    }
    if s.position.distance(u.position) > 1 {
        return Err(RejectReason::OutOfRange);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::map::{HexGrid, Tile, TileKind};
    use crate::players::Controller;
    use crate::structures::StructureKind;

    fn sea_state() -> GameState {
        let mut grid = HexGrid::new();
        for q in -3..=3i32 {
            for r in (-3).max(-q - 3)..=3.min(-q + 3) {
                grid.insert(Tile::new(HexCoord::new(q, r), TileKind::Sea, None));
            }
        }
        GameState::new(grid, RulesConfig::default())
    }

    fn with_player(state: &mut GameState, gold: u32) -> PlayerId {
        state.players.add_player("Anne", Controller::Human, gold)
    }

    #[test]
    fn move_checks_short_circuit_in_order() {
        let mut state = sea_state();
        let p = with_player(&mut state, 300);
        let other = state.players.add_player("Bart", Controller::Ai, 300);
        let unit = state.units.create_unit(p, HexCoord::ORIGIN, &state.config);

        // (a) existence first
        assert_eq!(
            validate_move(UnitId(99), p, &[], &state),
            Err(RejectReason::UnknownUnit(UnitId(99)))
        );
        // (b) ownership before path checks
        assert_eq!(
            validate_move(unit, other, &[], &state),
            Err(RejectReason::NotOwner)
        );
        // (d) path shape
        assert_eq!(
            validate_move(unit, p, &[], &state),
            Err(RejectReason::EmptyPath)
        );
        assert_eq!(
            validate_move(unit, p, &[HexCoord::new(1, 0)], &state),
            Err(RejectReason::PathDoesNotStartAtUnit)
        );
    }

    #[test]
    fn move_rejects_broken_and_offgrid_paths() {
        let mut state = sea_state();
        let p = with_player(&mut state, 300);
        let unit = state.units.create_unit(p, HexCoord::ORIGIN, &state.config);

        // Jump of distance 2.
        assert_eq!(
            validate_move(
                unit,
                p,
                &[HexCoord::ORIGIN, HexCoord::new(2, 0)],
                &state
            ),
            Err(RejectReason::BrokenPath(HexCoord::new(2, 0)))
        );
        // Land tile mid-path.
        state
            .grid
            .insert(Tile::new(HexCoord::new(1, 0), TileKind::Land, Some(0)));
        assert_eq!(
            validate_move(
                unit,
                p,
                &[HexCoord::ORIGIN, HexCoord::new(1, 0)],
                &state
            ),
            Err(RejectReason::BrokenPath(HexCoord::new(1, 0)))
        );
    }

    #[test]
    fn move_rejects_over_budget() {
        let mut state = sea_state();
        let p = with_player(&mut state, 300);
        let unit = state.units.create_unit(p, HexCoord::ORIGIN, &state.config);
        // Default capacity is 2; ask for 3 steps.
        let path = vec![
            HexCoord::ORIGIN,
            HexCoord::new(1, 0),
            HexCoord::new(2, 0),
            HexCoord::new(3, 0),
        ];
        assert_eq!(
            validate_move(unit, p, &path, &state),
            Err(RejectReason::InsufficientMovement {
                required: 3,
                available: 2
            })
        );
    }

    #[test]
    fn valid_move_is_accepted() {
        let mut state = sea_state();
        let p = with_player(&mut state, 300);
        let unit = state.units.create_unit(p, HexCoord::ORIGIN, &state.config);
        let path = vec![HexCoord::ORIGIN, HexCoord::new(1, 0), HexCoord::new(2, 0)];
        assert_eq!(validate_move(unit, p, &path, &state), Ok(()));
    }

    #[test]
    fn deploy_requires_harbor_then_vacancy_then_gold() {
        let mut state = sea_state();
        let p = with_player(&mut state, 300);
        let unit = state.units.create_unit(p, HexCoord::ORIGIN, &state.config);

        assert_eq!(
            validate_deploy(unit, p, &state),
            Err(RejectReason::NotAHarbor)
        );

        state
            .grid
            .insert(Tile::new(HexCoord::ORIGIN, TileKind::Harbor, Some(0)));
        assert_eq!(validate_deploy(unit, p, &state), Ok(()));

        state.structures.create_structure(
            Some(p),
            HexCoord::ORIGIN,
            StructureKind::Shipyard,
            20,
        );
        assert_eq!(
            validate_deploy(unit, p, &state),
            Err(RejectReason::TileOccupied)
        );
    }

    #[test]
    fn deploy_rejects_poor_player() {
        let mut state = sea_state();
        let p = with_player(&mut state, 10);
        let unit = state.units.create_unit(p, HexCoord::ORIGIN, &state.config);
        state
            .grid
            .insert(Tile::new(HexCoord::ORIGIN, TileKind::Harbor, Some(0)));

        assert_eq!(
            validate_deploy(unit, p, &state),
            Err(RejectReason::InsufficientGold {
                required: 100,
                available: 10
            })
        );
    }

    #[test]
    fn build_requires_owned_shipyard_gold_and_queue_room() {
        let mut state = sea_state();
        let p = with_player(&mut state, 300);
        let other = state.players.add_player("Bart", Controller::Ai, 300);
        let yard = state.structures.create_structure(
            Some(p),
            HexCoord::new(1, 0),
            StructureKind::Shipyard,
            20,
        );
        let cove =
            state
                .structures
                .create_structure(None, HexCoord::new(2, 0), StructureKind::PirateCove, 25);

        assert_eq!(validate_build(yard, p, &state), Ok(()));
        assert_eq!(
            validate_build(yard, other, &state),
            Err(RejectReason::NotOwner)
        );
        assert_eq!(
            validate_build(cove, p, &state),
            Err(RejectReason::NotOwner)
        );
        assert_eq!(
            validate_build(StructureId(99), p, &state),
            Err(RejectReason::UnknownStructure(StructureId(99)))
        );

        // Fill the queue to capacity.
        for _ in 0..state.config.queue_capacity {
            state.construction.enqueue(
                yard,
                p,
                crate::construction::BuildItem::Ship,
                3,
                100,
            );
        }
        assert_eq!(validate_build(yard, p, &state), Err(RejectReason::QueueFull));
    }

    #[test]
    fn repair_requires_damage_and_a_nearby_friendly_yard() {
        let mut state = sea_state();
        let p = with_player(&mut state, 300);
        let unit = state.units.create_unit(p, HexCoord::ORIGIN, &state.config);

        assert_eq!(
            validate_repair(unit, p, &state),
            Err(RejectReason::AtFullHealth)
        );

        state.units.get_mut(unit).unwrap().apply_damage(4);
        assert_eq!(
            validate_repair(unit, p, &state),
            Err(RejectReason::NotAdjacentToShipyard)
        );

        state.structures.create_structure(
            Some(p),
            HexCoord::new(1, 0),
            StructureKind::Shipyard,
            20,
        );
        assert_eq!(validate_repair(unit, p, &state), Ok(()));
    }

    #[test]
    fn upgrade_limit_applies_to_sails_and_cannons() {
        let mut state = sea_state();
        let p = with_player(&mut state, 1000);
        let unit = state.units.create_unit(p, HexCoord::ORIGIN, &state.config);

        state.units.get_mut(unit).unwrap().sails = state.config.upgrade_limit;
        assert_eq!(
            validate_upgrade(unit, p, UpgradeKind::Sails, &state),
            Err(RejectReason::UpgradeLimitReached)
        );
        assert_eq!(
            validate_upgrade(unit, p, UpgradeKind::Cannons, &state),
            Ok(())
        );
        // MaxLife has no count limit.
        assert_eq!(
            validate_upgrade(unit, p, UpgradeKind::MaxLife, &state),
            Ok(())
        );
    }

    #[test]
    fn attack_structure_requires_hostile_adjacent_target() {
        let mut state = sea_state();
        let p = with_player(&mut state, 300);
        let other = state.players.add_player("Bart", Controller::Ai, 300);
        let unit = state.units.create_unit(p, HexCoord::ORIGIN, &state.config);

        let own_yard = state.structures.create_structure(
            Some(p),
            HexCoord::new(1, 0),
            StructureKind::Shipyard,
            20,
        );
        let enemy_near = state.structures.create_structure(
            Some(other),
            HexCoord::new(0, 1),
            StructureKind::Shipyard,
            20,
        );
        let enemy_far = state.structures.create_structure(
            Some(other),
            HexCoord::new(3, 0),
            StructureKind::Shipyard,
            20,
        );

        assert_eq!(
            validate_attack_structure(unit, p, own_yard, &state),
            Err(RejectReason::TargetNotHostile)
        );
        assert_eq!(
            validate_attack_structure(unit, p, enemy_far, &state),
            Err(RejectReason::OutOfRange)
        );
        assert_eq!(validate_attack_structure(unit, p, enemy_near, &state), Ok(()));
    }
}
