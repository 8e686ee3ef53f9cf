//! The turn orchestrator.
//!
//! [`TurnResolver::resolve_turn`] consumes one turn's order batch and
//! mutates the game state through a fixed phase pipeline:
//!
//! 1. Construction advance (build queues tick, finished ships spawn)
//! 2. Economic orders: deploy, build, repair, upgrade (priority order)
//! 3. Movement and conflict detection (collisions become encounters)
//! 4. Combat: structure bombardment, then every adjacent hostile pair
//! 5. Elimination and victory check
//!
//! Every phase iterates in sorted-id order and each order is re-validated
//! against the state the previous phase left behind, so the same batch
//! against the same state always produces the same event log. Rejected
//! orders are skipped with an [`Event::OrderRejected`] and never abort the
//! rest of the turn.
//!
//! Encounters created during movement stay open across the turn boundary;
//! decisions arrive through [`TurnResolver::record_decision`] and their
//! effects (swaps, tile claims, triggered combat) apply the moment the
//! last involved unit has answered.

use std::collections::BTreeMap;

use crate::combat::CombatResolver;
use crate::encounter::{
    Encounter, EncounterDecision, EncounterId, EncounterKind, EncounterOutcome, EncounterSite,
    EncounterTracker,
};
use crate::error::{GameError, Result};
use crate::events::Event;
use crate::hex::{Direction, HexCoord};
use crate::orders::{sort_orders, Order};
use crate::players::PlayerId;
use crate::state::GameState;
use crate::units::UnitId;
use crate::validator::{validate_order, RejectReason};

/// A validated movement intent, pending conflict resolution.
#[derive(Debug, Clone, Copy)]
struct MoveIntent {
    unit: UnitId,
    owner: PlayerId,
    from: HexCoord,
    dest: HexCoord,
    steps: u32,
}

/// Orchestrates turn resolution against a [`GameState`].
///
/// Owns the seeded combat dice and the open-encounter tracker; both live
/// for the whole session so replaying the same seed and batches
/// reproduces the same game.
#[derive(Debug)]
pub struct TurnResolver {
    combat: CombatResolver,
    encounters: EncounterTracker,
    game_won: bool,
}

impl TurnResolver {
    /// Create a resolver with an explicit combat seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            combat: CombatResolver::new(seed),
            encounters: EncounterTracker::new(),
            game_won: false,
        }
    }

    /// The open-encounter tracker, for decision routing and inspection.
    #[must_use]
    pub fn encounters(&self) -> &EncounterTracker {
        &self.encounters
    }

    /// Resolve one turn. Returns the ordered event log.
    pub fn resolve_turn(&mut self, state: &mut GameState, orders: &[Order]) -> Vec<Event> {
        let turn = state.turn();
        let mut events = Vec::new();

        self.prepare_turn(state, turn, &mut events);

        let mut sorted = orders.to_vec();
        sort_orders(&mut sorted);

        self.advance_construction(state, turn, &mut events);
        self.resolve_economic_orders(state, &sorted, turn, &mut events);
        self.resolve_movement(state, &sorted, turn, &mut events);
        self.resolve_combat(state, &sorted, turn, &mut events);
        self.check_elimination(state, turn, &mut events);

        state.advance_turn();
        tracing::debug!(
            turn,
            events = events.len(),
            state_hash = state.state_hash(),
            "turn resolved"
        );
        events
    }

    /// Record a unit's decision against an open encounter.
    ///
    /// Once the last involved unit has answered, the encounter resolves
    /// immediately and the returned events describe the outcome. A
    /// contested ENTRY (two or more ATTACK answers) instead persists to
    /// the next turn.
    ///
    /// # Errors
    ///
    /// Rejects unknown or resolved encounters, non-involved units, and
    /// decisions of the wrong family for the encounter kind.
    pub fn record_decision(
        &mut self,
        state: &mut GameState,
        encounter: EncounterId,
        unit: UnitId,
        decision: EncounterDecision,
    ) -> Result<Vec<Event>> {
        let turn = state.turn();
        let e = self
            .encounters
            .get_mut(encounter)
            .filter(|e| !e.resolved)
            .ok_or(GameError::EncounterNotFound(encounter))?;
        e.record_decision(unit, decision)?;

        if e.awaiting_choices() {
            return Ok(Vec::new());
        }

        let mut events = Vec::new();
        self.apply_encounter(state, encounter, turn, &mut events);
        Ok(events)
    }

    // ------------------------------------------------------------------
    // Turn start
    // ------------------------------------------------------------------

    /// Reset movement budgets and re-offer encounters carried over from
    /// the previous turn.
    fn prepare_turn(&mut self, state: &mut GameState, turn: u32, events: &mut Vec<Event>) {
        let config = state.config.clone();
        for id in state.units.sorted_ids() {
            if let Some(unit) = state.units.get_mut(id) {
                unit.reset_movement(&config);
            }
        }

        // Drop encounters whose participants died since creation.
        for id in self.encounters.open_in_order() {
            let stale = self
                .encounters
                .get(id)
                .is_some_and(|e| e.units.iter().any(|u| !state.units.contains(*u)));
            if stale {
                tracing::debug!(encounter = %id, "dropping encounter with dead participant");
                if let Some(e) = self.encounters.remove(id) {
                    self.clear_engagement(state, &e);
                }
            }
        }

        // Contested encounters are re-offered with fresh decisions; an
        // encounter still awaiting answers keeps the ones already made.
        for id in self.encounters.open_in_order() {
            if let Some(e) = self.encounters.get_mut(id) {
                if e.contested {
                    e.reoffer();
                }
            }
            events.push(Event::CollisionNeedsResolution {
                turn,
                encounter: id,
            });
        }
    }

    // ------------------------------------------------------------------
    // Phase 1: construction
    // ------------------------------------------------------------------

    fn advance_construction(&mut self, state: &mut GameState, turn: u32, events: &mut Vec<Event>) {
        let config = state.config.clone();
        for yard_id in state.construction.active_shipyards() {
            // A queue can outlive its shipyard for one phase if the yard
            // fell this turn; treat it as a stale reference and flush it.
            let Some(yard_pos) = state.structures.get(yard_id).map(|s| s.position) else {
                for cancelled in state.construction.cancel_all_for(yard_id) {
                    events.push(Event::ConstructionCancelled {
                        turn,
                        job: cancelled.job,
                        shipyard: yard_id,
                        refund: 0,
                    });
                }
                continue;
            };

            let Some(outcome) = state.construction.advance_head(yard_id) else {
                continue;
            };
            events.push(Event::ConstructionProgressed {
                turn,
                job: outcome.job,
                shipyard: yard_id,
                turns_remaining: outcome.turns_remaining,
            });

            if outcome.completed {
                events.push(Event::ConstructionCompleted {
                    turn,
                    job: outcome.job,
                    shipyard: yard_id,
                });
                match self.spawn_tile(state, yard_pos) {
                    Some(spawn) => {
                        let unit = state.units.create_unit(outcome.owner, spawn, &config);
                        events.push(Event::ShipBuilt {
                            turn,
                            shipyard: yard_id,
                            unit,
                            owner: outcome.owner,
                            position: spawn,
                        });
                    }
                    None => {
                        tracing::warn!(
                            shipyard = %yard_id,
                            "no free tile to spawn finished ship; hull lost"
                        );
                    }
                }
            }
        }
    }

    /// The shipyard tile if unit-free, else the first unit-free navigable
    /// neighbor in direction order.
    fn spawn_tile(&self, state: &GameState, yard_pos: HexCoord) -> Option<HexCoord> {
        if state.units.at_position(yard_pos).is_none() && state.grid.is_navigable(yard_pos) {
            return Some(yard_pos);
        }
        Direction::ALL
            .into_iter()
            .map(|d| yard_pos.neighbor(d))
            .find(|c| state.grid.is_navigable(*c) && state.units.at_position(*c).is_none())
    }

    // ------------------------------------------------------------------
    // Phase 2: economic orders
    // ------------------------------------------------------------------

    fn resolve_economic_orders(
        &mut self,
        state: &mut GameState,
        sorted: &[Order],
        turn: u32,
        events: &mut Vec<Event>,
    ) {
        for order in sorted {
            if !matches!(
                order,
                Order::DeployShipyard { .. }
                    | Order::BuildShip { .. }
                    | Order::RepairShip { .. }
                    | Order::UpgradeShip { .. }
            ) {
                continue;
            }

            if let Err(reason) = validate_order(order, state) {
                self.reject(order, reason, turn, events);
                continue;
            }

            match order {
                Order::DeployShipyard { unit, owner } => {
                    let Some(position) = state.units.get(*unit).map(|u| u.position) else {
                        continue;
                    };
                    if state.players.debit(*owner, state.config.deploy_cost).is_err() {
                        continue;
                    }
                    state.units.remove(*unit);
                    let max_health = state
                        .config
                        .structure_max_health(crate::structures::StructureKind::Shipyard);
                    let structure = state.structures.create_structure(
                        Some(*owner),
                        position,
                        crate::structures::StructureKind::Shipyard,
                        max_health,
                    );
                    events.push(Event::ShipyardDeployed {
                        turn,
                        unit: *unit,
                        structure,
                        owner: *owner,
                        position,
                    });
                }
                Order::BuildShip {
                    shipyard,
                    owner,
                    item,
                } => {
                    let cost = state.config.ship_cost;
                    if state.players.debit(*owner, cost).is_err() {
                        continue;
                    }
                    let job = state.construction.enqueue(
                        *shipyard,
                        *owner,
                        *item,
                        state.config.ship_build_turns,
                        cost,
                    );
                    events.push(Event::ConstructionQueued {
                        turn,
                        job,
                        shipyard: *shipyard,
                        owner: *owner,
                        item: *item,
                        cost,
                    });
                }
                Order::RepairShip { unit, owner } => {
                    let cost = state.config.repair_cost;
                    if state.players.debit(*owner, cost).is_err() {
                        continue;
                    }
                    let amount = state.config.repair_amount;
                    let healed = state.units.get_mut(*unit).map_or(0, |u| {
                        let before = u.health;
                        u.heal(amount);
                        u.health - before
                    });
                    events.push(Event::ShipRepaired {
                        turn,
                        unit: *unit,
                        amount: healed,
                        cost,
                    });
                }
                Order::UpgradeShip {
                    unit,
                    owner,
                    upgrade,
                } => {
                    let cost = state.config.upgrade_cost(*upgrade);
                    if state.players.debit(*owner, cost).is_err() {
                        continue;
                    }
                    let max_life_amount = state.config.max_life_amount;
                    if let Some(u) = state.units.get_mut(*unit) {
                        match upgrade {
                            crate::units::UpgradeKind::Sails => u.sails += 1,
                            crate::units::UpgradeKind::Cannons => u.cannons += 1,
                            crate::units::UpgradeKind::MaxLife => u.max_health += max_life_amount,
                        }
                    }
                    events.push(Event::ShipUpgraded {
                        turn,
                        unit: *unit,
                        upgrade: *upgrade,
                        cost,
                    });
                }
                _ => unreachable!("filtered to economic orders above"),
            }
        }
    }

    // ------------------------------------------------------------------
    // Phase 3: movement
    // ------------------------------------------------------------------

    fn resolve_movement(
        &mut self,
        state: &mut GameState,
        sorted: &[Order],
        turn: u32,
        events: &mut Vec<Event>,
    ) {
        let mut intents: BTreeMap<UnitId, MoveIntent> = BTreeMap::new();

        for order in sorted {
            let Order::Move { unit, owner, path } = order else {
                continue;
            };
            if self.encounters.unit_engaged(*unit) {
                self.reject(order, RejectReason::UnitEngaged, turn, events);
                continue;
            }
            if intents.contains_key(unit) {
                tracing::debug!(unit = %unit, "duplicate move order ignored");
                continue;
            }
            if let Err(reason) = validate_order(order, state) {
                self.reject(order, reason, turn, events);
                continue;
            }
            let from = path[0];
            let dest = *path.last().expect("validated path is non-empty");
            if dest == from {
                continue;
            }
            intents.insert(
                *unit,
                MoveIntent {
                    unit: *unit,
                    owner: *owner,
                    from,
                    dest,
                    steps: (path.len() - 1) as u32,
                },
            );
        }

        self.settle_collisions(state, &mut intents, turn, events);
        self.settle_swaps(state, &mut intents, turn, events);
        self.settle_remaining(state, intents, turn, events);
    }

    /// Void every group of intents sharing a destination tile; hostile
    /// groups become ENTRY encounters, friendly groups a plain collision.
    fn settle_collisions(
        &mut self,
        state: &mut GameState,
        intents: &mut BTreeMap<UnitId, MoveIntent>,
        turn: u32,
        events: &mut Vec<Event>,
    ) {
        let mut by_dest: BTreeMap<HexCoord, Vec<UnitId>> = BTreeMap::new();
        for intent in intents.values() {
            by_dest.entry(intent.dest).or_default().push(intent.unit);
        }

        for (tile, claimants) in by_dest {
            if claimants.len() < 2 {
                continue;
            }

            let owners: Vec<PlayerId> = claimants
                .iter()
                .filter_map(|u| state.units.get(*u))
                .map(|u| u.owner)
                .collect();
            let hostile = owners
                .first()
                .is_some_and(|first| owners.iter().any(|o| o != first));

            if hostile {
                let mut parties: Vec<(UnitId, HexCoord)> = claimants
                    .iter()
                    .filter_map(|u| intents.get(u))
                    .map(|i| (i.unit, i.from))
                    .collect();
                // A hostile unit already resident on the claimed tile
                // holds an implicit claim and joins the encounter.
                if let Some(resident) = state.units.at_position(tile) {
                    if !self.encounters.unit_engaged(resident.id) {
                        parties.push((resident.id, tile));
                    }
                }
                self.open_encounter(
                    state,
                    EncounterKind::Entry,
                    EncounterSite::Tile(tile),
                    &parties,
                    turn,
                    events,
                );
            } else {
                events.push(Event::UnitsCollided {
                    turn,
                    tile,
                    units: claimants.clone(),
                });
            }

            for unit in claimants {
                intents.remove(&unit);
            }
        }
    }

    /// Detect tile swaps. Hostile swaps become PASSING encounters;
    /// friendly swaps execute simultaneously.
    fn settle_swaps(
        &mut self,
        state: &mut GameState,
        intents: &mut BTreeMap<UnitId, MoveIntent>,
        turn: u32,
        events: &mut Vec<Event>,
    ) {
        let ids: Vec<UnitId> = intents.keys().copied().collect();
        for a_id in ids {
            let Some(a) = intents.get(&a_id).copied() else {
                continue;
            };
            let Some(b) = intents
                .values()
                .find(|b| b.unit != a.unit && b.from == a.dest && b.dest == a.from)
                .copied()
            else {
                continue;
            };

            intents.remove(&a.unit);
            intents.remove(&b.unit);

            if a.owner == b.owner {
                self.apply_move(state, a, turn, events);
                self.apply_move(state, b, turn, events);
            } else {
                let (lo, hi) = if a.from <= b.from {
                    (a.from, b.from)
                } else {
                    (b.from, a.from)
                };
                self.open_encounter(
                    state,
                    EncounterKind::Passing,
                    EncounterSite::Edge(lo, hi),
                    &[(a.unit, a.from), (b.unit, b.from)],
                    turn,
                    events,
                );
            }
        }
    }

    /// Settle the remaining unique-destination intents: apply moves as
    /// tiles free up, then convert hostile-resident blocks into ENTRY
    /// encounters.
    fn settle_remaining(
        &mut self,
        state: &mut GameState,
        mut intents: BTreeMap<UnitId, MoveIntent>,
        turn: u32,
        events: &mut Vec<Event>,
    ) {
        // Fixpoint: chains like A -> B's tile -> C's tile settle as the
        // tail of the chain vacates.
        loop {
            let movable: Vec<UnitId> = intents
                .values()
                .filter(|i| state.units.at_position(i.dest).is_none())
                .map(|i| i.unit)
                .collect();
            if movable.is_empty() {
                break;
            }
            for unit in movable {
                if let Some(intent) = intents.remove(&unit) {
                    self.apply_move(state, intent, turn, events);
                }
            }
        }

        for intent in intents.into_values() {
            let Some(resident) = state.units.at_position(intent.dest) else {
                continue;
            };
            let resident_id = resident.id;
            let hostile = resident.owner != intent.owner;

            if !hostile {
                tracing::debug!(
                    unit = %intent.unit,
                    blocker = %resident_id,
                    "move blocked by stationary friendly unit"
                );
                continue;
            }
            if self.encounters.unit_engaged(resident_id) {
                tracing::debug!(
                    unit = %intent.unit,
                    resident = %resident_id,
                    "resident already engaged; move voided"
                );
                continue;
            }
            self.open_encounter(
                state,
                EncounterKind::Entry,
                EncounterSite::Tile(intent.dest),
                &[(intent.unit, intent.from), (resident_id, intent.dest)],
                turn,
                events,
            );
        }
    }

    fn apply_move(
        &mut self,
        state: &mut GameState,
        intent: MoveIntent,
        turn: u32,
        events: &mut Vec<Event>,
    ) {
        state.units.move_unit(intent.unit, intent.dest);
        if let Some(unit) = state.units.get_mut(intent.unit) {
            unit.movement_remaining = unit.movement_remaining.saturating_sub(intent.steps);
        }
        events.push(Event::UnitMoved {
            turn,
            unit: intent.unit,
            from: intent.from,
            to: intent.dest,
        });
    }

    fn open_encounter(
        &mut self,
        state: &mut GameState,
        kind: EncounterKind,
        site: EncounterSite,
        parties: &[(UnitId, HexCoord)],
        turn: u32,
        events: &mut Vec<Event>,
    ) {
        let id = self.encounters.create(kind, site, turn, parties);
        for (unit, _) in parties {
            if let Some(u) = state.units.get_mut(*unit) {
                u.in_combat = true;
            }
        }
        let units = self
            .encounters
            .get(id)
            .map(|e| e.units.clone())
            .unwrap_or_default();
        events.push(Event::ConflictDetected {
            turn,
            encounter: id,
            kind,
            units,
        });
        events.push(Event::CollisionNeedsResolution {
            turn,
            encounter: id,
        });
    }

    // ------------------------------------------------------------------
    // Phase 4: combat
    // ------------------------------------------------------------------

    fn resolve_combat(
        &mut self,
        state: &mut GameState,
        sorted: &[Order],
        turn: u32,
        events: &mut Vec<Event>,
    ) {
        // Structure bombardment first.
        for order in sorted {
            let Order::AttackShipyard {
                unit, structure, ..
            } = order
            else {
                continue;
            };
            if let Err(reason) = validate_order(order, state) {
                self.reject(order, reason, turn, events);
                continue;
            }

            let cannons = state.units.get(*unit).map_or(0, |u| u.cannons);
            let damage = state.config.structure_attack_damage + cannons;
            let destroyed = {
                let Some(s) = state.structures.get_mut(*structure) else {
                    continue;
                };
                s.apply_damage(damage);
                s.is_destroyed()
            };
            events.push(Event::StructureDamaged {
                turn,
                structure: *structure,
                attacker: *unit,
                damage,
            });

            if destroyed {
                state.structures.remove(*structure);
                for cancelled in state.construction.cancel_all_for(*structure) {
                    events.push(Event::ConstructionCancelled {
                        turn,
                        job: cancelled.job,
                        shipyard: *structure,
                        refund: 0,
                    });
                }
                events.push(Event::StructureDestroyed {
                    turn,
                    structure: *structure,
                });
            }
        }

        // Every unordered hostile pair at distance exactly 1 fights.
        // Pairs are fixed before any damage lands; deaths apply after.
        let ids = state.units.sorted_ids();
        let mut pairs: Vec<(UnitId, UnitId)> = Vec::new();
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                let (Some(ua), Some(ub)) = (state.units.get(*a), state.units.get(*b)) else {
                    continue;
                };
                if ua.owner != ub.owner && ua.position.distance(ub.position) == 1 {
                    pairs.push((*a, *b));
                }
            }
        }

        for (attacker, defender) in pairs {
            let outcome = self.combat.resolve();
            if let Some(u) = state.units.get_mut(attacker) {
                u.apply_damage(outcome.damage_to_attacker);
            }
            if let Some(u) = state.units.get_mut(defender) {
                u.apply_damage(outcome.damage_to_defender);
            }
            events.push(Event::CombatOccurred {
                turn,
                attacker,
                defender,
                attacker_rolls: outcome.attacker_rolls,
                defender_rolls: outcome.defender_rolls,
                damage_to_attacker: outcome.damage_to_attacker,
                damage_to_defender: outcome.damage_to_defender,
            });
        }

        self.bury_dead(state, turn, events);
    }

    /// Remove zero-health units, emitting destruction events.
    fn bury_dead(&mut self, state: &mut GameState, turn: u32, events: &mut Vec<Event>) {
        for id in state.units.sorted_ids() {
            let Some(unit) = state.units.get(id) else {
                continue;
            };
            if unit.is_dead() {
                let owner = unit.owner;
                state.units.remove(id);
                events.push(Event::UnitDestroyed {
                    turn,
                    unit: id,
                    owner,
                });
            }
        }
    }

    // ------------------------------------------------------------------
    // Phase 5: elimination
    // ------------------------------------------------------------------

    fn check_elimination(&mut self, state: &mut GameState, turn: u32, events: &mut Vec<Event>) {
        let active: Vec<PlayerId> = state.players.active().iter().map(|p| p.id).collect();
        for player in active {
            if state.units.for_owner(player).is_empty() && state.players.eliminate(player) {
                tracing::info!(player = %player, "player eliminated");
                events.push(Event::PlayerEliminated { turn, player });
            }
        }

        if !self.game_won {
            if let Some(winner) = state.players.winner() {
                self.game_won = true;
                tracing::info!(player = %winner, "game won");
                events.push(Event::GameWon {
                    turn,
                    player: winner,
                });
            }
        }
    }

    // ------------------------------------------------------------------
    // Encounter application
    // ------------------------------------------------------------------

    fn apply_encounter(
        &mut self,
        state: &mut GameState,
        id: EncounterId,
        turn: u32,
        events: &mut Vec<Event>,
    ) {
        let Some(encounter) = self.encounters.get(id).cloned() else {
            return;
        };

        match encounter.kind {
            EncounterKind::Passing => self.apply_passing(state, &encounter, turn, events),
            EncounterKind::Entry => self.apply_entry(state, &encounter, turn, events),
        }
    }

    fn apply_passing(
        &mut self,
        state: &mut GameState,
        encounter: &Encounter,
        turn: u32,
        events: &mut Vec<Event>,
    ) {
        let attackers = encounter.attackers();
        let [a, b] = encounter.units[..] else {
            tracing::warn!(encounter = %encounter.id, "passing encounter without two units");
            self.finish_encounter(state, encounter.id);
            return;
        };

        if attackers.is_empty() {
            // Both proceeded: the swap executes.
            let a_from = encounter.previous_positions[&a];
            let b_from = encounter.previous_positions[&b];
            state.units.move_unit(a, b_from);
            state.units.move_unit(b, a_from);
            events.push(Event::UnitMoved {
                turn,
                unit: a,
                from: a_from,
                to: b_from,
            });
            events.push(Event::UnitMoved {
                turn,
                unit: b,
                from: b_from,
                to: a_from,
            });
            events.push(Event::CollisionResolved {
                turn,
                encounter: encounter.id,
                outcome: EncounterOutcome::Swapped,
            });
        } else {
            // Any ATTACK cancels the swap and starts a fight. With both
            // attacking, the smaller id presses the attack.
            let attacker = attackers[0];
            let defender = if attacker == a { b } else { a };
            self.fight(state, attacker, defender, turn, events);
            events.push(Event::CollisionResolved {
                turn,
                encounter: encounter.id,
                outcome: EncounterOutcome::CombatTriggered,
            });
        }

        self.finish_encounter(state, encounter.id);
        self.bury_dead(state, turn, events);
    }

    fn apply_entry(
        &mut self,
        state: &mut GameState,
        encounter: &Encounter,
        turn: u32,
        events: &mut Vec<Event>,
    ) {
        let attackers = encounter.attackers();
        let EncounterSite::Tile(tile) = encounter.site else {
            tracing::warn!(encounter = %encounter.id, "entry encounter without a tile site");
            self.finish_encounter(state, encounter.id);
            return;
        };

        match attackers.len() {
            0 => {
                // Everyone yielded; the tile stays as it was.
                events.push(Event::CollisionResolved {
                    turn,
                    encounter: encounter.id,
                    outcome: EncounterOutcome::AllYielded,
                });
                self.finish_encounter(state, encounter.id);
            }
            1 => {
                let winner = attackers[0];
                let winner_owner = state.units.get(winner).map(|u| u.owner);
                let winner_was_resident = encounter.previous_positions.get(&winner) == Some(&tile);

                let resident = state
                    .units
                    .at_position(tile)
                    .filter(|u| u.id != winner)
                    .map(|u| (u.id, u.owner));

                match resident {
                    None => {
                        // The sole attacker takes (or keeps) the tile.
                        if !winner_was_resident {
                            let from = encounter.previous_positions[&winner];
                            state.units.move_unit(winner, tile);
                            events.push(Event::UnitMoved {
                                turn,
                                unit: winner,
                                from,
                                to: tile,
                            });
                        }
                        events.push(Event::CollisionResolved {
                            turn,
                            encounter: encounter.id,
                            outcome: EncounterOutcome::TileTaken(winner),
                        });
                        self.finish_encounter(state, encounter.id);
                    }
                    Some((defender, owner)) if Some(owner) != winner_owner => {
                        // A yielding hostile resident cannot vacate its own
                        // tile: the claim is pressed by force instead of
                        // movement.
                        self.fight(state, winner, defender, turn, events);
                        events.push(Event::CollisionResolved {
                            turn,
                            encounter: encounter.id,
                            outcome: EncounterOutcome::CombatTriggered,
                        });
                        self.finish_encounter(state, encounter.id);
                        self.bury_dead(state, turn, events);
                    }
                    Some(_) => {
                        // A friendly unit took the tile while the
                        // encounter was pending; the claim fizzles.
                        events.push(Event::CollisionResolved {
                            turn,
                            encounter: encounter.id,
                            outcome: EncounterOutcome::AllYielded,
                        });
                        self.finish_encounter(state, encounter.id);
                    }
                }
            }
            _ => {
                // Contested: carried to the next turn and re-offered.
                if let Some(e) = self.encounters.get_mut(encounter.id) {
                    e.contested = true;
                }
                tracing::debug!(encounter = %encounter.id, "entry contested; persists");
            }
        }
    }

    fn fight(
        &mut self,
        state: &mut GameState,
        attacker: UnitId,
        defender: UnitId,
        turn: u32,
        events: &mut Vec<Event>,
    ) {
        let outcome = self.combat.resolve();
        if let Some(u) = state.units.get_mut(attacker) {
            u.apply_damage(outcome.damage_to_attacker);
        }
        if let Some(u) = state.units.get_mut(defender) {
            u.apply_damage(outcome.damage_to_defender);
        }
        events.push(Event::CombatOccurred {
            turn,
            attacker,
            defender,
            attacker_rolls: outcome.attacker_rolls,
            defender_rolls: outcome.defender_rolls,
            damage_to_attacker: outcome.damage_to_attacker,
            damage_to_defender: outcome.damage_to_defender,
        });
    }

    /// Mark an encounter resolved, clear engagement flags, and drop it
    /// from active tracking.
    fn finish_encounter(&mut self, state: &mut GameState, id: EncounterId) {
        if let Some(e) = self.encounters.get_mut(id) {
            e.resolved = true;
        }
        if let Some(e) = self.encounters.remove(id) {
            self.clear_engagement(state, &e);
        }
    }

    fn clear_engagement(&self, state: &mut GameState, encounter: &Encounter) {
        for unit in &encounter.units {
            if let Some(u) = state.units.get_mut(*unit) {
                u.in_combat = false;
            }
        }
    }

    fn reject(&self, order: &Order, reason: RejectReason, turn: u32, events: &mut Vec<Event>) {
        tracing::debug!(owner = %order.owner(), %reason, "order rejected");
        events.push(Event::OrderRejected {
            turn,
            owner: order.owner(),
            reason,
        });
    }
}
