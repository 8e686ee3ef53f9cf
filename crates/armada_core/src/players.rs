//! Players and the player store.
//!
//! Elimination and victory detection live here; the resolver calls
//! [`PlayerManager::eliminate`] at end of turn and asks for
//! [`PlayerManager::winner`] afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Unique identifier for a player.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PlayerId(pub u32);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "player_{}", self.0)
    }
}

/// Who drives a player's orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Controller {
    /// Local human input.
    Human,
    /// Local AI planner.
    Ai,
    /// Orders arrive over a transport from elsewhere.
    Remote,
}

/// A participant in the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Stable identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Order source.
    pub controller: Controller,
    /// Set when the player has submitted orders for the current turn.
    pub ready: bool,
    /// Set once, when the player loses their last unit.
    pub eliminated: bool,
    /// Currency; never negative.
    pub gold: u32,
}

/// Authoritative store of all players.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerManager {
    players: HashMap<PlayerId, Player>,
    next_id: u32,
}

impl PlayerManager {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            players: HashMap::new(),
            next_id: 1,
        }
    }

    /// Add a player with the given starting gold.
    pub fn add_player(
        &mut self,
        name: impl Into<String>,
        controller: Controller,
        starting_gold: u32,
    ) -> PlayerId {
        let id = PlayerId(self.next_id);
        self.next_id += 1;
        self.players.insert(
            id,
            Player {
                id,
                name: name.into(),
                controller,
                ready: false,
                eliminated: false,
                gold: starting_gold,
            },
        );
        id
    }

    /// Get a player by id.
    #[must_use]
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Get a player mutably by id.
    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// Whether a player exists.
    #[must_use]
    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    /// Non-eliminated players, in id order.
    #[must_use]
    pub fn active(&self) -> Vec<&Player> {
        self.sorted_ids()
            .into_iter()
            .filter_map(|id| self.players.get(&id))
            .filter(|p| !p.eliminated)
            .collect()
    }

    /// Mark a player eliminated. Returns `true` the first time only.
    pub fn eliminate(&mut self, id: PlayerId) -> bool {
        match self.players.get_mut(&id) {
            Some(p) if !p.eliminated => {
                p.eliminated = true;
                true
            }
            _ => false,
        }
    }

    /// The unique remaining active player, or `None` while two or more remain.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        let active = self.active();
        match active.as_slice() {
            [only] => Some(only.id),
            _ => None,
        }
    }

    /// Add gold to a player's purse.
    pub fn credit(&mut self, id: PlayerId, amount: u32) -> Result<()> {
        let player = self
            .players
            .get_mut(&id)
            .ok_or(GameError::PlayerNotFound(id))?;
        player.gold += amount;
        Ok(())
    }

    /// Remove gold from a player's purse.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InsufficientGold`] without mutating if the
    /// player cannot afford the debit.
    pub fn debit(&mut self, id: PlayerId, amount: u32) -> Result<()> {
        let player = self
            .players
            .get_mut(&id)
            .ok_or(GameError::PlayerNotFound(id))?;
        if player.gold < amount {
            return Err(GameError::InsufficientGold {
                required: amount,
                available: player.gold,
            });
        }
        player.gold -= amount;
        Ok(())
    }

    /// Number of players (including eliminated ones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Sorted player ids for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<PlayerId> {
        let mut ids: Vec<_> = self.players.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
