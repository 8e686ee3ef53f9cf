//! Dice combat between one attacker/defender pairing.
//!
//! The attacker rolls three six-sided dice, the defender two. Both sets
//! are sorted descending and the top two of each are compared pairwise;
//! the defender wins ties. Every comparison costs its loser 2 damage, so
//! one resolution always distributes exactly 4 damage across the pair.
//!
//! The resolver owns an explicitly seeded [`ChaCha8Rng`] and never touches
//! ambient randomness: the same seed against the same state reproduces the
//! same rolls, which is what makes full-game replays byte-identical.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Damage dealt by each lost comparison.
pub const DAMAGE_PER_LOSS: u32 = 2;

/// Outcome of one combat resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatOutcome {
    /// Attacker's three rolls, as rolled.
    pub attacker_rolls: [u8; 3],
    /// Defender's two rolls, as rolled.
    pub defender_rolls: [u8; 2],
    /// Damage dealt to the attacker.
    pub damage_to_attacker: u32,
    /// Damage dealt to the defender.
    pub damage_to_defender: u32,
}

/// Seeded dice resolver.
///
/// One instance per game session; consecutive resolutions consume the
/// stream in resolution order, which the turn pipeline keeps stable.
#[derive(Debug, Clone)]
pub struct CombatResolver {
    rng: ChaCha8Rng,
}

impl CombatResolver {
    /// Create a resolver from an explicit seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Resolve one attacker/defender pairing.
    pub fn resolve(&mut self) -> CombatOutcome {
        let attacker_rolls = [self.roll(), self.roll(), self.roll()];
        let defender_rolls = [self.roll(), self.roll()];

        let mut attacker_sorted = attacker_rolls;
        attacker_sorted.sort_unstable_by(|a, b| b.cmp(a));
        let mut defender_sorted = defender_rolls;
        defender_sorted.sort_unstable_by(|a, b| b.cmp(a));

        let mut damage_to_attacker = 0;
        let mut damage_to_defender = 0;
        for i in 0..2 {
            // Defender wins ties.
            if attacker_sorted[i] > defender_sorted[i] {
                damage_to_defender += DAMAGE_PER_LOSS;
            } else {
                damage_to_attacker += DAMAGE_PER_LOSS;
            }
        }

        CombatOutcome {
            attacker_rolls,
            defender_rolls,
            damage_to_attacker,
            damage_to_defender,
        }
    }

    fn roll(&mut self) -> u8 {
        self.rng.gen_range(1..=6)
    }
}
