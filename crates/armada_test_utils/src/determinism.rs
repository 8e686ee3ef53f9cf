//! Determinism testing utilities.
//!
//! The resolution core must be 100% deterministic: the same map seed,
//! initial state and order batches always produce the same event log and
//! final state hash. Sources of non-determinism to watch for:
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   The core always iterates in sorted-id order.
//! - **Ambient randomness**: combat dice and map generation own seeded
//!   generators; nothing reads entropy.
//! - **Submission order**: batches are sorted by (priority, actor id)
//!   before resolution.
//!
//! The harness here runs a scenario closure several times and compares
//! the resulting hashes.

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Final state hash from each run.
    pub hashes: Vec<u64>,
}

impl DeterminismResult {
    /// All unique hashes (should be 1 for a deterministic scenario).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert the scenario was deterministic, with a detailed message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            panic!(
                "Scenario is non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.unique_hashes().len(),
                self.hashes
            );
        }
    }
}

/// Run a scenario `runs` times and compare the final hashes it returns.
pub fn check_determinism<F>(runs: usize, mut scenario: F) -> DeterminismResult
where
    F: FnMut() -> u64,
{
    let hashes: Vec<u64> = (0..runs).map(|_| scenario()).collect();
    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_scenario_is_deterministic() {
        let result = check_determinism(5, || 42);
        assert!(result.is_deterministic);
        assert_eq!(result.unique_hashes(), vec![42]);
        result.assert_deterministic();
    }

    #[test]
    fn diverging_scenario_is_flagged() {
        let mut counter = 0u64;
        let result = check_determinism(3, || {
            counter += 1;
            counter
        });
        assert!(!result.is_deterministic);
        assert_eq!(result.unique_hashes().len(), 3);
    }
}
