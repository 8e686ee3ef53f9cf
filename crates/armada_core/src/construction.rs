//! Per-shipyard build queues.
//!
//! Each shipyard owns an ordered queue of job ids. At most the head job is
//! `Building`; everything behind it is `Queued`. The resolver advances
//! heads once per turn and spawns the finished ship.
//!
//! Queue mutations are atomic with respect to gold: the resolver debits or
//! refunds only when the corresponding queue transition is guaranteed to
//! succeed, so a rejected order never half-applies.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::players::PlayerId;
use crate::structures::StructureId;

/// Unique identifier for a construction job.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct JobId(pub u32);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "job_{}", self.0)
    }
}

/// What a job produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BuildItem {
    /// A new ship, spawned at the shipyard when finished.
    #[default]
    Ship,
}

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    /// In the queue, behind the head.
    Queued,
    /// At the head, accumulating progress each turn.
    Building,
    /// Finished; the item has been spawned.
    Completed,
    /// Cancelled before completion.
    Cancelled,
}

/// One entry in a shipyard's build queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionJob {
    /// Stable identifier.
    pub id: JobId,
    /// Shipyard this job belongs to.
    pub shipyard: StructureId,
    /// Player who paid for the job.
    pub owner: PlayerId,
    /// What is being built.
    pub item: BuildItem,
    /// Turns left; counts down while `Building`.
    pub turns_remaining: u32,
    /// Total build time.
    pub turns_total: u32,
    /// Gold paid at enqueue time (basis for refunds).
    pub cost_paid: u32,
    /// Lifecycle state.
    pub status: JobStatus,
}

/// Outcome of advancing one shipyard's queue head by a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceOutcome {
    /// The job that advanced.
    pub job: JobId,
    /// Its owner.
    pub owner: PlayerId,
    /// What it builds.
    pub item: BuildItem,
    /// Turns left after this advance.
    pub turns_remaining: u32,
    /// True when the job just finished (and was popped from the queue).
    pub completed: bool,
}

/// Detail of a cancelled job, for refund accounting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelledJob {
    /// The cancelled job.
    pub job: JobId,
    /// Its shipyard.
    pub shipyard: StructureId,
    /// Its owner.
    pub owner: PlayerId,
    /// Gold originally paid.
    pub cost_paid: u32,
}

/// All construction jobs and per-shipyard queues.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstructionState {
    jobs: HashMap<JobId, ConstructionJob>,
    queues: HashMap<StructureId, Vec<JobId>>,
    next_id: u32,
}

impl ConstructionState {
    /// Create an empty construction state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            jobs: HashMap::new(),
            queues: HashMap::new(),
            next_id: 1,
        }
    }

    /// Get a job by id.
    #[must_use]
    pub fn job(&self, id: JobId) -> Option<&ConstructionJob> {
        self.jobs.get(&id)
    }

    /// The ordered queue for a shipyard (build order, head first).
    #[must_use]
    pub fn queue(&self, shipyard: StructureId) -> &[JobId] {
        self.queues.get(&shipyard).map_or(&[], Vec::as_slice)
    }

    /// Queue length for a shipyard.
    #[must_use]
    pub fn queue_len(&self, shipyard: StructureId) -> usize {
        self.queue(shipyard).len()
    }

    /// Shipyards with non-empty queues, in id order.
    #[must_use]
    pub fn active_shipyards(&self) -> Vec<StructureId> {
        let mut ids: Vec<_> = self
            .queues
            .iter()
            .filter(|(_, q)| !q.is_empty())
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Enqueue a job. The new job is `Building` iff the queue was empty.
    ///
    /// Capacity must have been checked by the caller (the validator does);
    /// the state itself accepts any enqueue.
    pub fn enqueue(
        &mut self,
        shipyard: StructureId,
        owner: PlayerId,
        item: BuildItem,
        build_turns: u32,
        cost_paid: u32,
    ) -> JobId {
        let id = JobId(self.next_id);
        self.next_id += 1;

        let queue = self.queues.entry(shipyard).or_default();
        let status = if queue.is_empty() {
            JobStatus::Building
        } else {
            JobStatus::Queued
        };
        queue.push(id);

        self.jobs.insert(
            id,
            ConstructionJob {
                id,
                shipyard,
                owner,
                item,
                turns_remaining: build_turns,
                turns_total: build_turns,
                cost_paid,
                status,
            },
        );
        id
    }

    /// Advance the `Building` head of a shipyard's queue by one turn.
    ///
    /// Returns `None` for an empty queue. On completion the job is marked
    /// `Completed`, popped, and the next job (if any) promoted to
    /// `Building`; the caller spawns the built item.
    pub fn advance_head(&mut self, shipyard: StructureId) -> Option<AdvanceOutcome> {
        let head = *self.queues.get(&shipyard)?.first()?;
        let job = self.jobs.get_mut(&head)?;
        debug_assert_eq!(job.status, JobStatus::Building);

        job.turns_remaining = job.turns_remaining.saturating_sub(1);
        let outcome = AdvanceOutcome {
            job: head,
            owner: job.owner,
            item: job.item,
            turns_remaining: job.turns_remaining,
            completed: job.turns_remaining == 0,
        };

        if outcome.completed {
            job.status = JobStatus::Completed;
            self.pop_head_and_promote(shipyard);
        }
        Some(outcome)
    }

    /// Cancel a job: mark `Cancelled`, remove from its queue, promote the
    /// new head if the cancelled job led the queue.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::JobNotFound`] if the job does not exist or is
    /// no longer pending.
    pub fn cancel(&mut self, id: JobId) -> Result<CancelledJob> {
        let job = self.jobs.get_mut(&id).ok_or(GameError::JobNotFound(id))?;
        if !matches!(job.status, JobStatus::Queued | JobStatus::Building) {
            return Err(GameError::JobNotFound(id));
        }

        let was_head = job.status == JobStatus::Building;
        job.status = JobStatus::Cancelled;
        let cancelled = CancelledJob {
            job: id,
            shipyard: job.shipyard,
            owner: job.owner,
            cost_paid: job.cost_paid,
        };

        if let Some(queue) = self.queues.get_mut(&cancelled.shipyard) {
            queue.retain(|j| *j != id);
        }
        if was_head {
            self.promote_head(cancelled.shipyard);
        }
        Ok(cancelled)
    }

    /// Cancel every pending job for a shipyard (used when the yard is
    /// destroyed). Returns the cancelled jobs in queue order.
    pub fn cancel_all_for(&mut self, shipyard: StructureId) -> Vec<CancelledJob> {
        let queue = self.queues.remove(&shipyard).unwrap_or_default();
        let mut out = Vec::with_capacity(queue.len());
        for id in queue {
            if let Some(job) = self.jobs.get_mut(&id) {
                job.status = JobStatus::Cancelled;
                out.push(CancelledJob {
                    job: id,
                    shipyard,
                    owner: job.owner,
                    cost_paid: job.cost_paid,
                });
            }
        }
        out
    }

    fn pop_head_and_promote(&mut self, shipyard: StructureId) {
        if let Some(queue) = self.queues.get_mut(&shipyard) {
            if !queue.is_empty() {
                queue.remove(0);
            }
        }
        self.promote_head(shipyard);
    }

    fn promote_head(&mut self, shipyard: StructureId) {
        if let Some(&head) = self.queues.get(&shipyard).and_then(|q| q.first()) {
            if let Some(job) = self.jobs.get_mut(&head) {
                job.status = JobStatus::Building;
            }
        }
    }

    /// Sorted job ids, for hashing and deterministic inspection.
    #[must_use]
    pub fn sorted_job_ids(&self) -> Vec<JobId> {
        let mut ids: Vec<_> = self.jobs.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
