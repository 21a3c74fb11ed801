//! Coordinator state: the requirement registry and the job table.
//!
//! Everything here is synchronous bookkeeping. Callbacks are never invoked
//! from this module; `take_ready` hands the record back to the caller so it
//! can be fired after the lock is released.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::domain::{
    ActionName, Completion, CoordinatorError, JobCallback, JobId, JobIdAllocator, JobRecord,
    Requirement, RequirementState,
};
use crate::observability::{ActionStatus, CoordinatorCounts, JobStatus};

/// How a job was attached to one of its required names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Attach {
    /// Appended to an active requirement; a sweep may fire it now.
    Active,
    /// Appended to (or created) a placeholder; it cannot fire yet.
    Placeholder,
    /// The job already fired, nothing to attach.
    Gone,
}

pub(crate) struct CoordinatorState {
    /// name -> requirement (single source of truth for readiness).
    requirements: HashMap<ActionName, Requirement>,

    /// Pending jobs only. A fired job is removed before its callback runs.
    jobs: HashMap<JobId, JobRecord>,

    ids: JobIdAllocator,

    fired: u64,
}

impl CoordinatorState {
    pub(crate) fn new() -> Self {
        Self {
            requirements: HashMap::new(),
            jobs: HashMap::new(),
            ids: JobIdAllocator::new(),
            fired: 0,
        }
    }

    /// Start `name` with `count` outstanding completions.
    ///
    /// Returns the number of jobs that were already waiting on it.
    pub(crate) fn register_action(
        &mut self,
        name: &ActionName,
        count: u32,
    ) -> Result<usize, CoordinatorError> {
        match self.requirements.entry(name.clone()) {
            Entry::Vacant(e) => {
                e.insert(Requirement::active(count));
                Ok(0)
            }
            Entry::Occupied(mut e) => {
                if !e.get_mut().activate(count) {
                    return Err(CoordinatorError::DuplicateRegistration(name.clone()));
                }
                Ok(e.get().waiting().len())
            }
        }
    }

    pub(crate) fn complete(&mut self, name: &ActionName) -> Result<Completion, CoordinatorError> {
        self.requirements
            .get_mut(name)
            .and_then(Requirement::complete_one)
            .ok_or_else(|| CoordinatorError::UnregisteredAction(name.clone()))
    }

    pub(crate) fn insert_job(&mut self, requires: Vec<ActionName>, callback: JobCallback) -> JobId {
        let id = self.ids.allocate();
        self.jobs.insert(id, JobRecord::new(id, requires, callback));
        id
    }

    pub(crate) fn attach(&mut self, job_id: JobId, name: &ActionName) -> Attach {
        if !self.jobs.contains_key(&job_id) {
            return Attach::Gone;
        }
        match self.requirements.entry(name.clone()) {
            Entry::Vacant(e) => {
                e.insert(Requirement::placeholder(job_id));
                Attach::Placeholder
            }
            Entry::Occupied(mut e) => {
                let requirement = e.get_mut();
                requirement.push_waiting(job_id);
                if requirement.is_active() {
                    Attach::Active
                } else {
                    Attach::Placeholder
                }
            }
        }
    }

    /// Copy of the waiting list, taken before a sweep iterates it.
    pub(crate) fn waiting_snapshot(&self, name: &ActionName) -> Vec<JobId> {
        self.requirements
            .get(name)
            .map(|req| req.waiting().to_vec())
            .unwrap_or_default()
    }

    /// Remove and return the job if every requirement is satisfied.
    ///
    /// Returns `None` for jobs that still wait, and for ids that already
    /// fired (they are no longer in the table).
    pub(crate) fn take_ready(&mut self, job_id: JobId) -> Option<JobRecord> {
        let job = self.jobs.get(&job_id)?;
        if !self.all_satisfied(job.requires()) {
            return None;
        }
        self.fired += 1;
        self.jobs.remove(&job_id)
    }

    /// Drop fired jobs from `name`'s waiting list. Jobs appended while the
    /// sweep was running stay put.
    pub(crate) fn prune_waiting(&mut self, name: &ActionName) {
        let jobs = &self.jobs;
        if let Some(req) = self.requirements.get_mut(name) {
            req.retain_waiting(|id| jobs.contains_key(id));
        }
    }

    fn all_satisfied(&self, names: &[ActionName]) -> bool {
        names.iter().all(|name| {
            self.requirements
                .get(name)
                .is_some_and(Requirement::is_satisfied)
        })
    }

    pub(crate) fn is_satisfied(&self, name: &str) -> bool {
        self.requirements
            .get(name)
            .is_some_and(Requirement::is_satisfied)
    }

    pub(crate) fn action_status(&self, name: &str) -> Option<ActionStatus> {
        let (name, req) = self.requirements.get_key_value(name)?;
        Some(ActionStatus {
            name: name.clone(),
            state: req.state(),
            remaining: req.remaining(),
            waiting_jobs: req.waiting().len(),
        })
    }

    /// Pending jobs in id (registration) order.
    pub(crate) fn pending_jobs(&self) -> Vec<JobStatus> {
        let mut pending: Vec<JobStatus> = self
            .jobs
            .values()
            .map(|job| JobStatus {
                job_id: job.id(),
                requires: job.requires().to_vec(),
                waiting_on: job
                    .requires()
                    .iter()
                    .filter(|name| !self.is_satisfied(name.as_str()))
                    .cloned()
                    .collect(),
            })
            .collect();
        pending.sort_by_key(|status| status.job_id);
        pending
    }

    pub(crate) fn counts(&self) -> CoordinatorCounts {
        let mut counts = CoordinatorCounts {
            pending_jobs: self.jobs.len(),
            fired_jobs: self.fired,
            ..CoordinatorCounts::default()
        };
        for req in self.requirements.values() {
            match req.state() {
                RequirementState::Placeholder => counts.placeholders += 1,
                RequirementState::Pending => counts.pending_actions += 1,
                RequirementState::Satisfied => counts.satisfied_actions += 1,
            }
        }
        counts
    }
}
