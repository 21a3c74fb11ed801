use serde::Serialize;

use crate::domain::{ActionName, JobId, RequirementState};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoordinatorCounts {
    /// Names referenced by jobs but never started.
    pub placeholders: usize,
    pub pending_actions: usize,
    pub satisfied_actions: usize,
    pub pending_jobs: usize,
    pub fired_jobs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionStatus {
    pub name: ActionName,
    pub state: RequirementState,
    /// `None` for placeholders.
    pub remaining: Option<u32>,
    pub waiting_jobs: usize,
}

/// A job that has not fired yet, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStatus {
    pub job_id: JobId,
    pub requires: Vec<ActionName>,
    /// Required names that are not yet satisfied, in `requires` order.
    pub waiting_on: Vec<ActionName>,
}
