//! Requirement - action 名ひとつ分の状態遷移
//!
//! 旧来の `-1` 番兵の代わりに enum で「未登録（placeholder）」と
//! 「登録済み（残りカウント付き）」を区別します。

use serde::{Deserialize, Serialize};

use super::ids::JobId;

/// What the registry knows about one action name.
///
/// State transitions:
/// - Unregistered -> Active(count) -> ... -> Active(0)
/// - Active(0) is terminal: the count never moves again and the name can
///   never be registered a second time.
///
/// `waiting` keeps insertion order and is not deduplicated: a job that lists
/// the same name twice is queued twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Referenced by a job before anyone started it. Always blocks.
    Unregistered { waiting: Vec<JobId> },

    /// Started with a completion count; `remaining == 0` means satisfied.
    Active { remaining: u32, waiting: Vec<JobId> },
}

/// Coarse state of a requirement, for status views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementState {
    Placeholder,
    Pending,
    Satisfied,
}

/// Result of a single completion against an active requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub remaining: u32,

    /// True only for the completion that moved the count from 1 to 0.
    pub just_satisfied: bool,
}

impl Requirement {
    pub fn placeholder(job_id: JobId) -> Self {
        Requirement::Unregistered {
            waiting: vec![job_id],
        }
    }

    pub fn active(count: u32) -> Self {
        Requirement::Active {
            remaining: count,
            waiting: Vec::new(),
        }
    }

    pub fn state(&self) -> RequirementState {
        match self {
            Requirement::Unregistered { .. } => RequirementState::Placeholder,
            Requirement::Active { remaining: 0, .. } => RequirementState::Satisfied,
            Requirement::Active { .. } => RequirementState::Pending,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Requirement::Active { .. })
    }

    /// Satisfied means started and counted all the way down.
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Requirement::Active { remaining: 0, .. })
    }

    /// `None` while the name is still a placeholder.
    pub fn remaining(&self) -> Option<u32> {
        match self {
            Requirement::Unregistered { .. } => None,
            Requirement::Active { remaining, .. } => Some(*remaining),
        }
    }

    pub fn waiting(&self) -> &[JobId] {
        match self {
            Requirement::Unregistered { waiting } | Requirement::Active { waiting, .. } => waiting,
        }
    }

    pub fn push_waiting(&mut self, job_id: JobId) {
        self.waiting_mut().push(job_id);
    }

    pub fn retain_waiting(&mut self, keep: impl FnMut(&JobId) -> bool) {
        self.waiting_mut().retain(keep);
    }

    /// Promote a placeholder to an active requirement, keeping its waiters.
    ///
    /// Returns `false` (and changes nothing) if the requirement is already
    /// active.
    pub fn activate(&mut self, count: u32) -> bool {
        match self {
            Requirement::Active { .. } => false,
            Requirement::Unregistered { waiting } => {
                let waiting = std::mem::take(waiting);
                *self = Requirement::Active {
                    remaining: count,
                    waiting,
                };
                true
            }
        }
    }

    /// Count one completion, floored at zero.
    ///
    /// Returns `None` for a placeholder: only active requirements can be
    /// completed.
    pub fn complete_one(&mut self) -> Option<Completion> {
        match self {
            Requirement::Unregistered { .. } => None,
            Requirement::Active { remaining, .. } => {
                let before = *remaining;
                *remaining = before.saturating_sub(1);
                Some(Completion {
                    remaining: *remaining,
                    just_satisfied: before == 1,
                })
            }
        }
    }

    fn waiting_mut(&mut self) -> &mut Vec<JobId> {
        match self {
            Requirement::Unregistered { waiting } | Requirement::Active { waiting, .. } => waiting,
        }
    }
}
