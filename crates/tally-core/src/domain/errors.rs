//! Errors returned by coordinator operations.
//!
//! Every variant is a contract violation by the direct caller. Nothing is
//! retried and nothing is partially applied when one of these is returned.

use thiserror::Error;

use super::name::ActionName;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    /// `start` on a name that is already a real registration.
    #[error("action '{0}' is already registered")]
    DuplicateRegistration(ActionName),

    /// `finish` on a name that was never started (a placeholder created by a
    /// waiting job does not count).
    #[error("action '{0}' is not registered")]
    UnregisteredAction(ActionName),

    #[error("a job must require at least one action")]
    EmptyRequirements,

    #[error("action '{name}' needs at least one completion (got {count})")]
    InvalidCount { name: ActionName, count: u32 },

    #[error("action names must not be empty")]
    InvalidName,
}
