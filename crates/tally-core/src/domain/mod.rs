//! Domain model (ids, names, requirement state, job records, errors, events).

pub mod errors;
pub mod events;
pub mod ids;
pub mod job;
pub mod name;
pub mod requirement;

pub use errors::CoordinatorError;
pub use events::CoordinatorEvent;
pub use ids::{JobId, JobIdAllocator};
pub use job::{JobCallback, JobRecord};
pub use name::ActionName;
pub use requirement::{Completion, Requirement, RequirementState};
