//! tally-core
//!
//! In-process coordination of named actions and the jobs that wait on them.
//!
//! # Modules
//! - **domain**: ids, action names, requirement state, job records, errors, events
//! - **ports**: `EventSink` and its provided implementations
//! - **coordinator**: `Coordinator`, `CompletionTrigger`, `CoordinatorBuilder`
//! - **observability**: serializable status views
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use tally_core::Coordinator;
//!
//! let coordinator = Coordinator::new();
//! let done = Arc::new(AtomicBool::new(false));
//!
//! let peaches = coordinator.start_group("peaches", 2)?;
//! let flag = done.clone();
//! coordinator.after(["peaches"], move || flag.store(true, Ordering::SeqCst))?;
//!
//! peaches.finish()?;
//! assert!(!done.load(Ordering::SeqCst));
//! peaches.finish()?;
//! assert!(done.load(Ordering::SeqCst));
//! # Ok::<(), tally_core::CoordinatorError>(())
//! ```

pub mod coordinator;
pub mod domain;
pub mod observability;
pub mod ports;

pub use coordinator::{CompletionTrigger, Coordinator, CoordinatorBuilder};
pub use domain::{ActionName, CoordinatorError, CoordinatorEvent, JobId, RequirementState};
pub use observability::{ActionStatus, CoordinatorCounts, JobStatus};
