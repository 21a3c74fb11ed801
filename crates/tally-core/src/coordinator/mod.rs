//! Coordinator: named actions, jobs waiting on them, and the sweep that
//! fires jobs once everything they need is done.
//!
//! Control flow:
//! - `start` / `start_group` register an action and hand back a
//!   `CompletionTrigger`.
//! - `after` registers a job and checks it right away against names that
//!   are already active.
//! - `finish` counts one completion and, once the count reaches zero,
//!   sweeps that name's waiting list.
//!
//! # Re-entrancy
//! Job callbacks run on the caller's stack with no internal lock held, and
//! may call any coordinator method, including on the name being swept.
//! A sweep iterates over a snapshot of the waiting list, and a job is
//! removed from the table before its callback runs, so no job can fire
//! twice even when nested or concurrent sweeps visit it.

mod builder;
mod state;
mod trigger;

pub use self::builder::CoordinatorBuilder;
pub use self::trigger::CompletionTrigger;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, debug_span, trace};

use self::state::{Attach, CoordinatorState};
use crate::domain::{ActionName, CoordinatorError, CoordinatorEvent, JobId};
use crate::observability::{ActionStatus, CoordinatorCounts, JobStatus};
use crate::ports::{EventSink, NoopEventSink};

/// Handle to one coordinator. Clones share the same registry.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

struct Inner {
    label: Option<String>,
    state: Mutex<CoordinatorState>,
    sink: Arc<dyn EventSink>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::from_parts(None, Arc::new(NoopEventSink))
    }

    pub fn builder() -> CoordinatorBuilder {
        CoordinatorBuilder::new()
    }

    pub(crate) fn from_parts(label: Option<String>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            inner: Arc::new(Inner {
                label,
                state: Mutex::new(CoordinatorState::new()),
                sink,
            }),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.inner.label.as_deref()
    }

    /// Register a single action. Same as `start_group(name, 1)`.
    pub fn start(&self, name: impl AsRef<str>) -> Result<CompletionTrigger, CoordinatorError> {
        self.start_group(name, 1)
    }

    /// Register an action group that needs `count` completions.
    ///
    /// A name may be started once. Jobs that referenced it earlier keep
    /// waiting on it.
    pub fn start_group(
        &self,
        name: impl AsRef<str>,
        count: u32,
    ) -> Result<CompletionTrigger, CoordinatorError> {
        let name = ActionName::new(name)?;
        if count == 0 {
            return Err(CoordinatorError::InvalidCount { name, count });
        }

        let _span = debug_span!("start", coordinator = self.log_label(), %name).entered();
        let waiting = self.lock().register_action(&name, count)?;
        debug!(count, waiting, "action registered");
        self.emit(CoordinatorEvent::ActionRegistered {
            name: name.clone(),
            count,
            waiting,
        });

        Ok(CompletionTrigger::new(self.clone(), name))
    }

    /// Count one completion of `name`.
    ///
    /// Completing more often than the declared count is a no-op past zero.
    /// May run job callbacks before returning.
    pub fn finish(&self, name: impl AsRef<str>) -> Result<(), CoordinatorError> {
        let name = ActionName::new(name)?;
        self.finish_action(&name)
    }

    pub(crate) fn finish_action(&self, name: &ActionName) -> Result<(), CoordinatorError> {
        let _span = debug_span!("finish", coordinator = self.log_label(), %name).entered();
        let completion = self.lock().complete(name)?;
        debug!(remaining = completion.remaining, "completion counted");
        self.emit(CoordinatorEvent::ActionCompleted {
            name: name.clone(),
            remaining: completion.remaining,
        });
        if completion.just_satisfied {
            self.emit(CoordinatorEvent::ActionSatisfied { name: name.clone() });
        }

        // Nothing can fire while this name still has outstanding completions.
        if completion.remaining == 0 {
            self.sweep(name);
        }
        Ok(())
    }

    /// Register `callback` to run once every name in `names` is satisfied.
    ///
    /// Names nobody has started yet become placeholders. If everything is
    /// already satisfied the callback runs before this returns.
    pub fn after<I, S, F>(&self, names: I, callback: F) -> Result<JobId, CoordinatorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnOnce() + Send + 'static,
    {
        let requires = names
            .into_iter()
            .map(ActionName::new)
            .collect::<Result<Vec<_>, _>>()?;
        if requires.is_empty() {
            return Err(CoordinatorError::EmptyRequirements);
        }

        let job_id = self.lock().insert_job(requires.clone(), Box::new(callback));
        let _span = debug_span!("after", coordinator = self.log_label(), %job_id).entered();
        debug!(?requires, "job registered");
        self.emit(CoordinatorEvent::JobRegistered {
            job_id,
            requires: requires.clone(),
        });

        for name in &requires {
            let attach = self.lock().attach(job_id, name);
            match attach {
                Attach::Active => self.sweep(name),
                Attach::Placeholder => {}
                Attach::Gone => break,
            }
        }
        Ok(job_id)
    }

    /// Fire every job waiting on `name` whose requirements are all met.
    fn sweep(&self, name: &ActionName) {
        let snapshot = self.lock().waiting_snapshot(name);
        trace!(%name, jobs = snapshot.len(), "sweep");

        for job_id in snapshot {
            let ready = self.lock().take_ready(job_id);
            let Some(job) = ready else {
                continue;
            };
            self.emit(CoordinatorEvent::JobFired {
                job_id,
                trigger: name.clone(),
            });
            job.fire();
        }

        self.lock().prune_waiting(name);
    }

    pub fn is_satisfied(&self, name: impl AsRef<str>) -> bool {
        self.lock().is_satisfied(name.as_ref())
    }

    pub fn action_status(&self, name: impl AsRef<str>) -> Option<ActionStatus> {
        self.lock().action_status(name.as_ref())
    }

    /// Jobs that have not fired, oldest first.
    pub fn pending_jobs(&self) -> Vec<JobStatus> {
        self.lock().pending_jobs()
    }

    pub fn counts(&self) -> CoordinatorCounts {
        self.lock().counts()
    }

    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        // State is only mutated by non-panicking bookkeeping, so a poisoned
        // lock still guards consistent data.
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: CoordinatorEvent) {
        self.inner.sink.emit(&event);
    }

    fn log_label(&self) -> &str {
        self.label().unwrap_or("-")
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("label", &self.inner.label)
            .field("counts", &self.counts())
            .finish_non_exhaustive()
    }
}
