//! Job record: a callback plus the action names it waits on.

use std::fmt;

use super::ids::JobId;
use super::name::ActionName;

/// Opaque zero-argument work run once all requirements are satisfied.
pub type JobCallback = Box<dyn FnOnce() + Send + 'static>;

/// A pending job.
///
/// Design:
/// - The record lives in the job table only while the job is pending.
/// - Firing consumes the record, so the callback can run at most once.
pub struct JobRecord {
    id: JobId,
    requires: Vec<ActionName>,
    callback: JobCallback,
}

impl JobRecord {
    pub fn new(id: JobId, requires: Vec<ActionName>, callback: JobCallback) -> Self {
        Self {
            id,
            requires,
            callback,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    /// Required names in registration order.
    pub fn requires(&self) -> &[ActionName] {
        &self.requires
    }

    /// Consume the record and run the callback.
    pub fn fire(self) {
        (self.callback)();
    }
}

impl fmt::Debug for JobRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobRecord")
            .field("id", &self.id)
            .field("requires", &self.requires)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn fire_runs_callback() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let record = JobRecord::new(
            JobId::new(1),
            vec![ActionName::new("a").unwrap()],
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(record.requires().len(), 1);
        record.fire();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn debug_omits_callback() {
        let record = JobRecord::new(
            JobId::new(3),
            vec![ActionName::new("pear").unwrap()],
            Box::new(|| {}),
        );
        let rendered = format!("{record:?}");
        assert!(rendered.contains("JobId(3)"));
        assert!(rendered.contains("pear"));
    }
}
