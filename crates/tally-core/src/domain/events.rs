//! Events - what the coordinator reports to its `EventSink`.

use serde::Serialize;

use super::ids::JobId;
use super::name::ActionName;

/// CoordinatorEvent is emitted after the state change it describes has been
/// committed. Events are never emitted while the coordinator lock is held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CoordinatorEvent {
    /// A name became active. `waiting` counts jobs that referenced it
    /// before it was started.
    ActionRegistered {
        name: ActionName,
        count: u32,
        waiting: usize,
    },

    ActionCompleted { name: ActionName, remaining: u32 },

    /// The completion that brought `name` to zero.
    ActionSatisfied { name: ActionName },

    JobRegistered {
        job_id: JobId,
        requires: Vec<ActionName>,
    },

    /// `trigger` is the name whose sweep fired the job.
    JobFired { job_id: JobId, trigger: ActionName },
}

impl CoordinatorEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            CoordinatorEvent::ActionRegistered { .. } => "action_registered",
            CoordinatorEvent::ActionCompleted { .. } => "action_completed",
            CoordinatorEvent::ActionSatisfied { .. } => "action_satisfied",
            CoordinatorEvent::JobRegistered { .. } => "job_registered",
            CoordinatorEvent::JobFired { .. } => "job_fired",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_tag_matches_kind() {
        let event = CoordinatorEvent::JobFired {
            job_id: JobId::new(2),
            trigger: ActionName::new("pear").unwrap(),
        };
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["event"], event.kind());
        assert_eq!(value["job_id"], 2);
        assert_eq!(value["trigger"], "pear");
    }
}
