//! Runner - drives a `Coordinator` with simulated asynchronous work.
//!
//! The coordinator only does bookkeeping; everything that takes time lives
//! here as tokio tasks that sleep and then call a completion trigger.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use anyhow::Context;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tally_core::ports::{EventSink, RecordingEventSink, TracingEventSink};
use tally_core::{Coordinator, CoordinatorCounts, CoordinatorEvent, JobStatus};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use crate::scenario::{ActionSpec, Scenario};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub seed: u64,
    pub timeout: Duration,
    /// Keep every coordinator event for the report, not just satisfactions.
    pub record_events: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub completed: bool,
    pub seed: u64,
    pub elapsed_ms: u64,
    /// Actions in the order they were satisfied.
    pub satisfied: Vec<String>,
    pub pending_jobs: Vec<JobStatus>,
    pub counts: CoordinatorCounts,
    pub failures: Vec<String>,
    /// Every coordinator event in emission order (only with `record_events`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<CoordinatorEvent>,
}

/// Logs every event and remembers the ones the report needs.
#[derive(Default)]
struct RunSink {
    recorder: RecordingEventSink,
    log: TracingEventSink,
    record_all: bool,
}

impl RunSink {
    fn new(record_all: bool) -> Self {
        Self {
            record_all,
            ..Self::default()
        }
    }
}

impl EventSink for RunSink {
    fn emit(&self, event: &CoordinatorEvent) {
        self.log.emit(event);
        if self.record_all || matches!(event, CoordinatorEvent::ActionSatisfied { .. }) {
            self.recorder.emit(event);
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Everything a job callback needs to start an action later on.
#[derive(Clone)]
struct RunContext {
    coordinator: Coordinator,
    handle: Handle,
    rng: Arc<Mutex<StdRng>>,
    min_delay: u64,
    max_delay: u64,
    failures: Arc<Mutex<Vec<String>>>,
}

impl RunContext {
    fn delay(&self) -> Duration {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Duration::from_millis(rng.gen_range(self.min_delay..=self.max_delay))
    }

    fn record_failure(&self, message: String) {
        error!("{message}");
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }

    /// Start `spec` and spawn one simulated call per group member.
    fn start_action(&self, spec: &ActionSpec) -> Result<(), tally_core::CoordinatorError> {
        let trigger = self.coordinator.start_group(&spec.name, spec.count)?;
        info!(action = %spec.name, count = spec.count, "starting");

        for member in 1..=spec.count {
            let delay = self.delay();
            let trigger = trigger.clone();
            let ctx = self.clone();
            let total = spec.count;
            self.handle.spawn(async move {
                tokio::time::sleep(delay).await;
                info!(action = %trigger.name(), member, total, "call finished");
                if let Err(err) = trigger.finish() {
                    ctx.record_failure(format!("finishing {}: {err}", trigger.name()));
                }
            });
        }
        Ok(())
    }

    /// Start `spec` now, or once everything in its `after` list is done.
    fn schedule(&self, spec: &ActionSpec) -> anyhow::Result<()> {
        if spec.after.is_empty() {
            return self
                .start_action(spec)
                .with_context(|| format!("starting action '{}'", spec.name));
        }

        let ctx = self.clone();
        let deferred = spec.clone();
        self.coordinator
            .after(&spec.after, move || {
                if let Err(err) = ctx.start_action(&deferred) {
                    ctx.record_failure(format!("starting {}: {err}", deferred.name));
                }
            })
            .with_context(|| format!("scheduling action '{}'", spec.name))?;
        Ok(())
    }
}

/// Run `scenario` to completion or until `options.timeout` elapses.
pub async fn run(scenario: &Scenario, options: RunOptions) -> anyhow::Result<RunReport> {
    scenario.validate()?;

    let sink = Arc::new(RunSink::new(options.record_events));
    let coordinator = Coordinator::builder()
        .label("scenario")
        .event_sink(sink.clone())
        .build();
    let ctx = RunContext {
        coordinator: coordinator.clone(),
        handle: Handle::current(),
        rng: Arc::new(Mutex::new(StdRng::seed_from_u64(options.seed))),
        min_delay: scenario.min_delay_ms,
        max_delay: scenario.max_delay_ms,
        failures: Arc::new(Mutex::new(Vec::new())),
    };

    let started = Instant::now();
    let (done_tx, done_rx) = oneshot::channel();
    coordinator
        .after(scenario.names(), move || {
            // The receiver is gone only if the run already timed out.
            let _ = done_tx.send(());
        })
        .context("registering completion watcher")?;

    for spec in &scenario.actions {
        ctx.schedule(spec)?;
    }

    let completed = match tokio::time::timeout(options.timeout, done_rx).await {
        Ok(Ok(())) => true,
        Ok(Err(_)) => false,
        Err(_) => {
            warn!(timeout_ms = millis(options.timeout), "run timed out");
            false
        }
    };

    let recorded = sink.recorder.take();
    let satisfied = recorded
        .iter()
        .filter_map(|event| match event {
            CoordinatorEvent::ActionSatisfied { name } => Some(name.to_string()),
            _ => None,
        })
        .collect();
    let events = if options.record_events {
        recorded
    } else {
        Vec::new()
    };
    let failures = ctx
        .failures
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    Ok(RunReport {
        completed,
        seed: options.seed,
        elapsed_ms: millis(started.elapsed()),
        satisfied,
        pending_jobs: coordinator.pending_jobs(),
        counts: coordinator.counts(),
        failures,
        events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> RunOptions {
        RunOptions {
            seed: 7,
            timeout: Duration::from_secs(5),
            record_events: false,
        }
    }

    fn position(report: &RunReport, name: &str) -> usize {
        report
            .satisfied
            .iter()
            .position(|n| n == name)
            .unwrap_or_else(|| panic!("{name} was never satisfied"))
    }

    #[tokio::test]
    async fn fruit_scenario_respects_dependencies() {
        let scenario = Scenario::fruit(1, 5);
        let report = run(&scenario, options()).await.unwrap();

        assert!(report.completed);
        assert!(report.failures.is_empty());
        assert_eq!(report.satisfied.len(), 6);
        assert!(position(&report, "banana") < position(&report, "pear"));
        assert!(position(&report, "peaches") < position(&report, "pear"));
        assert!(position(&report, "strawberries") < position(&report, "pear"));
        assert!(position(&report, "pear") < position(&report, "apple"));
        assert!(position(&report, "strawberries") < position(&report, "oranges"));
        assert!(report.pending_jobs.is_empty());
    }

    #[tokio::test]
    async fn zero_delay_scenario_completes() {
        let scenario = Scenario::from_json(
            r#"{
                "min_delay_ms": 0,
                "max_delay_ms": 0,
                "actions": [
                    { "name": "load", "count": 3 },
                    { "name": "render", "after": ["load"] }
                ]
            }"#,
        )
        .unwrap();

        let report = run(&scenario, options()).await.unwrap();
        assert!(report.completed);
        assert_eq!(report.satisfied, vec!["load", "render"]);
        assert_eq!(report.counts.satisfied_actions, 2);
    }

    #[tokio::test]
    async fn timeout_reports_pending_jobs() {
        let scenario = Scenario::from_json(
            r#"{
                "min_delay_ms": 10000,
                "max_delay_ms": 10000,
                "actions": [ { "name": "slow" }, { "name": "next", "after": ["slow"] } ]
            }"#,
        )
        .unwrap();
        let options = RunOptions {
            seed: 1,
            timeout: Duration::from_millis(20),
            record_events: false,
        };

        let report = run(&scenario, options).await.unwrap();
        assert!(!report.completed);
        assert!(report.satisfied.is_empty());
        // The watcher job and the job that starts `next`.
        assert_eq!(report.pending_jobs.len(), 2);
    }

    #[tokio::test]
    async fn recorded_events_follow_the_run() {
        let scenario = Scenario::from_json(
            r#"{
                "min_delay_ms": 0,
                "max_delay_ms": 0,
                "actions": [
                    { "name": "load" },
                    { "name": "render", "after": ["load"] }
                ]
            }"#,
        )
        .unwrap();
        let options = RunOptions {
            record_events: true,
            ..options()
        };

        let report = run(&scenario, options).await.unwrap();
        assert!(report.completed);

        let kinds: Vec<_> = report.events.iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                // completion watcher, `load` starts, job that starts `render`
                "job_registered",
                "action_registered",
                "job_registered",
                "action_completed",
                "action_satisfied",
                "job_fired",
                "action_registered",
                "action_completed",
                "action_satisfied",
                "job_fired",
            ]
        );
        assert!(matches!(
            &report.events[5],
            CoordinatorEvent::JobFired { trigger, .. } if trigger.as_str() == "load"
        ));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["events"].as_array().map(Vec::len), Some(10));
    }

    #[tokio::test]
    async fn events_are_left_out_unless_requested() {
        let scenario = Scenario::from_json(
            r#"{ "min_delay_ms": 0, "max_delay_ms": 0, "actions": [ { "name": "only" } ] }"#,
        )
        .unwrap();

        let report = run(&scenario, options()).await.unwrap();
        assert!(report.events.is_empty());
        assert_eq!(report.satisfied, vec!["only"]);
        assert!(serde_json::to_value(&report).unwrap().get("events").is_none());
    }

    #[test]
    fn millis_saturates_instead_of_truncating() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
