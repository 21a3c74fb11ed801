//! EventSink port - coordinator の状態変化を観測する
//!
//! # 実装
//! - **NoopEventSink**: 何もしない（デフォルト）
//! - **TracingEventSink**: `tracing` にログとして流す
//! - **RecordingEventSink**: メモリに溜める（テストと CLI のレポート用）

use std::sync::{Mutex, PoisonError};

use tracing::{debug, info};

use crate::domain::CoordinatorEvent;

/// EventSink receives every `CoordinatorEvent`.
///
/// `emit` is called with no coordinator lock held, but it runs on the call
/// stack of the operation that produced the event, so it should return
/// quickly.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &CoordinatorEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: &CoordinatorEvent) {}
}

/// Logs job firings and satisfied actions at `info`, everything else at
/// `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &CoordinatorEvent) {
        match event {
            CoordinatorEvent::JobFired { job_id, trigger } => {
                info!(%job_id, %trigger, "job fired");
            }
            CoordinatorEvent::ActionSatisfied { name } => {
                info!(%name, "action satisfied");
            }
            CoordinatorEvent::ActionRegistered {
                name,
                count,
                waiting,
            } => {
                debug!(%name, count, waiting, "action registered");
            }
            CoordinatorEvent::ActionCompleted { name, remaining } => {
                debug!(%name, remaining, "action completed");
            }
            CoordinatorEvent::JobRegistered { job_id, requires } => {
                debug!(%job_id, ?requires, "job registered");
            }
        }
    }
}

/// Keeps every event in emission order.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<CoordinatorEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CoordinatorEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<CoordinatorEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: &CoordinatorEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
