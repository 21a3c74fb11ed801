//! CoordinatorBuilder - wiring for a `Coordinator`.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use tally_core::{Coordinator, ports::TracingEventSink};
//!
//! let coordinator = Coordinator::builder()
//!     .label("checkout")
//!     .event_sink(Arc::new(TracingEventSink))
//!     .build();
//! assert_eq!(coordinator.label(), Some("checkout"));
//! ```

use std::sync::Arc;

use super::Coordinator;
use crate::ports::{EventSink, NoopEventSink};

pub struct CoordinatorBuilder {
    label: Option<String>,
    sink: Arc<dyn EventSink>,
}

impl CoordinatorBuilder {
    pub fn new() -> Self {
        Self {
            label: None,
            sink: Arc::new(NoopEventSink),
        }
    }

    /// Name recorded on every log line this coordinator produces.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn build(self) -> Coordinator {
        Coordinator::from_parts(self.label, self.sink)
    }
}

impl Default for CoordinatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CoordinatorEvent;
    use crate::ports::RecordingEventSink;

    #[test]
    fn default_build_has_no_label() {
        let coordinator = CoordinatorBuilder::new().build();
        assert_eq!(coordinator.label(), None);
    }

    #[test]
    fn build_wires_event_sink() {
        let sink = Arc::new(RecordingEventSink::new());
        let coordinator = CoordinatorBuilder::new()
            .label("fruit")
            .event_sink(sink.clone())
            .build();

        coordinator.start("apple").unwrap();

        assert_eq!(coordinator.label(), Some("fruit"));
        assert!(matches!(
            sink.events().as_slice(),
            [CoordinatorEvent::ActionRegistered { count: 1, .. }]
        ));
    }
}
