//! Ports - seams between the coordinator and the outside world.
//!
//! The coordinator itself never performs I/O. Anything that wants to watch
//! it (logs, test recorders, reports) plugs in through `EventSink`.

pub mod event_sink;

pub use self::event_sink::{EventSink, NoopEventSink, RecordingEventSink, TracingEventSink};
