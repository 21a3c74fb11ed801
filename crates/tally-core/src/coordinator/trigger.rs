use std::fmt;

use super::Coordinator;
use crate::domain::{ActionName, CoordinatorError};

/// Completion trigger returned by `Coordinator::start`.
///
/// Calling `finish` is the same as `coordinator.finish(name)`. Clone it to
/// hand one to every member of an action group.
#[derive(Clone)]
pub struct CompletionTrigger {
    coordinator: Coordinator,
    name: ActionName,
}

impl CompletionTrigger {
    pub(crate) fn new(coordinator: Coordinator, name: ActionName) -> Self {
        Self { coordinator, name }
    }

    pub fn name(&self) -> &ActionName {
        &self.name
    }

    pub fn finish(&self) -> Result<(), CoordinatorError> {
        self.coordinator.finish_action(&self.name)
    }
}

impl fmt::Debug for CompletionTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionTrigger")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
