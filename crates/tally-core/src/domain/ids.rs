//! Domain identifiers (strongly-typed IDs).
//!
//! # JobId
//! coordinator ごとに 1 から連番で払い出す ID です。
//! - 発火済みの job の ID は再利用しない
//! - 古い ID を引いても別の job に化けず「見つからない」になる

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a registered job.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(u64);

impl JobId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Hands out `JobId`s in allocation order, starting at 1.
#[derive(Debug)]
pub struct JobIdAllocator {
    next: u64,
}

impl JobIdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn allocate(&mut self) -> JobId {
        let id = JobId::new(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    #[cfg(test)]
    pub(crate) fn issued(&self) -> u64 {
        self.next - 1
    }
}

impl Default for JobIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_has_job_prefix() {
        assert_eq!(JobId::new(7).to_string(), "job-7");
    }

    #[test]
    fn allocator_is_dense_and_monotonic() {
        let mut ids = JobIdAllocator::new();
        let a = ids.allocate();
        let b = ids.allocate();
        let c = ids.allocate();

        assert_eq!(a.as_u64(), 1);
        assert_eq!(b.as_u64(), 2);
        assert_eq!(c.as_u64(), 3);
        assert!(a < b && b < c);
        assert_eq!(ids.issued(), 3);
    }

    #[test]
    fn job_id_serializes_as_plain_number() {
        let serialized = serde_json::to_string(&JobId::new(42)).unwrap();
        assert_eq!(serialized, "42");

        let back: JobId = serde_json::from_str(&serialized).unwrap();
        assert_eq!(back, JobId::new(42));
    }
}
