//! Identifiers for scoring and aggregation runs.
//!
//! Every `score_batch` / `aggregate_skills` call opens one run with a fresh
//! ULID; the id is attached to the run's tracing span so log lines of one
//! batch can be grouped. The process id is shared by every run of the
//! process, so a report can be traced back to the invocation that built it.
//!
//! # Example
//! ```
//! use jm_common::run_id::{self, RunId};
//!
//! let run = RunId::new();
//! println!("process {} run {}", run_id::process(), run);
//! ```

use std::fmt;

use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};
use ulid::Ulid;

static PROCESS_ID: Lazy<RunId> = Lazy::new(RunId::new);

/// Time-ordered, 26 characters, URL-safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(Ulid);

impl RunId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for RunId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The process-level id, generated on first access.
pub fn process() -> RunId {
    *PROCESS_ID
}
