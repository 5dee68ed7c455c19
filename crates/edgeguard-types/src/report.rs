//! Results reported back from cleanup runs.

use serde::{Deserialize, Serialize};

/// Outcome of an age-based cleanup run.
///
/// `eligible` is what the run planned to delete; `deleted` is what it
/// actually removed (key material and metadata both gone). On a dry run
/// `deleted` is always empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    /// Inactive key ids whose age exceeded the retention window
    pub eligible: Vec<String>,
    /// Ids whose secrets were fully removed
    pub deleted: Vec<String>,
    /// Whether deletion was skipped
    pub dry_run: bool,
}

impl CleanupReport {
    /// Ids that were planned but not removed.
    pub fn remaining(&self) -> Vec<&str> {
        self.eligible
            .iter()
            .filter(|id| !self.deleted.contains(id))
            .map(String::as_str)
            .collect()
    }

    /// Whether the run had nothing to do.
    pub fn is_empty(&self) -> bool {
        self.eligible.is_empty()
    }
}
