//! Per-machine mutation counts carried along a lineage.
//!
//! # Examples
//!
//! ```
//! use kvchain_core::ChangeTally;
//!
//! let first = ChangeTally::new().with_change("machine-a", 1);
//! let second = first.with_change("machine-a", 1).with_change("machine-b", 1);
//!
//! assert_eq!(first.changes("machine-a"), 1);
//! assert_eq!(second.changes("machine-a"), 2);
//! assert_eq!(second.total(), 3);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::KvResult;

/// Machine ID → number of times that machine mutated the lineage.
///
/// Cumulative and carried forward on each new entry. An audit signal only;
/// it never participates in ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeTally(BTreeMap<String, u32>);

impl ChangeTally {
    /// Create an empty tally.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Count recorded for `machine_id`, zero when absent.
    pub fn changes(&self, machine_id: &str) -> u32 {
        self.0.get(machine_id).copied().unwrap_or(0)
    }

    /// A copy of this tally with `changes` added for `machine_id`.
    pub fn with_change(&self, machine_id: &str, changes: u32) -> Self {
        let mut next = self.0.clone();
        *next.entry(machine_id.to_string()).or_insert(0) += changes;
        Self(next)
    }

    /// Sum over all machines.
    pub fn total(&self) -> u64 {
        self.0.values().map(|&c| u64::from(c)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Encode as JSON text for a structured column.
    pub fn to_json(&self) -> KvResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from the JSON text written by [`ChangeTally::to_json`].
    pub fn from_json(json: &str) -> KvResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl FromIterator<(String, u32)> for ChangeTally {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
