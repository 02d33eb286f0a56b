use serde::{Deserialize, Serialize};

/// Identity and merge behavior of the local machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicaConfig {
    /// Stable identifier of this machine. Required.
    pub machine_id: String,
    /// Upper bound on deferral passes in one merge. Default: 16.
    pub max_merge_passes: usize,
    /// Retired entries younger than this survive reclamation. Default: 7 days.
    pub reclaim_grace_secs: u64,
}

impl Default for ReplicaConfig {
    fn default() -> Self {
        Self {
            machine_id: String::new(),
            max_merge_passes: 16,
            reclaim_grace_secs: 7 * 24 * 60 * 60,
        }
    }
}
