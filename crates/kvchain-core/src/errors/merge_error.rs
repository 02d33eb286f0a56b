//! Per-lineage merge rejections.

/// Reasons a foreign entry cannot join the local log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// The predecessor exists locally but was already extended by a different entry.
    #[error("forked lineage: {entry_id} extends {previous_entry_id}, which already has a successor")]
    ForkedLineage {
        entry_id: String,
        previous_entry_id: String,
    },

    /// A lineage root arrived while the machine already has a live head for the key.
    #[error("divergent lineage for key {key:?} on machine {machine_id}: local head {head_entry_id}, incoming root {entry_id}")]
    DivergentLineage {
        key: String,
        machine_id: String,
        head_entry_id: String,
        entry_id: String,
    },
}
