//! # kvchain-replica
//!
//! Combines independently grown logs and exposes the per-machine register.
//!
//! - [`MergeEngine`]: imports a foreign log while preserving chain integrity;
//!   concurrent writes from other machines survive as branches.
//! - [`Replica`]: save/delete/load/merge for one machine over a [`StorageEngine`].
//!
//! [`StorageEngine`]: kvchain_storage::StorageEngine

pub mod merge;
pub mod replica;

pub use merge::{LineageRejection, MergeEngine, MergeReport};
pub use replica::Replica;
