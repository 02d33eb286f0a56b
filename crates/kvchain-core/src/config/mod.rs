//! Configuration system for kvchain.
//! TOML-based, 3-layer resolution: env > file > defaults.

pub mod kv_config;
pub mod replica_config;
pub mod storage_config;

pub use kv_config::KvConfig;
pub use replica_config::ReplicaConfig;
pub use storage_config::StorageConfig;
