pub mod storage;

pub use storage::{ILogStorage, IReadOnlyLogStorage};
