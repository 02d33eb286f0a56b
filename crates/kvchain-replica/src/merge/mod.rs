pub mod engine;
pub mod report;

pub use engine::MergeEngine;
pub use report::{LineageRejection, MergeReport};
