//! The persisted table index and the incremental builder that feeds it

pub mod builder;
pub mod rows;
pub mod store;

pub use builder::{merge_players, rebuild_players, IndexBuilder, IndexConfig, IndexSummary};
pub use store::IndexStore;
