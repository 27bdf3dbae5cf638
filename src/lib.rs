pub mod classify;
pub mod error;
pub mod files;
pub mod history;
pub mod index;
pub mod interval;
pub mod markers;
pub mod model;
pub mod progress;
pub mod stats;
pub mod summary;

pub use error::{RegfishError, Result};
pub use model::*;
