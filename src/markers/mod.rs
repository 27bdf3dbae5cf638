//! Color-marker files

pub mod reader;

pub use reader::{read_marker, read_markers, MarkerDocument};
