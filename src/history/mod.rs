//! Hand-history files

pub mod blocks;
pub mod order;
pub mod scanner;

pub use blocks::{hand_blocks, parse_seat_nickname, HandBlock};
pub use order::sorted_hand_files;
pub use scanner::{HandScanner, ScanResult};
