//! Tournament summary files

pub mod reader;

pub use reader::{parse_price, parse_table_id, read_summary, read_summary_file};
