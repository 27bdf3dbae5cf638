pub mod player;
pub mod table;

pub use player::{ColorStatus, IndexedPlayer};
pub use table::{
    parse_timestamp, Elimination, Player, Table, TableData, TableFileMeta, TableId, TIMESTAMP_FORMAT,
};
