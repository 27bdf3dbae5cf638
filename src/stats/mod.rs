//! Read-only statistics over the index: reg/fish buckets, time report and exports

pub mod aggregator;
pub mod export;
pub mod report;

pub use aggregator::{
    aggregate, parse_multiplier, Aggregation, StatsConfig, TableStat, DEFAULT_LAST_TABLES,
    DEFAULT_MULTIPLIER,
};
pub use export::{bucket_folder, ExportOptions, RunFolder, HANDS_PER_FILE, STAT_FILE_NAME};
pub use report::{stat_lines, BucketKey, Counter, ReportHeader, TimeReport, DAY_NAMES};

use crate::error::Result;
use crate::files::collect_table_files;
use crate::index::IndexStore;
use crate::model::TIMESTAMP_FORMAT;
use crate::progress::Progress;
use chrono::{NaiveDateTime, TimeZone};
use std::path::PathBuf;

/// Inputs of a statistics run
#[derive(Debug, Clone)]
pub struct StatsRequest {
    /// Hand files of the tables to report on
    pub hand_dir: PathBuf,
    /// Summary files of the tables to report on
    pub summary_dir: PathBuf,
    pub config: StatsConfig,
    pub export: ExportOptions,
}

/// What a statistics run produced
#[derive(Debug, Clone)]
pub struct StatsOutcome {
    pub run_folder: PathBuf,
    pub header: Vec<String>,
    pub lines: Vec<String>,
    pub aggregation: Aggregation,
}

/// Aggregate the calc tables against the index, write `stats.txt` and the
/// selected exports into a new run folder under the store root.
///
/// `started` is the local wall-clock time of the run.
pub fn run_stats<Tz, P>(
    store: &IndexStore,
    request: &StatsRequest,
    tz: &Tz,
    started: &NaiveDateTime,
    progress: &P,
) -> Result<StatsOutcome>
where
    Tz: TimeZone,
    P: Progress,
{
    log::info!("Run statistics");
    let index = store.load_tables()?;
    let players = store.load_players()?;
    let files = collect_table_files(&request.hand_dir, &request.summary_dir, None)?;

    let aggregation = aggregate(files, &index, &players, &request.config, tz, progress)?;

    let config = &request.config;
    let header = ReportHeader {
        run_time: started.format(TIMESTAMP_FORMAT).to_string(),
        mode: config.mode,
        reg_tables: config.reg_tables,
        reg_hands: config.reg_hands,
        interval: &config.interval,
        buy_in: config.buy_in,
        last: config.last,
    }
    .lines();
    let lines = stat_lines(
        &aggregation.counts(),
        aggregation.last.as_ref(),
        aggregation.report.as_ref(),
    );

    let run = RunFolder::create(store.root(), started)?;
    run.write_stats(&header, &lines)?;
    run.export(&aggregation, request.export, progress)?;

    log::info!("Finish statistics");
    Ok(StatsOutcome {
        run_folder: run.path().to_path_buf(),
        header,
        lines,
        aggregation,
    })
}
