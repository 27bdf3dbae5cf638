use super::report::{BucketKey, Counter, TimeReport};
use crate::classify::{CalcMode, Classifier};
use crate::error::{RegfishError, Result};
use crate::interval::IntervalSpec;
use crate::model::{IndexedPlayer, Table, TableFileMeta, TableId};
use crate::progress::Progress;
use chrono::TimeZone;
use std::collections::{BTreeMap, BTreeSet};

/// Filters and options of a statistics run
#[derive(Debug, Clone)]
pub struct StatsConfig {
    pub mode: CalcMode,
    pub reg_tables: u32,
    pub reg_hands: u64,
    /// Tables must have started within its UTC range
    pub interval: IntervalSpec,
    /// Keep only tables with this buy-in, compared truncated
    pub buy_in: Option<f64>,
    pub multipliers: BTreeSet<u32>,
    /// Count the highest-id surviving tables again in a separate counter
    pub last: Option<usize>,
    pub time_report: bool,
}

pub const DEFAULT_MULTIPLIER: u32 = 2;
pub const DEFAULT_LAST_TABLES: usize = 50;

/// Parse a prize pool multiplier written as `x3` or `3`
pub fn parse_multiplier(s: &str) -> Result<u32> {
    let value = s.trim();
    let digits = value
        .strip_prefix('x')
        .or_else(|| value.strip_prefix('X'))
        .unwrap_or(value);
    match digits.parse::<u32>() {
        Ok(m) if m > 0 => Ok(m),
        _ => Err(RegfishError::Multiplier(value.to_string())),
    }
}

/// A table that survived the filters, with what the exports need to know
#[derive(Debug, Clone, PartialEq)]
pub struct TableStat {
    pub meta: TableFileMeta,
    pub multiplier: Option<u32>,
    /// Hand at which self went heads-up against a fish
    pub elimination_after_hand: Option<u32>,
}

impl TableStat {
    pub fn is_double_prize_pool(&self) -> bool {
        self.multiplier == Some(2)
    }

    /// `x2`, `x3`, ... or `rest`
    pub fn multiplier_folder(&self) -> String {
        match self.multiplier {
            Some(m) => format!("x{}", m),
            None => "rest".to_string(),
        }
    }
}

/// Tables grouped by `(reg count, fish count)`
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub buckets: BTreeMap<BucketKey, Vec<TableStat>>,
    /// Buckets of the most recent tables only
    pub last: Option<Counter>,
    pub report: Option<TimeReport>,
    pub matched: usize,
    pub filtered_out: usize,
    pub not_found: usize,
}

impl Aggregation {
    pub fn counts(&self) -> Counter {
        self.buckets
            .iter()
            .map(|(key, stats)| (*key, stats.len()))
            .collect()
    }
}

/// Bucket every calc table found in the index.
///
/// Tables missing from the index are counted and skipped. The time report is
/// built in the time zone `tz`.
pub fn aggregate<Tz, P>(
    files: Vec<TableFileMeta>,
    index: &BTreeMap<TableId, Table>,
    players: &BTreeMap<String, IndexedPlayer>,
    config: &StatsConfig,
    tz: &Tz,
    progress: &P,
) -> Result<Aggregation>
where
    Tz: TimeZone,
    P: Progress,
{
    log::info!("Start getting table stats");
    let classifier =
        Classifier::new(players, config.mode).with_thresholds(config.reg_tables, config.reg_hands);
    let mut aggregation = Aggregation {
        report: config.time_report.then(TimeReport::new),
        ..Default::default()
    };
    let total = files.len();

    for (i, meta) in files.into_iter().enumerate() {
        progress.report("Getting table stats", i, total);
        let table = match index.get(&meta.id) {
            Some(table) => table,
            None => {
                log::debug!("Table {} is not indexed", meta.id);
                aggregation.not_found += 1;
                continue;
            }
        };
        if !passes_filters(table, config) {
            aggregation.filtered_out += 1;
            continue;
        }

        let regs = table
            .players
            .iter()
            .filter(|p| classifier.is_reg(&p.nickname))
            .count() as u32;
        let key = (regs, table.players.len() as u32 - regs);

        let elimination_after_hand = table
            .elimination
            .as_ref()
            .filter(|e| !classifier.is_reg(&e.nickname))
            .map(|e| e.after_hand);

        if let Some(report) = aggregation.report.as_mut() {
            report.add(&table.data.started_utc()?, tz, key);
        }
        aggregation.buckets.entry(key).or_default().push(TableStat {
            multiplier: table.data.prize_multiplier(&config.multipliers),
            meta,
            elimination_after_hand,
        });
        aggregation.matched += 1;
    }

    aggregation.last = config.last.map(|n| last_counts(&aggregation.buckets, n));

    log::info!("Tables to calculate stat: {}", aggregation.matched);
    log::info!("Tables were filtered out: {}", aggregation.filtered_out);
    if aggregation.not_found > 0 {
        log::warn!(
            "Tables were not found: {}. Rerun index with the calc files",
            aggregation.not_found
        );
    }
    log::info!(
        "Got {} buckets in table stats: {:?}",
        aggregation.buckets.len(),
        aggregation.buckets.keys().collect::<Vec<_>>()
    );
    Ok(aggregation)
}

/// Bucket counts of the `n` tables with the highest ids
fn last_counts(buckets: &BTreeMap<BucketKey, Vec<TableStat>>, n: usize) -> Counter {
    let mut tables: Vec<(TableId, BucketKey)> = buckets
        .iter()
        .flat_map(|(key, stats)| stats.iter().map(move |stat| (stat.meta.id, *key)))
        .collect();
    tables.sort_unstable_by(|a, b| b.0.cmp(&a.0));

    let mut counter = Counter::new();
    for (_, key) in tables.into_iter().take(n) {
        *counter.entry(key).or_insert(0) += 1;
    }
    counter
}

fn passes_filters(table: &Table, config: &StatsConfig) -> bool {
    if !config.interval.utc.contains(&table.data.timestamp) {
        return false;
    }
    match config.buy_in {
        Some(buy_in) => table.data.buy_in.trunc() as i64 == buy_in.trunc() as i64,
        None => true,
    }
}
