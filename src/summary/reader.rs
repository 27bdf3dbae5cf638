use crate::error::{RegfishError, Result};
use crate::model::{parse_timestamp, TableData, TableId};
use std::path::Path;

const BUY_IN_PREFIX: &str = "Buy-In";
const PRIZE_POOL_PREFIX: &str = "Prizepool";
const STARTED_PREFIX: &str = "Tournament started";

/// Extract the table id that follows the first `(` of a file name, up to the
/// next parenthesis
pub fn parse_table_id(file_name: &str) -> Result<TableId> {
    let invalid = || RegfishError::TableId(file_name.to_string());
    let open = file_name.find('(').ok_or_else(invalid)?;
    let rest = &file_name[open + 1..];
    let end = rest.find(['(', ')']).ok_or_else(invalid)?;
    rest[..end].trim().parse().map_err(|_| invalid())
}

/// Parse a currency amount such as `$5.00`, `5.00€` or `€0.25€`
pub fn parse_price(price: &str) -> Result<f64> {
    let s = price.trim().trim_start_matches(|c: char| !c.is_ascii_digit());
    let s = match s.chars().last() {
        Some(c) if !c.is_ascii_digit() => &s[..s.len() - c.len_utf8()],
        _ => s,
    };
    s.trim_end()
        .parse()
        .map_err(|_| RegfishError::Summary(format!("not a price: '{}'", price.trim())))
}

/// Sum of every `+`-separated amount after the first `:`
fn parse_buy_in(line: &str) -> Result<f64> {
    line_value(line)?.split('+').map(parse_price).sum()
}

fn parse_prize_pool(line: &str) -> Result<f64> {
    parse_price(line_value(line)?)
}

/// `Tournament started 2024/03/10 02:30:00 UTC` -> `2024/03/10 02:30:00`
fn parse_tournament_started(line: &str) -> Result<String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match (tokens.get(2), tokens.get(3)) {
        (Some(date), Some(time)) => {
            let timestamp = format!("{} {}", date, time);
            parse_timestamp(&timestamp)
                .map_err(|e| RegfishError::Summary(e.to_string()))?;
            Ok(timestamp)
        }
        _ => Err(RegfishError::Summary(format!(
            "no start time in '{}'",
            line.trim()
        ))),
    }
}

fn line_value(line: &str) -> Result<&str> {
    line.split(':')
        .nth(1)
        .ok_or_else(|| RegfishError::Summary(format!("no value in '{}'", line.trim())))
}

/// Read table data from tournament summary content.
///
/// Returns `Ok(None)` when the buy-in, prize pool or start time line is missing.
pub fn read_summary(content: &str) -> Result<Option<TableData>> {
    let mut buy_in = None;
    let mut prize_pool = None;
    let mut timestamp = None;

    for line in content.lines() {
        if line.starts_with(BUY_IN_PREFIX) {
            buy_in = Some(parse_buy_in(line)?);
        } else if line.starts_with(PRIZE_POOL_PREFIX) {
            prize_pool = Some(parse_prize_pool(line)?);
        } else if line.starts_with(STARTED_PREFIX) {
            timestamp = Some(parse_tournament_started(line)?);
        }
    }

    match (timestamp, prize_pool, buy_in) {
        (Some(timestamp), Some(prize_pool), Some(buy_in)) => {
            Ok(Some(TableData::new(timestamp, prize_pool, buy_in)))
        }
        _ => Ok(None),
    }
}

/// Read table data from a tournament summary file
pub fn read_summary_file(path: &Path) -> Result<Option<TableData>> {
    let content = std::fs::read_to_string(path)?;
    read_summary(&content)
}
