//! Time breakdown of bucketed tables and the text of `stats.txt`

use crate::classify::CalcMode;
use crate::interval::IntervalSpec;
use chrono::{Datelike, NaiveDateTime, TimeZone, Timelike, Weekday};
use std::collections::BTreeMap;

/// `(reg count, fish count)` of one table
pub type BucketKey = (u32, u32);

/// Tables per bucket key
pub type Counter = BTreeMap<BucketKey, usize>;

pub const WEEKDAY: &str = "Weekday";
pub const WEEKEND: &str = "Weekend";

/// Report order of day rows. `Weekday` and `Weekend` aggregate the days before them.
pub const DAY_NAMES: [&str; 9] = [
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", WEEKDAY, "Saturday", "Sunday", WEEKEND,
];

const WEEKDAY_ROW: usize = 5;
const WEEKEND_ROW: usize = 8;
const THREE_HOURS: usize = 8;
const WEEKS: u32 = 4;

fn day_row(day: Weekday) -> usize {
    match day {
        Weekday::Mon => 0,
        Weekday::Tue => 1,
        Weekday::Wed => 2,
        Weekday::Thu => 3,
        Weekday::Fri => 4,
        Weekday::Sat => 6,
        Weekday::Sun => 7,
    }
}

fn aggregate_row(day: Weekday) -> usize {
    match day {
        Weekday::Sat | Weekday::Sun => WEEKEND_ROW,
        _ => WEEKDAY_ROW,
    }
}

/// Week of the month, 1..=4. Days 29 to 31 count as week 4.
pub fn week_of_month(day: u32) -> u32 {
    day.div_ceil(7).clamp(1, WEEKS)
}

/// One report section: a fixed list of labelled counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub title: &'static str,
    rows: Vec<(String, Counter)>,
}

impl Dimension {
    fn new(title: &'static str, labels: impl IntoIterator<Item = String>) -> Self {
        Self {
            title,
            rows: labels.into_iter().map(|l| (l, Counter::new())).collect(),
        }
    }

    fn add(&mut self, row: usize, key: BucketKey) {
        if let Some((_, counter)) = self.rows.get_mut(row) {
            *counter.entry(key).or_insert(0) += 1;
        }
    }

    pub fn rows(&self) -> &[(String, Counter)] {
        &self.rows
    }

    /// Counter of the row with the given label
    pub fn get(&self, label: &str) -> Option<&Counter> {
        self.rows
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, counter)| counter)
    }
}

/// Bucket counts broken down by local day, hour, 3-hour window and week of month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeReport {
    pub days: Dimension,
    pub hours: Dimension,
    pub threes: Dimension,
    pub day_hours: Dimension,
    pub day_threes: Dimension,
    pub weeks: Dimension,
}

impl Default for TimeReport {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeReport {
    pub fn new() -> Self {
        let hour_label = |h: usize| format!("{}-{}", h, h + 1);
        let three_label = |t: usize| format!("{}-{}", t * 3, t * 3 + 3);

        TimeReport {
            days: Dimension::new("BY DAYS", DAY_NAMES.iter().map(|d| d.to_string())),
            hours: Dimension::new("BY HOURS", (0..24).map(hour_label)),
            threes: Dimension::new("BY THREE HOURS", (0..THREE_HOURS).map(three_label)),
            day_hours: Dimension::new(
                "BY DAYS/HOURS",
                DAY_NAMES
                    .iter()
                    .flat_map(|d| (0..24).map(move |h| format!("{} {}", d, hour_label(h)))),
            ),
            day_threes: Dimension::new(
                "BY DAYS/THREE HOURS",
                DAY_NAMES.iter().flat_map(|d| {
                    (0..THREE_HOURS).map(move |t| format!("{} {}", d, three_label(t)))
                }),
            ),
            weeks: Dimension::new("BY WEEKS", (1..=WEEKS).map(|w| w.to_string())),
        }
    }

    /// Count one table started at `started_utc`, seen in the time zone `tz`
    pub fn add<Tz: TimeZone>(&mut self, started_utc: &NaiveDateTime, tz: &Tz, key: BucketKey) {
        let local = tz.from_utc_datetime(started_utc);
        let hour = local.hour() as usize;
        let three = hour / 3;

        for day in [day_row(local.weekday()), aggregate_row(local.weekday())] {
            self.days.add(day, key);
            self.day_hours.add(day * 24 + hour, key);
            self.day_threes.add(day * THREE_HOURS + three, key);
        }
        self.hours.add(hour, key);
        self.threes.add(three, key);
        self.weeks.add(week_of_month(local.day()) as usize - 1, key);
    }

    pub fn dimensions(&self) -> [&Dimension; 6] {
        [
            &self.days,
            &self.hours,
            &self.threes,
            &self.day_hours,
            &self.day_threes,
            &self.weeks,
        ]
    }
}

/// `Total ..` line and one rate line per key, then a blank line
fn counter_lines(counter: &Counter, title: &str, keys: &[BucketKey], lines: &mut Vec<String>) {
    let total: usize = counter.values().sum();
    lines.push(format!("Total {}: {}", title, total));
    for &(reg, fish) in keys {
        let count = counter.get(&(reg, fish)).copied().unwrap_or(0);
        let rate = if total > 0 {
            count as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        lines.push(format!(
            "Reg: {}, Fish: {}, count: {:7}, rate: {:0.3}%",
            reg, fish, count, rate
        ));
    }
    lines.push(String::new());
}

/// Result lines: bucket totals, the most recent tables, then every time
/// dimension when a report is given
pub fn stat_lines(
    totals: &Counter,
    last: Option<&Counter>,
    report: Option<&TimeReport>,
) -> Vec<String> {
    let keys: Vec<BucketKey> = totals.keys().copied().collect();
    let mut lines = Vec::new();
    counter_lines(totals, "tables", &keys, &mut lines);
    if let Some(last) = last {
        counter_lines(last, "last tables", &keys, &mut lines);
    }

    if let Some(report) = report {
        for dimension in report.dimensions() {
            lines.push(String::new());
            lines.push(dimension.title.to_string());
            for (label, counter) in dimension.rows() {
                counter_lines(counter, label, &keys, &mut lines);
            }
        }
    }

    lines
}

/// Run parameters printed above the results
#[derive(Debug, Clone)]
pub struct ReportHeader<'a> {
    pub run_time: String,
    pub mode: CalcMode,
    pub reg_tables: u32,
    pub reg_hands: u64,
    pub interval: &'a IntervalSpec,
    pub buy_in: Option<f64>,
    pub last: Option<usize>,
}

impl ReportHeader<'_> {
    pub fn lines(&self) -> Vec<String> {
        let buy_in = match self.buy_in {
            Some(buy_in) => buy_in.to_string(),
            None => "all".to_string(),
        };
        let last = match self.last {
            Some(n) => n.to_string(),
            None => "off".to_string(),
        };
        vec![
            format!("Run time:             {}", self.run_time),
            format!("Reg calculation mode: {}", self.mode),
            format!("Reg table value:      {}", self.reg_tables),
            format!("Reg hand value:       {}", self.reg_hands),
            format!("In original interval: {}", self.interval.expression),
            format!("In interval:          {}", self.interval.local),
            format!("In interval UTC:      {}", self.interval.utc),
            format!("Buy-in:               {}", buy_in),
            format!("Last tables:          {}", last),
            String::new(),
            String::new(),
        ]
    }
}
