use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use regfish::classify::{CalcMode, DEFAULT_REG_HANDS, DEFAULT_REG_TABLES};
use regfish::index::{IndexBuilder, IndexConfig, IndexStore};
use regfish::interval::parse_interval;
use regfish::progress::LogProgress;
use regfish::stats::{
    self, parse_multiplier, ExportOptions, StatsConfig, StatsRequest, DEFAULT_LAST_TABLES,
};

#[derive(Parser)]
#[command(name = "regfish")]
#[command(about = "Index Expresso Nitro hand histories and report the reg/fish mix of tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fold new hand histories into the index
    Index {
        /// Folder with hand-history files
        #[arg(long, env = "REGFISH_DATA")]
        data: PathBuf,

        /// Folder with tournament summary files
        #[arg(long, env = "REGFISH_SUMMARIES")]
        summaries: PathBuf,

        /// Folder with color-marker files
        #[arg(long, env = "REGFISH_MARKERS")]
        markers: PathBuf,

        /// Result folder holding the index
        #[arg(short, long, env = "REGFISH_RESULT")]
        result: PathBuf,

        /// Nicknames of the tracked player
        #[arg(short, long, env = "REGFISH_NICKNAMES", value_delimiter = ',', required = true)]
        nicknames: Vec<String>,
    },

    /// Bucket tables by reg/fish count and write a report
    Stats(StatsArgs),
}

#[derive(Args)]
struct StatsArgs {
    /// Folder with hand-history files of the tables to report on
    #[arg(long, env = "REGFISH_CALC_DATA")]
    calc_data: PathBuf,

    /// Folder with summary files of the tables to report on
    #[arg(long, env = "REGFISH_CALC_SUMMARIES")]
    calc_summaries: PathBuf,

    /// Result folder holding the index
    #[arg(short, long, env = "REGFISH_RESULT")]
    result: PathBuf,

    /// Count used for the reg threshold: tables or hands
    #[arg(long, env = "REGFISH_CALC_MODE", default_value = "tables")]
    calc_mode: CalcMode,

    /// Tables a player needs to be a reg in tables mode
    #[arg(long, env = "REGFISH_REG_TABLES", default_value_t = DEFAULT_REG_TABLES)]
    reg_tables: u32,

    /// Hands a player needs to be a reg in hands mode
    #[arg(long, env = "REGFISH_REG_HANDS", default_value_t = DEFAULT_REG_HANDS)]
    reg_hands: u64,

    /// Interval, e.g. all, today, month, 12h, 7d, 20240101-20240131
    #[arg(long, env = "REGFISH_INTERVAL", default_value = "all")]
    interval: String,

    /// Buy-in to keep, or all
    #[arg(long, env = "REGFISH_BUY_IN", default_value = "all")]
    buy_in: String,

    /// Copy tables into per-bucket folders
    #[arg(long, env = "REGFISH_SORT")]
    sort: bool,

    /// Prize pool multipliers to sort by, e.g. x2,x3
    #[arg(long, env = "REGFISH_MULTIPLIERS", default_value = "x2", value_delimiter = ',', value_parser = parse_multiplier)]
    multipliers: Vec<u32>,

    /// Copy tables with a fish elimination by hand index
    #[arg(long, env = "REGFISH_ELIMINATION")]
    elimination: bool,

    /// Collect the first hand of every table
    #[arg(long, env = "REGFISH_FIRST_HANDS")]
    first_hands: bool,

    /// Collect button-fold hands
    #[arg(long, env = "REGFISH_BUTTON_FOLDS")]
    button_folds: bool,

    /// Also count this many most recent tables, 0 to turn off
    #[arg(long, env = "REGFISH_LAST", default_value_t = DEFAULT_LAST_TABLES)]
    last: usize,

    /// Skip the day and hour breakdown
    #[arg(long, env = "REGFISH_NO_TIME_REPORT")]
    no_time_report: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Index {
            data,
            summaries,
            markers,
            result,
            nicknames,
        } => {
            let config = IndexConfig {
                hand_dir: data,
                summary_dir: summaries,
                marker_dir: markers,
                self_nicknames: parse_nicknames(&nicknames),
            };
            index(&config, &result)?;
        }
        Commands::Stats(args) => {
            run_stats(args)?;
        }
    }

    Ok(())
}

fn parse_nicknames(nicknames: &[String]) -> HashSet<String> {
    nicknames
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_buy_in(buy_in: &str) -> Result<Option<f64>> {
    let buy_in = buy_in.trim();
    if buy_in.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    let value = buy_in
        .parse()
        .with_context(|| format!("Invalid buy-in: {}", buy_in))?;
    Ok(Some(value))
}

fn index(config: &IndexConfig, result: &Path) -> Result<()> {
    log::info!("Hand files:    {}", config.hand_dir.display());
    log::info!("Summary files: {}", config.summary_dir.display());
    log::info!("Markers:       {}", config.marker_dir.display());
    log::info!("Result:        {}", result.display());
    let mut nicknames: Vec<&String> = config.self_nicknames.iter().collect();
    nicknames.sort();
    log::info!("Nicknames:     {:?}", nicknames);

    let store = IndexStore::open(result).context("Failed to open result folder")?;
    let summary = IndexBuilder::new(&store, config, &LogProgress)
        .run()
        .context("Indexing failed")?;

    println!("Tables found:     {}", summary.candidates);
    println!("Tables indexed:   {}", summary.indexed);
    println!("Tables skipped:   {}", summary.skipped);
    if summary.recovered > 0 {
        println!("Tables recovered: {}", summary.recovered);
    }
    println!("Players:          {}", summary.players);
    println!("Checkpoint:       {}", summary.checkpoint);
    Ok(())
}

fn run_stats(args: StatsArgs) -> Result<()> {
    let now = Local::now();
    let interval = parse_interval(&args.interval, &now).context("Failed to parse interval")?;
    let buy_in = parse_buy_in(&args.buy_in)?;
    let multipliers: BTreeSet<u32> = args.multipliers.iter().copied().collect();

    log::info!("Calc hand files:    {}", args.calc_data.display());
    log::info!("Calc summary files: {}", args.calc_summaries.display());
    log::info!("Result:             {}", args.result.display());
    log::info!("Calc mode:          {}", args.calc_mode);
    log::info!("Interval:           {} ({})", interval.expression, interval.local);
    log::info!("Interval UTC:       {}", interval.utc);
    log::info!("Last tables:        {}", args.last);

    let request = StatsRequest {
        hand_dir: args.calc_data,
        summary_dir: args.calc_summaries,
        config: StatsConfig {
            mode: args.calc_mode,
            reg_tables: args.reg_tables,
            reg_hands: args.reg_hands,
            interval,
            buy_in,
            multipliers,
            last: (args.last > 0).then_some(args.last),
            time_report: !args.no_time_report,
        },
        export: ExportOptions {
            sort: args.sort,
            elimination: args.elimination,
            first_hands: args.first_hands,
            button_folds: args.button_folds,
        },
    };

    let store = IndexStore::existing(&args.result).context("Failed to open result folder")?;
    let outcome = stats::run_stats(&store, &request, &Local, &now.naive_local(), &LogProgress)
        .context("Statistics failed")?;

    println!("Result statistic:");
    for line in outcome.header.iter().chain(&outcome.lines) {
        println!("  {}", line);
    }
    println!("Written to {}", outcome.run_folder.display());
    Ok(())
}
