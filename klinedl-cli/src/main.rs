//! klinedl CLI — bulk download of historical kline archives.
//!
//! Commands:
//! - `download` — fetch monthly and daily archives (plus optional checksums)
//! - `symbols` — list the tradable symbols of a market
//! - `config` — print the effective configuration as TOML

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use klinedl_core::{
    filter_by_suffix, normalize_symbols, ArchiveLayout, DataCategory, DownloaderConfig,
    ExchangeInfoLister, FileFetcher, HttpFetcher, LogProgress, RunSummary, ScheduleOptions,
    Scheduler, SymbolLister, TaskEnumerator, TradingType, YearMonth,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "klinedl",
    about = "klinedl — bulk downloader for historical kline archives"
)]
struct Cli {
    /// TOML config file. Built-in defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download kline archives for the selected symbols, intervals and dates.
    Download(DownloadArgs),
    /// List tradable symbols for a market.
    Symbols {
        /// Market: spot, um or cm.
        #[arg(short = 't', long = "type", default_value = "spot")]
        trading_type: TradingType,

        /// Keep only symbols ending with this suffix (e.g. USDT).
        #[arg(long)]
        symbol_endswith: Option<String>,
    },
    /// Print the effective configuration.
    Config,
}

#[derive(Args)]
struct DownloadArgs {
    /// Market: spot, um (USD-margined futures) or cm (coin-margined futures).
    #[arg(short = 't', long = "type", default_value = "spot")]
    trading_type: TradingType,

    /// Kline family: klines, markPriceKlines, indexPriceKlines, premiumIndexKlines.
    #[arg(long, default_value = "klines")]
    category: DataCategory,

    /// Symbols to download. Omit (or pass `all`) to download every listed symbol.
    #[arg(short = 's', long, num_args = 1..)]
    symbols: Vec<String>,

    /// Keep only symbols ending with this suffix (e.g. USDT).
    #[arg(long)]
    symbol_endswith: Option<String>,

    /// Intervals to download. Defaults to every published interval.
    #[arg(short = 'i', long, num_args = 1..)]
    intervals: Vec<String>,

    /// Years for monthly archives. Defaults to every year since the epoch.
    #[arg(short = 'y', long, num_args = 1..)]
    years: Vec<i32>,

    /// Months (1-12) for monthly archives. Defaults to all twelve.
    #[arg(short = 'm', long, num_args = 1.., value_parser = clap::value_parser!(u32).range(1..=12))]
    months: Vec<u32>,

    /// Explicit dates (YYYY-MM-DD) for daily archives. Defaults to every day in range.
    #[arg(short = 'd', long, num_args = 1..)]
    dates: Vec<NaiveDate>,

    /// Start date (YYYY-MM-DD). Defaults to the configured epoch.
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    end_date: Option<NaiveDate>,

    /// Destination folder.
    #[arg(short = 'f', long, env = "STORE_DIRECTORY", default_value = ".")]
    folder: PathBuf,

    /// Also download the `.CHECKSUM` file of every archive.
    #[arg(short = 'c', long, default_value_t = false)]
    checksum: bool,

    /// Verify each archive against its checksum file.
    #[arg(long, default_value_t = false, requires = "checksum")]
    verify: bool,

    /// Number of symbols downloaded concurrently in daily mode.
    #[arg(short = 'j', long, default_value_t = 1)]
    jobs: usize,

    /// Re-download files that already exist.
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    /// Skip daily archives.
    #[arg(long, default_value_t = false)]
    skip_daily: bool,

    /// Skip monthly archives.
    #[arg(long, default_value_t = false)]
    skip_monthly: bool,

    /// Stop at the first failed download instead of continuing.
    #[arg(long, default_value_t = false)]
    fail_fast: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Download(args) => run_download(&config, args),
        Commands::Symbols {
            trading_type,
            symbol_endswith,
        } => run_symbols(&config, trading_type, symbol_endswith.as_deref()),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<DownloaderConfig> {
    match path {
        Some(path) => DownloaderConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(DownloaderConfig::default()),
    }
}

fn run_download(config: &DownloaderConfig, args: DownloadArgs) -> Result<()> {
    args.category.check_supported(args.trading_type)?;

    if args.jobs == 0 {
        bail!("--jobs must be at least 1");
    }
    if args.skip_daily && args.skip_monthly {
        bail!("--skip-daily and --skip-monthly together leave nothing to download");
    }

    let intervals = if args.intervals.is_empty() {
        config.kline_intervals.as_slice().to_vec()
    } else {
        let unknown = config.kline_intervals.unknown(&args.intervals);
        if !unknown.is_empty() {
            bail!(
                "unknown interval(s) {}. Valid: {}",
                unknown.join(", "),
                config.kline_intervals.as_slice().join(", ")
            );
        }
        args.intervals.clone()
    };

    let symbols = resolve_symbols(
        config,
        args.trading_type,
        &args.symbols,
        args.symbol_endswith.as_deref(),
    )?;
    if symbols.is_empty() {
        bail!("no symbols to download");
    }

    let range = config.resolve_range(args.start_date, args.end_date)?;
    let mut layout = ArchiveLayout::new(args.trading_type, args.category, &args.folder);
    if args.start_date.is_some() && args.end_date.is_some() {
        layout = layout.with_range_folder(&range);
    }

    let enumerator = TaskEnumerator::new(range, config.daily_intervals.clone(), args.checksum);
    let fetcher = HttpFetcher::from_config(config)?;
    let options = ScheduleOptions {
        overwrite: args.overwrite,
        parallelism: args.jobs,
        fail_fast: args.fail_fast,
        verify: args.verify,
    };
    let progress = LogProgress;
    let scheduler = Scheduler::new(&fetcher, &layout, &progress, options);

    info!(
        trading_type = %args.trading_type,
        category = %args.category,
        start = %range.start(),
        end = %range.end(),
        folder = %args.folder.display(),
        fetcher = fetcher.name(),
        "starting download"
    );

    let mut summary = RunSummary::default();

    if !args.skip_monthly {
        let months = monthly_periods(config, &args.years, &args.months);
        summary.merge(scheduler.run_monthly(&enumerator, &symbols, &intervals, &months));
    }

    if !args.skip_daily {
        let dates: Vec<NaiveDate> = if args.dates.is_empty() {
            range.days().collect()
        } else {
            args.dates.clone()
        };
        summary.merge(scheduler.run_daily(&enumerator, &symbols, &intervals, &dates)?);
    }

    print_summary(&summary);

    if !summary.all_succeeded() {
        for failure in &summary.failures {
            eprintln!("Error for {}: {}", failure.task.file_name(), failure.error);
        }
        std::process::exit(1);
    }

    Ok(())
}

/// Explicit symbols, or the exchange's full list; then the suffix filter.
fn resolve_symbols(
    config: &DownloaderConfig,
    trading_type: TradingType,
    requested: &[String],
    suffix: Option<&str>,
) -> Result<Vec<String>> {
    let wants_all =
        requested.is_empty() || (requested.len() == 1 && requested[0].eq_ignore_ascii_case("all"));

    let symbols = if wants_all {
        let lister = exchange_info_lister(config)?;
        lister.list_symbols(trading_type)?
    } else {
        normalize_symbols(requested)
    };
    info!("found {} symbols", symbols.len());

    let symbols = filter_by_suffix(symbols, suffix);
    if let Some(suffix) = suffix {
        info!("found {} symbols with suffix {suffix}", symbols.len());
    }
    Ok(symbols)
}

fn exchange_info_lister(config: &DownloaderConfig) -> Result<ExchangeInfoLister> {
    Ok(ExchangeInfoLister::new(
        config.exchange_info.clone(),
        Duration::from_secs(config.request_timeout_secs),
        &config.user_agent,
    )?)
}

fn monthly_periods(config: &DownloaderConfig, years: &[i32], months: &[u32]) -> Vec<YearMonth> {
    if years.is_empty() && months.is_empty() {
        return config.default_months();
    }
    let years: Vec<i32> = if years.is_empty() {
        (config.epoch.year()..=Utc::now().year()).collect()
    } else {
        years.to_vec()
    };
    let months: Vec<u32> = if months.is_empty() {
        (1..=12).collect()
    } else {
        months.to_vec()
    };
    YearMonth::grid(&years, &months)
}

fn run_symbols(
    config: &DownloaderConfig,
    trading_type: TradingType,
    suffix: Option<&str>,
) -> Result<()> {
    let lister = exchange_info_lister(config)?;
    let symbols = filter_by_suffix(lister.list_symbols(trading_type)?, suffix);
    for symbol in &symbols {
        println!("{symbol}");
    }
    info!("{} symbols", symbols.len());
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("=== Download Summary ===");
    println!("Tasks:             {}", summary.total);
    println!(
        "Downloaded:        {} ({})",
        summary.downloaded,
        format_size(summary.bytes)
    );
    println!("Already present:   {}", summary.skipped);
    println!("Not found:         {}", summary.not_found);
    println!("Missing checksums: {}", summary.missing_checksums);
    if summary.verified > 0 {
        println!("Verified:          {}", summary.verified);
    }
    println!("Failed:            {}", summary.failed());
    if summary.cancelled > 0 {
        println!("Cancelled:         {}", summary.cancelled);
    }
    println!();
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
