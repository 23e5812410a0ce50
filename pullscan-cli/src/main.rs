//! PullScan CLI — scan, inspect and catalog commands.
//!
//! Commands:
//! - `scan` — scan a universe for trend pullbacks and print ranked signals
//! - `inspect` — full reasoning, setup and recent candles for one instrument
//! - `catalog` — list the instruments a scan would cover

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use pullscan_core::domain::{AssetClass, Instrument, Signal};
use pullscan_core::ClassifierKind;
use pullscan_runner::{write_csv, write_json, Catalog, ScanConfig, ScanReport, Scanner};

#[derive(Parser)]
#[command(
    name = "pullscan",
    about = "PullScan CLI — multi-asset trend pullback scanner"
)]
struct Cli {
    /// Log filter (e.g. "debug", "pullscan_runner=trace"). Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a universe and print signals ranked by confidence.
    Scan {
        /// Path to a TOML scan config.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Path to a TOML universe with [[instruments]] tables. Defaults to the built-in catalog.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Only scan one asset class: forex, crypto or stock.
        #[arg(long)]
        asset_class: Option<AssetClass>,

        /// Classifier strategy: randomized or ema_structure.
        #[arg(long)]
        classifier: Option<ClassifierKind>,

        /// Master seed for a reproducible scan.
        #[arg(long)]
        seed: Option<u64>,

        /// Show only the N highest-ranked signals.
        #[arg(long)]
        top: Option<usize>,

        /// Hide signals without a trade setup.
        #[arg(long, default_value_t = false)]
        valid_only: bool,

        /// Assemble instruments one at a time instead of in parallel.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Write the full report (with candles) as JSON.
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write one CSV row per signal.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Scan a single instrument and show its full reasoning.
    Inspect {
        /// Instrument symbol (e.g. BTC/USDT).
        symbol: String,

        /// Path to a TOML scan config.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Path to a TOML universe to look the symbol up in.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Classifier strategy: randomized or ema_structure.
        #[arg(long)]
        classifier: Option<ClassifierKind>,

        /// Master seed for a reproducible scan.
        #[arg(long)]
        seed: Option<u64>,

        /// Number of trailing candles to print.
        #[arg(long, default_value_t = 10)]
        candles: usize,
    },
    /// List instruments in the catalog.
    Catalog {
        /// Path to a TOML universe. Defaults to the built-in catalog.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Only list one asset class: forex, crypto or stock.
        #[arg(long)]
        asset_class: Option<AssetClass>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logger(cli.log_level.as_deref());

    match cli.command {
        Commands::Scan {
            config,
            universe,
            asset_class,
            classifier,
            seed,
            top,
            valid_only,
            sequential,
            json,
            csv,
        } => {
            let config = load_config(config.as_deref(), classifier, seed, sequential)?;
            let catalog = load_catalog(universe.as_deref(), asset_class)?;
            run_scan(&config, &catalog, top, valid_only, json.as_deref(), csv.as_deref())
        }
        Commands::Inspect {
            symbol,
            config,
            universe,
            classifier,
            seed,
            candles,
        } => {
            let config = load_config(config.as_deref(), classifier, seed, false)?;
            let catalog = load_catalog(universe.as_deref(), None)?;
            run_inspect(&config, &catalog, &symbol, candles)
        }
        Commands::Catalog {
            universe,
            asset_class,
        } => {
            let catalog = load_catalog(universe.as_deref(), asset_class)?;
            print_catalog(&catalog);
            Ok(())
        }
    }
}

/// Install the stderr subscriber. `--log-level` wins over `RUST_LOG`; default `info`.
fn setup_logger(level: Option<&str>) {
    let filter = match level {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(true)
        .compact()
        .with_env_filter(filter)
        .init();
}

fn load_config(
    path: Option<&Path>,
    classifier: Option<ClassifierKind>,
    seed: Option<u64>,
    sequential: bool,
) -> Result<ScanConfig> {
    let mut config = match path {
        Some(path) => ScanConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ScanConfig::default(),
    };
    if let Some(kind) = classifier {
        config.classifier.kind = kind;
    }
    if seed.is_some() {
        config.seed = seed;
    }
    if sequential {
        config.parallel = false;
    }
    Ok(config)
}

fn load_catalog(path: Option<&Path>, asset_class: Option<AssetClass>) -> Result<Catalog> {
    let catalog = match path {
        Some(path) => Catalog::from_file(path)
            .with_context(|| format!("failed to load universe {}", path.display()))?,
        None => Catalog::default(),
    };
    let catalog = match asset_class {
        Some(class) => catalog.filter_class(class),
        None => catalog,
    };
    if catalog.is_empty() {
        bail!("universe is empty; nothing to scan");
    }
    Ok(catalog)
}

fn run_scan(
    config: &ScanConfig,
    catalog: &Catalog,
    top: Option<usize>,
    valid_only: bool,
    json: Option<&Path>,
    csv: Option<&Path>,
) -> Result<()> {
    let mut report = Scanner::new(config).scan_with_summary(&catalog.instruments);

    // Exports carry the whole scan; display filters apply to the table only.
    if let Some(path) = json {
        write_json(&report, path)?;
        println!("JSON written to: {}", path.display());
    }
    if let Some(path) = csv {
        write_csv(&report.signals, path)?;
        println!("CSV written to: {}", path.display());
    }

    if valid_only {
        report.retain_valid();
    }
    if let Some(n) = top {
        report.top(n);
    }
    print_report(&report);
    Ok(())
}

fn run_inspect(config: &ScanConfig, catalog: &Catalog, symbol: &str, candles: usize) -> Result<()> {
    let Some(instrument) = catalog.find(symbol) else {
        bail!("unknown symbol '{symbol}'. Run `pullscan catalog` to list instruments");
    };
    let report = Scanner::new(config).scan_with_summary(std::slice::from_ref(instrument));
    let Some(signal) = report.signals.first() else {
        bail!("scan produced no signal for {symbol}");
    };
    print_signal_detail(signal, report.summary.master_seed, candles);
    Ok(())
}

fn price_decimals(class: AssetClass) -> usize {
    match class {
        AssetClass::Forex => 5,
        AssetClass::Crypto | AssetClass::Stock => 2,
    }
}

fn print_report(report: &ScanReport) {
    let s = &report.summary;
    println!();
    println!("=== Pullback Scan ===");
    println!("Generated:      {}", report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Classifier:     {}", report.classifier);
    println!("Seed:           {}", s.master_seed);
    println!(
        "Signals:        {} scanned, {} valid ({} buy / {} sell)",
        s.total, s.valid, s.buys, s.sells
    );
    if let Some(mean) = s.mean_confidence {
        println!("Avg Confidence: {mean:.1}/10");
    }
    println!();

    if report.signals.is_empty() {
        println!("No signals to show.");
        return;
    }

    println!(
        "{:<4} {:<10} {:<7} {:<8} {:>3}  {:<24} {:>4} {:>4}  SETUP",
        "#", "SYMBOL", "CLASS", "TREND", "STR", "PULLBACK", "QUAL", "CONF"
    );
    for (i, sig) in report.signals.iter().enumerate() {
        let setup = match &sig.setup {
            Some(t) => {
                let d = price_decimals(sig.instrument.asset_class);
                format!(
                    "{} {} @ {:.d$}  SL {:.d$}  TP2 {:.d$}  RR {:.2}",
                    t.direction, t.execution_type, t.entry, t.stop_loss, t.tp2, t.rr_ratio
                )
            }
            None => "-".to_string(),
        };
        println!(
            "{:<4} {:<10} {:<7} {:<8} {:>3}  {:<24} {:>4} {:>4}  {}",
            i + 1,
            sig.instrument.symbol,
            sig.instrument.asset_class.to_string(),
            sig.trend_direction.to_string(),
            sig.trend_strength,
            sig.pullback_type.to_string(),
            sig.pullback_quality,
            sig.confidence,
            setup
        );
    }
}

fn print_signal_detail(signal: &Signal, seed: u64, trailing: usize) {
    let d = price_decimals(signal.instrument.asset_class);
    println!();
    println!("=== {} ===", signal.instrument);
    println!("Id:             {}", signal.id);
    println!("Seed:           {seed}");
    println!("Trend:          {} ({}/10)", signal.trend_direction, signal.trend_strength);
    println!(
        "Pullback:       {} (quality {}/10)",
        signal.pullback_type, signal.pullback_quality
    );
    println!("Confidence:     {}/10", signal.confidence);
    if let Some(close) = signal.last_close() {
        println!("Last Close:     {close:.d$}");
    }

    match &signal.setup {
        Some(t) => {
            println!();
            println!("--- Setup ---");
            println!("Direction:      {}", t.direction);
            println!("Execution:      {}", t.execution_type);
            if t.execution_type.is_pending() {
                println!("Order:          resting until price trades through entry");
            }
            println!("Entry:          {:.d$}", t.entry);
            println!("Stop Loss:      {:.d$}", t.stop_loss);
            println!("TP1:            {:.d$}", t.tp1);
            println!("TP2:            {:.d$}", t.tp2);
            println!("TP3:            {:.d$}", t.tp3);
            println!("Risk/Reward:    {:.2}", t.rr_ratio);
        }
        None => {
            println!();
            println!("No valid setup.");
        }
    }

    println!();
    println!("--- Reasoning ---");
    for line in &signal.reasoning {
        println!("- {line}");
    }

    let skip = signal.candles.len().saturating_sub(trailing);
    if skip < signal.candles.len() {
        println!();
        println!("--- Last {} candles ---", signal.candles.len() - skip);
        println!(
            "{:<17} {:>14} {:>14} {:>14} {:>14} {:>14} {:>14}",
            "TIME", "OPEN", "HIGH", "LOW", "CLOSE", "EMA20", "EMA50"
        );
        for c in &signal.candles[skip..] {
            let ema = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |x| format!("{x:.d$}"));
            println!(
                "{:<17} {:>14.d$} {:>14.d$} {:>14.d$} {:>14.d$} {:>14} {:>14}",
                c.timestamp.format("%Y-%m-%d %H:%M"),
                c.open,
                c.high,
                c.low,
                c.close,
                ema(c.ema20),
                ema(c.ema50),
            );
        }
    }
}

fn print_catalog(catalog: &Catalog) {
    println!("{:<10} {:<7} NAME", "SYMBOL", "CLASS");
    for Instrument {
        symbol,
        name,
        asset_class,
    } in &catalog.instruments
    {
        println!("{:<10} {:<7} {}", symbol, asset_class.to_string(), name);
    }
    println!();
    println!("{} instruments", catalog.len());
}
