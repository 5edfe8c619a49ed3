//! RegimeLab CLI: local indicator snapshots and market context lookups.
//!
//! Commands:
//! - `analyze`: snapshot of a candle file with the local indicator engine
//! - `context`: resolve market context through the backend/ephemeral/client chain
//! - `fetch`: download candles from the market-data provider to JSON
//! - `synth`: write a seeded synthetic candle window

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use regimelab_core::data::synthetic::{self, SyntheticKind};
use regimelab_core::data::{
    load_candles, load_candles_csv, load_candles_json, validate_window, write_candles_json,
};
use regimelab_core::{Candle, EngineConfig, IndicatorEngine};
use regimelab_runner::logging::init_logging;
use regimelab_runner::provider::is_supported_timeframe;
use regimelab_runner::{
    BinanceProvider, CandleProvider, CircuitBreaker, ContextFetcher, FetcherConfig,
};

#[derive(Parser)]
#[command(
    name = "regimelab",
    about = "RegimeLab CLI: crypto market regime indicators"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute an indicator snapshot for the last candle of a file.
    Analyze {
        /// Candle file (CSV or JSON).
        file: PathBuf,

        /// File format. Inferred from the extension when omitted.
        #[arg(long, value_enum)]
        format: Option<CandleFormat>,

        /// TOML config; only the [engine] section is used.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Resolve market context for one or more symbols.
    Context {
        /// Symbols (e.g., BTCUSDT ETHUSDT).
        #[arg(required = true)]
        symbols: Vec<String>,

        #[arg(long, default_value = "1h")]
        timeframe: String,

        /// TOML config. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Download candles from the market-data provider.
    Fetch {
        symbol: String,

        #[arg(long, default_value = "1h")]
        timeframe: String,

        /// Number of candles. Defaults to market_data.candle_limit.
        #[arg(long)]
        limit: Option<usize>,

        /// Output JSON file.
        #[arg(long)]
        out: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write a seeded synthetic candle window.
    Synth {
        #[arg(value_enum)]
        kind: SynthKind,

        /// Output JSON file.
        #[arg(long)]
        out: PathBuf,

        #[arg(long, default_value_t = 300)]
        bars: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CandleFormat {
    Json,
    Csv,
}

#[derive(Clone, Copy, ValueEnum)]
enum SynthKind {
    Trend,
    Range,
    Reversal,
}

impl From<SynthKind> for SyntheticKind {
    fn from(kind: SynthKind) -> Self {
        match kind {
            SynthKind::Trend => SyntheticKind::Trend,
            SynthKind::Range => SyntheticKind::Range,
            SynthKind::Reversal => SyntheticKind::Reversal,
        }
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            file,
            format,
            config,
        } => run_analyze(&file, format, config.as_deref()),
        Commands::Context {
            symbols,
            timeframe,
            config,
        } => run_context(symbols, &timeframe, config.as_deref()),
        Commands::Fetch {
            symbol,
            timeframe,
            limit,
            out,
            config,
        } => run_fetch(&symbol, &timeframe, limit, &out, config.as_deref()),
        Commands::Synth {
            kind,
            out,
            bars,
            seed,
        } => run_synth(kind, &out, bars, seed),
    }
}

fn load_config(path: Option<&Path>) -> Result<FetcherConfig> {
    match path {
        Some(p) => FetcherConfig::from_file(p)
            .with_context(|| format!("loading config {}", p.display())),
        None => Ok(FetcherConfig::default()),
    }
}

fn run_analyze(file: &Path, format: Option<CandleFormat>, config: Option<&Path>) -> Result<()> {
    let engine_config: EngineConfig = load_config(config)?.engine;

    let candles: Vec<Candle> = match format {
        Some(CandleFormat::Json) => load_candles_json(file),
        Some(CandleFormat::Csv) => load_candles_csv(file),
        None => load_candles(file),
    }
    .with_context(|| format!("reading candles from {}", file.display()))?;
    validate_window(&candles).with_context(|| format!("invalid candles in {}", file.display()))?;

    let needed = engine_config.min_candles();
    if candles.len() < needed {
        eprintln!(
            "WARNING: {} candles, fewer than the {needed} needed for every indicator to warm up",
            candles.len()
        );
    }

    let snapshot = IndicatorEngine::new(engine_config).snapshot(&candles);
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn run_context(symbols: Vec<String>, timeframe: &str, config: Option<&Path>) -> Result<()> {
    if !is_supported_timeframe(timeframe) {
        bail!("unsupported timeframe '{timeframe}'");
    }
    let config = load_config(config)?;
    let fetcher = ContextFetcher::from_config(&config)?;

    let requests: Vec<(String, String)> = symbols
        .iter()
        .map(|s| (s.clone(), timeframe.to_string()))
        .collect();
    let results = fetcher.fetch_many(&requests);

    let mut failures = 0;
    for ((symbol, _), result) in requests.iter().zip(results) {
        match result {
            Ok(ctx) => println!("{}", serde_json::to_string_pretty(&ctx)?),
            Err(e) => {
                eprintln!("Error for {symbol}: {e}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} context lookups failed", requests.len());
    }
    Ok(())
}

fn run_fetch(
    symbol: &str,
    timeframe: &str,
    limit: Option<usize>,
    out: &Path,
    config: Option<&Path>,
) -> Result<()> {
    let config = load_config(config)?;
    let limit = limit.unwrap_or(config.market_data.candle_limit);
    if limit == 0 {
        bail!("--limit must be at least 1");
    }

    let breaker = Arc::new(CircuitBreaker::default_provider());
    let provider = BinanceProvider::new(&config.market_data, breaker)?;
    let candles = provider.fetch_candles(symbol, timeframe, limit)?;
    validate_window(&candles)?;

    write_candles_json(out, &candles)
        .with_context(|| format!("writing {}", out.display()))?;
    info!(symbol, timeframe, count = candles.len(), provider = provider.name(), "candles saved");
    println!("Saved {} candles to {}", candles.len(), out.display());
    Ok(())
}

fn run_synth(kind: SynthKind, out: &Path, bars: usize, seed: u64) -> Result<()> {
    let candles = synthetic::generate(kind.into(), bars, seed);
    write_candles_json(out, &candles)
        .with_context(|| format!("writing {}", out.display()))?;
    println!("Wrote {bars} synthetic candles to {}", out.display());
    Ok(())
}
