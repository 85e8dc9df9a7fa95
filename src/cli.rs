//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use crate::adapters::csv_transaction_adapter::CsvTransactionAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::adapters::price_adapter::{CsvPriceAdapter, FixedPriceAdapter};
use crate::adapters::text_report::TextReportAdapter;
use crate::domain::config_validation::validate_config;
use crate::domain::engine::{compare_methods, compute_snapshot, Ledger};
use crate::domain::error::BtclotsError;
use crate::domain::method::AccountingMethod;
use crate::domain::snapshot::PortfolioSnapshot;
use crate::domain::valuation::{
    TaxRates, DEFAULT_LONG_TERM_RATE, DEFAULT_LONG_TERM_THRESHOLD_DAYS, DEFAULT_SHORT_TERM_RATE,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;
use crate::ports::report_port::ReportPort;
use crate::ports::transaction_port::TransactionPort;

#[derive(Parser, Debug)]
#[command(name = "btclots", about = "BTC tax-lot cost basis and gain calculator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by `report` and `compare`; each flag overrides the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[arg(short, long)]
    pub config: PathBuf,
    /// fifo, lifo, hifo or average-cost
    #[arg(short, long)]
    pub method: Option<AccountingMethod>,
    /// Current BTC price in USD
    #[arg(long)]
    pub price: Option<f64>,
    /// Valuation date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
    /// text or json
    #[arg(long)]
    pub format: Option<ReportFormat>,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report holdings, gains and estimated tax under one accounting method
    Report(RunArgs),
    /// Report every accounting method side by side
    Compare(RunArgs),
    /// Validate a configuration file and dry-read its transactions
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = BtclotsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(BtclotsError::ConfigInvalid {
                section: "report".into(),
                key: "format".into(),
                reason: format!("unknown format '{other}', expected text or json"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PriceSource {
    Fixed(f64),
    History(PathBuf),
}

/// Everything one run needs, after config values and flags are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub transactions_path: PathBuf,
    pub method: AccountingMethod,
    pub price: PriceSource,
    pub as_of: NaiveDate,
    pub tax_rates: TaxRates,
    pub format: ReportFormat,
    pub output: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Runs a parsed command; `run` maps the error to an exit code.
pub fn execute(cli: &Cli) -> Result<(), BtclotsError> {
    match &cli.command {
        Command::Report(args) => run_report(args, false),
        Command::Compare(args) => run_report(args, true),
        Command::Validate { config } => run_validate(config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, BtclotsError> {
    tracing::info!(path = %path.display(), "loading config");
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_config(&adapter)?;
    Ok(adapter)
}

fn run_report(args: &RunArgs, compare: bool) -> Result<(), BtclotsError> {
    let adapter = load_config(&args.config)?;
    let today = Local::now().date_naive();
    let settings = build_settings(&adapter, args, today)?;

    let transactions = CsvTransactionAdapter::new(settings.transactions_path.clone());
    let prices = price_adapter(&settings.price);
    let report = report_adapter(settings.format);

    run_pipeline(&transactions, prices.as_ref(), report.as_ref(), &settings, compare)?;
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), BtclotsError> {
    let adapter = load_config(config_path)?;
    let path = transactions_path(&adapter)?;
    let raw = CsvTransactionAdapter::new(path.clone()).fetch_transactions()?;
    let ledger = Ledger::from_raw(&raw);

    println!("Config OK: {}", config_path.display());
    println!(
        "Transactions: {} ({} buys, {} sells, {} lots)",
        path.display(),
        ledger.buy_count(),
        ledger.sell_count(),
        ledger.build.lots.len()
    );
    if ledger.build.diagnostics.is_empty() {
        println!("No warnings");
    } else {
        println!("Warnings ({}):", ledger.build.diagnostics.len());
        for d in &ledger.build.diagnostics {
            println!("  - {d}");
        }
    }
    Ok(())
}

fn price_adapter(source: &PriceSource) -> Box<dyn PricePort> {
    match source {
        PriceSource::Fixed(price) => Box::new(FixedPriceAdapter::new(*price)),
        PriceSource::History(path) => Box::new(CsvPriceAdapter::new(path.clone())),
    }
}

fn report_adapter(format: ReportFormat) -> Box<dyn ReportPort> {
    match format {
        ReportFormat::Text => Box::new(TextReportAdapter),
        ReportFormat::Json => Box::new(JsonReportAdapter),
    }
}

fn transactions_path(config: &dyn ConfigPort) -> Result<PathBuf, BtclotsError> {
    config
        .get_string("transactions", "path")
        .filter(|p| !p.trim().is_empty())
        .map(|p| config.resolve_path(&p))
        .ok_or_else(|| BtclotsError::ConfigMissing {
            section: "transactions".into(),
            key: "path".into(),
        })
}

pub fn build_tax_rates(config: &dyn ConfigPort) -> TaxRates {
    TaxRates {
        short_term_rate: config.get_double("tax", "short_term_rate", DEFAULT_SHORT_TERM_RATE),
        long_term_rate: config.get_double("tax", "long_term_rate", DEFAULT_LONG_TERM_RATE),
        long_term_threshold_days: config.get_int(
            "tax",
            "long_term_threshold_days",
            DEFAULT_LONG_TERM_THRESHOLD_DAYS,
        ),
    }
}

/// Merges the config with command-line overrides. Flags win; `today` is the
/// fallback valuation date.
pub fn build_settings(
    config: &dyn ConfigPort,
    args: &RunArgs,
    today: NaiveDate,
) -> Result<RunSettings, BtclotsError> {
    let transactions_path = transactions_path(config)?;

    let method = match args.method {
        Some(m) => m,
        None => match config.get_string("report", "method") {
            Some(m) => m.parse()?,
            None => AccountingMethod::Fifo,
        },
    };

    let price = match args.price {
        Some(p) => PriceSource::Fixed(p),
        None => {
            let current = config.get_string("price", "current");
            let history = config
                .get_string("price", "history_path")
                .filter(|p| !p.trim().is_empty());
            match (current, history) {
                (Some(value), _) => PriceSource::Fixed(value.trim().parse().map_err(|_| {
                    BtclotsError::ConfigInvalid {
                        section: "price".into(),
                        key: "current".into(),
                        reason: "current must be a positive number".into(),
                    }
                })?),
                (None, Some(path)) => PriceSource::History(config.resolve_path(&path)),
                (None, None) => {
                    return Err(BtclotsError::ConfigMissing {
                        section: "price".into(),
                        key: "current".into(),
                    });
                }
            }
        }
    };

    let as_of = args
        .as_of
        .or_else(|| config.get_date("report", "as_of"))
        .unwrap_or(today);

    let format = match args.format {
        Some(f) => f,
        None => match config.get_string("report", "format") {
            Some(f) => f.parse()?,
            None => ReportFormat::Text,
        },
    };

    let output = args.output.clone().or_else(|| {
        config
            .get_string("report", "output")
            .filter(|p| !p.trim().is_empty())
            .map(|p| config.resolve_path(&p))
    });

    Ok(RunSettings {
        transactions_path,
        method,
        price,
        as_of,
        tax_rates: build_tax_rates(config),
        format,
        output,
    })
}

/// Reads transactions, prices them, computes one snapshot (or one per method
/// when `compare` is set) and hands the result to the report port.
pub fn run_pipeline(
    transactions: &dyn TransactionPort,
    prices: &dyn PricePort,
    report: &dyn ReportPort,
    settings: &RunSettings,
    compare: bool,
) -> Result<Vec<PortfolioSnapshot>, BtclotsError> {
    let raw = transactions.fetch_transactions()?;
    let ledger = Ledger::from_raw(&raw);
    tracing::info!(
        buys = ledger.buy_count(),
        sells = ledger.sell_count(),
        lots = ledger.build.lots.len(),
        "ledger built"
    );

    let price = prices.current_price(settings.as_of)?;
    tracing::info!(price, as_of = %settings.as_of, "valuing holdings");

    let snapshots = if compare {
        compare_methods(&ledger, price, settings.as_of, &settings.tax_rates)?
    } else {
        vec![compute_snapshot(
            &ledger,
            settings.method,
            price,
            settings.as_of,
            &settings.tax_rates,
        )?]
    };

    log_diagnostics(&snapshots);
    report.write(&snapshots, settings.output.as_deref())?;
    if let Some(path) = &settings.output {
        tracing::info!(path = %path.display(), "report written");
    }
    Ok(snapshots)
}

/// Every snapshot carries the same diagnostics; the first one's are logged.
fn log_diagnostics(snapshots: &[PortfolioSnapshot]) {
    let diagnostics = snapshots
        .first()
        .map(|s| s.diagnostics.as_slice())
        .unwrap_or_default();
    for d in diagnostics {
        tracing::warn!(transaction = d.transaction_id(), "{d}");
    }
}
