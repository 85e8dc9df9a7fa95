//! CLI integration tests for the report, compare and validate commands.
//!
//! Tests cover:
//! - Settings resolution (build_settings) from INI plus flag overrides
//! - The pipeline (run_pipeline) with mock ports
//! - End-to-end runs against INI and CSV files on disk

mod common;

use btclots::adapters::file_config_adapter::FileConfigAdapter;
use btclots::cli::{self, Cli, Command, PriceSource, ReportFormat, RunArgs, RunSettings};
use btclots::domain::error::BtclotsError;
use btclots::domain::method::AccountingMethod;
use btclots::domain::valuation::TaxRates;
use common::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn args(config: &Path) -> RunArgs {
    RunArgs {
        config: config.to_path_buf(),
        ..Default::default()
    }
}

const VALID_INI: &str = r#"
[transactions]
path = /data/transactions.csv

[price]
current = 65000

[tax]
short_term_rate = 0.32
long_term_rate = 0.15
long_term_threshold_days = 366

[report]
method = lifo
format = json
as_of = 2025-01-31
output = /tmp/btclots-report.json
"#;

const TRANSACTIONS_CSV: &str = "\
id,date,type,receivedAmount,receivedCurrency,sentAmount,sentCurrency,feeAmount,feeCurrency,unitPrice
b1,2023-01-01,buy,1.0,BTC,10000,USD,0,USD,10000
b2,2024-06-01,buy,0.5,BTC,30000,USD,15,USD,60000
s1,2024-02-01,sell,8000,USD,0.4,BTC,,,20000
d1,2024-03-01,deposit,0.1,BTC,,,,,
";

mod settings {
    use super::*;

    #[test]
    fn reads_every_section() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let settings =
            cli::build_settings(&adapter, &args(Path::new("x.ini")), date(2026, 1, 1)).unwrap();

        assert_eq!(
            settings,
            RunSettings {
                transactions_path: PathBuf::from("/data/transactions.csv"),
                method: AccountingMethod::Lifo,
                price: PriceSource::Fixed(65_000.0),
                as_of: date(2025, 1, 31),
                tax_rates: TaxRates {
                    short_term_rate: 0.32,
                    long_term_rate: 0.15,
                    long_term_threshold_days: 366,
                },
                format: ReportFormat::Json,
                output: Some(PathBuf::from("/tmp/btclots-report.json")),
            }
        );
    }

    #[test]
    fn defaults_fill_optional_keys() {
        let ini = "[transactions]\npath = tx.csv\n[price]\ncurrent = 100\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let settings =
            cli::build_settings(&adapter, &args(Path::new("x.ini")), date(2026, 1, 1)).unwrap();

        assert_eq!(settings.method, AccountingMethod::Fifo);
        assert_eq!(settings.format, ReportFormat::Text);
        assert_eq!(settings.as_of, date(2026, 1, 1));
        assert_eq!(settings.tax_rates, TaxRates::default());
        assert_eq!(settings.output, None);
    }

    #[test]
    fn flags_override_config() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let overrides = RunArgs {
            config: PathBuf::from("x.ini"),
            method: Some(AccountingMethod::Hifo),
            price: Some(70_000.0),
            as_of: Some(date(2025, 6, 30)),
            format: Some(ReportFormat::Text),
            output: Some(PathBuf::from("out.txt")),
        };
        let settings = cli::build_settings(&adapter, &overrides, date(2026, 1, 1)).unwrap();

        assert_eq!(settings.method, AccountingMethod::Hifo);
        assert_eq!(settings.price, PriceSource::Fixed(70_000.0));
        assert_eq!(settings.as_of, date(2025, 6, 30));
        assert_eq!(settings.format, ReportFormat::Text);
        assert_eq!(settings.output, Some(PathBuf::from("out.txt")));
    }

    #[test]
    fn price_history_is_resolved_next_to_the_config() {
        let file = write_temp_ini(
            "[transactions]\npath = tx.csv\n[price]\nhistory_path = prices.csv\n",
        );
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        let settings = cli::build_settings(&adapter, &args(file.path()), date(2026, 1, 1)).unwrap();

        let dir = file.path().parent().unwrap();
        assert_eq!(settings.transactions_path, dir.join("tx.csv"));
        assert_eq!(settings.price, PriceSource::History(dir.join("prices.csv")));
    }

    #[test]
    fn missing_price_without_flag_is_an_error() {
        let adapter = FileConfigAdapter::from_string("[transactions]\npath = tx.csv\n").unwrap();
        let err = cli::build_settings(&adapter, &args(Path::new("x.ini")), date(2026, 1, 1))
            .unwrap_err();
        assert!(matches!(err, BtclotsError::ConfigMissing { section, .. } if section == "price"));
    }

    #[test]
    fn price_flag_stands_in_for_missing_section() {
        let adapter = FileConfigAdapter::from_string("[transactions]\npath = tx.csv\n").unwrap();
        let overrides = RunArgs {
            price: Some(42_000.0),
            ..args(Path::new("x.ini"))
        };
        let settings = cli::build_settings(&adapter, &overrides, date(2026, 1, 1)).unwrap();
        assert_eq!(settings.price, PriceSource::Fixed(42_000.0));
    }

    #[test]
    fn missing_transactions_path_is_an_error() {
        let adapter = FileConfigAdapter::from_string("[price]\ncurrent = 1\n").unwrap();
        let err = cli::build_settings(&adapter, &args(Path::new("x.ini")), date(2026, 1, 1))
            .unwrap_err();
        assert!(matches!(err, BtclotsError::ConfigMissing { key, .. } if key == "path"));
    }
}

mod pipeline {
    use super::*;

    fn settings() -> RunSettings {
        RunSettings {
            transactions_path: PathBuf::from("unused.csv"),
            method: AccountingMethod::Fifo,
            price: PriceSource::Fixed(30_000.0),
            as_of: date(2024, 6, 1),
            tax_rates: TaxRates::default(),
            format: ReportFormat::Text,
            output: Some(PathBuf::from("report.txt")),
        }
    }

    fn history() -> MockTransactionPort {
        MockTransactionPort::new(vec![
            raw_buy("b1", "2023-01-01", 1.0, 10_000.0, 0.0),
            raw_buy("b2", "2024-01-01", 1.0, 40_000.0, 0.0),
            raw_sell("s1", "2024-03-01", 0.5, 50_000.0),
        ])
    }

    #[test]
    fn single_method_writes_one_snapshot() {
        let prices = MockPricePort::new(30_000.0);
        let report = RecordingReportPort::default();

        let snaps = cli::run_pipeline(&history(), &prices, &report, &settings(), false).unwrap();

        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].method, AccountingMethod::Fifo);
        assert_eq!(snaps[0].realized_gains[0].lot_id.0, 0);
        assert_eq!(*prices.requested.borrow(), vec![date(2024, 6, 1)]);

        let written = report.written.borrow();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].0, snaps);
        assert_eq!(written[0].1, Some(PathBuf::from("report.txt")));
    }

    #[test]
    fn compare_writes_every_method_once() {
        let prices = MockPricePort::new(30_000.0);
        let report = RecordingReportPort::default();

        let snaps = cli::run_pipeline(&history(), &prices, &report, &settings(), true).unwrap();

        let methods: Vec<_> = snaps.iter().map(|s| s.method).collect();
        assert_eq!(methods, AccountingMethod::ALL.to_vec());
        assert_eq!(report.written.borrow().len(), 1);
        assert_eq!(prices.requested.borrow().len(), 1);
    }

    #[test]
    fn transaction_source_errors_propagate() {
        let prices = MockPricePort::new(30_000.0);
        let report = RecordingReportPort::default();
        let err = cli::run_pipeline(
            &MockTransactionPort::failing("store offline"),
            &prices,
            &report,
            &settings(),
            false,
        )
        .unwrap_err();

        assert!(matches!(err, BtclotsError::TransactionSource { .. }));
        assert!(report.written.borrow().is_empty());
        assert!(prices.requested.borrow().is_empty());
    }

    #[test]
    fn invalid_price_writes_nothing() {
        let prices = MockPricePort::new(0.0);
        let report = RecordingReportPort::default();
        let err = cli::run_pipeline(&history(), &prices, &report, &settings(), false).unwrap_err();

        assert!(matches!(err, BtclotsError::InvalidPrice { .. }));
        assert!(report.written.borrow().is_empty());
    }
}

mod logging {
    use super::*;
    use btclots::domain::engine::{compute_snapshot, Ledger};
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn oversold_history() -> Vec<btclots::domain::transaction::RawTransaction> {
        vec![
            raw_buy("b1", "2024-01-01", 0.5, 40_000.0, 0.0),
            raw_sell("s1", "2024-02-01", 1.0, 50_000.0),
        ]
    }

    #[test]
    fn engine_does_not_log_diagnostics() {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();

        let ledger = Ledger::from_raw(&oversold_history());
        tracing::subscriber::with_default(subscriber, || {
            for method in AccountingMethod::ALL {
                let snap =
                    compute_snapshot(&ledger, method, 50_000.0, date(2024, 3, 1), &TaxRates::default())
                        .unwrap();
                assert_eq!(snap.diagnostics.len(), 1);
            }
        });

        assert!(!buffer.contents().contains("exceeds open lots"));
    }

    #[test]
    fn compare_logs_each_diagnostic_once() {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();

        let settings = RunSettings {
            transactions_path: PathBuf::from("unused.csv"),
            method: AccountingMethod::Fifo,
            price: PriceSource::Fixed(50_000.0),
            as_of: date(2024, 3, 1),
            tax_rates: TaxRates::default(),
            format: ReportFormat::Text,
            output: None,
        };
        let snaps = tracing::subscriber::with_default(subscriber, || {
            cli::run_pipeline(
                &MockTransactionPort::new(oversold_history()),
                &MockPricePort::new(50_000.0),
                &RecordingReportPort::default(),
                &settings,
                true,
            )
            .unwrap()
        });

        assert_eq!(snaps.len(), 3);
        assert_eq!(buffer.contents().matches("exceeds open lots").count(), 1);
    }
}

mod end_to_end {
    use super::*;

    struct Workspace {
        dir: TempDir,
    }

    impl Workspace {
        fn new(ini: &str) -> Self {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("transactions.csv"), TRANSACTIONS_CSV).unwrap();
            fs::write(dir.path().join("btclots.ini"), ini).unwrap();
            Self { dir }
        }

        fn config(&self) -> PathBuf {
            self.dir.path().join("btclots.ini")
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }
    }

    const INI: &str = "\
[transactions]
path = transactions.csv

[price]
current = 50000

[report]
as_of = 2025-01-31
output = report.out
";

    #[test]
    fn report_writes_json_snapshot() {
        let ws = Workspace::new(INI);
        let cli = Cli {
            command: Command::Report(RunArgs {
                format: Some(ReportFormat::Json),
                ..args(&ws.config())
            }),
        };
        cli::execute(&cli).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(ws.path("report.out")).unwrap()).unwrap();
        assert_eq!(json["method"], "fifo");
        assert_eq!(json["as_of"], "2025-01-31");
        assert_eq!(json["remaining_lots"].as_array().unwrap().len(), 2);
        let total_btc = json["total_btc"].as_f64().unwrap();
        assert!((total_btc - 1.1).abs() < 1e-9);
        let realized = json["total_realized_gain"].as_f64().unwrap();
        assert!((realized - 4_000.0).abs() < 1e-9);
        assert_eq!(json["diagnostics"][0]["kind"], "unsupported_kind");
    }

    #[test]
    fn compare_writes_text_table() {
        let ws = Workspace::new(INI);
        let cli = Cli {
            command: Command::Compare(args(&ws.config())),
        };
        cli::execute(&cli).unwrap();

        let text = fs::read_to_string(ws.path("report.out")).unwrap();
        assert!(text.starts_with("=== Method Comparison as of 2025-01-31"));
        assert!(text.contains("FIFO"));
        assert!(text.contains("LIFO"));
        assert!(text.contains("HIFO (average cost)"));
        assert!(text.contains("Warnings (1):"));
    }

    #[test]
    fn price_history_file_is_used() {
        let ini = "\
[transactions]
path = transactions.csv

[price]
history_path = prices.csv

[report]
format = json
as_of = 2025-01-31
output = report.out
";
        let ws = Workspace::new(ini);
        fs::write(
            ws.path("prices.csv"),
            "date,price\n2025-01-01,90000\n2025-01-30,100000\n2025-02-01,1\n",
        )
        .unwrap();

        cli::execute(&Cli {
            command: Command::Report(args(&ws.config())),
        })
        .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(ws.path("report.out")).unwrap()).unwrap();
        assert_eq!(json["current_price"].as_f64(), Some(100_000.0));
    }

    #[test]
    fn validate_reads_transactions_without_reporting() {
        let ws = Workspace::new(INI);
        cli::execute(&Cli {
            command: Command::Validate {
                config: ws.config(),
            },
        })
        .unwrap();
        assert!(!ws.path("report.out").exists());
    }

    #[test]
    fn invalid_config_fails_before_reading() {
        let ws = Workspace::new("[transactions]\npath = transactions.csv\n[tax]\nshort_term_rate = 2\n");
        let err = cli::execute(&Cli {
            command: Command::Report(RunArgs {
                price: Some(50_000.0),
                ..args(&ws.config())
            }),
        })
        .unwrap_err();
        assert!(matches!(err, BtclotsError::ConfigInvalid { ref key, .. } if key == "short_term_rate"));
        assert_eq!(err.exit_status(), 2);
    }

    #[test]
    fn missing_transaction_file_is_a_source_error() {
        let ws = Workspace::new(INI);
        fs::remove_file(ws.path("transactions.csv")).unwrap();
        let err = cli::execute(&Cli {
            command: Command::Report(args(&ws.config())),
        })
        .unwrap_err();
        assert!(matches!(err, BtclotsError::TransactionSource { .. }));
        assert_eq!(err.exit_status(), 3);
    }
}
