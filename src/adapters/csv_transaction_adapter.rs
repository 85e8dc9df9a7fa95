//! CSV file transaction store adapter.
//!
//! Expects a header row using the store's column names (`id`, `date`, `type`,
//! `receivedAmount`, `receivedCurrency`, `sentAmount`, `sentCurrency`,
//! `feeAmount`, `feeCurrency`, `unitPrice`). Columns may appear in any order
//! and may be absent; empty cells are read as missing values.

use crate::domain::error::BtclotsError;
use crate::domain::transaction::RawTransaction;
use crate::ports::transaction_port::TransactionPort;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

pub struct CsvTransactionAdapter {
    path: PathBuf,
}

impl CsvTransactionAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Reads records from any CSV source. Line numbers in errors count the header as line 1.
    pub fn read_records<R: Read>(reader: R) -> Result<Vec<RawTransaction>, BtclotsError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for (index, result) in rdr.deserialize::<RawTransaction>().enumerate() {
            let record = result.map_err(|e| BtclotsError::TransactionSource {
                reason: format!("line {}: {}", index + 2, e),
            })?;
            records.push(record);
        }
        Ok(records)
    }
}

impl TransactionPort for CsvTransactionAdapter {
    fn fetch_transactions(&self) -> Result<Vec<RawTransaction>, BtclotsError> {
        let file = File::open(&self.path).map_err(|e| BtclotsError::TransactionSource {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        let records = Self::read_records(file)?;
        tracing::info!(
            path = %self.path.display(),
            records = records.len(),
            "loaded transactions"
        );
        Ok(records)
    }
}
