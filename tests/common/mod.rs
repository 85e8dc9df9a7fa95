#![allow(dead_code)]

use btclots::domain::error::BtclotsError;
use btclots::domain::snapshot::PortfolioSnapshot;
use btclots::domain::transaction::RawTransaction;
use btclots::ports::price_port::PricePort;
use btclots::ports::report_port::ReportPort;
use btclots::ports::transaction_port::TransactionPort;
use chrono::NaiveDate;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

pub struct MockTransactionPort {
    pub records: Vec<RawTransaction>,
    pub error: Option<String>,
}

impl MockTransactionPort {
    pub fn new(records: Vec<RawTransaction>) -> Self {
        Self {
            records,
            error: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            records: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl TransactionPort for MockTransactionPort {
    fn fetch_transactions(&self) -> Result<Vec<RawTransaction>, BtclotsError> {
        match &self.error {
            Some(reason) => Err(BtclotsError::TransactionSource {
                reason: reason.clone(),
            }),
            None => Ok(self.records.clone()),
        }
    }
}

/// Returns a fixed price and remembers the dates it was asked for.
pub struct MockPricePort {
    pub price: f64,
    pub requested: RefCell<Vec<NaiveDate>>,
}

impl MockPricePort {
    pub fn new(price: f64) -> Self {
        Self {
            price,
            requested: RefCell::new(Vec::new()),
        }
    }
}

impl PricePort for MockPricePort {
    fn current_price(&self, as_of: NaiveDate) -> Result<f64, BtclotsError> {
        self.requested.borrow_mut().push(as_of);
        Ok(self.price)
    }
}

#[derive(Default)]
pub struct RecordingReportPort {
    pub written: RefCell<Vec<(Vec<PortfolioSnapshot>, Option<PathBuf>)>>,
}

impl ReportPort for RecordingReportPort {
    fn write(
        &self,
        snapshots: &[PortfolioSnapshot],
        output: Option<&Path>,
    ) -> Result<(), BtclotsError> {
        self.written
            .borrow_mut()
            .push((snapshots.to_vec(), output.map(Path::to_path_buf)));
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A USD-for-BTC purchase at `price`, with an optional USD fee.
pub fn raw_buy(id: &str, on: &str, btc: f64, price: f64, fee: f64) -> RawTransaction {
    RawTransaction {
        id: id.to_string(),
        date: Some(on.to_string()),
        kind: Some("buy".to_string()),
        received_amount: Some(btc),
        received_currency: Some("BTC".to_string()),
        sent_amount: Some(btc * price),
        sent_currency: Some("USD".to_string()),
        fee_amount: (fee > 0.0).then_some(fee),
        fee_currency: (fee > 0.0).then(|| "USD".to_string()),
        unit_price: Some(price),
    }
}

/// A BTC-for-USD sale at `price`.
pub fn raw_sell(id: &str, on: &str, btc: f64, price: f64) -> RawTransaction {
    RawTransaction {
        id: id.to_string(),
        date: Some(on.to_string()),
        kind: Some("sell".to_string()),
        received_amount: Some(btc * price),
        received_currency: Some("USD".to_string()),
        sent_amount: Some(btc),
        sent_currency: Some("BTC".to_string()),
        fee_amount: None,
        fee_currency: None,
        unit_price: Some(price),
    }
}
