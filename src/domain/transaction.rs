//! Buy/sell transactions and normalization of transaction-store records.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::diagnostic::Diagnostic;

pub const BTC: &str = "BTC";
pub const USD: &str = "USD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Buy,
    Sell,
}

/// A buy or sell as the engine sees it.
///
/// Numeric fields stay optional so incomplete records survive normalization;
/// the lot builder and matcher decide whether a record is usable.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub btc_amount: Option<f64>,
    pub fiat_amount: Option<f64>,
    pub fee_amount: Option<f64>,
    pub fee_currency_is_usd: bool,
    pub unit_price: Option<f64>,
}

impl Transaction {
    pub fn is_buy(&self) -> bool {
        self.kind == TransactionKind::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.kind == TransactionKind::Sell
    }

    /// Fee in USD, or zero when the fee is absent or paid in another currency.
    pub fn usd_fee(&self) -> f64 {
        if self.fee_currency_is_usd {
            self.fee_amount.filter(|f| *f > 0.0).unwrap_or(0.0)
        } else {
            0.0
        }
    }
}

/// A record as stored by the transaction store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawTransaction {
    pub id: String,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub received_amount: Option<f64>,
    pub received_currency: Option<String>,
    pub sent_amount: Option<f64>,
    pub sent_currency: Option<String>,
    pub fee_amount: Option<f64>,
    pub fee_currency: Option<String>,
    pub unit_price: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct NormalizedTransactions {
    pub transactions: Vec<Transaction>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parses a store date down to its calendar day.
///
/// Accepts `YYYY-MM-DD`, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` timestamp, or RFC 3339.
pub fn parse_transaction_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}

fn currency_is(currency: Option<&str>, expected: &str) -> bool {
    currency.is_some_and(|c| c.trim().eq_ignore_ascii_case(expected))
}

fn amount_in(amount: Option<f64>, currency: Option<&str>, expected: &str) -> Option<f64> {
    if currency_is(currency, expected) {
        amount
    } else {
        None
    }
}

impl RawTransaction {
    fn parse_kind(&self) -> Option<TransactionKind> {
        match self.kind.as_deref().map(|k| k.trim().to_lowercase()).as_deref() {
            Some("buy") => Some(TransactionKind::Buy),
            Some("sell") => Some(TransactionKind::Sell),
            _ => None,
        }
    }

    fn to_transaction(&self, kind: TransactionKind, date: NaiveDate) -> Transaction {
        let received = self.received_currency.as_deref();
        let sent = self.sent_currency.as_deref();
        let (btc_amount, fiat_amount) = match kind {
            TransactionKind::Buy => (
                amount_in(self.received_amount, received, BTC),
                amount_in(self.sent_amount, sent, USD),
            ),
            TransactionKind::Sell => (
                amount_in(self.sent_amount, sent, BTC),
                amount_in(self.received_amount, received, USD),
            ),
        };
        Transaction {
            id: self.id.clone(),
            date,
            kind,
            btc_amount,
            fiat_amount,
            fee_amount: self.fee_amount,
            fee_currency_is_usd: currency_is(self.fee_currency.as_deref(), USD),
            unit_price: self.unit_price,
        }
    }
}

/// Converts store records into engine transactions.
///
/// Records that are neither buys nor sells are ignored, and records whose date
/// cannot be read are skipped; both are reported as diagnostics. Input order is kept.
pub fn normalize(raw: &[RawTransaction]) -> NormalizedTransactions {
    let mut out = NormalizedTransactions::default();

    for record in raw {
        let Some(kind) = record.parse_kind() else {
            out.diagnostics.push(Diagnostic::UnsupportedKind {
                transaction_id: record.id.clone(),
                kind: record.kind.clone().unwrap_or_default(),
            });
            continue;
        };

        let raw_date = record.date.clone().unwrap_or_default();
        let Some(date) = parse_transaction_date(&raw_date) else {
            out.diagnostics.push(Diagnostic::UnparseableDate {
                transaction_id: record.id.clone(),
                value: raw_date,
            });
            continue;
        };

        out.transactions.push(record.to_transaction(kind, date));
    }

    out
}

/// Sum of USD fees across every buy and sell.
pub fn total_usd_fees(transactions: &[Transaction]) -> f64 {
    transactions.iter().map(Transaction::usd_fee).sum()
}
