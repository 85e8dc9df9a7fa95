//! End-to-end calculation: transactions in, one snapshot per method out.
//!
//! Every call is a pure function of its arguments. The wall-clock "today"
//! is never read here; callers pass `as_of` explicitly.

use chrono::NaiveDate;
use rayon::prelude::*;

use super::error::BtclotsError;
use super::lot::{build_lots, BuildResult};
use super::matcher::match_sells;
use super::method::{apply_method, AccountingMethod};
use super::snapshot::{summarize, PortfolioSnapshot};
use super::transaction::{normalize, RawTransaction, Transaction};
use super::valuation::{validate_price, valuate, TaxRates};

/// Normalized transactions plus the lots built from them.
///
/// Immutable once built, so it can be shared across methods and threads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    pub transactions: Vec<Transaction>,
    pub build: BuildResult,
}

impl Ledger {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        let build = build_lots(&transactions);
        Self {
            transactions,
            build,
        }
    }

    /// Normalizes store records first; normalization diagnostics lead the list.
    pub fn from_raw(raw: &[RawTransaction]) -> Self {
        let normalized = normalize(raw);
        let mut ledger = Self::new(normalized.transactions);
        let mut diagnostics = normalized.diagnostics;
        diagnostics.append(&mut ledger.build.diagnostics);
        ledger.build.diagnostics = diagnostics;
        ledger
    }

    pub fn buy_count(&self) -> usize {
        self.transactions.iter().filter(|tx| tx.is_buy()).count()
    }

    pub fn sell_count(&self) -> usize {
        self.transactions.iter().filter(|tx| tx.is_sell()).count()
    }
}

pub fn compute_snapshot(
    ledger: &Ledger,
    method: AccountingMethod,
    current_price: f64,
    as_of: NaiveDate,
    rates: &TaxRates,
) -> Result<PortfolioSnapshot, BtclotsError> {
    let span = tracing::info_span!("snapshot", method = ?method);
    let _enter = span.enter();

    validate_price(current_price)?;

    let ordered = apply_method(&ledger.build.lots, method);
    let matched = match_sells(&ordered, &ledger.transactions, rates);
    let valuation = valuate(&matched.remaining_lots, current_price, as_of, rates)?;

    tracing::debug!(
        remaining = matched.remaining_lots.len(),
        realized = matched.realized_gains.len(),
        "matched sells"
    );

    Ok(summarize(
        method,
        as_of,
        current_price,
        rates,
        &ledger.build,
        matched,
        valuation,
    ))
}

/// Computes every method in [`AccountingMethod::ALL`] order, in parallel.
pub fn compare_methods(
    ledger: &Ledger,
    current_price: f64,
    as_of: NaiveDate,
    rates: &TaxRates,
) -> Result<Vec<PortfolioSnapshot>, BtclotsError> {
    AccountingMethod::ALL
        .par_iter()
        .map(|&method| compute_snapshot(ledger, method, current_price, as_of, rates))
        .collect()
}
