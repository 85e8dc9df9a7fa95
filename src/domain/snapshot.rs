//! Portfolio snapshot assembly.

use chrono::NaiveDate;
use serde::Serialize;

use super::diagnostic::Diagnostic;
use super::lot::{BuildResult, Lot};
use super::matcher::{MatchResult, RealizedGainRecord};
use super::method::AccountingMethod;
use super::valuation::{TaxRates, ValuationResult};

/// Everything the presentation layer needs for one accounting method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSnapshot {
    pub method: AccountingMethod,
    pub as_of: NaiveDate,
    pub current_price: f64,
    pub tax_rates: TaxRates,
    pub remaining_lots: Vec<Lot>,
    pub total_cost_basis: f64,
    pub total_btc: f64,
    pub current_value: f64,
    pub unrealized_gain: f64,
    pub unrealized_gain_percent: f64,
    pub short_term_unrealized_gain: f64,
    pub long_term_unrealized_gain: f64,
    pub short_term_liability: f64,
    pub long_term_liability: f64,
    pub realized_gains: Vec<RealizedGainRecord>,
    pub total_realized_gain: f64,
    pub short_term_realized_gain: f64,
    pub long_term_realized_gain: f64,
    /// Fee-inclusive cost of every lot bought divided by BTC bought; independent of method.
    pub average_buy_price: f64,
    pub total_fees: f64,
    pub skipped_records: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl PortfolioSnapshot {
    pub fn total_liability(&self) -> f64 {
        self.short_term_liability + self.long_term_liability
    }

    pub fn is_empty(&self) -> bool {
        self.remaining_lots.is_empty() && self.realized_gains.is_empty()
    }
}

/// Assembles a snapshot. Build diagnostics come first, then matching ones.
pub fn summarize(
    method: AccountingMethod,
    as_of: NaiveDate,
    current_price: f64,
    tax_rates: &TaxRates,
    build: &BuildResult,
    matched: MatchResult,
    valuation: ValuationResult,
) -> PortfolioSnapshot {
    let total_realized_gain = matched.total_realized_gain();
    let short_term_realized_gain = matched.short_term_realized_gain();
    let long_term_realized_gain = matched.long_term_realized_gain();

    let mut diagnostics = build.diagnostics.clone();
    diagnostics.extend(matched.diagnostics);
    let skipped_records = diagnostics.iter().filter(|d| d.is_skipped_record()).count();

    PortfolioSnapshot {
        method,
        as_of,
        current_price,
        tax_rates: *tax_rates,
        remaining_lots: matched.remaining_lots,
        total_cost_basis: valuation.total_cost_basis,
        total_btc: valuation.total_btc,
        current_value: valuation.current_value,
        unrealized_gain: valuation.unrealized_gain,
        unrealized_gain_percent: valuation.unrealized_gain_percent,
        short_term_unrealized_gain: valuation.short_term_gain,
        long_term_unrealized_gain: valuation.long_term_gain,
        short_term_liability: valuation.short_term_liability,
        long_term_liability: valuation.long_term_liability,
        realized_gains: matched.realized_gains,
        total_realized_gain,
        short_term_realized_gain,
        long_term_realized_gain,
        average_buy_price: build.average_buy_price(),
        total_fees: build.total_fees,
        skipped_records,
        diagnostics,
    }
}
