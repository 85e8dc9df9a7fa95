//! Unrealized gain and estimated tax liability on the lots still held.

use chrono::NaiveDate;
use serde::Serialize;

use super::error::BtclotsError;
use super::lot::Lot;

pub const DEFAULT_SHORT_TERM_RATE: f64 = 0.37;
pub const DEFAULT_LONG_TERM_RATE: f64 = 0.20;
pub const DEFAULT_LONG_TERM_THRESHOLD_DAYS: i64 = 365;

/// Flat-rate approximation of US federal capital gains brackets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaxRates {
    pub short_term_rate: f64,
    pub long_term_rate: f64,
    /// Holding period, in calendar days, at which a lot becomes long-term.
    pub long_term_threshold_days: i64,
}

impl Default for TaxRates {
    fn default() -> Self {
        Self {
            short_term_rate: DEFAULT_SHORT_TERM_RATE,
            long_term_rate: DEFAULT_LONG_TERM_RATE,
            long_term_threshold_days: DEFAULT_LONG_TERM_THRESHOLD_DAYS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldingPeriod {
    ShortTerm,
    LongTerm,
}

impl TaxRates {
    /// The boundary is inclusive: exactly `long_term_threshold_days` is long-term.
    pub fn holding_period(&self, acquired: NaiveDate, on: NaiveDate) -> HoldingPeriod {
        if (on - acquired).num_days() >= self.long_term_threshold_days {
            HoldingPeriod::LongTerm
        } else {
            HoldingPeriod::ShortTerm
        }
    }

    pub fn is_long_term(&self, acquired: NaiveDate, on: NaiveDate) -> bool {
        self.holding_period(acquired, on) == HoldingPeriod::LongTerm
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValuationResult {
    pub total_btc: f64,
    pub total_cost_basis: f64,
    pub current_value: f64,
    pub unrealized_gain: f64,
    pub unrealized_gain_percent: f64,
    /// Positive per-lot gains held short-term.
    pub short_term_gain: f64,
    /// Positive per-lot gains held long-term.
    pub long_term_gain: f64,
    pub short_term_liability: f64,
    pub long_term_liability: f64,
}

pub fn validate_price(price: f64) -> Result<f64, BtclotsError> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(BtclotsError::InvalidPrice { price })
    }
}

/// Values the remaining lots at `current_price` as of `as_of`.
///
/// Only lots with a positive gain feed the liability buckets; losses are not
/// offset against gains.
pub fn valuate(
    remaining_lots: &[Lot],
    current_price: f64,
    as_of: NaiveDate,
    rates: &TaxRates,
) -> Result<ValuationResult, BtclotsError> {
    let price = validate_price(current_price)?;

    let mut result = ValuationResult::default();
    for lot in remaining_lots {
        result.total_btc += lot.amount;
        result.total_cost_basis += lot.cost_basis;

        let gain = lot.unrealized_gain(price);
        if gain > 0.0 {
            match rates.holding_period(lot.acquisition_date, as_of) {
                HoldingPeriod::ShortTerm => result.short_term_gain += gain,
                HoldingPeriod::LongTerm => result.long_term_gain += gain,
            }
        }
    }

    result.current_value = result.total_btc * price;
    result.unrealized_gain = result.current_value - result.total_cost_basis;
    result.unrealized_gain_percent = if result.total_cost_basis > 0.0 {
        result.unrealized_gain / result.total_cost_basis * 100.0
    } else {
        0.0
    };
    result.short_term_liability = result.short_term_gain * rates.short_term_rate;
    result.long_term_liability = result.long_term_gain * rates.long_term_rate;

    Ok(result)
}
