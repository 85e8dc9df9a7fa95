//! Tax lots and the lot builder.

use chrono::NaiveDate;
use serde::Serialize;

use super::diagnostic::{Diagnostic, SkipReason};
use super::transaction::{total_usd_fees, Transaction};

/// Lots at or below this many BTC are treated as fully consumed.
pub const LOT_EPSILON: f64 = 1e-9;

/// Position of a lot in the arena produced by [`build_lots`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LotId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lot {
    pub id: LotId,
    pub transaction_id: String,
    pub amount: f64,
    pub acquisition_date: NaiveDate,
    pub cost_basis: f64,
    /// Fixed at creation; partial consumption shrinks `cost_basis` instead.
    pub unit_cost: f64,
}

impl Lot {
    pub fn is_dust(&self) -> bool {
        self.amount <= LOT_EPSILON
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.amount * price
    }

    pub fn unrealized_gain(&self, price: f64) -> f64 {
        self.market_value(price) - self.cost_basis
    }

    /// Calendar days from acquisition to `on`; negative if `on` precedes it.
    pub fn days_held(&self, on: NaiveDate) -> i64 {
        (on - self.acquisition_date).num_days()
    }

    /// Takes up to `amount` BTC out of the lot and returns `(consumed, cost_released)`.
    ///
    /// Cost basis shrinks in proportion to the amount taken, so the ratio
    /// `cost_basis / amount` is unchanged for whatever stays in the lot.
    pub fn consume(&mut self, amount: f64) -> (f64, f64) {
        if self.amount <= 0.0 || amount <= 0.0 {
            return (0.0, 0.0);
        }
        let consumed = amount.min(self.amount);
        let reduction_ratio = consumed / self.amount;
        let released = self.cost_basis * reduction_ratio;
        self.cost_basis -= released;
        self.amount -= consumed;
        (consumed, released)
    }
}

/// Lots built from the buy side of a transaction list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildResult {
    pub lots: Vec<Lot>,
    /// BTC across every lot, before any sell is matched.
    pub total_btc_bought: f64,
    /// Cost basis across every lot, before any sell is matched.
    pub total_cost_basis: f64,
    /// USD fees across every buy and sell handed to the builder.
    pub total_fees: f64,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildResult {
    pub fn average_buy_price(&self) -> f64 {
        if self.total_btc_bought > 0.0 {
            self.total_cost_basis / self.total_btc_bought
        } else {
            0.0
        }
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn lot_inputs(tx: &Transaction) -> Result<(f64, f64, f64), SkipReason> {
    let amount = positive(tx.btc_amount).ok_or(SkipReason::MissingBtcAmount)?;
    let fiat = positive(tx.fiat_amount).ok_or(SkipReason::MissingFiatAmount)?;
    let unit_price = positive(tx.unit_price).ok_or(SkipReason::MissingUnitPrice)?;
    Ok((amount, fiat, unit_price))
}

/// Creates one lot per complete buy, in input order. Sells are ignored here
/// apart from their fees; incomplete buys are skipped and reported.
pub fn build_lots(transactions: &[Transaction]) -> BuildResult {
    let mut result = BuildResult {
        total_fees: total_usd_fees(transactions),
        ..Default::default()
    };

    for tx in transactions.iter().filter(|tx| tx.is_buy()) {
        let (amount, fiat, unit_price) = match lot_inputs(tx) {
            Ok(inputs) => inputs,
            Err(reason) => {
                result.diagnostics.push(Diagnostic::SkippedBuy {
                    transaction_id: tx.id.clone(),
                    reason,
                });
                continue;
            }
        };

        let cost_basis = fiat + tx.usd_fee();
        result.total_btc_bought += amount;
        result.total_cost_basis += cost_basis;
        result.lots.push(Lot {
            id: LotId(result.lots.len()),
            transaction_id: tx.id.clone(),
            amount,
            acquisition_date: tx.date,
            cost_basis,
            unit_cost: unit_price,
        });
    }

    tracing::debug!(
        lots = result.lots.len(),
        skipped = result.diagnostics.len(),
        "built lots"
    );
    result
}
