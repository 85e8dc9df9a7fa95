//! Sell matching against ordered lots.
//!
//! Sells are always walked in chronological order; only the order in which
//! lots are consumed depends on the accounting method, and that order is
//! fixed by the caller via [`apply_method`](super::method::apply_method).
//!
//! Matching is copy-on-write: the ordered lots are cloned into a working set
//! and the caller's slice is never touched, so one set of built lots can feed
//! several methods at once.

use chrono::NaiveDate;
use serde::Serialize;

use super::diagnostic::{Diagnostic, SkipReason};
use super::lot::{Lot, LotId, LOT_EPSILON};
use super::transaction::Transaction;
use super::valuation::TaxRates;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealizedGainRecord {
    pub lot_id: LotId,
    pub sale_transaction_id: String,
    pub amount_sold: f64,
    pub proceeds_allocated: f64,
    pub cost_basis_allocated: f64,
    pub gain: f64,
    pub acquisition_date: NaiveDate,
    pub sale_date: NaiveDate,
    pub is_long_term: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchResult {
    /// Lots with anything left in them, still in consumption order.
    pub remaining_lots: Vec<Lot>,
    pub realized_gains: Vec<RealizedGainRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl MatchResult {
    pub fn total_realized_gain(&self) -> f64 {
        self.realized_gains.iter().map(|r| r.gain).sum()
    }

    pub fn short_term_realized_gain(&self) -> f64 {
        self.realized_gains
            .iter()
            .filter(|r| !r.is_long_term)
            .map(|r| r.gain)
            .sum()
    }

    pub fn long_term_realized_gain(&self) -> f64 {
        self.realized_gains
            .iter()
            .filter(|r| r.is_long_term)
            .map(|r| r.gain)
            .sum()
    }
}

struct Sale<'a> {
    tx: &'a Transaction,
    amount: f64,
    unit_price: f64,
}

fn valid_sale(tx: &Transaction) -> Result<Sale<'_>, SkipReason> {
    let amount = tx
        .btc_amount
        .filter(|a| a.is_finite() && *a > 0.0)
        .ok_or(SkipReason::MissingBtcAmount)?;
    let unit_price = tx
        .unit_price
        .filter(|p| p.is_finite() && *p > 0.0)
        .ok_or(SkipReason::MissingUnitPrice)?;
    Ok(Sale {
        tx,
        amount,
        unit_price,
    })
}

/// Consumes `ordered_lots` with every sell in `transactions`.
///
/// Non-sell transactions are ignored. A sell larger than the open lots uses up
/// everything available and the unmatched remainder is reported as
/// [`Diagnostic::Oversold`] rather than producing a negative lot.
pub fn match_sells(
    ordered_lots: &[Lot],
    transactions: &[Transaction],
    rates: &TaxRates,
) -> MatchResult {
    let mut lots = ordered_lots.to_vec();
    let mut result = MatchResult::default();

    let mut sells: Vec<&Transaction> = transactions.iter().filter(|tx| tx.is_sell()).collect();
    sells.sort_by_key(|tx| tx.date);

    for tx in sells {
        let sale = match valid_sale(tx) {
            Ok(sale) => sale,
            Err(reason) => {
                result.diagnostics.push(Diagnostic::SkippedSell {
                    transaction_id: tx.id.clone(),
                    reason,
                });
                continue;
            }
        };

        let remaining = consume_for_sale(&mut lots, &sale, rates, &mut result.realized_gains);
        if remaining > LOT_EPSILON {
            result.diagnostics.push(Diagnostic::Oversold {
                transaction_id: sale.tx.id.clone(),
                date: sale.tx.date,
                unmatched_btc: remaining,
            });
        }
    }

    lots.retain(|lot| !lot.is_dust());
    result.remaining_lots = lots;
    result
}

/// Walks the lots for one sale and returns the BTC that could not be matched.
fn consume_for_sale(
    lots: &mut [Lot],
    sale: &Sale<'_>,
    rates: &TaxRates,
    realized: &mut Vec<RealizedGainRecord>,
) -> f64 {
    let mut remaining = sale.amount;

    for lot in lots.iter_mut() {
        if remaining <= LOT_EPSILON {
            break;
        }
        if lot.amount <= 0.0 {
            continue;
        }

        let (consumed, cost_released) = lot.consume(remaining);
        let proceeds = consumed * sale.unit_price;
        remaining -= consumed;

        tracing::debug!(
            lot = lot.id.0,
            sale = %sale.tx.id,
            consumed,
            left = lot.amount,
            "consumed lot"
        );

        realized.push(RealizedGainRecord {
            lot_id: lot.id,
            sale_transaction_id: sale.tx.id.clone(),
            amount_sold: consumed,
            proceeds_allocated: proceeds,
            cost_basis_allocated: cost_released,
            gain: proceeds - cost_released,
            acquisition_date: lot.acquisition_date,
            sale_date: sale.tx.date,
            is_long_term: rates.is_long_term(lot.acquisition_date, sale.tx.date),
        });
    }

    remaining
}
