//! Non-fatal diagnostics collected while building and matching lots.
//!
//! The engine always produces a best-effort result; anything it had to skip
//! or truncate along the way is reported here instead of being absorbed.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// BTC amount missing, zero or negative.
    MissingBtcAmount,
    /// USD amount missing, zero or negative.
    MissingFiatAmount,
    /// Unit price missing, zero or negative.
    MissingUnitPrice,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingBtcAmount => write!(f, "missing or non-positive BTC amount"),
            SkipReason::MissingFiatAmount => write!(f, "missing or non-positive USD amount"),
            SkipReason::MissingUnitPrice => write!(f, "missing or non-positive unit price"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    SkippedBuy {
        transaction_id: String,
        reason: SkipReason,
    },
    SkippedSell {
        transaction_id: String,
        reason: SkipReason,
    },
    /// A sell asked for more BTC than the open lots held; the remainder was dropped.
    Oversold {
        transaction_id: String,
        date: NaiveDate,
        unmatched_btc: f64,
    },
    UnsupportedKind {
        transaction_id: String,
        kind: String,
    },
    UnparseableDate {
        transaction_id: String,
        value: String,
    },
}

impl Diagnostic {
    /// True for diagnostics that mean an input record was dropped entirely.
    pub fn is_skipped_record(&self) -> bool {
        matches!(
            self,
            Diagnostic::SkippedBuy { .. }
                | Diagnostic::SkippedSell { .. }
                | Diagnostic::UnparseableDate { .. }
        )
    }

    pub fn transaction_id(&self) -> &str {
        match self {
            Diagnostic::SkippedBuy { transaction_id, .. }
            | Diagnostic::SkippedSell { transaction_id, .. }
            | Diagnostic::Oversold { transaction_id, .. }
            | Diagnostic::UnsupportedKind { transaction_id, .. }
            | Diagnostic::UnparseableDate { transaction_id, .. } => transaction_id,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SkippedBuy {
                transaction_id,
                reason,
            } => write!(f, "skipped buy {transaction_id}: {reason}"),
            Diagnostic::SkippedSell {
                transaction_id,
                reason,
            } => write!(f, "skipped sell {transaction_id}: {reason}"),
            Diagnostic::Oversold {
                transaction_id,
                date,
                unmatched_btc,
            } => write!(
                f,
                "sell {transaction_id} on {date} exceeds open lots by {unmatched_btc:.8} BTC"
            ),
            Diagnostic::UnsupportedKind {
                transaction_id,
                kind,
            } => write!(f, "ignored {transaction_id}: unsupported type '{kind}'"),
            Diagnostic::UnparseableDate {
                transaction_id,
                value,
            } => write!(f, "skipped {transaction_id}: unparseable date '{value}'"),
        }
    }
}
