//! Lot-consumption ordering for each accounting method.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::error::BtclotsError;
use super::lot::Lot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountingMethod {
    /// Earliest acquisition first.
    Fifo,
    /// Latest acquisition first.
    Lifo,
    /// Highest unit cost first. Also what the product calls "average cost":
    /// it is not a running weighted average.
    Hifo,
}

impl AccountingMethod {
    pub const ALL: [AccountingMethod; 3] = [
        AccountingMethod::Fifo,
        AccountingMethod::Lifo,
        AccountingMethod::Hifo,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AccountingMethod::Fifo => "FIFO",
            AccountingMethod::Lifo => "LIFO",
            AccountingMethod::Hifo => "HIFO (average cost)",
        }
    }
}

impl fmt::Display for AccountingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AccountingMethod {
    type Err = BtclotsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fifo" => Ok(AccountingMethod::Fifo),
            "lifo" => Ok(AccountingMethod::Lifo),
            "hifo" | "average-cost" | "average_cost" | "avg" => Ok(AccountingMethod::Hifo),
            _ => Err(BtclotsError::UnknownMethod(s.trim().to_string())),
        }
    }
}

/// Returns the lots in the order `method` consumes them. Ties keep input order.
pub fn apply_method(lots: &[Lot], method: AccountingMethod) -> Vec<Lot> {
    let mut ordered = lots.to_vec();
    match method {
        AccountingMethod::Fifo => ordered.sort_by_key(|lot| lot.acquisition_date),
        AccountingMethod::Lifo => {
            ordered.sort_by(|a, b| b.acquisition_date.cmp(&a.acquisition_date))
        }
        AccountingMethod::Hifo => ordered.sort_by(|a, b| b.unit_cost.total_cmp(&a.unit_cost)),
    }
    ordered
}
