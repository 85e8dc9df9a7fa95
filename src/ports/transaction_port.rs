//! Transaction store port trait.

use crate::domain::error::BtclotsError;
use crate::domain::transaction::RawTransaction;

/// Read-only access to the user's buy/sell history, in store order.
pub trait TransactionPort {
    fn fetch_transactions(&self) -> Result<Vec<RawTransaction>, BtclotsError>;
}
