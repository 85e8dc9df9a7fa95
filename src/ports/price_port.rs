//! Price feed port trait.

use crate::domain::error::BtclotsError;
use chrono::NaiveDate;

pub trait PricePort {
    /// USD per BTC as of `as_of`.
    fn current_price(&self, as_of: NaiveDate) -> Result<f64, BtclotsError>;
}
