//! Price feed adapters: a fixed configured price and a CSV price history.

use crate::domain::error::BtclotsError;
use crate::domain::valuation::validate_price;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

/// Returns the same price for any date.
pub struct FixedPriceAdapter {
    price: f64,
}

impl FixedPriceAdapter {
    pub fn new(price: f64) -> Self {
        Self { price }
    }
}

impl PricePort for FixedPriceAdapter {
    fn current_price(&self, _as_of: NaiveDate) -> Result<f64, BtclotsError> {
        validate_price(self.price)
    }
}

/// Daily closes read from a `date,price` CSV file.
pub struct CsvPriceAdapter {
    path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> Result<Vec<(NaiveDate, f64)>, BtclotsError> {
        let content = fs::read_to_string(&self.path).map_err(|e| BtclotsError::PriceSource {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut points = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| BtclotsError::PriceSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| BtclotsError::PriceSource {
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                BtclotsError::PriceSource {
                    reason: format!("invalid date '{}': {}", date_str, e),
                }
            })?;

            let price: f64 = record
                .get(1)
                .ok_or_else(|| BtclotsError::PriceSource {
                    reason: "missing price column".into(),
                })?
                .parse()
                .map_err(|e| BtclotsError::PriceSource {
                    reason: format!("invalid price on {}: {}", date, e),
                })?;

            points.push((date, price));
        }

        points.sort_by_key(|(date, _)| *date);
        Ok(points)
    }
}

impl PricePort for CsvPriceAdapter {
    /// Latest price dated on or before `as_of`.
    fn current_price(&self, as_of: NaiveDate) -> Result<f64, BtclotsError> {
        let points = self.load()?;
        let (date, price) = points
            .iter()
            .rev()
            .find(|(date, _)| *date <= as_of)
            .copied()
            .ok_or_else(|| BtclotsError::PriceSource {
                reason: format!("no price on or before {} in {}", as_of, self.path.display()),
            })?;
        tracing::info!(%date, price, "using historical price");
        validate_price(price)
    }
}
