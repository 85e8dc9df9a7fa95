//! Configuration validation.
//!
//! Validates all config fields before any file is read or any lot is built.

use crate::domain::error::BtclotsError;
use crate::domain::method::AccountingMethod;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const REPORT_FORMATS: [&str; 2] = ["text", "json"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), BtclotsError> {
    validate_transactions(config)?;
    validate_price(config)?;
    validate_tax(config)?;
    validate_report(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> BtclotsError {
    BtclotsError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_transactions(config: &dyn ConfigPort) -> Result<(), BtclotsError> {
    match config.get_string("transactions", "path") {
        Some(p) if !p.trim().is_empty() => Ok(()),
        _ => Err(BtclotsError::ConfigMissing {
            section: "transactions".to_string(),
            key: "path".to_string(),
        }),
    }
}

fn validate_price(config: &dyn ConfigPort) -> Result<(), BtclotsError> {
    // With neither key set the price may still come from the command line.
    let Some(value) = config.get_string("price", "current") else {
        return Ok(());
    };
    match value.trim().parse::<f64>() {
        Ok(price) if price.is_finite() && price > 0.0 => Ok(()),
        _ => Err(invalid("price", "current", "current must be a positive number")),
    }
}

fn validate_rate(config: &dyn ConfigPort, key: &str) -> Result<(), BtclotsError> {
    let Some(value) = config.get_string("tax", key) else {
        return Ok(());
    };
    match value.trim().parse::<f64>() {
        Ok(rate) if (0.0..=1.0).contains(&rate) => Ok(()),
        _ => Err(invalid("tax", key, format!("{key} must be between 0 and 1"))),
    }
}

fn validate_tax(config: &dyn ConfigPort) -> Result<(), BtclotsError> {
    validate_rate(config, "short_term_rate")?;
    validate_rate(config, "long_term_rate")?;

    if let Some(value) = config.get_string("tax", "long_term_threshold_days") {
        match value.trim().parse::<i64>() {
            Ok(days) if days > 0 => {}
            _ => {
                return Err(invalid(
                    "tax",
                    "long_term_threshold_days",
                    "long_term_threshold_days must be a positive whole number",
                ));
            }
        }
    }
    Ok(())
}

fn validate_report(config: &dyn ConfigPort) -> Result<(), BtclotsError> {
    if let Some(method) = config.get_string("report", "method") {
        method
            .parse::<AccountingMethod>()
            .map_err(|_| invalid("report", "method", "method must be fifo, lifo, hifo or average-cost"))?;
    }

    if let Some(format) = config.get_string("report", "format") {
        if !REPORT_FORMATS.contains(&format.trim().to_lowercase().as_str()) {
            return Err(invalid("report", "format", "format must be text or json"));
        }
    }

    if let Some(as_of) = config.get_string("report", "as_of") {
        NaiveDate::parse_from_str(as_of.trim(), "%Y-%m-%d")
            .map_err(|_| invalid("report", "as_of", "invalid as_of format, expected YYYY-MM-DD"))?;
    }
    Ok(())
}
