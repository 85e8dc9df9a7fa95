//! Configuration access port trait.

use chrono::NaiveDate;
use std::path::PathBuf;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;

    /// Reads a `YYYY-MM-DD` value; `None` when missing or malformed.
    fn get_date(&self, section: &str, key: &str) -> Option<NaiveDate> {
        self.get_string(section, key)
            .and_then(|v| NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").ok())
    }

    /// Turns a configured path into a usable one; adapters backed by a file
    /// resolve relative paths against that file's directory.
    fn resolve_path(&self, value: &str) -> PathBuf {
        PathBuf::from(value.trim())
    }
}
