//! Concrete adapter implementations for ports.

pub mod csv_transaction_adapter;
pub mod file_config_adapter;
pub mod json_report_adapter;
pub mod price_adapter;
pub mod text_report;
