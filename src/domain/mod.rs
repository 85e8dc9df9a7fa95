//! Core domain types and logic.

pub mod transaction;
pub mod lot;
pub mod method;
pub mod matcher;
pub mod valuation;
pub mod snapshot;
pub mod engine;
pub mod diagnostic;
pub mod config_validation;
pub mod error;
