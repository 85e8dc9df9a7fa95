//! Port traits: the seams between the engine and its external collaborators.

pub mod config_port;
pub mod price_port;
pub mod report_port;
pub mod transaction_port;
