//! Domain error types.

/// Top-level error type for btclots.
#[derive(Debug, thiserror::Error)]
pub enum BtclotsError {
    #[error("invalid current price {price}: price must be a positive finite number")]
    InvalidPrice { price: f64 },

    #[error("unknown accounting method: {0}")]
    UnknownMethod(String),

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("transaction source error: {reason}")]
    TransactionSource { reason: String },

    #[error("price source error: {reason}")]
    PriceSource { reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BtclotsError {
    /// Process exit status reported by the CLI for this error.
    pub fn exit_status(&self) -> u8 {
        match self {
            BtclotsError::Io(_) => 1,
            BtclotsError::ConfigParse { .. }
            | BtclotsError::ConfigMissing { .. }
            | BtclotsError::ConfigInvalid { .. } => 2,
            BtclotsError::TransactionSource { .. } | BtclotsError::PriceSource { .. } => 3,
            BtclotsError::InvalidPrice { .. } | BtclotsError::UnknownMethod(_) => 4,
            BtclotsError::Report { .. } => 5,
        }
    }
}

impl From<&BtclotsError> for std::process::ExitCode {
    fn from(err: &BtclotsError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
