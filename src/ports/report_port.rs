//! Report generation port trait.

use crate::domain::error::BtclotsError;
use crate::domain::snapshot::PortfolioSnapshot;
use std::path::Path;

/// Port for rendering snapshots. `output` of `None` means standard output.
pub trait ReportPort {
    fn write(
        &self,
        snapshots: &[PortfolioSnapshot],
        output: Option<&Path>,
    ) -> Result<(), BtclotsError>;
}
