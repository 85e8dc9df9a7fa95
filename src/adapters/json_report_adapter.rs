//! JSON report adapter implementing ReportPort.
//!
//! A single snapshot is written as one object; a comparison as an array in
//! method order.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::domain::error::BtclotsError;
use crate::domain::snapshot::PortfolioSnapshot;
use crate::ports::report_port::ReportPort;

pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn render(snapshots: &[PortfolioSnapshot]) -> Result<String, BtclotsError> {
        let rendered = match snapshots {
            [single] => serde_json::to_string_pretty(single),
            many => serde_json::to_string_pretty(many),
        };
        rendered.map_err(|e| BtclotsError::Report {
            reason: format!("failed to serialize snapshot: {e}"),
        })
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        snapshots: &[PortfolioSnapshot],
        output: Option<&Path>,
    ) -> Result<(), BtclotsError> {
        let json = Self::render(snapshots)?;
        match output {
            Some(path) => fs::write(path, json + "\n").map_err(|e| BtclotsError::Report {
                reason: format!("failed to write {}: {}", path.display(), e),
            }),
            None => {
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{json}")?;
                Ok(())
            }
        }
    }
}
