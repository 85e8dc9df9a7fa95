//! Console text rendering of snapshots.
//!
//! Provides:
//! - a per-method summary with the remaining lot table
//! - a side-by-side comparison table across methods
//! - a diagnostics list when anything was skipped or truncated

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::domain::diagnostic::Diagnostic;
use crate::domain::error::BtclotsError;
use crate::domain::snapshot::PortfolioSnapshot;
use crate::ports::report_port::ReportPort;

pub struct TextReportAdapter;

fn usd(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${:.2}", value.abs())
}

fn btc(value: f64) -> String {
    format!("{value:.8}")
}

pub fn render_snapshot(snapshot: &PortfolioSnapshot) -> String {
    let mut out = String::new();
    let s = snapshot;

    let _ = writeln!(out, "=== {} as of {} ===", s.method, s.as_of);
    let _ = writeln!(out, "BTC Price:            {}", usd(s.current_price));
    let _ = writeln!(out, "Holdings:             {} BTC", btc(s.total_btc));
    let _ = writeln!(out, "Cost Basis:           {}", usd(s.total_cost_basis));
    let _ = writeln!(out, "Current Value:        {}", usd(s.current_value));
    let _ = writeln!(
        out,
        "Unrealized Gain:      {} ({:.2}%)",
        usd(s.unrealized_gain),
        s.unrealized_gain_percent
    );
    let _ = writeln!(
        out,
        "Realized Gain:        {} (short {}, long {})",
        usd(s.total_realized_gain),
        usd(s.short_term_realized_gain),
        usd(s.long_term_realized_gain)
    );
    let _ = writeln!(out, "Short-Term Liability: {}", usd(s.short_term_liability));
    let _ = writeln!(out, "Long-Term Liability:  {}", usd(s.long_term_liability));
    let _ = writeln!(out, "Average Buy Price:    {}", usd(s.average_buy_price));
    let _ = writeln!(out, "Total Fees:           {}", usd(s.total_fees));

    if s.is_empty() {
        let _ = writeln!(out, "\nNo holdings or sales.");
    }

    if !s.remaining_lots.is_empty() {
        let _ = writeln!(out, "\nRemaining lots:");
        let _ = writeln!(
            out,
            "  {:<12} {:>14} {:>14} {:>12} {:>6}",
            "Acquired", "BTC", "Cost Basis", "Unit Cost", "Term"
        );
        for lot in &s.remaining_lots {
            let term = if s.tax_rates.is_long_term(lot.acquisition_date, s.as_of) {
                "long"
            } else {
                "short"
            };
            let _ = writeln!(
                out,
                "  {:<12} {:>14} {:>14} {:>12} {:>6}",
                lot.acquisition_date.to_string(),
                btc(lot.amount),
                usd(lot.cost_basis),
                usd(lot.unit_cost),
                term
            );
        }
    }

    out.push_str(&render_diagnostics(&s.diagnostics));
    out
}

pub fn render_comparison(snapshots: &[PortfolioSnapshot]) -> String {
    let mut out = String::new();
    let Some(first) = snapshots.first() else {
        return out;
    };

    let _ = writeln!(
        out,
        "=== Method Comparison as of {} (BTC {}) ===",
        first.as_of,
        usd(first.current_price)
    );
    let _ = writeln!(
        out,
        "  {:<20} {:>14} {:>14} {:>14} {:>14}",
        "Method", "Realized", "Unrealized", "Cost Basis", "Est. Tax"
    );
    for s in snapshots {
        let _ = writeln!(
            out,
            "  {:<20} {:>14} {:>14} {:>14} {:>14}",
            s.method.label(),
            usd(s.total_realized_gain),
            usd(s.unrealized_gain),
            usd(s.total_cost_basis),
            usd(s.short_term_liability + s.long_term_liability)
        );
    }

    // Diagnostics never depend on lot order, so every method carries the same list.
    out.push_str(&render_diagnostics(&first.diagnostics));
    out
}

fn render_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    if diagnostics.is_empty() {
        return out;
    }
    let _ = writeln!(out, "\nWarnings ({}):", diagnostics.len());
    for d in diagnostics {
        let _ = writeln!(out, "  - {d}");
    }
    out
}

impl ReportPort for TextReportAdapter {
    fn write(
        &self,
        snapshots: &[PortfolioSnapshot],
        output: Option<&Path>,
    ) -> Result<(), BtclotsError> {
        let text = match snapshots {
            [single] => render_snapshot(single),
            many => render_comparison(many),
        };
        match output {
            Some(path) => fs::write(path, text).map_err(|e| BtclotsError::Report {
                reason: format!("failed to write {}: {}", path.display(), e),
            }),
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(text.as_bytes())?;
                Ok(())
            }
        }
    }
}
