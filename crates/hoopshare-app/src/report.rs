// Report rendering: a text table for the terminal or a JSON document.

use std::fmt::Write;

use hoopshare_core::{DerivedMetrics, Metric};
use serde::Serialize;

use crate::config::OutputFormat;
use crate::minutes::format_minutes;
use crate::season::SeasonTotals;

/// Everything a report shows. `requested` limits the text table; the JSON
/// document carries the full value map.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub player: &'a str,
    pub season: &'a str,
    pub totals: &'a SeasonTotals,
    #[serde(flatten)]
    pub metrics: &'a DerivedMetrics,
    #[serde(skip)]
    pub requested: &'a [Metric],
}

impl Report<'_> {
    pub fn render(&self, format: OutputFormat) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Text => Ok(self.render_text()),
            OutputFormat::Json => self.render_json(),
        }
    }

    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let totals = self.totals;

        // Writing to a String cannot fail.
        let _ = writeln!(out, "{}, {}", self.player, self.season);
        let _ = write!(out, "{} game(s)", totals.games);
        if let (Some(first), Some(last)) = (totals.first_game, totals.last_game) {
            let _ = write!(out, " ({first} to {last})");
        }
        let _ = writeln!(out, ", {} MP", format_minutes(totals.player.mp));
        let _ = writeln!(out);

        let _ = writeln!(out, "{:<24}{:>12}", "Metric", "Value");
        for metric in self.requested {
            if let Some(value) = self.metrics.metric(*metric) {
                let _ = writeln!(out, "{:<24}{:>12.3}", metric.name(), value);
            }
        }

        let failures: Vec<_> = self
            .metrics
            .failures()
            .iter()
            .filter(|f| self.requested.contains(&f.metric))
            .collect();
        if !failures.is_empty() {
            let _ = writeln!(out);
            for failure in failures {
                let _ = writeln!(out, "{failure}");
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
