//! Report construction: the miles-per-citation metric and its two ordered
//! views.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::citations::ScanStats;
use crate::traffic::CourtAggregate;

/// Days used to annualize the daily VMT figures.
const DAYS_PER_YEAR: f64 = 365.0;

/// Report policy knobs. Defaults match the published charts.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Localities containing this token are dropped from chart labels;
    /// their traffic still counts toward the court's totals.
    pub label_exclude_token: String,
    /// High outliers removed from the locality-ordered view; their bars
    /// dwarf everything else.
    pub outlier_localities: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            label_exclude_token: "Manassas".to_string(),
            outlier_localities: vec!["York".to_string(), "Craig".to_string()],
        }
    }
}

/// One chart row: court label and annualized miles driven per citation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub label: String,
    pub miles_per_citation: f64,
}

/// Full run output, logged as JSON for machine inspection.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub scan: ScanStats,
    pub by_metric: Vec<ReportEntry>,
    pub by_locality: Vec<ReportEntry>,
}

/// Builds one entry per court with at least one matched citation.
///
/// Courts with zero citations have no defined miles-per-citation value;
/// they are excluded here and the exclusion is logged, so the division
/// below can never hit zero.
pub fn build_entries(courts: &[CourtAggregate], config: &ReportConfig) -> Vec<ReportEntry> {
    let mut entries = Vec::with_capacity(courts.len());

    for court in courts {
        let label = court
            .localities
            .iter()
            .filter(|l| !l.contains(&config.label_exclude_token))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" / ");

        if court.citation_count == 0 {
            warn!(label = %label, "No citations matched this court; excluded from report");
            continue;
        }

        entries.push(ReportEntry {
            label,
            miles_per_citation: court.total_miles as f64 * DAYS_PER_YEAR
                / court.citation_count as f64,
        });
    }

    entries
}

/// View A: courts ranked by miles per citation, highest first.
pub fn order_by_metric(entries: &[ReportEntry]) -> Vec<ReportEntry> {
    let mut view = entries.to_vec();
    view.sort_by(|a, b| b.miles_per_citation.total_cmp(&a.miles_per_citation));
    view
}

/// View B: high-outlier courts removed, remainder in reverse label order.
pub fn order_by_label(entries: &[ReportEntry], config: &ReportConfig) -> Vec<ReportEntry> {
    let mut view: Vec<ReportEntry> = entries
        .iter()
        .filter(|e| {
            !config
                .outlier_localities
                .iter()
                .any(|outlier| e.label.contains(outlier))
        })
        .cloned()
        .collect();

    view.sort_by(|a, b| b.label.cmp(&a.label));
    view
}
