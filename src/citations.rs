//! Citation scanning and court attribution.
//!
//! Scanning is split from aggregation: the scan borrows the court
//! collection read-only and returns per-court deltas, which a separate
//! apply step folds back in. Results are identical to mutating the courts
//! while scanning, without the action at a distance.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::traffic::CourtAggregate;
use crate::violation::{Violation, ViolationExtractor};

/// A single row of a district-court citation export. Columns beyond these
/// are ignored.
#[derive(Debug, Deserialize)]
struct CitationRow {
    #[serde(rename = "Charge")]
    charge: String,
    court_fips: u32,
}

/// Citation observations for one court, parallel to the court collection
/// the scan ran against.
#[derive(Debug, Default, Clone)]
pub struct CourtDelta {
    pub citation_count: u64,
    pub violations: Vec<Violation>,
}

/// Everything a citation scan produces.
#[derive(Debug)]
pub struct CitationDeltas {
    pub per_court: Vec<CourtDelta>,
    pub stats: ScanStats,
}

/// Scan diagnostics. Rows dropped during matching are counted here rather
/// than disappearing silently; a whole dataset of unmatched records shows
/// up as a large `unmatched_court`.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ScanStats {
    pub files: usize,
    pub rows: u64,
    pub matched: u64,
    pub no_violation: u64,
    pub unmatched_court: u64,
}

/// Scans every citation CSV in `dir` and attributes speeding citations to
/// courts.
///
/// Files are processed in filename order so repeated runs over the same
/// directory produce identical results regardless of filesystem listing
/// order. Each citation goes to the first court, in creation order, whose
/// jurisdiction codes contain the row's `court_fips`; scanning stops at
/// that court, so a citation is attributed at most once even when code
/// sets overlap.
///
/// # Errors
///
/// Fails when the directory is unreadable, contains no `csv` file, or a
/// file has a missing `Charge` column or a non-integer `court_fips`.
#[tracing::instrument(skip(extractor, courts), fields(dir = %dir.display()))]
pub fn scan_citations(
    dir: &Path,
    extractor: &ViolationExtractor,
    courts: &[CourtAggregate],
) -> Result<CitationDeltas> {
    let files = citation_files(dir)?;
    if files.is_empty() {
        bail!("no citation csv files found in {}", dir.display());
    }

    let mut per_court = vec![CourtDelta::default(); courts.len()];
    let mut stats = ScanStats {
        files: files.len(),
        ..ScanStats::default()
    };

    for path in &files {
        debug!(path = %path.display(), "Scanning citation file");
        scan_file(path, extractor, courts, &mut per_court, &mut stats)?;
    }

    info!(
        files = stats.files,
        rows = stats.rows,
        matched = stats.matched,
        no_violation = stats.no_violation,
        unmatched_court = stats.unmatched_court,
        "Citation scan complete"
    );

    Ok(CitationDeltas { per_court, stats })
}

/// Folds scan deltas into the court collection. Attribution already
/// happened during the scan; this only merges counts and speed
/// observations.
pub fn apply_deltas(
    mut courts: Vec<CourtAggregate>,
    per_court: Vec<CourtDelta>,
) -> Vec<CourtAggregate> {
    for (court, delta) in courts.iter_mut().zip(per_court) {
        court.citation_count += delta.citation_count;
        for violation in delta.violations {
            court
                .limit_buckets
                .entry(violation.speed_limit)
                .or_default()
                .push(violation.actual_speed);
        }
    }
    courts
}

fn citation_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("reading citation directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        files.push(path);
    }

    files.sort();
    Ok(files)
}

fn scan_file(
    path: &Path,
    extractor: &ViolationExtractor,
    courts: &[CourtAggregate],
    per_court: &mut [CourtDelta],
    stats: &mut ScanStats,
) -> Result<()> {
    let file = File::open(path)
        .with_context(|| format!("opening citation file {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);

    for result in rdr.deserialize() {
        let row: CitationRow = result
            .with_context(|| format!("reading citation rows from {}", path.display()))?;
        stats.rows += 1;

        let Some(violation) = extractor.extract(&row.charge) else {
            stats.no_violation += 1;
            continue;
        };

        // First court in creation order containing the code wins.
        match courts
            .iter()
            .position(|c| c.court_ids.contains(&row.court_fips))
        {
            Some(i) => {
                per_court[i].citation_count += 1;
                per_court[i].violations.push(violation);
                stats.matched += 1;
            }
            None => stats.unmatched_court += 1,
        }
    }

    Ok(())
}
