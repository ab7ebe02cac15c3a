//! Loading and merging of the daily vehicle-miles-traveled dataset.
//!
//! Some district courts are represented in the traffic data by multiple
//! localities, and some localities share a court. Rows carrying the same
//! compound FIPS identifier are merged into a single per-court record
//! instead of being loaded one-to-one.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

/// Default location of the daily-VMT export consumed by the pipeline.
pub const DEFAULT_TRAFFIC_DATA_PATH: &str = "data/traffic_daily_vehicle_miles_traveled_2015.csv";

/// Locality qualifier dropped from display names.
const CITY_QUALIFIER: &str = "City of ";

/// Accumulated traffic and citation state for one district court.
///
/// One aggregate exists per distinct compound identifier string. Courts are
/// kept in first-seen input order; that order is the deterministic scan
/// order for citation attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourtAggregate {
    /// Contributing locality names, in input order. Duplicates possible if
    /// the input repeats a locality.
    pub localities: Vec<String>,
    /// Jurisdiction FIPS codes this court answers to.
    pub court_ids: Vec<u32>,
    pub total_miles: u64,
    pub interstate_miles: u64,
    pub primary_miles: u64,
    pub secondary_miles: u64,
    /// Observed actual speeds keyed by the speed limit they exceeded.
    pub limit_buckets: BTreeMap<u32, Vec<u32>>,
    pub citation_count: u64,
}

impl CourtAggregate {
    fn new(court_ids: Vec<u32>) -> Self {
        Self {
            localities: Vec::new(),
            court_ids,
            total_miles: 0,
            interstate_miles: 0,
            primary_miles: 0,
            secondary_miles: 0,
            limit_buckets: BTreeMap::new(),
            citation_count: 0,
        }
    }
}

/// A single row of the VMT export. Columns beyond these are ignored.
///
/// Mileage fields stay as text here: rows without a court identifier are
/// skipped before any numeric parsing, so a malformed figure on an
/// unattributable row is not an error.
#[derive(Debug, Deserialize)]
struct TrafficRow {
    #[serde(rename = "District Court FIPS Codes")]
    court_fips_codes: String,
    #[serde(rename = "Locality")]
    locality: String,
    #[serde(rename = "All")]
    all: String,
    #[serde(rename = "Interstate")]
    interstate: String,
    #[serde(rename = "Primary")]
    primary: String,
    #[serde(rename = "Secondary")]
    secondary: String,
}

/// Loads the VMT dataset from `path` and merges it per court.
///
/// # Errors
///
/// Fails when the file cannot be opened, a kept row carries a malformed
/// mileage figure, a jurisdiction code is not an integer, or an expected
/// column is missing.
#[tracing::instrument(fields(path = %path.display()))]
pub fn load_traffic_data(path: &Path) -> Result<Vec<CourtAggregate>> {
    let file =
        File::open(path).with_context(|| format!("opening traffic data {}", path.display()))?;
    let aggregates = read_traffic(file)
        .with_context(|| format!("loading traffic data {}", path.display()))?;

    info!(courts = aggregates.len(), "Traffic data loaded");
    Ok(aggregates)
}

/// Merges VMT rows from any CSV reader into per-court aggregates, keyed by
/// the exact compound identifier string and ordered by first appearance.
pub fn read_traffic<R: Read>(reader: R) -> Result<Vec<CourtAggregate>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let mut aggregates: Vec<CourtAggregate> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut unattributable = 0u64;

    for result in rdr.deserialize() {
        let row: TrafficRow = result?;

        if row.court_fips_codes.is_empty() {
            // No court assignment; nothing to attribute citations to.
            unattributable += 1;
            continue;
        }

        let slot = match index.get(&row.court_fips_codes) {
            Some(&i) => i,
            None => {
                let court_ids = parse_court_ids(&row.court_fips_codes)?;
                aggregates.push(CourtAggregate::new(court_ids));
                index.insert(row.court_fips_codes.clone(), aggregates.len() - 1);
                aggregates.len() - 1
            }
        };

        let cur = &mut aggregates[slot];
        cur.localities.push(row.locality.replace(CITY_QUALIFIER, ""));
        cur.total_miles += parse_miles(&row.all, "All", &row.locality)?;
        cur.interstate_miles += parse_miles(&row.interstate, "Interstate", &row.locality)?;
        cur.primary_miles += parse_miles(&row.primary, "Primary", &row.locality)?;
        cur.secondary_miles += parse_miles(&row.secondary, "Secondary", &row.locality)?;
    }

    if unattributable > 0 {
        debug!(unattributable, "Rows without a court identifier skipped");
    }

    Ok(aggregates)
}

fn parse_court_ids(compound: &str) -> Result<Vec<u32>> {
    compound
        .split(',')
        .map(|code| {
            code.trim()
                .parse()
                .with_context(|| format!("invalid jurisdiction code {code:?} in {compound:?}"))
        })
        .collect()
}

fn parse_miles(field: &str, column: &str, locality: &str) -> Result<u64> {
    field.trim().parse().with_context(|| {
        format!("invalid {column} mileage {field:?} for locality {locality:?}")
    })
}
