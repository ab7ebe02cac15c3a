use std::fs;
use std::path::Path;

use citation_rater::citations::{CitationDeltas, apply_deltas, scan_citations};
use citation_rater::render::{ChartRenderer, SvgChart};
use citation_rater::report::{
    ReportConfig, ReportEntry, build_entries, order_by_label, order_by_metric,
};
use citation_rater::traffic::{CourtAggregate, load_traffic_data};
use citation_rater::violation::ViolationExtractor;

const TRAFFIC_CSV: &str = include_str!("fixtures/traffic_daily_vmt.csv");
const CITATIONS_A: &str = include_str!("fixtures/citations_a.csv");
const CITATIONS_B: &str = include_str!("fixtures/citations_b.csv");

fn run_pipeline(dir: &Path) -> (Vec<CourtAggregate>, Vec<ReportEntry>, Vec<ReportEntry>) {
    let traffic_path = dir.join("traffic.csv");
    fs::write(&traffic_path, TRAFFIC_CSV).unwrap();

    let citation_dir = dir.join("citations");
    fs::create_dir(&citation_dir).unwrap();
    fs::write(citation_dir.join("citations_a.csv"), CITATIONS_A).unwrap();
    fs::write(citation_dir.join("citations_b.csv"), CITATIONS_B).unwrap();
    fs::write(citation_dir.join("readme.txt"), "not tabular\n").unwrap();

    let courts = load_traffic_data(&traffic_path).expect("traffic load failed");
    let extractor = ViolationExtractor::new().unwrap();
    let CitationDeltas { per_court, stats } =
        scan_citations(&citation_dir, &extractor, &courts).expect("citation scan failed");

    assert_eq!(stats.files, 2);
    assert_eq!(stats.rows, 7);
    assert_eq!(stats.matched, 4);
    assert_eq!(stats.no_violation, 2);
    assert_eq!(stats.unmatched_court, 1);

    let courts = apply_deltas(courts, per_court);
    let config = ReportConfig::default();
    let entries = build_entries(&courts, &config);
    let by_metric = order_by_metric(&entries);
    let by_locality = order_by_label(&entries, &config);

    (courts, by_metric, by_locality)
}

#[test]
fn test_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let (courts, by_metric, by_locality) = run_pipeline(dir.path());

    // Four courts loaded; the row without a court identifier is dropped.
    assert_eq!(courts.len(), 4);

    // One citation each for Alexandria and York, two for the Fairfax
    // compound court (court 59 and court 600 both map to it).
    assert_eq!(courts[0].citation_count, 1);
    assert_eq!(courts[1].citation_count, 2);
    assert_eq!(courts[2].citation_count, 1);
    assert_eq!(courts[3].citation_count, 0);

    // Actual speeds land under their speed-limit bucket.
    assert_eq!(courts[1].limit_buckets[&45], vec![55]);
    assert_eq!(courts[1].limit_buckets[&60], vec![100]);

    // Roanoke had no citations, so only three entries reach the views.
    let metric_labels: Vec<&str> = by_metric.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(
        metric_labels,
        vec!["York County", "Fairfax County / Fairfax", "Alexandria"]
    );
    assert_eq!(by_metric[0].miles_per_citation, 3000.0 * 365.0);
    assert_eq!(by_metric[1].miles_per_citation, 5200.0 * 365.0 / 2.0);
    assert_eq!(by_metric[2].miles_per_citation, 1000.0 * 365.0);

    // York is a configured outlier; the rest sort in reverse label order.
    let locality_labels: Vec<&str> = by_locality.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(
        locality_labels,
        vec!["Fairfax County / Fairfax", "Alexandria"]
    );
}

#[test]
fn test_pipeline_is_idempotent() {
    let dir_one = tempfile::tempdir().unwrap();
    let dir_two = tempfile::tempdir().unwrap();

    let (_, metric_one, locality_one) = run_pipeline(dir_one.path());
    let (_, metric_two, locality_two) = run_pipeline(dir_two.path());

    assert_eq!(metric_one, metric_two);
    assert_eq!(locality_one, locality_two);
}

#[test]
fn test_charts_are_written_for_both_views() {
    let dir = tempfile::tempdir().unwrap();
    let (_, by_metric, by_locality) = run_pipeline(dir.path());

    let chart = SvgChart::default();
    let metric_path = dir.path().join("order_by_data.svg");
    let locality_path = dir.path().join("order_by_locality.svg");

    chart.render(&by_metric, &metric_path).unwrap();
    chart.render(&by_locality, &locality_path).unwrap();

    let metric_svg = fs::read_to_string(&metric_path).unwrap();
    let locality_svg = fs::read_to_string(&locality_path).unwrap();
    assert_eq!(metric_svg.matches("<rect").count(), 3);
    assert_eq!(locality_svg.matches("<rect").count(), 2);
}
