// Histogram reconstruction: reset detection, group fold, per-group decumulation

use hist_export::histogram::{SampleMode, aggregate_and_decumulate, aggregate_and_decumulate_with};
use hist_export::models::{BucketRow, Series};

fn s(group: &str, le: &str, host: &str, samples: &[f64]) -> Series {
    Series::new(group, le, host, samples.to_vec())
}

fn triples(rows: &[BucketRow]) -> Vec<(&str, &str, f64)> {
    rows.iter()
        .map(|r| (r.group.as_str(), r.le.as_str(), r.value))
        .collect()
}

#[test]
fn single_sample_counts_as_its_value() {
    let report = aggregate_and_decumulate(&[s("z1", "1", "h1", &[17.0])]);
    assert_eq!(triples(&report.rows), vec![("z1", "1", 17.0)]);
    assert_eq!(report.counter_resets, 0);
    assert!(report.coverage.invalid_hosts("z1").is_none());
}

#[test]
fn increasing_pair_contributes_delta_and_host() {
    let report = aggregate_and_decumulate(&[s("z1", "1", "h1", &[3.0, 11.0])]);
    assert_eq!(triples(&report.rows), vec![("z1", "1", 8.0)]);
    assert!(report.coverage.all_hosts("z1").unwrap().contains("h1"));
    assert!(report.coverage.invalid_hosts("z1").is_none());
}

#[test]
fn decreasing_pair_is_excluded_and_host_marked_invalid() {
    let report = aggregate_and_decumulate(&[
        s("z1", "1", "h1", &[50.0, 5.0]),
        s("z1", "1", "h2", &[1.0, 2.0]),
    ]);
    assert_eq!(triples(&report.rows), vec![("z1", "1", 1.0)]);
    assert_eq!(report.counter_resets, 1);
    let all = report.coverage.all_hosts("z1").unwrap();
    let invalid = report.coverage.invalid_hosts("z1").unwrap();
    assert!(all.contains("h1") && all.contains("h2"));
    assert_eq!(invalid.len(), 1);
    assert!(invalid.contains("h1"));
    assert!(invalid.is_subset(all));
}

#[test]
fn hosts_are_deduplicated_per_group() {
    let report = aggregate_and_decumulate(&[
        s("z1", "1", "h1", &[0.0, 1.0]),
        s("z1", "5", "h1", &[0.0, 2.0]),
        s("z1", "+Inf", "h1", &[0.0, 3.0]),
        s("z1", "1", "h2", &[9.0, 1.0]),
        s("z1", "5", "h2", &[9.0, 1.0]),
    ]);
    let summary = report.coverage.summary();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].total_hosts, 2);
    assert_eq!(summary[0].invalid_hosts, 1);
}

#[test]
fn decumulates_cumulative_buckets() {
    let report = aggregate_and_decumulate(&[
        s("z", "+Inf", "h", &[0.0, 40.0]),
        s("z", "1", "h", &[0.0, 10.0]),
        s("z", "5", "h", &[0.0, 25.0]),
    ]);
    assert_eq!(
        triples(&report.rows),
        vec![("z", "1", 10.0), ("z", "5", 15.0), ("z", "+Inf", 15.0)]
    );
}

#[test]
fn unbounded_bucket_always_last_in_group() {
    let report = aggregate_and_decumulate(&[
        s("z", "+Inf", "h", &[100.0]),
        s("z", "1000000", "h", &[90.0]),
        s("z", "0.001", "h", &[1.0]),
        s("z", "25", "h", &[50.0]),
    ]);
    let les: Vec<_> = report.rows.iter().map(|r| r.le.as_str()).collect();
    assert_eq!(les, vec!["0.001", "25", "1000000", "+Inf"]);
}

#[test]
fn input_order_does_not_change_result() {
    let input = vec![
        s("z2", "1", "a", &[0.0, 4.0]),
        s("z1", "+Inf", "b", &[10.0, 30.0]),
        s("z1", "1", "b", &[10.0, 12.0]),
        s("z1", "1", "c", &[5.0, 6.0]),
        s("z2", "+Inf", "a", &[0.0, 9.0]),
        s("z1", "+Inf", "c", &[7.0, 1.0]),
        s("z1", "0.5", "c", &[2.0, 3.0]),
    ];
    let expected = aggregate_and_decumulate(&input);

    let mut reversed = input.clone();
    reversed.reverse();
    assert_eq!(aggregate_and_decumulate(&reversed), expected);

    for k in 1..input.len() {
        let mut rotated = input.clone();
        rotated.rotate_left(k);
        assert_eq!(aggregate_and_decumulate(&rotated), expected);
    }
}

#[test]
fn repeated_calls_are_identical() {
    let input = vec![s("z1", "1", "a", &[0.0, 4.0]), s("z1", "+Inf", "a", &[0.0, 6.0])];
    assert_eq!(aggregate_and_decumulate(&input), aggregate_and_decumulate(&input));
}

#[test]
fn no_usable_series_gives_empty_report() {
    let report = aggregate_and_decumulate(&[
        s("z1", "1", "h1", &[]),
        s("z1", "5", "h2", &[]),
    ]);
    assert!(report.is_empty());
    assert!(report.coverage.is_empty());

    let all_reset = aggregate_and_decumulate(&[s("z1", "1", "h1", &[9.0, 1.0])]);
    assert!(all_reset.is_empty());
    assert_eq!(all_reset.coverage.invalid_hosts("z1").unwrap().len(), 1);
}

#[test]
fn inconsistent_histogram_yields_negative_bucket() {
    let report = aggregate_and_decumulate(&[
        s("z1", "1", "h1", &[100.0, 150.0]),
        s("z1", "1", "h2", &[50.0, 80.0]),
        s("z1", "+Inf", "h1", &[200.0, 260.0]),
    ]);
    assert_eq!(
        triples(&report.rows),
        vec![("z1", "1", 80.0), ("z1", "+Inf", -20.0)]
    );
}

#[test]
fn invalid_host_stays_in_its_group() {
    let report = aggregate_and_decumulate(&[
        s("z1", "1", "shared", &[10.0, 1.0]),
        s("z2", "1", "shared", &[1.0, 10.0]),
    ]);
    assert!(report.coverage.invalid_hosts("z1").unwrap().contains("shared"));
    assert!(report.coverage.invalid_hosts("z2").is_none());
    assert!(report.coverage.all_hosts("z2").unwrap().contains("shared"));
}

#[test]
fn groups_with_different_bucket_sets_restart_differencing() {
    // z1 has a single bucket; z2 and z3 use different label sets
    let report = aggregate_and_decumulate(&[
        s("z1", "+Inf", "a", &[0.0, 500.0]),
        s("z2", "0.1", "b", &[0.0, 3.0]),
        s("z2", "1", "b", &[0.0, 8.0]),
        s("z2", "+Inf", "b", &[0.0, 8.0]),
        s("z3", "5", "c", &[0.0, 2.0]),
        s("z3", "+Inf", "c", &[0.0, 7.0]),
    ]);
    assert_eq!(
        triples(&report.rows),
        vec![
            ("z1", "+Inf", 500.0),
            ("z2", "0.1", 3.0),
            ("z2", "1", 5.0),
            ("z2", "+Inf", 0.0),
            ("z3", "5", 2.0),
            ("z3", "+Inf", 5.0),
        ]
    );
}

#[test]
fn groups_sorted_lexicographically() {
    let report = aggregate_and_decumulate(&[
        s("zone-b", "1", "h", &[1.0]),
        s("zone-a", "1", "h", &[2.0]),
        s("Zone-c", "1", "h", &[3.0]),
    ]);
    let groups: Vec<_> = report.rows.iter().map(|r| r.group.as_str()).collect();
    assert_eq!(groups, vec!["Zone-c", "zone-a", "zone-b"]);
}

#[test]
fn instant_mode_uses_first_sample_without_reset_check() {
    let input = vec![
        s("z1", "1", "h1", &[30.0, 2.0]),
        s("z1", "1", "h2", &[10.0, 50.0]),
        s("z1", "+Inf", "h1", &[70.0]),
    ];
    let report = aggregate_and_decumulate_with(&input, SampleMode::Instant);
    assert_eq!(
        triples(&report.rows),
        vec![("z1", "1", 40.0), ("z1", "+Inf", 30.0)]
    );
    assert_eq!(report.counter_resets, 0);
    assert!(report.coverage.invalid_hosts("z1").is_none());
    assert_eq!(report.coverage.all_hosts("z1").unwrap().len(), 2);
}
