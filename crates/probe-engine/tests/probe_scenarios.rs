//! End-to-end scenario tests for the match + collate pipeline.

mod common;

use common::*;
use grid_source::{GridSource, MemoryGrid, MemoryGridSource};
use probe_common::{
    Element, ProbeError, ProbePoint, ProbeValue, TimeWindow, UnitSystem,
};
use probe_engine::{
    collate, CancelToken, ElementDescriptor, ElementMatcher, InterpolationMode, ProbeQuery,
};
use sector_catalog::SectorResolver;
use std::sync::Arc;
use test_utils::{assert_approx_eq, linear_field};

fn matcher() -> ElementMatcher {
    ElementMatcher::new(Arc::new(SectorResolver::new(Arc::new(test_catalog()))))
}

fn point(latlon: (f64, f64)) -> ProbePoint {
    ProbePoint::location(latlon.0, latlon.1)
}

// ============================================================================
// Scenario A: one in-sector point, one descriptor, three valid times
// ============================================================================

#[test]
fn test_scenario_one_point_three_valid_times() {
    let source = MemoryGridSource::new(
        "alpha-temps",
        vec![
            uniform_grid(temp_meta("alpha", 12), 284.0),
            uniform_grid(temp_meta("alpha", 6), 282.0),
            uniform_grid(temp_meta("alpha", 18), 286.0),
        ],
    );
    let query = ProbeQuery::new(
        vec![point(ALPHA_ONLY)],
        vec![ElementDescriptor::new(Element::Temp)],
    );

    let records = matcher().run(&query, &[&source]).unwrap();
    assert_eq!(records.len(), 3);
    for record in &records {
        assert_eq!(record.values.len(), 1);
        assert!(matches!(record.values[0], ProbeValue::Numeric(_)));
        assert_eq!(record.sector_id, "alpha");
        assert_eq!(record.reference_time, reference_time());
    }

    let collation = collate(records);
    assert_eq!(collation.rows().len(), 3);
    let times: Vec<_> = collation.rows().iter().map(|r| r.valid_time).collect();
    let mut sorted = times.clone();
    sorted.sort();
    assert_eq!(times, sorted, "rows must be ascending by valid time");
    assert!(collation.collisions().is_empty());
}

// ============================================================================
// Scenario B: out-of-coverage point still yields records, with missing values
// ============================================================================

#[test]
fn test_scenario_point_outside_coverage_yields_missing_not_empty() {
    let source = MemoryGridSource::new(
        "alpha-temps",
        vec![
            uniform_grid(temp_meta("alpha", 6), 282.0),
            uniform_grid(temp_meta("alpha", 12), 284.0),
            uniform_grid(temp_meta("alpha", 18), 286.0),
        ],
    );
    let query = ProbeQuery::new(
        vec![point(NOWHERE)],
        vec![ElementDescriptor::new(Element::Temp)],
    );

    let records = matcher().run(&query, &[&source]).unwrap();
    assert_eq!(
        records.len(),
        3,
        "descriptor/time combinations exist in the dataset even for an out-of-coverage point"
    );
    for record in &records {
        assert_eq!(record.values.len(), 1);
        assert!(record.values[0].is_missing());
    }
}

// ============================================================================
// Scenario C: overlapping sectors, same element and time, disjoint points
// ============================================================================

#[test]
fn test_scenario_overlapping_sectors_first_wins_with_flag() {
    let source = MemoryGridSource::new(
        "both-sectors",
        vec![
            uniform_grid(temp_meta("alpha", 6), 280.0),
            uniform_grid(temp_meta("beta", 6), 290.0),
        ],
    );
    let points = vec![point(ALPHA_ONLY), point(OVERLAP), point(BETA_ONLY)];
    let query = ProbeQuery::new(points, vec![ElementDescriptor::new(Element::Temp)])
        .with_interpolation(InterpolationMode::Nearest);

    let records = matcher().run(&query, &[&source]).unwrap();
    assert_eq!(records.len(), 2, "one record per sector");

    let alpha = records.iter().find(|r| r.sector_id == "alpha").unwrap();
    assert_eq!(alpha.values[0], ProbeValue::Numeric(280.0));
    assert_eq!(alpha.values[1], ProbeValue::Numeric(280.0));
    assert!(alpha.values[2].is_missing(), "beta-only point missing in alpha");

    let beta = records.iter().find(|r| r.sector_id == "beta").unwrap();
    assert!(beta.values[0].is_missing(), "alpha-only point missing in beta");
    assert_eq!(beta.values[2], ProbeValue::Numeric(290.0));

    let collation = collate(records);
    assert_eq!(collation.rows().len(), 1);
    assert_eq!(collation.collisions().len(), 1);

    let kept = collation.rows()[0].slot(Element::Temp).unwrap();
    assert_eq!(
        collation.records()[kept].sector_id,
        "alpha",
        "the higher-priority sector's record must win"
    );
    let rejected = collation.collisions()[0].rejected;
    assert_eq!(collation.records()[rejected].sector_id, "beta");
}

// ============================================================================
// Shape invariant
// ============================================================================

#[test]
fn test_every_record_has_one_value_per_point() {
    let source = MemoryGridSource::new(
        "mixed",
        vec![
            uniform_grid(temp_meta("alpha", 6), 281.0),
            uniform_grid(sky_meta("alpha", 6), 40.0),
            uniform_grid(temp_meta("beta", 12), 283.0),
        ],
    );
    let points = vec![
        point(ALPHA_ONLY),
        point(OVERLAP),
        point(BETA_ONLY),
        point(NOWHERE),
    ];
    let n = points.len();
    let query = ProbeQuery::new(
        points,
        vec![
            ElementDescriptor::new(Element::Temp),
            ElementDescriptor::new(Element::Sky),
        ],
    );

    let records = matcher().run(&query, &[&source]).unwrap();
    assert_eq!(records.len(), 3);
    for record in &records {
        assert_eq!(record.values.len(), n);
    }
}

// ============================================================================
// Duplicate source rejection
// ============================================================================

#[test]
fn test_later_source_duplicate_rejected_not_overwritten() {
    let first = MemoryGridSource::new(
        "first",
        vec![uniform_grid(temp_meta("alpha", 6), 281.0)],
    );
    let second = MemoryGridSource::new(
        "second",
        vec![uniform_grid(temp_meta("alpha", 6), 999.0)],
    );
    let query = ProbeQuery::new(
        vec![point(ALPHA_ONLY)],
        vec![ElementDescriptor::new(Element::Temp)],
    );

    let records = matcher().run(&query, &[&first, &second]).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].values[0], ProbeValue::Numeric(281.0));
}

// ============================================================================
// Valid-time window
// ============================================================================

#[test]
fn test_window_filters_with_inclusive_bounds() {
    let source = MemoryGridSource::new(
        "alpha-temps",
        vec![
            uniform_grid(temp_meta("alpha", 0), 280.0),
            uniform_grid(temp_meta("alpha", 6), 282.0),
            uniform_grid(temp_meta("alpha", 12), 284.0),
            uniform_grid(temp_meta("alpha", 18), 286.0),
        ],
    );
    let start = reference_time() + chrono::Duration::hours(6);
    let end = reference_time() + chrono::Duration::hours(12);
    let query = ProbeQuery::new(
        vec![point(ALPHA_ONLY)],
        vec![ElementDescriptor::new(Element::Temp)],
    )
    .with_window(TimeWindow::between(start, end));

    let records = matcher().run(&query, &[&source]).unwrap();
    assert_eq!(records.len(), 2, "boundary valid times are included");
    assert!(records.iter().all(|r| r.valid_time >= start && r.valid_time <= end));
}

// ============================================================================
// Input errors raised before any source work
// ============================================================================

#[test]
fn test_empty_points_is_typed_input_error() {
    let source = MemoryGridSource::new("unused", vec![]);
    let query = ProbeQuery::new(vec![], vec![ElementDescriptor::new(Element::Temp)]);
    let err = matcher().run(&query, &[&source]).unwrap_err();
    assert!(matches!(err, ProbeError::NoPoints));
    assert!(err.is_input_error());
}

#[test]
fn test_empty_descriptors_is_typed_input_error() {
    let source = MemoryGridSource::new("unused", vec![]);
    let query = ProbeQuery::new(vec![point(ALPHA_ONLY)], vec![]);
    assert!(matches!(
        matcher().run(&query, &[&source]),
        Err(ProbeError::NoDescriptors)
    ));
}

#[test]
fn test_malformed_descriptor_is_typed_input_error() {
    let source = MemoryGridSource::new("unused", vec![]);
    let bad = ElementDescriptor::new(Element::Pop12).with_probability(1, 50.0, 10.0);
    let query = ProbeQuery::new(vec![point(ALPHA_ONLY)], vec![bad]);
    assert!(matches!(
        matcher().run(&query, &[&source]),
        Err(ProbeError::InvalidDescriptor(_))
    ));
}

#[test]
fn test_zero_matches_is_empty_result_not_error() {
    let source = MemoryGridSource::new(
        "sky-only",
        vec![uniform_grid(sky_meta("alpha", 6), 40.0)],
    );
    // Request an element the dataset does not carry.
    let query = ProbeQuery::new(
        vec![point(ALPHA_ONLY)],
        vec![ElementDescriptor::new(Element::Qpf)],
    );
    let records = matcher().run(&query, &[&source]).unwrap();
    assert!(records.is_empty());
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn test_cancelled_query_errors() {
    let source = MemoryGridSource::new(
        "alpha-temps",
        vec![uniform_grid(temp_meta("alpha", 6), 282.0)],
    );
    let query = ProbeQuery::new(
        vec![point(ALPHA_ONLY)],
        vec![ElementDescriptor::new(Element::Temp)],
    );
    let token = CancelToken::new();
    token.cancel();
    assert!(matches!(
        matcher().run_cancellable(&query, &[&source], &token),
        Err(ProbeError::Cancelled)
    ));
}

// ============================================================================
// Unit conversion on records
// ============================================================================

#[test]
fn test_english_units_convert_values_and_label() {
    let source = MemoryGridSource::new(
        "alpha-temps",
        vec![uniform_grid(temp_meta("alpha", 6), 300.0)],
    );
    let query = ProbeQuery::new(
        vec![point(ALPHA_ONLY)],
        vec![ElementDescriptor::new(Element::Temp)],
    )
    .with_units(UnitSystem::English);

    let records = matcher().run(&query, &[&source]).unwrap();
    assert_eq!(records[0].units, "F");
    let value = records[0].values[0].as_f64().unwrap();
    assert_approx_eq!(value, 80.33, 0.01);
}

#[test]
fn test_native_units_use_source_label() {
    let source = MemoryGridSource::new(
        "alpha-temps",
        vec![uniform_grid(temp_meta("alpha", 6), 300.0)],
    );
    let query = ProbeQuery::new(
        vec![point(ALPHA_ONLY)],
        vec![ElementDescriptor::new(Element::Temp)],
    );
    let records = matcher().run(&query, &[&source]).unwrap();
    assert_eq!(records[0].units, "K");
    assert_eq!(records[0].values[0], ProbeValue::Numeric(300.0));
}

// ============================================================================
// Interpolation policy
// ============================================================================

#[test]
fn test_bilinear_blends_and_nearest_snaps() {
    let grid = MemoryGrid::numeric(temp_meta("alpha", 6), NX, NY, linear_field(NX, NY, 0.0, 1.0));
    let source = MemoryGridSource::new("gradient", vec![grid]);

    let p = point(ALPHA_ONLY);
    let nearest_query = ProbeQuery::new(
        vec![p.clone()],
        vec![ElementDescriptor::new(Element::Temp)],
    )
    .with_interpolation(InterpolationMode::Nearest);
    let bilinear_query = ProbeQuery::new(vec![p], vec![ElementDescriptor::new(Element::Temp)])
        .with_interpolation(InterpolationMode::Bilinear);

    let nearest_value = matcher().run(&nearest_query, &[&source]).unwrap()[0].values[0]
        .as_f64()
        .unwrap();
    let bilinear_value = matcher().run(&bilinear_query, &[&source]).unwrap()[0].values[0]
        .as_f64()
        .unwrap();

    assert_eq!(nearest_value.fract(), 0.0, "nearest reads a whole cell");
    assert!(
        (bilinear_value - nearest_value).abs() < (NX + 1) as f64,
        "bilinear stays within the neighborhood of the nearest cell"
    );
    assert_ne!(nearest_value, bilinear_value);
}

#[test]
fn test_area_average_over_coverage_point() {
    let grid = MemoryGrid::numeric(temp_meta("alpha", 6), NX, NY, linear_field(NX, NY, 0.0, 1.0));
    let source = MemoryGridSource::new("gradient", vec![grid]);

    // A coverage extent around the middle of alpha.
    let coverage = ProbePoint::coverage(0.3, 0.1, 0.5, 0.3);
    let query = ProbeQuery::new(vec![coverage], vec![ElementDescriptor::new(Element::Temp)])
        .with_interpolation(InterpolationMode::AreaAverage);

    let records = matcher().run(&query, &[&source]).unwrap();
    let value = records[0].values[0].as_f64().unwrap();
    assert!(value > 0.0 && value < (NX * NY) as f64);
}

// ============================================================================
// Textual weather values
// ============================================================================

#[test]
fn test_weather_strings_pass_through_unconverted() {
    let wx = MemoryGrid::textual(
        wx_meta("alpha", 6),
        NX,
        NY,
        vec![Some("Sct:RW:-:<NoVis>:".to_string()); NX * NY],
    );
    let source = MemoryGridSource::new("weather", vec![wx]);
    let query = ProbeQuery::new(
        vec![point(ALPHA_ONLY)],
        vec![ElementDescriptor::new(Element::Weather)],
    )
    .with_units(UnitSystem::English);

    let records = matcher().run(&query, &[&source]).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].values[0].as_text(),
        Some("Sct:RW:-:<NoVis>:"),
        "text values are never unit-converted"
    );
}

// ============================================================================
// Sector allow-list
// ============================================================================

#[test]
fn test_sector_allow_list_restricts_extraction() {
    let source = MemoryGridSource::new(
        "both-sectors",
        vec![
            uniform_grid(temp_meta("alpha", 6), 280.0),
            uniform_grid(temp_meta("beta", 6), 290.0),
        ],
    );
    // The overlap point normally resolves in both sectors; restricting to
    // beta makes the alpha record miss it.
    let query = ProbeQuery::new(
        vec![point(OVERLAP)],
        vec![ElementDescriptor::new(Element::Temp)],
    )
    .with_sectors(vec!["beta".to_string()])
    .with_interpolation(InterpolationMode::Nearest);

    let records = matcher().run(&query, &[&source]).unwrap();
    let alpha = records.iter().find(|r| r.sector_id == "alpha").unwrap();
    assert!(alpha.values[0].is_missing());
    let beta = records.iter().find(|r| r.sector_id == "beta").unwrap();
    assert_eq!(beta.values[0], ProbeValue::Numeric(290.0));
}

// ============================================================================
// Determinism across repeated runs
// ============================================================================

#[test]
fn test_repeated_runs_are_identical() {
    let source = MemoryGridSource::new(
        "both-sectors",
        vec![
            uniform_grid(temp_meta("alpha", 6), 280.0),
            uniform_grid(temp_meta("beta", 6), 290.0),
            uniform_grid(sky_meta("alpha", 12), 55.0),
        ],
    );
    let query = ProbeQuery::new(
        vec![point(ALPHA_ONLY), point(OVERLAP), point(BETA_ONLY)],
        vec![
            ElementDescriptor::new(Element::Temp),
            ElementDescriptor::new(Element::Sky),
        ],
    );

    let m = matcher();
    let sources: Vec<&dyn GridSource> = vec![&source];
    let first = m.run(&query, &sources).unwrap();
    let second = m.run(&query, &sources).unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.sector_id, b.sector_id);
        assert_eq!(a.valid_time, b.valid_time);
        assert_eq!(a.values, b.values);
    }
}
