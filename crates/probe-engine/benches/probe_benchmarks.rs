//! Benchmarks for the match + collate hot path.

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use grid_source::{MemoryGrid, MemoryGridSource, MessageMeta, SurfaceSpec};
use probe_common::{Element, ProbePoint, ProbeValue};
use probe_engine::{collate, ElementDescriptor, ElementMatcher, MatchRecord, ProbeQuery};
use sector_catalog::{
    CatalogConfig, GridConfig, ProjectionConfig, SectorCatalog, SectorConfig, SectorResolver,
    UniformCellMeta,
};
use std::sync::Arc;

const NX: usize = 64;
const NY: usize = 64;

fn bench_catalog() -> SectorCatalog {
    SectorCatalog::from_config(CatalogConfig {
        version: Some("bench-1".to_string()),
        sectors: vec![SectorConfig {
            id: "bench".to_string(),
            projection: ProjectionConfig::Mercator { reflon: 0.0 },
            grid: GridConfig {
                nx: NX,
                ny: NY,
                lat1: 0.0,
                lon1: 0.0,
                cell_size_m: 10_000.0,
                size_at_lat: 0.0,
                orient: 0.0,
            },
            meta: UniformCellMeta::default(),
            elevations: None,
        }],
    })
    .unwrap()
}

fn message(forecast_hour: u32) -> MemoryGrid {
    let reference = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let meta = MessageMeta {
        center: 8,
        sub_center: 0,
        gen_process: 96,
        template: 0,
        category: 0,
        sub_category: 0,
        surface: SurfaceSpec::single(103, 2.0),
        probability: None,
        forecast_duration_hours: 0,
        reference_time: reference,
        valid_time: reference + Duration::hours(forecast_hour as i64),
        sector_id: "bench".to_string(),
        units: "K".to_string(),
        textual: false,
    };
    let data = (0..NX * NY).map(|i| 250.0 + (i % 97) as f64).collect();
    MemoryGrid::numeric(meta, NX, NY, data)
}

fn bench_match(c: &mut Criterion) {
    let matcher = ElementMatcher::new(Arc::new(SectorResolver::new(Arc::new(bench_catalog()))));
    let sources: Vec<MemoryGridSource> = (0..4u32)
        .map(|s| {
            MemoryGridSource::new(
                format!("source-{}", s),
                (0..24u32).map(|h| message(s * 24 + h)).collect(),
            )
        })
        .collect();
    let source_refs: Vec<&dyn grid_source::GridSource> =
        sources.iter().map(|s| s as &dyn grid_source::GridSource).collect();

    let points: Vec<ProbePoint> = (0..16)
        .map(|i| ProbePoint::location(0.05 + 0.03 * i as f64, 0.05 + 0.03 * i as f64))
        .collect();
    let query = ProbeQuery::new(points, vec![ElementDescriptor::new(Element::Temp)]);

    c.bench_function("match_96_messages_16_points", |b| {
        b.iter(|| {
            let records = matcher.run(black_box(&query), black_box(&source_refs)).unwrap();
            black_box(records)
        })
    });
}

fn bench_collate(c: &mut Criterion) {
    let reference = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let records: Vec<MatchRecord> = (0..512)
        .map(|i| MatchRecord {
            descriptor: ElementDescriptor::new(Element::ALL[i % Element::COUNT]),
            reference_time: reference,
            valid_time: reference + Duration::hours(((i * 7) % 96) as i64),
            sector_id: "bench".to_string(),
            units: "K".to_string(),
            values: vec![ProbeValue::Numeric(i as f64); 16],
        })
        .collect();

    c.bench_function("collate_512_records", |b| {
        b.iter(|| {
            let collation = collate(black_box(records.clone()));
            black_box(collation)
        })
    });
}

criterion_group!(benches, bench_match, bench_collate);
criterion_main!(benches);
