//! Batch grid probe driver.
//!
//! Loads a sector catalog (built-in NDFD table or a YAML file), reads a
//! query description, probes the listed grid fixture files, and prints the
//! collated result as a time-ordered table.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use config::QueryConfig;
use grid_source::{GridSource, MemoryGridSource};
use probe_common::{Element, ProbeError};
use probe_engine::{collate, Collation, ElementMatcher};
use sector_catalog::{SectorCatalog, SectorResolver};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "probe-cli")]
#[command(about = "Probe gridded forecast files at geographic points")]
struct Args {
    /// Query description file (points, elements, sources)
    query: String,

    /// Sector catalog file (default: built-in NDFD sectors)
    #[arg(short, long)]
    catalog: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Catalog defects are fatal before any query work starts.
    let catalog = match &args.catalog {
        Some(path) => SectorCatalog::from_yaml_file(path)
            .with_context(|| format!("loading catalog {}", path))?,
        None => SectorCatalog::ndfd_default(),
    };
    info!(
        version = catalog.version(),
        sectors = catalog.sectors().len(),
        "catalog loaded"
    );

    let query_config = QueryConfig::load(&args.query)?;
    let query = query_config.to_query()?;

    let sources = open_sources(&query_config)?;
    info!(
        points = query.points.len(),
        descriptors = query.descriptors.len(),
        sources = sources.len(),
        "running probe query"
    );

    let matcher = ElementMatcher::new(Arc::new(SectorResolver::new(Arc::new(catalog))));
    let source_refs: Vec<&dyn GridSource> =
        sources.iter().map(|s| s as &dyn GridSource).collect();
    let records = matcher.run(&query, &source_refs)?;
    info!(records = records.len(), "match complete");

    let collation = collate(records);
    print_table(&collation, &query_config);

    for collision in collation.collisions() {
        warn!(
            element = %collision.element,
            valid_time = %collision.valid_time,
            "duplicate element at valid time (first kept)"
        );
    }
    Ok(())
}

/// Open every listed fixture file. One unreadable file among several is a
/// warning and the query proceeds without it; losing all of them means
/// there is no usable input and the query stops.
fn open_sources(config: &QueryConfig) -> Result<Vec<MemoryGridSource>> {
    let mut sources = Vec::new();
    let mut failures = Vec::new();
    for path in &config.sources {
        match MemoryGridSource::from_yaml_file(path) {
            Ok(source) => sources.push(source),
            Err(e) => {
                let err = ProbeError::source_unreadable(path.display().to_string(), e.to_string());
                warn!(%err, "skipping unreadable source");
                failures.push(err);
            }
        }
    }
    if sources.is_empty() {
        let detail = if failures.is_empty() {
            "no sources listed".to_string()
        } else {
            format!("all {} sources unreadable", failures.len())
        };
        return Err(ProbeError::NoUsableInput(detail).into());
    }
    Ok(sources)
}

/// Dump the collation as a plain table: one line per element per valid
/// time, one value column per probe point.
fn print_table(collation: &Collation, config: &QueryConfig) {
    let labels: Vec<String> = config
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| p.label.clone().unwrap_or_else(|| format!("point{}", i)))
        .collect();

    println!(
        "{:<22} {:<9} {:<9} {:<12} {}",
        "valid-time",
        "element",
        "sector",
        "units",
        labels.join("  ")
    );
    for row in collation.rows() {
        for element in Element::ALL {
            let Some(index) = row.slot(element) else {
                continue;
            };
            let record = &collation.records()[index];
            let values: Vec<String> = record.values.iter().map(|v| v.to_string()).collect();
            println!(
                "{:<22} {:<9} {:<9} {:<12} {}",
                record.valid_time.format("%Y-%m-%dT%H:%MZ"),
                element.name(),
                record.sector_id,
                record.units,
                values.join("  ")
            );
        }
    }
}
