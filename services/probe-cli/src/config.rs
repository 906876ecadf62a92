//! Query description file.
//!
//! A query file names the probe points, the requested elements, and the
//! extraction policy, plus the grid fixture files to probe. Elements are
//! given by their short names and expand to wildcard descriptors;
//! fully-constrained descriptors can be passed under `descriptors`.

use anyhow::{bail, Context, Result};
use probe_common::{Element, ProbePoint, TimeWindow, UnitSystem};
use probe_engine::{ElementDescriptor, InterpolationMode, ProbeQuery};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Serialized query description.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    pub points: Vec<PointConfig>,
    /// Element short names expanding to wildcard descriptors.
    #[serde(default)]
    pub elements: Vec<String>,
    /// Fully-specified descriptors, appended after `elements`.
    #[serde(default)]
    pub descriptors: Vec<ElementDescriptor>,
    #[serde(default)]
    pub window: TimeWindow,
    #[serde(default)]
    pub interpolation: InterpolationMode,
    #[serde(default)]
    pub units: UnitSystem,
    #[serde(default)]
    pub sectors: Option<Vec<String>>,
    /// Grid fixture files to probe.
    pub sources: Vec<PathBuf>,
}

/// One probe point in the query file.
#[derive(Debug, Clone, Deserialize)]
pub struct PointConfig {
    #[serde(default)]
    pub label: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl QueryConfig {
    /// Load a query description from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read query file {}", path.display()))?;
        let config: QueryConfig = serde_yaml::from_str(&text)
            .with_context(|| format!("cannot parse query file {}", path.display()))?;
        Ok(config)
    }

    /// Expand into the engine's query context.
    pub fn to_query(&self) -> Result<ProbeQuery> {
        let points = self
            .points
            .iter()
            .map(|p| {
                let mut point = ProbePoint::location(p.lat, p.lon);
                if let Some(label) = &p.label {
                    point = point.with_label(label.clone());
                }
                point
            })
            .collect();

        let mut descriptors = Vec::new();
        for name in &self.elements {
            let Some(element) = Element::from_name(name) else {
                bail!("unknown element '{}'", name);
            };
            descriptors.push(ElementDescriptor::new(element));
        }
        descriptors.extend(self.descriptors.iter().cloned());

        let mut query = ProbeQuery::new(points, descriptors)
            .with_window(self.window)
            .with_interpolation(self.interpolation)
            .with_units(self.units);
        if let Some(sectors) = &self.sectors {
            query = query.with_sectors(sectors.clone());
        }
        Ok(query)
    }
}
