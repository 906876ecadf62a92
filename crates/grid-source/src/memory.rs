//! In-memory grid source.
//!
//! Backs unit tests, scenario fixtures, and the CLI's fixture mode. The
//! on-disk form is a YAML document holding message metadata plus row-major
//! cell values, with `null` marking missing cells.

use crate::meta::MessageMeta;
use crate::{CellValue, GridMessage, GridSource};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a fixture file.
#[derive(Debug, Error)]
pub enum MemorySourceError {
    #[error("failed to read fixture: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse fixture: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid fixture: {0}")]
    Invalid(String),
}

/// One in-memory grid message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryGrid {
    pub meta: MessageMeta,
    pub width: usize,
    pub height: usize,
    /// Row-major numeric values; `null` entries are missing cells.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub values: Option<Vec<Option<f64>>>,
    /// Row-major text values for textual elements.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub text_values: Option<Vec<Option<String>>>,
}

impl MemoryGrid {
    /// Build a numeric grid; NaN entries become missing cells.
    pub fn numeric(meta: MessageMeta, width: usize, height: usize, data: Vec<f64>) -> Self {
        let values = data
            .into_iter()
            .map(|v| if v.is_nan() { None } else { Some(v) })
            .collect();
        Self {
            meta,
            width,
            height,
            values: Some(values),
            text_values: None,
        }
    }

    /// Build a textual grid (weather type strings).
    pub fn textual(
        meta: MessageMeta,
        width: usize,
        height: usize,
        data: Vec<Option<String>>,
    ) -> Self {
        Self {
            meta,
            width,
            height,
            values: None,
            text_values: Some(data),
        }
    }

    fn validate(&self) -> Result<(), MemorySourceError> {
        let expected = self.width * self.height;
        let actual = match (&self.values, &self.text_values) {
            (Some(v), None) => v.len(),
            (None, Some(t)) => t.len(),
            (Some(_), Some(_)) => {
                return Err(MemorySourceError::Invalid(format!(
                    "grid for '{}' has both numeric and text payloads",
                    self.meta.sector_id
                )))
            }
            (None, None) => {
                return Err(MemorySourceError::Invalid(format!(
                    "grid for '{}' has no payload",
                    self.meta.sector_id
                )))
            }
        };
        if actual != expected {
            return Err(MemorySourceError::Invalid(format!(
                "grid payload length {} does not match {}x{}",
                actual, self.width, self.height
            )));
        }
        if self.meta.textual != self.text_values.is_some() {
            return Err(MemorySourceError::Invalid(
                "textual flag disagrees with payload kind".to_string(),
            ));
        }
        Ok(())
    }
}

impl GridMessage for MemoryGrid {
    fn meta(&self) -> &MessageMeta {
        &self.meta
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn cell(&self, x: i64, y: i64) -> CellValue {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return CellValue::Missing;
        }
        let idx = y as usize * self.width + x as usize;
        if let Some(values) = &self.values {
            return match values.get(idx).copied().flatten() {
                Some(v) => CellValue::Numeric(v),
                None => CellValue::Missing,
            };
        }
        if let Some(texts) = &self.text_values {
            return match texts.get(idx).and_then(|t| t.clone()) {
                Some(t) => CellValue::Text(t),
                None => CellValue::Missing,
            };
        }
        CellValue::Missing
    }
}

/// A grid source holding its messages in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryGridSource {
    pub id: String,
    pub grids: Vec<MemoryGrid>,
}

impl MemoryGridSource {
    /// Create from already-built grids.
    pub fn new(id: impl Into<String>, grids: Vec<MemoryGrid>) -> Self {
        Self {
            id: id.into(),
            grids,
        }
    }

    /// Parse a YAML fixture document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, MemorySourceError> {
        let source: MemoryGridSource = serde_yaml::from_str(yaml)?;
        for grid in &source.grids {
            grid.validate()?;
        }
        Ok(source)
    }

    /// Load a YAML fixture file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, MemorySourceError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}

impl GridSource for MemoryGridSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn messages(&self) -> Vec<&dyn GridMessage> {
        self.grids.iter().map(|g| g as &dyn GridMessage).collect()
    }
}
