//! Grid data source boundary.
//!
//! The probe engine consumes grid data through the two traits defined here:
//! a [`GridSource`] is one opened input file exposing one or more messages,
//! and each [`GridMessage`] exposes identification metadata plus cell-level
//! value access. GRIB2 (or any other) byte-level decoding lives entirely
//! behind these traits; the engine never touches encoded data.
//!
//! [`memory::MemoryGridSource`] is the built-in implementation backing tests
//! and fixture files.

pub mod memory;
pub mod meta;

pub use memory::{MemoryGrid, MemoryGridSource, MemorySourceError};
pub use meta::{MessageMeta, ProbabilitySpec, SurfaceSpec};

/// One cell's content.
///
/// Out-of-extent reads and physically missing values are both `Missing`;
/// the engine converts them into explicit missing probe values rather than
/// sentinel numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Numeric(f64),
    Text(String),
    Missing,
}

impl CellValue {
    /// Whether this cell holds no data.
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// Numeric payload, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Numeric(v) => Some(*v),
            _ => None,
        }
    }
}

/// One message (one element at one valid time on one sector grid) of an
/// opened grid source.
pub trait GridMessage: Send + Sync {
    /// Identification metadata for descriptor matching.
    fn meta(&self) -> &MessageMeta;

    /// Grid width in cells.
    fn width(&self) -> usize;

    /// Grid height in cells.
    fn height(&self) -> usize;

    /// Value at integer cell coordinates. Reads outside the grid extent
    /// return `CellValue::Missing`.
    fn cell(&self, x: i64, y: i64) -> CellValue;
}

/// One opened grid input.
pub trait GridSource: Send + Sync {
    /// Stable identifier for logs and error reports (usually the file path).
    fn id(&self) -> &str;

    /// All messages in this source, in file order.
    fn messages(&self) -> Vec<&dyn GridMessage>;
}
