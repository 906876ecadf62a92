//! Common types shared across all gridprobe crates.

pub mod element;
pub mod error;
pub mod point;
pub mod time;
pub mod units;
pub mod value;

pub use element::Element;
pub use error::{ProbeError, ProbeResult};
pub use point::{PointGeometry, ProbePoint};
pub use time::TimeWindow;
pub use units::UnitSystem;
pub use value::ProbeValue;
