//! Element matching and temporal collation over sector grid sources.
//!
//! This crate is the query engine: it turns probe points, element
//! descriptors, and opened grid sources into a flat, point-indexed match
//! array and a time-ordered collation index that every downstream formatter
//! consumes identically.
//!
//! # Architecture
//!
//! ```text
//! ProbeQuery (points + descriptors + policy)
//!      │
//!      ▼
//! ElementMatcher::run
//!      │
//!      ├─► SectorResolver: membership per point (once, cached)
//!      │
//!      ├─► per-source scan (parallel, per-source buffers)
//!      │         │
//!      │         ├─► descriptor identification predicate
//!      │         ├─► valid-time window filter
//!      │         └─► per-point extraction (nearest / bilinear / area-average)
//!      │
//!      └─► ordered merge, first-wins duplicate rejection
//!               │
//!               ▼
//!          collate() → Collation (rows by valid time, dense element slots)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use probe_engine::{collate, ElementDescriptor, ElementMatcher, ProbeQuery};
//! use probe_common::{Element, ProbePoint};
//!
//! let matcher = ElementMatcher::new(resolver);
//! let query = ProbeQuery::new(
//!     vec![ProbePoint::location(35.4, -97.6)],
//!     vec![ElementDescriptor::new(Element::Temp)],
//! );
//! let records = matcher.run(&query, &sources)?;
//! let collation = collate(records);
//! for row in collation.rows() {
//!     // ...
//! }
//! ```

pub mod cancel;
pub mod collate;
pub mod descriptor;
pub mod interpolate;
pub mod matcher;
pub mod units;

pub use cancel::CancelToken;
pub use collate::{collate, Collation, CollationRow, Collision};
pub use descriptor::{dedup_descriptors, ElementDescriptor};
pub use matcher::{ElementMatcher, InterpolationMode, MatchRecord, ProbeQuery};
