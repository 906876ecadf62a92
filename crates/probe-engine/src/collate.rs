//! Temporal collation of match records.
//!
//! Collation turns the flat match array into a time-ordered index: one row
//! per distinct valid time, each row mapping every known element to the
//! record that carries it. "Give me SKY at time T" becomes a slot read
//! instead of a scan. The index is rebuilt from scratch when the record set
//! changes; it is never mutated incrementally.

use crate::matcher::MatchRecord;
use chrono::{DateTime, Utc};
use probe_common::Element;
use tracing::warn;

/// One valid time's element slots.
#[derive(Debug, Clone)]
pub struct CollationRow {
    pub valid_time: DateTime<Utc>,
    /// Dense per-element slots: index into the collated record array, or
    /// `None` when the element has no data at this time.
    slots: Vec<Option<usize>>,
}

impl CollationRow {
    fn new(valid_time: DateTime<Utc>) -> Self {
        Self {
            valid_time,
            slots: vec![None; Element::COUNT],
        }
    }

    /// Record index for an element at this row's valid time.
    pub fn slot(&self, element: Element) -> Option<usize> {
        self.slots[element.index()]
    }
}

/// A duplicate element+time hit discovered during collation.
///
/// The first-seen record stays indexed; the rejected record remains
/// discoverable in the record array but is not reachable through any row.
#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    pub element: Element,
    pub valid_time: DateTime<Utc>,
    /// Index of the record kept in the row.
    pub kept: usize,
    /// Index of the record that lost.
    pub rejected: usize,
}

/// The collated, time-indexed record set.
#[derive(Debug, Clone)]
pub struct Collation {
    records: Vec<MatchRecord>,
    rows: Vec<CollationRow>,
    collisions: Vec<Collision>,
}

impl Collation {
    /// The records, sorted ascending by valid time. Row slots index into
    /// this array.
    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    /// Rows in strictly increasing valid-time order.
    pub fn rows(&self) -> &[CollationRow] {
        &self.rows
    }

    /// Duplicate element+time hits flagged during collation.
    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// The record for an element at an exact valid time, if indexed.
    pub fn record_at(&self, valid_time: DateTime<Utc>, element: Element) -> Option<&MatchRecord> {
        let row = self
            .rows
            .binary_search_by_key(&valid_time, |r| r.valid_time)
            .ok()?;
        let index = self.rows[row].slot(element)?;
        self.records.get(index)
    }

    /// Consume the collation, returning the sorted record array.
    pub fn into_records(self) -> Vec<MatchRecord> {
        self.records
    }
}

/// Sort records by valid time and build the per-time element index.
///
/// The sort is stable: records sharing a valid time keep their matcher
/// emission order, so when two sectors contribute the same element at the
/// same instant the earlier-resolved (higher-priority) sector wins and the
/// duplicate is flagged rather than overwritten.
pub fn collate(mut records: Vec<MatchRecord>) -> Collation {
    records.sort_by_key(|r| r.valid_time);

    let mut rows: Vec<CollationRow> = Vec::new();
    let mut collisions = Vec::new();

    for (index, record) in records.iter().enumerate() {
        if rows.last().map(|r| r.valid_time) != Some(record.valid_time) {
            rows.push(CollationRow::new(record.valid_time));
        }
        let row = rows.last_mut().unwrap();
        let slot = record.descriptor.element.index();
        match row.slots[slot] {
            None => row.slots[slot] = Some(index),
            Some(kept) => {
                warn!(
                    element = %record.descriptor.element,
                    valid_time = %record.valid_time,
                    kept,
                    rejected = index,
                    "duplicate element at valid time; keeping first"
                );
                collisions.push(Collision {
                    element: record.descriptor.element,
                    valid_time: record.valid_time,
                    kept,
                    rejected: index,
                });
            }
        }
    }

    debug_assert!(rows.windows(2).all(|w| w[0].valid_time < w[1].valid_time));

    Collation {
        records,
        rows,
        collisions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ElementDescriptor;
    use chrono::TimeZone;
    use probe_common::ProbeValue;

    fn record(element: Element, hour: u32, sector: &str, value: f64) -> MatchRecord {
        let reference = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        MatchRecord {
            descriptor: ElementDescriptor::new(element),
            reference_time: reference,
            valid_time: reference + chrono::Duration::hours(hour as i64),
            sector_id: sector.to_string(),
            units: "K".to_string(),
            values: vec![ProbeValue::Numeric(value)],
        }
    }

    #[test]
    fn test_rows_sorted_and_grouped() {
        let records = vec![
            record(Element::Temp, 12, "conus", 280.0),
            record(Element::Sky, 6, "conus", 50.0),
            record(Element::Temp, 6, "conus", 281.0),
        ];
        let collation = collate(records);

        assert_eq!(collation.rows().len(), 2);
        assert!(collation.rows()[0].valid_time < collation.rows()[1].valid_time);
        let row6 = &collation.rows()[0];
        assert!(row6.slot(Element::Temp).is_some());
        assert!(row6.slot(Element::Sky).is_some());
        assert!(row6.slot(Element::Qpf).is_none());
    }

    #[test]
    fn test_record_at_lookup() {
        let records = vec![
            record(Element::Temp, 6, "conus", 281.0),
            record(Element::Temp, 12, "conus", 280.0),
        ];
        let collation = collate(records);
        let t6 = Utc.with_ymd_and_hms(2025, 6, 1, 6, 0, 0).unwrap();
        let found = collation.record_at(t6, Element::Temp).unwrap();
        assert_eq!(found.values[0], ProbeValue::Numeric(281.0));
        assert!(collation.record_at(t6, Element::Sky).is_none());
        let t7 = Utc.with_ymd_and_hms(2025, 6, 1, 7, 0, 0).unwrap();
        assert!(collation.record_at(t7, Element::Temp).is_none());
    }

    #[test]
    fn test_duplicate_element_keeps_first_and_flags() {
        let records = vec![
            record(Element::Temp, 6, "conus", 281.0),
            record(Element::Temp, 6, "nhemi", 279.0),
        ];
        let collation = collate(records);

        assert_eq!(collation.rows().len(), 1);
        let kept_index = collation.rows()[0].slot(Element::Temp).unwrap();
        assert_eq!(collation.records()[kept_index].sector_id, "conus");

        assert_eq!(collation.collisions().len(), 1);
        let collision = &collation.collisions()[0];
        assert_eq!(collision.element, Element::Temp);
        assert_eq!(collision.kept, kept_index);
        // The losing record is discoverable but not indexed.
        assert_eq!(collation.records()[collision.rejected].sector_id, "nhemi");
    }

    #[test]
    fn test_collation_is_idempotent() {
        let records = vec![
            record(Element::Sky, 12, "conus", 10.0),
            record(Element::Temp, 6, "conus", 281.0),
            record(Element::Sky, 6, "conus", 25.0),
            record(Element::Temp, 12, "conus", 279.5),
        ];
        let first = collate(records);
        let second = collate(first.records().to_vec());

        assert_eq!(first.rows().len(), second.rows().len());
        for (a, b) in first.rows().iter().zip(second.rows().iter()) {
            assert_eq!(a.valid_time, b.valid_time);
            for element in Element::ALL {
                assert_eq!(a.slot(element), b.slot(element));
            }
        }
        assert!(second.collisions().is_empty());
    }

    #[test]
    fn test_empty_input_collates_to_empty() {
        let collation = collate(Vec::new());
        assert!(collation.rows().is_empty());
        assert!(collation.records().is_empty());
        assert!(collation.collisions().is_empty());
    }
}
