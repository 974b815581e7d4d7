//! Year normalization for the events table
//!
//! The `Year` column mixes plain integers (`1945`) with era-suffixed text
//! (`500 BC`, `753BC`). Everything downstream keys on a single signed year:
//! - BC years become negative, with no offset (1 BC is `-1`, not `0`)
//! - Only the `"BC"` marker is recognised; `"AD"`/`"CE"` text is unparseable
//! - Rows whose year cannot be parsed leave the working set and are reported
//!   as [`DroppedRow`]s

use serde::{Deserialize, Serialize};

use crate::models::{Event, RawEvent, RawYear};

/// Era marker for years before the common era. Case-sensitive.
pub const BC_MARKER: &str = "BC";

/// Parse a raw `Year` cell into a signed year.
///
/// Total and deterministic: returns `None` for anything it cannot read,
/// never panics.
pub fn parse_year(raw: &RawYear) -> Option<i64> {
    match raw {
        RawYear::Int(year) => Some(*year),
        RawYear::Text(text) if text.contains(BC_MARKER) => {
            let stripped = text.replace(BC_MARKER, "");
            let digits = stripped.trim();
            // A BC year is a magnitude; "-500 BC" is not a valid way to write it.
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            digits.parse::<i64>().ok().map(|n| -n)
        }
        RawYear::Text(text) => text.trim().parse::<i64>().ok(),
        RawYear::Missing => None,
    }
}

/// A row excluded from the working set because its year did not parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedRow {
    /// Zero-based position in the input.
    pub index: usize,
    pub name: String,
    pub raw_year: RawYear,
}

/// Output of [`normalize`]: retained events in chronological order plus the
/// rows that were dropped.
#[derive(Debug, Clone, Default)]
pub struct NormalizedEvents {
    pub events: Vec<Event>,
    pub dropped: Vec<DroppedRow>,
}

impl NormalizedEvents {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

/// Normalize every raw row, drop the unparseable ones and sort the rest
/// chronologically.
pub fn normalize<I>(raw_events: I) -> NormalizedEvents
where
    I: IntoIterator<Item = RawEvent>,
{
    let mut events = Vec::new();
    let mut dropped = Vec::new();

    for (index, raw) in raw_events.into_iter().enumerate() {
        match parse_year(&raw.raw_year) {
            Some(year) => events.push(Event::from_raw(raw, year)),
            None => {
                tracing::debug!(
                    index,
                    name = %raw.name,
                    raw_year = %raw.raw_year,
                    "Dropping event with unparseable year"
                );
                dropped.push(DroppedRow {
                    index,
                    name: raw.name,
                    raw_year: raw.raw_year,
                });
            }
        }
    }

    if !dropped.is_empty() {
        tracing::info!(
            retained = events.len(),
            dropped = dropped.len(),
            "Year normalization excluded rows"
        );
    }

    NormalizedEvents {
        events: chronological_order(events),
        dropped,
    }
}

/// Stable ascending sort on the normalized year. Ties keep input order.
pub fn chronological_order(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by_key(|e| e.year);
    events
}
