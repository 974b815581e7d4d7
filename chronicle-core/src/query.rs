//! Read-only lookups over the normalized working set
//!
//! [`EventIndex`] owns the chronologically sorted events and answers every
//! query the presentation layer needs. Nothing here mutates the events; each
//! lookup is a linear scan over a table small enough to fit on one screen of
//! a history textbook.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{Event, RawEvent};
use crate::normalize::{normalize, DroppedRow};

/// One point on a per-country timeline chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub year: i64,
    pub name: String,
}

/// Immutable, chronologically ordered working set of events.
#[derive(Debug, Clone, Default)]
pub struct EventIndex {
    events: Vec<Event>,
    dropped: Vec<DroppedRow>,
}

impl EventIndex {
    /// Normalize the raw table and take ownership of the result.
    pub fn new<I>(raw_events: I) -> Self
    where
        I: IntoIterator<Item = RawEvent>,
    {
        let normalized = normalize(raw_events);
        Self {
            events: normalized.events,
            dropped: normalized.dropped,
        }
    }

    /// All retained events, oldest first.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Rows excluded during normalization.
    pub fn dropped(&self) -> &[DroppedRow] {
        &self.dropped
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn distinct_years(&self) -> BTreeSet<i64> {
        self.events.iter().map(|e| e.year).collect()
    }

    /// Earliest and latest year covered, `None` when the table is empty.
    pub fn year_span(&self) -> Option<(i64, i64)> {
        // Sorted on construction, so the ends are the extremes.
        match (self.events.first(), self.events.last()) {
            (Some(first), Some(last)) => Some((first.year, last.year)),
            _ => None,
        }
    }

    /// Events with exactly this year and place. Empty when nothing matches.
    pub fn events_at(&self, year: i64, place: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.year == year && e.place.as_deref() == Some(place))
            .collect()
    }

    /// Distinct places recorded for a year.
    pub fn places_at(&self, year: i64) -> BTreeSet<&str> {
        self.events
            .iter()
            .filter(|e| e.year == year)
            .filter_map(|e| e.place.as_deref())
            .collect()
    }

    pub fn events_in_country(&self, country: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.country.as_deref() == Some(country))
            .collect()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type.as_deref() == Some(event_type))
            .collect()
    }

    pub fn distinct_countries(&self) -> BTreeSet<&str> {
        self.events
            .iter()
            .filter_map(|e| e.country.as_deref())
            .collect()
    }

    pub fn distinct_event_types(&self) -> BTreeSet<&str> {
        self.events
            .iter()
            .filter_map(|e| e.event_type.as_deref())
            .collect()
    }

    /// Points for a country's timeline chart, oldest first.
    pub fn timeline(&self, country: &str) -> Vec<TimelinePoint> {
        self.events_in_country(country)
            .into_iter()
            .map(|e| TimelinePoint {
                year: e.year,
                name: e.name.clone(),
            })
            .collect()
    }
}
