use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel used by the events table when the country of an incident is not known.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// The `Year` cell exactly as it was read, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawYear {
    Int(i64),
    Text(String),
    Missing,
}

impl fmt::Display for RawYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawYear::Int(y) => write!(f, "{}", y),
            RawYear::Text(s) => f.write_str(s),
            RawYear::Missing => Ok(()),
        }
    }
}

impl From<i64> for RawYear {
    fn from(year: i64) -> Self {
        RawYear::Int(year)
    }
}

impl From<&str> for RawYear {
    fn from(text: &str) -> Self {
        RawYear::Text(text.to_string())
    }
}

impl From<String> for RawYear {
    fn from(text: String) -> Self {
        RawYear::Text(text)
    }
}

impl From<Option<String>> for RawYear {
    fn from(text: Option<String>) -> Self {
        text.map(RawYear::Text).unwrap_or(RawYear::Missing)
    }
}

/// One row of the events table as loaded, year not yet normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub name: String,
    pub raw_year: RawYear,
    pub place: Option<String>,
    pub country: Option<String>,
    pub event_type: Option<String>,
    pub impact: Option<String>,
    pub responsible_party: Option<String>,
    pub outcome: Option<String>,
}

impl RawEvent {
    /// Minimal row with only a name and a year; descriptive fields empty.
    pub fn new(name: impl Into<String>, raw_year: impl Into<RawYear>) -> Self {
        Self {
            name: name.into(),
            raw_year: raw_year.into(),
            place: None,
            country: None,
            event_type: None,
            impact: None,
            responsible_party: None,
            outcome: None,
        }
    }

    pub fn with_place(mut self, place: impl Into<String>) -> Self {
        self.place = Some(place.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }
}

/// A historical incident that survived year normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub raw_year: RawYear,
    /// Signed year, BC as negative. Sole sort and filter key for chronology.
    pub year: i64,
    pub place: Option<String>,
    pub country: Option<String>,
    pub event_type: Option<String>,
    pub impact: Option<String>,
    pub responsible_party: Option<String>,
    pub outcome: Option<String>,
}

impl Event {
    pub fn from_raw(raw: RawEvent, year: i64) -> Self {
        Self {
            name: raw.name,
            raw_year: raw.raw_year,
            year,
            place: raw.place,
            country: raw.country,
            event_type: raw.event_type,
            impact: raw.impact,
            responsible_party: raw.responsible_party,
            outcome: raw.outcome,
        }
    }

    /// Country to highlight on a map overlay. `None` for missing or `"Unknown"`.
    pub fn map_country(&self) -> Option<&str> {
        self.country
            .as_deref()
            .filter(|c| !c.trim().is_empty() && *c != UNKNOWN_COUNTRY)
    }
}
