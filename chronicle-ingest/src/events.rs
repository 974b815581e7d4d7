use std::fs::File;
use std::io::Read;
use std::path::Path;

use chronicle_core::{RawEvent, RawYear};
use serde::Deserialize;

use crate::error::IngestError;

/// One line of the events CSV. Empty cells deserialize to `None`.
#[derive(Debug, Deserialize)]
struct EventRow {
    #[serde(rename = "Name of Incident")]
    name: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Place Name")]
    place: Option<String>,
    #[serde(rename = "Type of Event")]
    event_type: Option<String>,
    #[serde(rename = "Impact")]
    impact: Option<String>,
    #[serde(rename = "Important Person/Group Responsible")]
    responsible_party: Option<String>,
    #[serde(rename = "Outcome")]
    outcome: Option<String>,
    #[serde(rename = "Country")]
    country: Option<String>,
}

impl From<EventRow> for RawEvent {
    fn from(row: EventRow) -> Self {
        RawEvent {
            name: row.name.unwrap_or_default(),
            raw_year: RawYear::from(row.year),
            place: row.place,
            country: row.country,
            event_type: row.event_type,
            impact: row.impact,
            responsible_party: row.responsible_party,
            outcome: row.outcome,
        }
    }
}

/// Read the events table. Year cells are kept as written; normalization
/// happens in `chronicle_core::normalize`.
///
/// Short rows are padded with absent cells and cells past the last header are
/// ignored. A row that cannot be decoded at all is kept as a nameless,
/// yearless event so it surfaces in the normalizer's dropped rows at its
/// original index.
pub fn read_events<R: Read>(reader: R) -> Result<Vec<RawEvent>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut events = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let decoded = match record {
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => Err(e),
            Ok(record) => {
                if record.len() != headers.len() {
                    tracing::warn!(
                        row = index + 1,
                        fields = record.len(),
                        expected = headers.len(),
                        "Ragged events row"
                    );
                }
                record.deserialize::<EventRow>(Some(&headers))
            }
        };
        match decoded {
            Ok(row) => events.push(RawEvent::from(row)),
            Err(e) => {
                tracing::warn!(row = index + 1, error = %e, "Unreadable events row");
                events.push(RawEvent::new("", RawYear::Missing));
            }
        }
    }
    Ok(events)
}

pub fn load_events(path: impl AsRef<Path>) -> Result<Vec<RawEvent>, IngestError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let events = read_events(file)?;
    tracing::debug!(path = %path.display(), rows = events.len(), "Loaded events table");
    Ok(events)
}
