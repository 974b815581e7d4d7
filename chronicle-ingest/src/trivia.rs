use std::fs::File;
use std::io::Read;
use std::path::Path;

use chronicle_core::{DataIntegrityError, TriviaQuestion};
use serde::{Deserialize, Serialize};

use crate::choices::parse_choices;
use crate::error::IngestError;

/// One line of the trivia CSV (`pregunta`, `opciones`, `respuesta`).
#[derive(Debug, Deserialize)]
struct TriviaRow {
    pregunta: Option<String>,
    opciones: Option<String>,
    respuesta: Option<String>,
}

impl TryFrom<TriviaRow> for TriviaQuestion {
    type Error = DataIntegrityError;

    fn try_from(row: TriviaRow) -> Result<Self, Self::Error> {
        let prompt = row
            .pregunta
            .ok_or(DataIntegrityError::MissingField("pregunta"))?;
        let raw_choices = row
            .opciones
            .ok_or(DataIntegrityError::MissingField("opciones"))?;
        let answer = row
            .respuesta
            .ok_or(DataIntegrityError::MissingField("respuesta"))?;

        TriviaQuestion::new(prompt, parse_choices(&raw_choices)?, answer)
    }
}

/// A trivia row excluded from the quiz pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedQuestion {
    /// One-based data row (the header is not counted).
    pub row: usize,
    pub error: String,
    #[serde(skip)]
    pub kind: DataIntegrityError,
}

/// Result of loading the trivia table: the valid pool plus every row that
/// failed validation.
#[derive(Debug, Clone, Default)]
pub struct TriviaLoad {
    pub questions: Vec<TriviaQuestion>,
    pub rejected: Vec<RejectedQuestion>,
}

/// Read the trivia table. Rows that cannot become a question, including rows
/// with the wrong number of fields, are rejected rather than failing the load.
pub fn read_trivia<R: Read>(reader: R) -> Result<TriviaLoad, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut load = TriviaLoad::default();
    for (i, record) in reader.records().enumerate() {
        let row_number = i + 1;
        match parse_row(&headers, record) {
            Ok(q) => load.questions.push(q),
            Err(RowError::Io(e)) => return Err(e.into()),
            Err(RowError::Integrity(e)) => {
                tracing::warn!(row = row_number, error = %e, "Excluding trivia question from pool");
                load.rejected.push(RejectedQuestion {
                    row: row_number,
                    error: e.to_string(),
                    kind: e,
                });
            }
        }
    }
    Ok(load)
}

enum RowError {
    Io(csv::Error),
    Integrity(DataIntegrityError),
}

impl From<DataIntegrityError> for RowError {
    fn from(e: DataIntegrityError) -> Self {
        RowError::Integrity(e)
    }
}

fn parse_row(
    headers: &csv::StringRecord,
    record: Result<csv::StringRecord, csv::Error>,
) -> Result<TriviaQuestion, RowError> {
    let record = match record {
        Ok(record) => record,
        Err(e) if e.is_io_error() => return Err(RowError::Io(e)),
        Err(e) => return Err(DataIntegrityError::UnreadableRow(e.to_string()).into()),
    };
    if record.len() != headers.len() {
        return Err(DataIntegrityError::FieldCount {
            expected: headers.len(),
            found: record.len(),
        }
        .into());
    }
    let row: TriviaRow = record
        .deserialize(Some(headers))
        .map_err(|e| DataIntegrityError::UnreadableRow(e.to_string()))?;
    Ok(TriviaQuestion::try_from(row)?)
}

pub fn load_trivia(path: impl AsRef<Path>) -> Result<TriviaLoad, IngestError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_trivia(file)
}
