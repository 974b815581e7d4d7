use std::io::Write;

use chronicle_core::config::DataConfig;
use chronicle_ingest::{load_dataset, IngestError};
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

fn events_csv() -> NamedTempFile {
    write_temp(
        "Name of Incident,Year,Place Name,Type of Event,Impact,Important Person/Group Responsible,Outcome,Country\n\
         End of WWII,1945,Berlin,War,Peace in Europe,Allies,Surrender,Germany\n\
         Persian Wars,500 BC,Marathon,War,Greek independence,Miltiades,Greek victory,Greece\n\
         Unknown date,abc,Nowhere,Other,,,,Unknown\n\
         Pandemic,2020,Wuhan,Health,Global crisis,,Ongoing,China\n",
    )
}

fn trivia_csv() -> NamedTempFile {
    write_temp(
        "pregunta,opciones,respuesta\n\
         Q1,\"['a', 'b']\",a\n\
         Q2,\"['a', 'b']\",z\n\
         Q3,\"[\"\"x\"\", \"\"y\"\"]\",y\n",
    )
}

#[test]
fn test_load_dataset_normalizes_and_validates() {
    let events = events_csv();
    let trivia = trivia_csv();
    let config = DataConfig {
        events_path: events.path().display().to_string(),
        trivia_path: trivia.path().display().to_string(),
    };

    let dataset = load_dataset(&config).expect("dataset should load");

    let years: Vec<i64> = dataset.events.events().iter().map(|e| e.year).collect();
    assert_eq!(years, vec![-500, 1945, 2020]);
    assert_eq!(dataset.events.dropped().len(), 1);
    assert_eq!(dataset.events.events_at(1945, "Berlin").len(), 1);

    assert_eq!(dataset.trivia.questions.len(), 2);
    assert_eq!(dataset.trivia.rejected.len(), 1);
    assert_eq!(dataset.trivia.rejected[0].row, 2);
}

#[test]
fn test_load_dataset_missing_file() {
    let trivia = trivia_csv();
    let config = DataConfig {
        events_path: "/no/such/events.csv".to_string(),
        trivia_path: trivia.path().display().to_string(),
    };

    match load_dataset(&config) {
        Err(IngestError::Io { path, .. }) => assert!(path.ends_with("events.csv")),
        other => panic!("expected Io error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_repository_sample_data_loads() {
    let config = DataConfig {
        events_path: "../data/events.csv".to_string(),
        trivia_path: "../data/trivia.csv".to_string(),
    };
    let dataset = load_dataset(&config).expect("sample data should load");
    assert!(!dataset.events.is_empty());
    assert!(dataset.trivia.questions.len() >= chronicle_core::DEFAULT_QUIZ_SIZE);
    assert!(dataset.trivia.rejected.is_empty());
}
