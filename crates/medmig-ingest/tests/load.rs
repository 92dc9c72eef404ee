use std::fs;

use polars::prelude::DataType;
use tempfile::tempdir;

use medmig_ingest::{IngestError, load_admissions};
use medmig_model::{REQUIRED_COLUMNS, SourceColumn};

const HEADER: &str = "Name,Age,Gender,Blood Type,Medical Condition,Date of Admission,Doctor,Hospital,Insurance Provider,Billing Amount,Room Number,Admission Type,Discharge Date,Medication,Test Results";

#[test]
fn loads_export_with_inferred_types() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("healthcare_dataset.csv");
    let contents = format!(
        "{HEADER}\n\
         Bobby JacksOn,30,Male,B-,Cancer,2024-01-31,Matthew Smith,Sons and Miller,Blue Cross,18856.28,328,Urgent,2024-02-02,Paracetamol,Normal\n\
         LesLie TErRy,62,Male,A+,Obesity,2019-08-20,Samantha Davies,Kim Inc,Medicare,33643.33,265,Emergency,2019-08-26,Ibuprofen,Inconclusive\n"
    );
    fs::write(&path, contents).unwrap();

    let source = load_admissions(&path).expect("load export");

    assert_eq!(source.frame.height(), 2);
    assert_eq!(source.frame.width(), 15);
    assert!(source.headers.missing(&REQUIRED_COLUMNS).is_empty());
    assert!(source.headers.unrecognized().is_empty());
    let age = source.frame.column(SourceColumn::Age.header()).unwrap();
    assert_eq!(age.dtype(), &DataType::Int64);
    let billing = source
        .frame
        .column(SourceColumn::BillingAmount.header())
        .unwrap();
    assert_eq!(billing.dtype(), &DataType::Float64);
}

#[test]
fn late_text_age_makes_column_textual() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("late_text.csv");
    let mut contents = String::from("Name,Age\n");
    for idx in 0..250 {
        contents.push_str(&format!("Patient {idx},{}\n", 20 + idx % 50));
    }
    contents.push_str("Late Entry,N/A\n");
    fs::write(&path, contents).unwrap();

    let source = load_admissions(&path).expect("load export");

    let age = source.frame.column("Age").unwrap();
    assert_eq!(age.dtype(), &DataType::String);
    assert_eq!(source.frame.height(), 251);
}

#[test]
fn header_only_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    fs::write(&path, format!("{HEADER}\n")).unwrap();

    let result = load_admissions(&path);

    assert!(matches!(
        result,
        Err(IngestError::EmptyCsv { .. } | IngestError::CsvParse { .. })
    ));
}

#[test]
fn missing_file_is_reported() {
    let dir = tempdir().unwrap();
    let result = load_admissions(&dir.path().join("absent.csv"));
    assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
}
