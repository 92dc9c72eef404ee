//! End-to-end runs of the migration pipeline against file and memory stores.

use std::fs;
use std::path::{Path, PathBuf};

use medmig_cli::config::MigrationConfig;
use medmig_cli::pipeline::{
    DEMO_PATIENT_ID, MigrationOptions, check_source, crud_demo, migrate, open_collection,
};
use medmig_store::{Filter, LoadMode, connect};
use medmig_transform::{ConflictPolicy, IdentityStrategy};
use medmig_validate::{DuplicateKey, Issue, PreValidationOptions};

const HEADER: &str = "Name,Age,Gender,Blood Type,Medical Condition,Date of Admission,Doctor,Hospital,Insurance Provider,Billing Amount,Room Number,Admission Type,Discharge Date,Medication,Test Results";

const ROWS: [&str; 3] = [
    "John Smith,40,Male,A+,Diabetes,2024-01-05,Dr. Brown,General,Aetna,1200.5,101,Emergency,2024-01-10,Insulin,Normal",
    "Ann Lee,25,Female,O-,Asthma,2024-02-01,Dr. Ray,St. Mary,Cigna,3500.75,105,Elective,2024-02-03,Ibuprofen,Inconclusive",
    "John Smith,40,Male,A+,Hypertension,2024-03-10,Dr. Brown,General,Aetna,980,214,Urgent,2024-03-12,Lipitor,Abnormal",
];

fn write_csv(dir: &Path, header: &str, rows: &[&str]) -> PathBuf {
    let path = dir.join("admissions.csv");
    let mut contents = String::from(header);
    for row in rows {
        contents.push('\n');
        contents.push_str(row);
    }
    contents.push('\n');
    fs::write(&path, contents).unwrap();
    path
}

fn config(store_uri: &str, data_file: &Path) -> MigrationConfig {
    MigrationConfig::from_lookup(|key| match key {
        "MONGO_URI" => Some(store_uri.to_string()),
        "DB_NAME" => Some("hospital".to_string()),
        "COLLECTION_NAME" => Some("patients".to_string()),
        "DATA_FILE" => Some(data_file.display().to_string()),
        "MEDMIG_REFERENCE_YEAR" => Some("2025".to_string()),
        _ => None,
    })
    .unwrap()
}

fn file_store(dir: &Path) -> String {
    format!("file://{}", dir.join("store").display())
}

fn options() -> MigrationOptions {
    MigrationOptions::new(IdentityStrategy::age_anchored(2025))
}

/// Repeat visits of one patient pass the duplicate check.
fn repeat_visit_options() -> MigrationOptions {
    let mut options = options();
    options.duplicate_key = DuplicateKey::Identity(options.identity.clone());
    options
}

#[test]
fn migration_groups_rows_and_verifies_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), HEADER, &ROWS);
    let config = config(&file_store(dir.path()), &csv);

    let result = migrate(&config, &repeat_visit_options()).unwrap();

    assert!(result.pre.is_valid());
    assert_eq!(result.rows, 3);
    assert_eq!(result.documents, 2);
    assert_eq!(result.admissions, 3);
    assert!(result.conflicts.is_empty());
    let load = result.load.as_ref().unwrap();
    assert_eq!(load.mode, LoadMode::Replace);
    assert_eq!(load.inserted, 2);
    assert!(result.post.as_ref().unwrap().is_valid());
    assert!(!result.has_errors());

    let collection = open_collection(&config).unwrap();
    assert_eq!(collection.count_documents(&Filter::all()).unwrap(), 2);
    let ann = collection
        .find_one(&Filter::by_id("patient_ann_lee_2000"))
        .unwrap()
        .unwrap();
    insta::assert_json_snapshot!(ann, @r#"
    {
      "_id": "patient_ann_lee_2000",
      "name": "Ann Lee",
      "age": 25,
      "gender": "Female",
      "blood_type": "O-",
      "admissions": [
        {
          "medical_condition": "Asthma",
          "date_of_admission": "2024-02-01",
          "discharge_date": "2024-02-03",
          "doctor": "Dr. Ray",
          "hospital": "St. Mary",
          "room_number": 105,
          "admission_type": "Elective",
          "medication": "Ibuprofen",
          "test_results": "Inconclusive",
          "billing_amount": 3500.75,
          "insurance_provider": "Cigna"
        }
      ]
    }
    "#);
}

#[test]
fn rerunning_an_upsert_leaves_the_collection_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), HEADER, &ROWS);
    let config = config(&file_store(dir.path()), &csv);

    let mut upsert = repeat_visit_options();
    upsert.load_mode = LoadMode::Upsert;
    migrate(&config, &upsert).unwrap();
    let rerun = migrate(&config, &upsert).unwrap();

    let load = rerun.load.unwrap();
    assert_eq!(load.inserted, 0);
    assert_eq!(load.replaced, 2);
    assert_eq!(load.removed, 0);
    assert!(rerun.post.unwrap().is_valid());
}

#[test]
fn replace_mode_drops_stale_patients() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), HEADER, &ROWS);
    let config = config(&file_store(dir.path()), &csv);
    migrate(&config, &repeat_visit_options()).unwrap();

    write_csv(dir.path(), HEADER, &ROWS[..1]);
    let result = migrate(&config, &repeat_visit_options()).unwrap();

    let load = result.load.unwrap();
    assert_eq!(load.removed, 2);
    assert_eq!(load.inserted, 1);
    let collection = open_collection(&config).unwrap();
    assert_eq!(collection.count_documents(&Filter::all()).unwrap(), 1);
}

#[test]
fn dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), HEADER, &ROWS);
    let config = config(&file_store(dir.path()), &csv);
    let mut dry = repeat_visit_options();
    dry.dry_run = true;

    let result = migrate(&config, &dry).unwrap();

    assert_eq!(result.documents, 2);
    assert!(result.load.is_none());
    assert!(result.post.is_none());
    assert!(!dir.path().join("store").exists());
}

#[test]
fn failed_pre_validation_stops_before_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let header = HEADER.replace("Doctor,", "");
    let rows: Vec<String> = ROWS
        .iter()
        .map(|row| {
            let mut cells: Vec<&str> = row.split(',').collect();
            cells.remove(6);
            cells.join(",")
        })
        .collect();
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    let csv = write_csv(dir.path(), &header, &rows);
    let config = config(&file_store(dir.path()), &csv);

    let result = migrate(&config, &options()).unwrap();

    assert!(result.has_errors());
    assert_eq!(
        result.pre.first(),
        Some(&Issue::MissingColumn {
            column: "Doctor".to_string()
        })
    );
    assert_eq!(result.documents, 0);
    assert!(result.load.is_none());
    assert!(!dir.path().join("store").exists());
}

#[test]
fn default_run_rejects_repeated_name_and_age() {
    let dir = tempfile::tempdir().unwrap();
    let jane = [
        "Jane Doe,30,Female,B+,Flu,2024-04-01,Dr. Ray,General,Aetna,300,110,Urgent,2024-04-02,Aspirin,Normal",
        "Jane Doe,30,Female,B+,Asthma,2024-06-01,Dr. Ray,General,Aetna,450,112,Elective,2024-06-03,Ibuprofen,Normal",
    ];
    let csv = write_csv(dir.path(), HEADER, &jane);
    let config = config(&file_store(dir.path()), &csv);

    let result = migrate(&config, &options()).unwrap();

    assert!(result.has_errors());
    let issue = result.pre.first().unwrap();
    assert_eq!(issue.kind(), "duplicate-patients");
    assert_eq!(issue.count(), Some(1));
    assert_eq!(result.documents, 0);
    assert!(result.load.is_none());
    assert!(!dir.path().join("store").exists());
}

/// Two visits of one keyed patient whose recorded ages disagree.
fn keyed_age_conflict(dir: &Path) -> PathBuf {
    let header = format!("{HEADER},Patient ID");
    let first = format!("{},P-1", ROWS[0]);
    let second = format!("{},P-1", ROWS[2].replace("John Smith,40", "John Smith,41"));
    write_csv(dir, &header, &[&first, &second])
}

fn keyed_options() -> MigrationOptions {
    MigrationOptions::new(IdentityStrategy::source_key("Patient ID"))
}

#[test]
fn first_wins_absorbs_age_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    let csv = keyed_age_conflict(dir.path());
    let config = config(&file_store(dir.path()), &csv);

    let result = migrate(&config, &keyed_options()).unwrap();

    assert!(result.pre.is_valid());
    assert_eq!(result.documents, 1);
    assert_eq!(result.admissions, 2);
    assert_eq!(result.conflicts.len(), 1);
    let conflict = &result.conflicts[0];
    assert_eq!(conflict.row, 2);
    assert_eq!(conflict.field, "age");
    assert_eq!((conflict.kept.as_str(), conflict.ignored.as_str()), ("40", "41"));
}

#[test]
fn reject_policy_aborts_before_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let csv = keyed_age_conflict(dir.path());
    let config = config(&file_store(dir.path()), &csv);
    let mut reject = keyed_options();
    reject.conflicts = ConflictPolicy::Reject;

    let err = migrate(&config, &reject).unwrap_err();

    assert!(format!("{err:#}").contains("row 2"));
    assert!(!dir.path().join("store").exists());
}

#[test]
fn identity_collisions_fail_the_source_check() {
    let dir = tempfile::tempdir().unwrap();
    let conflicting = ROWS[2].replace("Male,A+", "Male,B+");
    let csv = write_csv(dir.path(), HEADER, &[ROWS[0], ROWS[1], &conflicting]);

    let check = check_source(
        &csv,
        &PreValidationOptions::new(DuplicateKey::Identity(IdentityStrategy::age_anchored(2025))),
    )
    .unwrap();

    assert_eq!(check.rows, 3);
    assert!(check.unrecognized_columns.is_empty());
    let issue = check.report.first().unwrap();
    assert_eq!(issue.kind(), "identity-collisions");
    assert_eq!(issue.count(), Some(1));
}

#[test]
fn repeat_admissions_pass_the_source_check() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), HEADER, &ROWS);

    let check = check_source(
        &csv,
        &PreValidationOptions::new(DuplicateKey::Identity(IdentityStrategy::age_anchored(2025))),
    )
    .unwrap();

    assert!(check.report.is_valid());
}

#[test]
fn crud_walkthrough_leaves_no_trace() {
    let collection = connect("memory://")
        .unwrap()
        .collection("hospital", "patients")
        .unwrap();

    let steps = crud_demo(&collection).unwrap();

    let outcomes: Vec<(&str, &str)> = steps
        .iter()
        .map(|step| (step.operation, step.outcome.as_str()))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            ("insert_one", "inserted patient_demo_001"),
            ("find_one", "John Doe age 45"),
            ("update_one", "matched 1, modified 1"),
            ("find_one", "John Doe age 46"),
            ("delete_one", "deleted 1"),
        ]
    );
    assert!(
        collection
            .find_one(&Filter::by_id(DEMO_PATIENT_ID))
            .unwrap()
            .is_none()
    );
}

#[test]
fn missing_data_file_is_reported() {
    let config = MigrationConfig::from_lookup(|key| match key {
        "MONGO_URI" => Some("memory://".to_string()),
        "DB_NAME" => Some("hospital".to_string()),
        "COLLECTION_NAME" => Some("patients".to_string()),
        _ => None,
    })
    .unwrap();

    let err = migrate(&config, &options()).unwrap_err();
    assert!(err.to_string().contains("DATA_FILE"));
}
