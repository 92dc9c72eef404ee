//! Integrity checks on hand-built frames and collections.

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use serde_json::json;

use medmig_model::{REQUIRED_COLUMNS, SourceColumn};
use medmig_store::{Filter, connect, to_document};
use medmig_transform::IdentityStrategy;
use medmig_validate::{
    DuplicateKey, Issue, PreValidationOptions, Stage, ValidationError, validate_persisted,
    validate_source,
};

/// A frame with every required column, one row per `(name, age, gender)`.
fn source(rows: &[(&str, &str, &str)]) -> DataFrame {
    let columns: Vec<Column> = REQUIRED_COLUMNS
        .iter()
        .map(|column| {
            let values: Vec<Option<String>> = rows
                .iter()
                .map(|(name, age, gender)| {
                    let value = match column {
                        SourceColumn::Name => name.to_string(),
                        SourceColumn::Age => age.to_string(),
                        SourceColumn::Gender => gender.to_string(),
                        SourceColumn::BloodType => "O+".to_string(),
                        other => format!("{} value", other.field_name()),
                    };
                    (!value.is_empty()).then_some(value)
                })
                .collect();
            Series::new(column.header().into(), values).into_column()
        })
        .collect();
    DataFrame::new(columns).unwrap()
}

fn name_age() -> PreValidationOptions {
    PreValidationOptions::default()
}

fn by_identity() -> PreValidationOptions {
    PreValidationOptions::new(DuplicateKey::Identity(IdentityStrategy::age_anchored(2025)))
}

#[test]
fn clean_source_passes() {
    let df = source(&[("Ann Lee", "25", "Female"), ("Bo Chen", "61", "Male")]);
    let report = validate_source(&df, &name_age());
    assert!(report.is_valid(), "{:?}", report.issues);
    assert!(report.into_result().is_ok());
}

#[test]
fn missing_doctor_column_is_named() {
    let mut df = source(&[("Ann Lee", "25", "Female")]);
    df.drop_in_place(SourceColumn::Doctor.header()).unwrap();

    let err = validate_source(&df, &name_age()).into_result().unwrap_err();

    match err {
        ValidationError::Failed { stage, issue, .. } => {
            assert_eq!(stage, Stage::Pre);
            assert_eq!(
                issue,
                Issue::MissingColumn {
                    column: "Doctor".to_string()
                }
            );
            assert!(issue.to_string().contains("Doctor"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn first_missing_column_follows_required_order() {
    let mut df = source(&[("Ann Lee", "25", "Female")]);
    df.drop_in_place(SourceColumn::Hospital.header()).unwrap();
    df.drop_in_place(SourceColumn::Gender.header()).unwrap();

    let report = validate_source(&df, &name_age());

    assert_eq!(
        report.first(),
        Some(&Issue::MissingColumn {
            column: "Gender".to_string()
        })
    );
    assert_eq!(report.issues.len(), 2);
}

#[test]
fn duplicate_name_age_pair_is_rejected() {
    let df = source(&[
        ("Jane Doe", "30", "Female"),
        ("Ann Lee", "25", "Female"),
        ("Jane Doe", "30", "Female"),
    ]);

    let report = validate_source(&df, &name_age());

    assert_eq!(
        report.issues,
        vec![Issue::DuplicatePatients {
            count: 1,
            samples: vec!["Jane Doe (30)".to_string()],
        }]
    );
}

#[test]
fn missing_values_are_counted_across_required_columns() {
    let df = source(&[("Ann Lee", "", "Female"), ("Bo Chen", "61", "")]);

    let report = validate_source(&df, &name_age());

    assert_eq!(report.first(), Some(&Issue::MissingValues { count: 2 }));
}

#[test]
fn non_numeric_ages_are_reported_with_samples() {
    let df = source(&[
        ("Ann Lee", "N/A", "Female"),
        ("Bo Chen", "61", "Male"),
        ("Cy Diaz", "forty", "Male"),
    ]);

    let report = validate_source(&df, &name_age());

    assert_eq!(
        report.issues,
        vec![Issue::NonNumericAge {
            count: 2,
            samples: vec!["N/A".to_string(), "forty".to_string()],
        }]
    );
}

#[test]
fn fractional_ages_in_a_float_column_are_reported() {
    let mut df = source(&[
        ("Ann Lee", "25", "Female"),
        ("Bo Chen", "61", "Male"),
        ("Cy Diaz", "40", "Male"),
    ]);
    let ages = Series::new(
        SourceColumn::Age.header().into(),
        [Some(25.0_f64), Some(61.5), None],
    );
    df.with_column(ages).unwrap();

    let report = validate_source(&df, &name_age());

    let issue = report
        .issues
        .iter()
        .find(|issue| issue.kind() == "fractional-age")
        .unwrap();
    assert_eq!(issue.count(), Some(1));
    assert_eq!(issue.samples(), ["61.5".to_string()]);
}

#[test]
fn whole_floats_are_valid_ages() {
    let mut df = source(&[("Ann Lee", "25", "Female"), ("Bo Chen", "61", "Male")]);
    let ages = Series::new(SourceColumn::Age.header().into(), [25.0_f64, 61.0]);
    df.with_column(ages).unwrap();

    assert!(validate_source(&df, &name_age()).is_valid());
}

#[test]
fn repeat_admissions_pass_identity_check() {
    let df = source(&[
        ("John Smith", "40", "Male"),
        ("John Smith", "40", "Male"),
        ("Ann Lee", "25", "Female"),
    ]);

    assert!(validate_source(&df, &by_identity()).is_valid());
    assert!(!validate_source(&df, &name_age()).is_valid());
}

#[test]
fn identity_collisions_are_reported() {
    let df = source(&[
        ("Jordan Hale", "33", "Female"),
        ("Jordan Hale", "33", "Male"),
    ]);

    let report = validate_source(&df, &by_identity());

    assert_eq!(
        report.issues,
        vec![Issue::IdentityCollisions {
            count: 1,
            samples: vec!["patient_jordan_hale_1992".to_string()],
        }]
    );
}

#[test]
fn missing_source_key_column_is_reported() {
    let df = source(&[("Ann Lee", "25", "Female")]);
    let options = PreValidationOptions::new(DuplicateKey::Identity(IdentityStrategy::source_key(
        "Patient Number",
    )));

    let report = validate_source(&df, &options);

    assert_eq!(
        report.issues,
        vec![Issue::MissingColumn {
            column: "Patient Number".to_string()
        }]
    );
}

#[test]
fn post_validation_detects_count_mismatch() {
    let client = connect("memory://").unwrap();
    let patients = client.collection("hospital", "patients").unwrap();
    for id in ["p1", "p2"] {
        patients
            .insert_one(
                to_document(&json!({
                    "_id": id, "name": "A", "age": 1, "gender": "Male", "admissions": []
                }))
                .unwrap(),
            )
            .unwrap();
    }

    let report = validate_persisted(&patients, 3).unwrap();

    assert_eq!(
        report.issues,
        vec![Issue::CountMismatch {
            expected: 3,
            actual: 2
        }]
    );
    assert!(validate_persisted(&patients, 2).unwrap().is_valid());
}

#[test]
fn post_validation_checks_sample_shape() {
    let client = connect("memory://").unwrap();
    let patients = client.collection("hospital", "patients").unwrap();
    patients
        .insert_one(to_document(&json!({"_id": "p1", "name": "A", "age": 1})).unwrap())
        .unwrap();

    let report = validate_persisted(&patients, 1).unwrap();

    assert_eq!(
        report.issues,
        vec![
            Issue::MissingField {
                field: "gender".to_string()
            },
            Issue::MissingField {
                field: "admissions".to_string()
            },
        ]
    );
}

#[test]
fn post_validation_needs_a_sample() {
    let client = connect("memory://").unwrap();
    let patients = client.collection("hospital", "patients").unwrap();
    patients.delete_many(&Filter::all()).unwrap();

    let report = validate_persisted(&patients, 0).unwrap();

    assert_eq!(report.issues, vec![Issue::NoSampleDocument]);
}
