//! Duplicate patient detection.

use std::collections::{HashMap, HashSet};

use polars::prelude::{AnyValue, DataFrame};

use medmig_common::any_to_string;
use medmig_model::SourceColumn;
use medmig_transform::{AdmissionFrame, IdentityStrategy};

use super::{add_sample, has_column};
use crate::issue::Issue;

/// Rows repeating an earlier (Name, Age) pair.
///
/// Blank cells compare equal to each other. Skipped when either column is absent.
pub fn check_name_age(df: &DataFrame) -> Option<Issue> {
    let names = df.column(SourceColumn::Name.header()).ok()?;
    let ages = df.column(SourceColumn::Age.header()).ok()?;
    let mut seen = HashSet::with_capacity(df.height());
    let mut count: u64 = 0;
    let mut samples = Vec::new();
    for idx in 0..df.height() {
        let name = any_to_string(names.get(idx).unwrap_or(AnyValue::Null));
        let age = any_to_string(ages.get(idx).unwrap_or(AnyValue::Null));
        let sample = format!("{name} ({age})");
        if !seen.insert((name, age)) {
            count += 1;
            add_sample(&mut samples, sample);
        }
    }
    (count > 0).then_some(Issue::DuplicatePatients { count, samples })
}

/// Rows whose synthesized identity matches an earlier row with a different
/// gender or blood type.
///
/// Rows whose identity cannot be derived are skipped. A missing source-key
/// column is reported as a missing column.
pub fn check_identity(df: &DataFrame, strategy: &IdentityStrategy) -> Vec<Issue> {
    if let IdentityStrategy::SourceKey { column } = strategy
        && df.column(column).is_err()
    {
        return vec![Issue::MissingColumn {
            column: column.clone(),
        }];
    }
    let needed = [
        SourceColumn::Name,
        SourceColumn::Gender,
        SourceColumn::BloodType,
    ];
    if needed.iter().any(|column| !has_column(df, *column)) {
        return Vec::new();
    }

    let frame = AdmissionFrame::new(df);
    let mut first_seen: HashMap<String, (String, String)> = HashMap::new();
    let mut count: u64 = 0;
    let mut samples = Vec::new();
    for idx in 0..frame.height() {
        let Ok(identity) = frame.identity(idx, strategy) else {
            continue;
        };
        let (Ok(gender), Ok(blood_type)) = (
            frame.text(SourceColumn::Gender, idx),
            frame.text(SourceColumn::BloodType, idx),
        ) else {
            continue;
        };
        match first_seen.get(&identity) {
            Some((first_gender, first_blood)) => {
                if *first_gender != gender || *first_blood != blood_type {
                    count += 1;
                    add_sample(&mut samples, identity);
                }
            }
            None => {
                first_seen.insert(identity, (gender, blood_type));
            }
        }
    }
    if count > 0 {
        vec![Issue::IdentityCollisions { count, samples }]
    } else {
        Vec::new()
    }
}
