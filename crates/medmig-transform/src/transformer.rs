//! Grouping of admission rows into patient documents.

use std::collections::HashMap;

use polars::prelude::DataFrame;
use tracing::{debug, info, info_span, warn};

use medmig_model::{AdmissionRecord, PatientDocument, SourceColumn, fields};

use crate::error::{Result, TransformError};
use crate::frame::AdmissionFrame;
use crate::options::{ConflictPolicy, TransformOptions};

/// A later row whose demographics disagree with the document it was merged into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemographicConflict {
    /// One-based source row number.
    pub row: usize,
    pub identity: String,
    pub field: &'static str,
    pub kept: String,
    pub ignored: String,
}

/// Documents produced by one pass, plus the conflicts absorbed along the way.
#[derive(Debug, Clone, Default)]
pub struct TransformOutcome {
    pub documents: Vec<PatientDocument>,
    pub conflicts: Vec<DemographicConflict>,
    pub rows: usize,
}

impl TransformOutcome {
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn admission_count(&self) -> usize {
        medmig_model::total_admissions(&self.documents)
    }
}

/// Group every row of `df` into patient documents.
///
/// Documents appear in first-occurrence order of their identity and admissions
/// in source row order. Any coercion failure aborts the whole pass.
pub fn transform(df: &DataFrame, options: &TransformOptions) -> Result<TransformOutcome> {
    let span = info_span!("transform", rows = df.height());
    let _guard = span.enter();

    let frame = AdmissionFrame::new(df);
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut documents: Vec<PatientDocument> = Vec::new();
    let mut conflicts = Vec::new();

    for idx in 0..frame.height() {
        let identity = frame.identity(idx, &options.identity)?;
        let age = frame.age(idx)?;
        let gender = frame.text(SourceColumn::Gender, idx)?;
        let blood_type = frame.text(SourceColumn::BloodType, idx)?;

        let slot = match slots.get(&identity) {
            Some(&slot) => {
                let existing = &documents[slot];
                for conflict in demographic_conflicts(existing, idx + 1, age, &gender, &blood_type)
                {
                    if options.conflicts == ConflictPolicy::Reject {
                        return Err(TransformError::DemographicConflict {
                            row: conflict.row,
                            identity: conflict.identity,
                            field: conflict.field,
                        });
                    }
                    warn!(
                        row = conflict.row,
                        field = conflict.field,
                        "demographics differ from the patient's first row; keeping the first"
                    );
                    conflicts.push(conflict);
                }
                slot
            }
            None => {
                let name = frame.text(SourceColumn::Name, idx)?;
                documents.push(PatientDocument::new(
                    identity.clone(),
                    name,
                    age,
                    gender,
                    blood_type,
                ));
                slots.insert(identity, documents.len() - 1);
                documents.len() - 1
            }
        };

        let admission = admission_record(&frame, idx)?;
        documents[slot].push_admission(admission);
    }

    let outcome = TransformOutcome {
        documents,
        conflicts,
        rows: frame.height(),
    };
    debug!(
        identity = %options.identity.label(),
        "grouped rows by synthesized identity"
    );
    info!(
        rows = outcome.rows,
        documents = outcome.document_count(),
        admissions = outcome.admission_count(),
        conflicts = outcome.conflicts.len(),
        "transform complete"
    );
    Ok(outcome)
}

fn admission_record(frame: &AdmissionFrame<'_>, idx: usize) -> Result<AdmissionRecord> {
    Ok(AdmissionRecord {
        medical_condition: frame.text(SourceColumn::MedicalCondition, idx)?,
        date_of_admission: frame.text(SourceColumn::DateOfAdmission, idx)?,
        discharge_date: frame.text(SourceColumn::DischargeDate, idx)?,
        doctor: frame.text(SourceColumn::Doctor, idx)?,
        hospital: frame.text(SourceColumn::Hospital, idx)?,
        room_number: frame.scalar(SourceColumn::RoomNumber, idx)?,
        admission_type: frame.text(SourceColumn::AdmissionType, idx)?,
        medication: frame.text(SourceColumn::Medication, idx)?,
        test_results: frame.text(SourceColumn::TestResults, idx)?,
        billing_amount: frame.billing_amount(idx)?,
        insurance_provider: frame.text(SourceColumn::InsuranceProvider, idx)?,
    })
}

fn demographic_conflicts(
    existing: &PatientDocument,
    row: usize,
    age: i64,
    gender: &str,
    blood_type: &str,
) -> Vec<DemographicConflict> {
    let candidates = [
        (fields::AGE, existing.age.to_string(), age.to_string()),
        (fields::GENDER, existing.gender.clone(), gender.to_string()),
        (
            fields::BLOOD_TYPE,
            existing.blood_type.clone(),
            blood_type.to_string(),
        ),
    ];
    candidates
        .into_iter()
        .filter(|(_, kept, incoming)| kept != incoming)
        .map(|(field, kept, ignored)| DemographicConflict {
            row,
            identity: existing.identity.clone(),
            field,
            kept,
            ignored,
        })
        .collect()
}
