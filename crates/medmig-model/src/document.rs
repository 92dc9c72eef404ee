//! Patient-centric target documents.

use serde::{Deserialize, Serialize};

use crate::scalar::ScalarValue;

/// Top-level and embedded field names of the persisted document.
pub mod fields {
    pub const ID: &str = "_id";
    pub const NAME: &str = "name";
    pub const AGE: &str = "age";
    pub const GENDER: &str = "gender";
    pub const BLOOD_TYPE: &str = "blood_type";
    pub const ADMISSIONS: &str = "admissions";
}

/// Fields indexed after a load.
pub mod index_fields {
    pub const NAME: &str = "name";
    pub const ADMISSION_MEDICAL_CONDITION: &str = "admissions.medical_condition";
}

/// Fields every persisted patient document must carry.
pub const REQUIRED_DOCUMENT_FIELDS: [&str; 5] = [
    fields::ID,
    fields::NAME,
    fields::AGE,
    fields::GENDER,
    fields::ADMISSIONS,
];

/// All admissions attributed to one synthesized patient identity.
///
/// Demographics come from the first source row seen for the identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDocument {
    #[serde(rename = "_id")]
    pub identity: String,
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub blood_type: String,
    pub admissions: Vec<AdmissionRecord>,
}

impl PatientDocument {
    pub fn new(
        identity: impl Into<String>,
        name: impl Into<String>,
        age: i64,
        gender: impl Into<String>,
        blood_type: impl Into<String>,
    ) -> Self {
        Self {
            identity: identity.into(),
            name: name.into(),
            age,
            gender: gender.into(),
            blood_type: blood_type.into(),
            admissions: Vec::new(),
        }
    }

    pub fn push_admission(&mut self, admission: AdmissionRecord) {
        self.admissions.push(admission);
    }

    pub fn admission_count(&self) -> usize {
        self.admissions.len()
    }
}

/// One hospital stay, embedded in its patient's document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionRecord {
    pub medical_condition: String,
    pub date_of_admission: String,
    pub discharge_date: String,
    pub doctor: String,
    pub hospital: String,
    pub room_number: ScalarValue,
    pub admission_type: String,
    pub medication: String,
    pub test_results: String,
    pub billing_amount: f64,
    pub insurance_provider: String,
}

/// Total embedded admissions across a document set.
pub fn total_admissions(documents: &[PatientDocument]) -> usize {
    documents.iter().map(PatientDocument::admission_count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admission(condition: &str) -> AdmissionRecord {
        AdmissionRecord {
            medical_condition: condition.to_string(),
            date_of_admission: "2024-01-31".to_string(),
            discharge_date: "2024-02-02".to_string(),
            doctor: "Matthew Smith".to_string(),
            hospital: "Sons and Miller".to_string(),
            room_number: ScalarValue::Integer(328),
            admission_type: "Urgent".to_string(),
            medication: "Paracetamol".to_string(),
            test_results: "Normal".to_string(),
            billing_amount: 18856.28,
            insurance_provider: "Blue Cross".to_string(),
        }
    }

    #[test]
    fn counts_admissions() {
        let mut first = PatientDocument::new("patient_a_1990", "A", 35, "Male", "O+");
        first.push_admission(admission("Cancer"));
        first.push_admission(admission("Asthma"));
        let mut second = PatientDocument::new("patient_b_1980", "B", 45, "Female", "A-");
        second.push_admission(admission("Obesity"));
        assert_eq!(first.admission_count(), 2);
        assert_eq!(total_admissions(&[first, second]), 3);
    }

    #[test]
    fn identity_serializes_as_id() {
        let doc = PatientDocument::new("patient_a_1990", "A", 35, "Male", "O+");
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["_id"], "patient_a_1990");
        assert!(json.get("identity").is_none());
    }
}
