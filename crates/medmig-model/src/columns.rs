//! Columns of the admissions export.
//!
//! Header names are matched exactly; the export is produced by a single system
//! and its headers are part of the interface.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// One column of the per-admission source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceColumn {
    Name,
    Age,
    Gender,
    BloodType,
    MedicalCondition,
    DateOfAdmission,
    DischargeDate,
    Doctor,
    Hospital,
    RoomNumber,
    AdmissionType,
    Medication,
    TestResults,
    BillingAmount,
    InsuranceProvider,
}

/// Columns that must be present and fully populated before a migration runs.
///
/// Order matters: the pre-migration check reports missing columns in this order.
pub const REQUIRED_COLUMNS: [SourceColumn; 8] = [
    SourceColumn::Name,
    SourceColumn::Age,
    SourceColumn::Gender,
    SourceColumn::BloodType,
    SourceColumn::MedicalCondition,
    SourceColumn::DateOfAdmission,
    SourceColumn::Doctor,
    SourceColumn::Hospital,
];

/// Columns copied into each embedded admission record, in document order.
pub const ADMISSION_COLUMNS: [SourceColumn; 11] = [
    SourceColumn::MedicalCondition,
    SourceColumn::DateOfAdmission,
    SourceColumn::DischargeDate,
    SourceColumn::Doctor,
    SourceColumn::Hospital,
    SourceColumn::RoomNumber,
    SourceColumn::AdmissionType,
    SourceColumn::Medication,
    SourceColumn::TestResults,
    SourceColumn::BillingAmount,
    SourceColumn::InsuranceProvider,
];

impl SourceColumn {
    /// Every column in export order.
    pub const ALL: [SourceColumn; 15] = [
        SourceColumn::Name,
        SourceColumn::Age,
        SourceColumn::Gender,
        SourceColumn::BloodType,
        SourceColumn::MedicalCondition,
        SourceColumn::DateOfAdmission,
        SourceColumn::DischargeDate,
        SourceColumn::Doctor,
        SourceColumn::Hospital,
        SourceColumn::RoomNumber,
        SourceColumn::AdmissionType,
        SourceColumn::Medication,
        SourceColumn::TestResults,
        SourceColumn::BillingAmount,
        SourceColumn::InsuranceProvider,
    ];

    /// Header text as it appears in the export.
    pub fn header(&self) -> &'static str {
        match self {
            SourceColumn::Name => "Name",
            SourceColumn::Age => "Age",
            SourceColumn::Gender => "Gender",
            SourceColumn::BloodType => "Blood Type",
            SourceColumn::MedicalCondition => "Medical Condition",
            SourceColumn::DateOfAdmission => "Date of Admission",
            SourceColumn::DischargeDate => "Discharge Date",
            SourceColumn::Doctor => "Doctor",
            SourceColumn::Hospital => "Hospital",
            SourceColumn::RoomNumber => "Room Number",
            SourceColumn::AdmissionType => "Admission Type",
            SourceColumn::Medication => "Medication",
            SourceColumn::TestResults => "Test Results",
            SourceColumn::BillingAmount => "Billing Amount",
            SourceColumn::InsuranceProvider => "Insurance Provider",
        }
    }

    /// Field name used for this column in the target document.
    pub fn field_name(&self) -> &'static str {
        match self {
            SourceColumn::Name => "name",
            SourceColumn::Age => "age",
            SourceColumn::Gender => "gender",
            SourceColumn::BloodType => "blood_type",
            SourceColumn::MedicalCondition => "medical_condition",
            SourceColumn::DateOfAdmission => "date_of_admission",
            SourceColumn::DischargeDate => "discharge_date",
            SourceColumn::Doctor => "doctor",
            SourceColumn::Hospital => "hospital",
            SourceColumn::RoomNumber => "room_number",
            SourceColumn::AdmissionType => "admission_type",
            SourceColumn::Medication => "medication",
            SourceColumn::TestResults => "test_results",
            SourceColumn::BillingAmount => "billing_amount",
            SourceColumn::InsuranceProvider => "insurance_provider",
        }
    }

    /// True for columns in [`REQUIRED_COLUMNS`].
    pub fn is_required(&self) -> bool {
        REQUIRED_COLUMNS.contains(self)
    }
}

impl fmt::Display for SourceColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for SourceColumn {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceColumn::ALL
            .iter()
            .find(|column| column.header() == s)
            .copied()
            .ok_or_else(|| ModelError::UnknownColumn(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_parse_back() {
        for column in SourceColumn::ALL {
            assert_eq!(column.header().parse::<SourceColumn>().unwrap(), column);
        }
    }

    #[test]
    fn header_match_is_exact() {
        assert!("blood type".parse::<SourceColumn>().is_err());
        assert!("Blood Type ".parse::<SourceColumn>().is_err());
    }

    #[test]
    fn required_set_excludes_billing() {
        assert!(SourceColumn::Doctor.is_required());
        assert!(!SourceColumn::BillingAmount.is_required());
        assert!(!SourceColumn::DischargeDate.is_required());
    }
}
