//! Secondary index declarations.

use serde::{Deserialize, Serialize};

/// An ascending single-field index.
///
/// Indexes are recorded with the collection; they do not change query results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub name: String,
    pub field: String,
}

impl IndexSpec {
    /// Index on `field`, named `<field>_1`.
    pub fn ascending(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            name: format!("{field}_1"),
            field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascending_name_follows_field() {
        let spec = IndexSpec::ascending("admissions.medical_condition");
        assert_eq!(spec.name, "admissions.medical_condition_1");
        assert_eq!(spec.field, "admissions.medical_condition");
    }
}
