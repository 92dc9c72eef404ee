//! Batched validation results.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::issue::{Issue, Stage};

/// Every issue one validator found, in check order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub stage: Stage,
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            issues: Vec::new(),
        }
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = Issue>) {
        self.issues.extend(issues);
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn first(&self) -> Option<&Issue> {
        self.issues.first()
    }

    /// `Ok` when no issue was found, otherwise the first issue as an error.
    pub fn into_result(self) -> Result<()> {
        let total = self.issues.len();
        match self.issues.into_iter().next() {
            None => Ok(()),
            Some(issue) => Err(ValidationError::Failed {
                stage: self.stage,
                issue,
                total,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_ok() {
        assert!(ValidationReport::new(Stage::Post).into_result().is_ok());
    }

    #[test]
    fn failing_report_keeps_first_issue() {
        let mut report = ValidationReport::new(Stage::Pre);
        report.push(Issue::MissingColumn {
            column: "Doctor".to_string(),
        });
        report.push(Issue::MissingValues { count: 4 });
        assert!(!report.is_valid());

        match report.into_result() {
            Err(ValidationError::Failed { issue, total, .. }) => {
                assert_eq!(
                    issue,
                    Issue::MissingColumn {
                        column: "Doctor".to_string()
                    }
                );
                assert_eq!(total, 2);
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
