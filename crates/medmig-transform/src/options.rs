//! Transformation options.

use crate::identity::IdentityStrategy;

/// What to do when a row shares an identity with an earlier row but carries
/// different age, gender or blood type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Keep the first row's demographics and record the conflict.
    #[default]
    FirstWins,
    /// Abort the transformation on the first conflict.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    pub identity: IdentityStrategy,
    pub conflicts: ConflictPolicy,
}

impl TransformOptions {
    pub fn new(identity: IdentityStrategy) -> Self {
        Self {
            identity,
            conflicts: ConflictPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_conflict_policy(mut self, conflicts: ConflictPolicy) -> Self {
        self.conflicts = conflicts;
        self
    }
}
