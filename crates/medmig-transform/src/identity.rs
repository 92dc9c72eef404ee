//! Synthesized patient identities.
//!
//! The export carries no patient identifier, so one is derived from the name
//! and a second attribute. Two strategies exist:
//!
//! - [`IdentityStrategy::AgeAnchored`] derives a birth year as
//!   `reference_year - age`. Grouping therefore depends on the reference year:
//!   the same export run in a different calendar year can group differently.
//!   The reference year is always an explicit input, never read from the clock here.
//! - [`IdentityStrategy::SourceKey`] fingerprints the name together with an
//!   immutable source column (a birth date or external patient number), so the
//!   identity is reproducible regardless of when the migration runs.
//!
//! Distinct people sharing a normalized name and the same second attribute
//! collapse into one identity.

use sha2::{Digest, Sha256};

const IDENTITY_PREFIX: &str = "patient";
const UNKNOWN_YEAR: &str = "unknown";
const FINGERPRINT_LEN: usize = 12;

/// How the grouping key is derived for each row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityStrategy {
    /// Name plus `reference_year - age`.
    AgeAnchored { reference_year: i32 },
    /// Name plus a hash of the value in `column`.
    SourceKey { column: String },
}

impl IdentityStrategy {
    pub fn age_anchored(reference_year: i32) -> Self {
        IdentityStrategy::AgeAnchored { reference_year }
    }

    pub fn source_key(column: impl Into<String>) -> Self {
        IdentityStrategy::SourceKey {
            column: column.into(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            IdentityStrategy::AgeAnchored { reference_year } => {
                format!("name + birth year (reference {reference_year})")
            }
            IdentityStrategy::SourceKey { column } => format!("name + {column}"),
        }
    }
}

/// Lowercase the name and replace spaces with underscores.
pub fn normalize_name(name: &str) -> String {
    name.replace(' ', "_").to_lowercase()
}

/// Birth year implied by an age at the reference year.
pub fn birth_year(reference_year: i32, age: i64) -> i64 {
    i64::from(reference_year) - age
}

/// Identity from a name and an optional year; a missing or zero year becomes `unknown`.
///
/// ```
/// use medmig_transform::synthesize_identity;
///
/// assert_eq!(synthesize_identity("John Smith", Some(1985)), "patient_john_smith_1985");
/// assert_eq!(synthesize_identity("John Smith", None), "patient_john_smith_unknown");
/// ```
pub fn synthesize_identity(name: &str, year: Option<i64>) -> String {
    let normalized = normalize_name(name);
    match year {
        Some(year) if year != 0 => format!("{IDENTITY_PREFIX}_{normalized}_{year}"),
        _ => format!("{IDENTITY_PREFIX}_{normalized}_{UNKNOWN_YEAR}"),
    }
}

/// Identity from a name and a stable source key.
///
/// A blank key falls back to the `unknown` suffix.
pub fn synthesize_keyed_identity(name: &str, key: &str) -> String {
    let normalized = normalize_name(name);
    let key = key.trim();
    if key.is_empty() {
        return format!("{IDENTITY_PREFIX}_{normalized}_{UNKNOWN_YEAR}");
    }
    format!(
        "{IDENTITY_PREFIX}_{normalized}_{}",
        fingerprint(&normalized, key)
    )
}

fn fingerprint(normalized_name: &str, key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized_name.as_bytes());
    hasher.update([0u8]);
    hasher.update(key.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..FINGERPRINT_LEN].to_string()
}
