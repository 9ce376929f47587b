//! Order-independent fingerprints of shortening requests.
//!
//! Two requests naming the same calendar URL and the same set of subjects,
//! in any order, produce the same [`CanonicalKey`]. The store keeps a unique
//! index on [`CanonicalKey::digest`], which is what makes get-or-create
//! idempotent.

use sha2::{Digest, Sha256};
use std::fmt;

const FIELD_SEPARATOR: char = '\u{1f}';

/// Canonical form of a shortening request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Key for a simple link: calendar URL plus its subject selection.
    pub fn simple(url: &str, subjects: &[String]) -> Self {
        Self(format!(
            "simple{sep}{url}{sep}{subjects}",
            sep = FIELD_SEPARATOR,
            subjects = join_sorted(subjects)
        ))
    }

    /// Key for a composite link.
    ///
    /// Without a base calendar the base URL and base subjects are ignored.
    pub fn composite(
        has_base_calendar: bool,
        base_url: &str,
        base_subjects: &[String],
        extra_subjects: &[String],
    ) -> Self {
        let (base_url, base_subjects) = if has_base_calendar {
            (base_url, join_sorted(base_subjects))
        } else {
            ("", String::new())
        };

        Self(format!(
            "composite{sep}{has_base_calendar}{sep}{base_url}{sep}{base_subjects}{sep}{extra}",
            sep = FIELD_SEPARATOR,
            extra = join_sorted(extra_subjects)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex-encoded SHA-256 of the canonical form, stored under a unique index.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns a sorted copy of `subjects`.
pub fn sorted(subjects: &[String]) -> Vec<String> {
    let mut sorted = subjects.to_vec();
    sorted.sort();
    sorted
}

fn join_sorted(subjects: &[String]) -> String {
    sorted(subjects).join(&FIELD_SEPARATOR.to_string())
}
