//! Canonical domain key.

use serde::{Serialize, Serializer};
use std::fmt;

/// A normalized, validated hostname used as the snapshot lookup key.
///
/// Only produced by [`crate::utils::domain_normalizer::normalize_domain`], so
/// holding one means the value is lowercase, has no `www.` prefix, and carries
/// no scheme, port, or path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalDomain(String);

impl CanonicalDomain {
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for CanonicalDomain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
