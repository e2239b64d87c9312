//! Conversion keys.

use std::fmt;

use typeconv_core::TypeHash;

/// Identifies a conversion rule: source descriptor, target descriptor, and an
/// optional formatting qualifier.
///
/// Keys with and without a qualifier are distinct, so a formatting rule never
/// shadows the generic rule for the same pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConvertiblePair {
    pub source: TypeHash,
    pub target: TypeHash,
    pub qualifier: Option<TypeHash>,
}

impl ConvertiblePair {
    /// An unqualified key.
    pub const fn new(source: TypeHash, target: TypeHash) -> Self {
        Self {
            source,
            target,
            qualifier: None,
        }
    }

    /// A key qualified by a formatting annotation kind.
    pub const fn formatted(source: TypeHash, target: TypeHash, qualifier: TypeHash) -> Self {
        Self {
            source,
            target,
            qualifier: Some(qualifier),
        }
    }

    /// Build a key with an optional qualifier.
    pub const fn with_qualifier(source: TypeHash, target: TypeHash, qualifier: Option<TypeHash>) -> Self {
        Self {
            source,
            target,
            qualifier,
        }
    }
}

impl fmt::Display for ConvertiblePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)?;
        if let Some(qualifier) = self.qualifier {
            write!(f, " @{}", qualifier)?;
        }
        Ok(())
    }
}
