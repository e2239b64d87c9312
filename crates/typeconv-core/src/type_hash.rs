//! Deterministic hash-based type identity.
//!
//! This module provides [`TypeHash`], a 64-bit hash that names a runtime type
//! descriptor. Hashes are computed from the descriptor's name, so:
//!
//! - Descriptors can be referenced before they are registered
//! - Registration order does not matter
//! - Two descriptors are equal exactly when their names are equal
//! - Every lookup is a single map probe keyed by the hash
//!
//! # Hash Computation
//!
//! Uses XXHash64 with a domain mixing constant. Array descriptors are derived
//! from their component hash, so `int32[]` never needs to be spelled out.
//!
//! # Examples
//!
//! ```
//! use typeconv_core::TypeHash;
//!
//! let int_hash = TypeHash::from_name("int32");
//! assert_eq!(int_hash, TypeHash::from_name("int32"));
//!
//! let ints = TypeHash::array_of(int_hash);
//! assert_ne!(ints, int_hash);
//! assert_eq!(ints, TypeHash::array_of(TypeHash::from_name("int32")));
//! ```

use std::fmt;
use xxhash_rust::const_xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Separator constant used when folding component hashes
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for named type hashes
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for array type hashes
    pub const ARRAY: u64 = 0x9e3779b97f4a7c15;
}

/// A deterministic 64-bit hash identifying a runtime type descriptor.
///
/// Computed from the descriptor's name. The same name always produces the
/// same hash, so descriptors compare by identity without a registry lookup.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from a type name.
    ///
    /// Usable in constant position, which is how the built-in descriptors in
    /// [`types`] and [`qualifiers`] are defined.
    ///
    /// # Examples
    ///
    /// ```
    /// use typeconv_core::TypeHash;
    ///
    /// let hash1 = TypeHash::from_name("string");
    /// let hash2 = TypeHash::from_name("string");
    /// assert_eq!(hash1, hash2);
    /// ```
    #[inline]
    pub const fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Create the hash of the array descriptor whose elements are `component`.
    #[inline]
    pub const fn array_of(component: TypeHash) -> Self {
        TypeHash(
            hash_constants::ARRAY
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(component.0 ^ hash_constants::TYPE),
        )
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Well-known descriptors registered by [`TypeTable::with_builtins`](crate::TypeTable::with_builtins).
pub mod types {
    use super::TypeHash;

    /// Universal terminal of every hierarchy.
    pub const ANY: TypeHash = TypeHash::from_name("any");
    /// Terminal shared by all array descriptors.
    pub const ANY_ARRAY: TypeHash = TypeHash::array_of(ANY);

    /// Text capability interface.
    pub const TEXT: TypeHash = TypeHash::from_name("text");
    /// Owned text, implements [`TEXT`].
    pub const STRING: TypeHash = TypeHash::from_name("string");
    pub const CHAR: TypeHash = TypeHash::from_name("char");
    pub const BOOL: TypeHash = TypeHash::from_name("bool");

    /// Abstract base of every numeric descriptor.
    pub const NUMBER: TypeHash = TypeHash::from_name("number");
    pub const INT8: TypeHash = TypeHash::from_name("int8");
    pub const INT16: TypeHash = TypeHash::from_name("int16");
    pub const INT32: TypeHash = TypeHash::from_name("int32");
    pub const INT64: TypeHash = TypeHash::from_name("int64");
    pub const FLOAT32: TypeHash = TypeHash::from_name("float32");
    pub const FLOAT64: TypeHash = TypeHash::from_name("float64");
    pub const BIGINT: TypeHash = TypeHash::from_name("bigint");
    pub const DECIMAL: TypeHash = TypeHash::from_name("decimal");

    /// Raw byte sequence.
    pub const BYTES: TypeHash = TypeHash::from_name("bytes");

    pub const ITERABLE: TypeHash = TypeHash::from_name("iterable");
    pub const COLLECTION: TypeHash = TypeHash::from_name("collection");
    pub const LIST: TypeHash = TypeHash::from_name("list");
    pub const SET: TypeHash = TypeHash::from_name("set");
    pub const MAP: TypeHash = TypeHash::from_name("map");
    /// Insertion-ordered map, the concrete type of map values.
    pub const LINKED_MAP: TypeHash = TypeHash::from_name("linked_map");
    /// String-to-string property map.
    pub const PROPERTIES: TypeHash = TypeHash::from_name("properties");

    pub const OPTIONAL: TypeHash = TypeHash::from_name("optional");
    pub const OPTIONAL_INT: TypeHash = TypeHash::from_name("optional_int");
    pub const OPTIONAL_LONG: TypeHash = TypeHash::from_name("optional_long");

    /// Abstract base of every enumeration descriptor.
    pub const ENUM: TypeHash = TypeHash::from_name("enum");

    pub const URL: TypeHash = TypeHash::from_name("url");
    pub const URI: TypeHash = TypeHash::from_name("uri");
    pub const LOCALE: TypeHash = TypeHash::from_name("locale");
    pub const CHARSET: TypeHash = TypeHash::from_name("charset");
    pub const CURRENCY: TypeHash = TypeHash::from_name("currency");
    pub const TIME_ZONE: TypeHash = TypeHash::from_name("time_zone");
    pub const UUID: TypeHash = TypeHash::from_name("uuid");
    pub const PATH: TypeHash = TypeHash::from_name("path");

    pub const ZONED_DATE_TIME: TypeHash = TypeHash::from_name("zoned_date_time");
    pub const LOCAL_DATE_TIME: TypeHash = TypeHash::from_name("local_date_time");
    pub const LOCAL_DATE: TypeHash = TypeHash::from_name("local_date");
    /// UTC instant.
    pub const DATE: TypeHash = TypeHash::from_name("date");

    /// Readable byte source.
    pub const INPUT_STREAM: TypeHash = TypeHash::from_name("input_stream");
}

/// Annotation kinds that select a formatting rule.
pub mod qualifiers {
    use super::TypeHash;

    /// Carries a date/time pattern in its value.
    pub const FORMAT: TypeHash = TypeHash::from_name("format");

    /// Marks text such as `10MB` as a byte count.
    pub const READABLE_BYTES: TypeHash = TypeHash::from_name("readable_bytes");
}
