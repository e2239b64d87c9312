//! Bridging between Rust types and [`Value`].
//!
//! - [`Described`]: the descriptor a Rust type converts to
//! - [`FromValue`]: extract a Rust value from a [`Value`] of exactly that descriptor
//! - `From<T> for Value`: wrap a Rust value
//!
//! Together these let callers write `service.convert_into::<i32>(&value, &ctx)`
//! instead of matching on the result themselves.
//!
//! ## Example
//!
//! ```
//! use typeconv_core::{Described, FromValue, Value, types};
//!
//! let value = Value::from(42i32);
//! assert_eq!(i32::type_hash(), types::INT32);
//! assert_eq!(i32::from_value(value), Some(42));
//! ```

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use url::Url;
use uuid::Uuid;

use crate::types::{Charset, Currency, Locale, TimeZone, Uri};
use crate::{TypeHash, Value, types};

/// A Rust type with a built-in descriptor.
pub trait Described: Sized + 'static {
    /// Descriptor values of this type carry.
    fn type_hash() -> TypeHash;

    /// Registered name of the descriptor.
    fn type_name() -> &'static str;
}

/// Extract a Rust value from a [`Value`].
///
/// Only the variant matching [`Described::type_hash`] is accepted; anything
/// else must go through the conversion engine first.
pub trait FromValue: Described {
    fn from_value(value: Value) -> Option<Self>;
}

// ============================================================================
// Implementations
// ============================================================================

macro_rules! impl_value_bridge {
    ($($ty:ty => $variant:ident, $hash:expr, $name:literal;)*) => {
        $(
            impl Described for $ty {
                fn type_hash() -> TypeHash {
                    $hash
                }

                fn type_name() -> &'static str {
                    $name
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_value_bridge! {
    bool => Bool, types::BOOL, "bool";
    char => Char, types::CHAR, "char";
    i8 => Int8, types::INT8, "int8";
    i16 => Int16, types::INT16, "int16";
    i32 => Int32, types::INT32, "int32";
    i64 => Int64, types::INT64, "int64";
    f32 => Float32, types::FLOAT32, "float32";
    f64 => Float64, types::FLOAT64, "float64";
    BigInt => BigInt, types::BIGINT, "bigint";
    Decimal => Decimal, types::DECIMAL, "decimal";
    String => Text, types::STRING, "string";
    Vec<u8> => Bytes, types::BYTES, "bytes";
    Url => Url, types::URL, "url";
    Uri => Uri, types::URI, "uri";
    Locale => Locale, types::LOCALE, "locale";
    Charset => Charset, types::CHARSET, "charset";
    Currency => Currency, types::CURRENCY, "currency";
    TimeZone => TimeZone, types::TIME_ZONE, "time_zone";
    Uuid => Uuid, types::UUID, "uuid";
    PathBuf => Path, types::PATH, "path";
    DateTime<FixedOffset> => ZonedDateTime, types::ZONED_DATE_TIME, "zoned_date_time";
    NaiveDateTime => LocalDateTime, types::LOCAL_DATE_TIME, "local_date_time";
    NaiveDate => LocalDate, types::LOCAL_DATE, "local_date";
    DateTime<Utc> => Date, types::DATE, "date";
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn described_matches_value_type_hash() {
        assert_eq!(Value::from(true).type_hash(), bool::type_hash());
        assert_eq!(Value::from(1i64).type_hash(), i64::type_hash());
        assert_eq!(Value::from(String::from("x")).type_hash(), String::type_hash());
        assert_eq!(Value::from(vec![1u8]).type_hash(), <Vec<u8>>::type_hash());
    }

    #[test]
    fn from_value_requires_exact_variant() {
        assert_eq!(i32::from_value(Value::Int32(7)), Some(7));
        assert_eq!(i32::from_value(Value::Int64(7)), None);
        assert_eq!(String::from_value(Value::from("a")), Some("a".to_string()));
        assert_eq!(bool::from_value(Value::from("true")), None);
    }

    #[test]
    fn type_names() {
        assert_eq!(f64::type_name(), "float64");
        assert_eq!(NaiveDate::type_name(), "local_date");
    }

    #[test]
    fn vec_of_values_is_list() {
        assert_eq!(Value::from(vec![Value::Int32(1)]), Value::list([Value::Int32(1)]));
    }
}
