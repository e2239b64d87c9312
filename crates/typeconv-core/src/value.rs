//! Runtime values flowing through the conversion engine.
//!
//! [`Value`] is the dynamically typed currency of the engine: every rule
//! receives one and produces one. Each variant maps to a built-in descriptor
//! through [`Value::type_hash`], which is how the engine finds the source side
//! of a conversion key.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use num_bigint::BigInt;
use ordered_float::OrderedFloat;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rustc_hash::FxHasher;
use url::Url;
use uuid::Uuid;

use crate::types::{Charset, Currency, Locale, TimeZone, Uri};
use crate::{TypeHash, types};

/// A user-defined value with its own descriptor.
///
/// Implement this for application types that take part in conversion, then
/// register the descriptor (and its supertypes) in the [`TypeTable`](crate::TypeTable).
pub trait ObjectValue: fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Descriptor of this value's runtime type.
    fn type_hash(&self) -> TypeHash;

    /// Access to the concrete type, for rules that downcast.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Structural equality with another object. Defaults to identity only.
    ///
    /// Objects hash by [`type_hash`](ObjectValue::type_hash), so only objects
    /// of the same descriptor may compare equal.
    fn eq_object(&self, other: &dyn ObjectValue) -> bool {
        let _ = other;
        false
    }
}

/// A dynamically typed value.
///
/// Floats compare and hash with `OrderedFloat` semantics, so `NaN == NaN`
/// and any value can key a [`ValueMap`]. Sets and maps compare regardless of
/// order.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent value. Never converted.
    Null,
    Bool(bool),
    Char(char),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    BigInt(BigInt),
    Decimal(Decimal),
    Text(String),
    Bytes(Vec<u8>),

    // === Leaf value types ===
    Url(Url),
    Uri(Uri),
    Locale(Locale),
    Charset(Charset),
    Currency(Currency),
    TimeZone(TimeZone),
    Uuid(Uuid),
    Path(PathBuf),

    // === Date and time ===
    ZonedDateTime(DateTime<FixedOffset>),
    LocalDateTime(NaiveDateTime),
    LocalDate(NaiveDate),
    /// A UTC instant.
    Date(DateTime<Utc>),

    /// A constant of a registered enumeration.
    Enum { ty: TypeHash, constant: String },

    // === Containers ===
    List(Vec<Value>),
    /// Distinct items in insertion order. Build with [`Value::set`].
    Set(IndexSet<Value>),
    Array { component: TypeHash, items: Vec<Value> },
    Map(ValueMap),
    Properties(ValueMap),

    Optional(Option<Box<Value>>),
    OptionalInt(Option<i32>),
    OptionalLong(Option<i64>),

    Stream(Stream),
    Object(Arc<dyn ObjectValue>),
}

impl Value {
    // ==========================================================================
    // Construction
    // ==========================================================================

    pub fn text(text: impl Into<String>) -> Self {
        Value::Text(text.into())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    /// A set; later duplicates are dropped.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Set(items.into_iter().collect())
    }

    pub fn array(component: TypeHash, items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array {
            component,
            items: items.into_iter().collect(),
        }
    }

    pub fn map(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Value::Map(entries.into_iter().collect())
    }

    pub fn enum_constant(ty: TypeHash, constant: impl Into<String>) -> Self {
        Value::Enum {
            ty,
            constant: constant.into(),
        }
    }

    pub fn optional(value: Option<Value>) -> Self {
        Value::Optional(value.map(Box::new))
    }

    pub fn stream(reader: impl Read + Send + 'static) -> Self {
        Value::Stream(Stream::new(reader))
    }

    pub fn object(object: impl ObjectValue) -> Self {
        Value::Object(Arc::new(object))
    }

    // ==========================================================================
    // Type Identity
    // ==========================================================================

    /// Descriptor of this value's runtime type.
    ///
    /// Array descriptors are computed from the component; the engine registers
    /// them in its table before resolving.
    pub fn type_hash(&self) -> TypeHash {
        match self {
            Value::Null => types::ANY,
            Value::Bool(_) => types::BOOL,
            Value::Char(_) => types::CHAR,
            Value::Int8(_) => types::INT8,
            Value::Int16(_) => types::INT16,
            Value::Int32(_) => types::INT32,
            Value::Int64(_) => types::INT64,
            Value::Float32(_) => types::FLOAT32,
            Value::Float64(_) => types::FLOAT64,
            Value::BigInt(_) => types::BIGINT,
            Value::Decimal(_) => types::DECIMAL,
            Value::Text(_) => types::STRING,
            Value::Bytes(_) => types::BYTES,
            Value::Url(_) => types::URL,
            Value::Uri(_) => types::URI,
            Value::Locale(_) => types::LOCALE,
            Value::Charset(_) => types::CHARSET,
            Value::Currency(_) => types::CURRENCY,
            Value::TimeZone(_) => types::TIME_ZONE,
            Value::Uuid(_) => types::UUID,
            Value::Path(_) => types::PATH,
            Value::ZonedDateTime(_) => types::ZONED_DATE_TIME,
            Value::LocalDateTime(_) => types::LOCAL_DATE_TIME,
            Value::LocalDate(_) => types::LOCAL_DATE,
            Value::Date(_) => types::DATE,
            Value::Enum { ty, .. } => *ty,
            Value::List(_) => types::LIST,
            Value::Set(_) => types::SET,
            Value::Array { component, .. } => TypeHash::array_of(*component),
            Value::Map(_) => types::LINKED_MAP,
            Value::Properties(_) => types::PROPERTIES,
            Value::Optional(_) => types::OPTIONAL,
            Value::OptionalInt(_) => types::OPTIONAL_INT,
            Value::OptionalLong(_) => types::OPTIONAL_LONG,
            Value::Stream(_) => types::INPUT_STREAM,
            Value::Object(object) => object.type_hash(),
        }
    }

    /// Short name of the variant, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Int8(_) => "int8",
            Value::Int16(_) => "int16",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::BigInt(_) => "bigint",
            Value::Decimal(_) => "decimal",
            Value::Text(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Url(_) => "url",
            Value::Uri(_) => "uri",
            Value::Locale(_) => "locale",
            Value::Charset(_) => "charset",
            Value::Currency(_) => "currency",
            Value::TimeZone(_) => "time_zone",
            Value::Uuid(_) => "uuid",
            Value::Path(_) => "path",
            Value::ZonedDateTime(_) => "zoned_date_time",
            Value::LocalDateTime(_) => "local_date_time",
            Value::LocalDate(_) => "local_date",
            Value::Date(_) => "date",
            Value::Enum { .. } => "enum",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Array { .. } => "array",
            Value::Map(_) => "map",
            Value::Properties(_) => "properties",
            Value::Optional(_) => "optional",
            Value::OptionalInt(_) => "optional_int",
            Value::OptionalLong(_) => "optional_long",
            Value::Stream(_) => "input_stream",
            Value::Object(_) => "object",
        }
    }

    // ==========================================================================
    // Access
    // ==========================================================================

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Text form of the value: borrowed for text, the `Display` form otherwise.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Value::Text(text) => Cow::Borrowed(text),
            other => Cow::Owned(other.to_string()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Any fixed-width integer widened to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int8(v) => Some(i64::from(*v)),
            Value::Int16(v) => Some(i64::from(*v)),
            Value::Int32(v) => Some(i64::from(*v)),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Any float widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float32(v) => Some(f64::from(*v)),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Items of a list, set or array, in order.
    pub fn elements(&self) -> Option<Elements<'_>> {
        match self {
            Value::List(items) | Value::Array { items, .. } => Some(Elements::Sequence(items.iter())),
            Value::Set(items) => Some(Elements::Set(items.iter())),
            _ => None,
        }
    }

    /// Entries of a map or properties value.
    pub fn entries(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) | Value::Properties(map) => Some(map),
            _ => None,
        }
    }

    /// Downcast an object value to its concrete type.
    pub fn downcast_ref<T: ObjectValue>(&self) -> Option<&T> {
        match self {
            Value::Object(object) => object.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Int8(a), Value::Int8(b)) => a == b,
            (Value::Int16(a), Value::Int16(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Float32(a), Value::Float32(b)) => OrderedFloat(*a) == OrderedFloat(*b),
            (Value::Float64(a), Value::Float64(b)) => OrderedFloat(*a) == OrderedFloat(*b),
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Url(a), Value::Url(b)) => a == b,
            (Value::Uri(a), Value::Uri(b)) => a == b,
            (Value::Locale(a), Value::Locale(b)) => a == b,
            (Value::Charset(a), Value::Charset(b)) => a == b,
            (Value::Currency(a), Value::Currency(b)) => a == b,
            (Value::TimeZone(a), Value::TimeZone(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            (Value::Path(a), Value::Path(b)) => a == b,
            (Value::ZonedDateTime(a), Value::ZonedDateTime(b)) => a == b,
            (Value::LocalDateTime(a), Value::LocalDateTime(b)) => a == b,
            (Value::LocalDate(a), Value::LocalDate(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Enum { ty: ta, constant: ca }, Value::Enum { ty: tb, constant: cb }) => ta == tb && ca == cb,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (
                Value::Array {
                    component: ca,
                    items: ia,
                },
                Value::Array {
                    component: cb,
                    items: ib,
                },
            ) => ca == cb && ia == ib,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Properties(a), Value::Properties(b)) => a == b,
            (Value::Optional(a), Value::Optional(b)) => a == b,
            (Value::OptionalInt(a), Value::OptionalInt(b)) => a == b,
            (Value::OptionalLong(a), Value::OptionalLong(b)) => a == b,
            (Value::Stream(a), Value::Stream(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b) || a.eq_object(b.as_ref()),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(v) => v.hash(state),
            Value::Char(v) => v.hash(state),
            Value::Int8(v) => v.hash(state),
            Value::Int16(v) => v.hash(state),
            Value::Int32(v) => v.hash(state),
            Value::Int64(v) => v.hash(state),
            Value::Float32(v) => OrderedFloat(*v).hash(state),
            Value::Float64(v) => OrderedFloat(*v).hash(state),
            Value::BigInt(v) => v.hash(state),
            Value::Decimal(v) => v.hash(state),
            Value::Text(v) => v.hash(state),
            Value::Bytes(v) => v.hash(state),
            Value::Url(v) => v.hash(state),
            Value::Uri(v) => v.hash(state),
            Value::Locale(v) => v.hash(state),
            Value::Charset(v) => v.hash(state),
            Value::Currency(v) => v.hash(state),
            Value::TimeZone(v) => v.hash(state),
            Value::Uuid(v) => v.hash(state),
            Value::Path(v) => v.hash(state),
            Value::ZonedDateTime(v) => v.hash(state),
            Value::LocalDateTime(v) => v.hash(state),
            Value::LocalDate(v) => v.hash(state),
            Value::Date(v) => v.hash(state),
            Value::Enum { ty, constant } => {
                ty.hash(state);
                constant.hash(state);
            }
            Value::List(items) => items.hash(state),
            Value::Set(items) => hash_unordered(items.iter(), state),
            Value::Array { component, items } => {
                component.hash(state);
                items.hash(state);
            }
            Value::Map(map) | Value::Properties(map) => map.hash(state),
            Value::Optional(v) => v.hash(state),
            Value::OptionalInt(v) => v.hash(state),
            Value::OptionalLong(v) => v.hash(state),
            Value::Stream(v) => v.hash(state),
            Value::Object(object) => object.type_hash().hash(state),
        }
    }
}

/// Order-independent hash: item hashes are summed.
fn hash_unordered<T: Hash, H: Hasher>(items: impl ExactSizeIterator<Item = T>, state: &mut H) {
    state.write_usize(items.len());
    let sum = items.fold(0u64, |sum, item| {
        let mut hasher = FxHasher::default();
        item.hash(&mut hasher);
        sum.wrapping_add(hasher.finish())
    });
    state.write_u64(sum);
}

/// The canonical text form, used by the any-to-text rule.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{}", v),
            Value::Int8(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            // Debug keeps the fractional part: 1.0 rather than 1.
            Value::Float32(v) => write!(f, "{:?}", v),
            Value::Float64(v) => write!(f, "{:?}", v),
            Value::BigInt(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::Text(v) => f.write_str(v),
            Value::Bytes(v) => f.write_str(&String::from_utf8_lossy(v)),
            Value::Url(v) => f.write_str(v.as_str()),
            Value::Uri(v) => write!(f, "{}", v),
            Value::Locale(v) => write!(f, "{}", v),
            Value::Charset(v) => write!(f, "{}", v),
            Value::Currency(v) => write!(f, "{}", v),
            Value::TimeZone(v) => write!(f, "{}", v),
            Value::Uuid(v) => write!(f, "{}", v),
            Value::Path(v) => write!(f, "{}", v.display()),
            Value::ZonedDateTime(v) => f.write_str(&v.to_rfc3339()),
            Value::LocalDateTime(v) => write!(f, "{}", v.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::LocalDate(v) => write!(f, "{}", v),
            Value::Date(v) => f.write_str(&v.to_rfc2822()),
            Value::Enum { constant, .. } => f.write_str(constant),
            Value::List(_) | Value::Set(_) | Value::Array { .. } => {
                f.write_str("[")?;
                for (i, item) in self.elements().into_iter().flatten().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(map) | Value::Properties(map) => write!(f, "{}", map),
            Value::Optional(Some(v)) => write!(f, "Optional[{}]", v),
            Value::OptionalInt(Some(v)) => write!(f, "Optional[{}]", v),
            Value::OptionalLong(Some(v)) => write!(f, "Optional[{}]", v),
            Value::Optional(None) | Value::OptionalInt(None) | Value::OptionalLong(None) => f.write_str("Optional.empty"),
            Value::Stream(_) => f.write_str("<input_stream>"),
            Value::Object(object) => write!(f, "{}", object),
        }
    }
}

// ============================================================================
// Elements
// ============================================================================

/// Iterator over the items of a list, set or array.
#[derive(Debug, Clone)]
pub enum Elements<'a> {
    Sequence(std::slice::Iter<'a, Value>),
    Set(indexmap::set::Iter<'a, Value>),
}

impl<'a> Iterator for Elements<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Elements::Sequence(iter) => iter.next(),
            Elements::Set(iter) => iter.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Elements::Sequence(iter) => iter.size_hint(),
            Elements::Set(iter) => iter.size_hint(),
        }
    }
}

impl ExactSizeIterator for Elements<'_> {}

// ============================================================================
// ValueMap
// ============================================================================

/// Insertion-ordered map keyed by [`Value`].
///
/// Inserting an existing key replaces its value in place. Equality ignores
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValueMap {
    entries: IndexMap<Value, Value>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert an entry, returning the value it replaced.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, Value, Value> {
        self.entries.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, Value, Value> {
        self.entries.keys()
    }
}

impl Hash for ValueMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_unordered(self.entries.iter(), state);
    }
}

impl FromIterator<(Value, Value)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ValueMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        f.write_str("}")
    }
}

// ============================================================================
// Stream
// ============================================================================

/// A shared, read-once byte source.
///
/// Clones share the underlying reader, so draining one drains them all.
#[derive(Clone)]
pub struct Stream(Arc<Mutex<Box<dyn Read + Send>>>);

impl Stream {
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Stream(Arc::new(Mutex::new(Box::new(reader))))
    }

    /// Read everything that remains.
    pub fn read_all(&self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.0.lock().read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl PartialEq for Stream {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Hash for Stream {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Stream(..)")
    }
}
