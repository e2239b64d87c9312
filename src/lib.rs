//! Runtime type conversion.
//!
//! A [`ConversionService`] turns a [`Value`] of one runtime type into another
//! type named by a descriptor ([`TypeHash`]): `"42"` into an `int32`,
//! `"1,2,3"` into a `list<int64>`, a map of strings into `properties`.
//! Rules are registered per `(source, target)` pair and found by walking
//! the type hierarchies of both sides, so a rule for `text -> number`
//! serves every string subtype and every concrete number.
//!
//! ```
//! use typeconv::prelude::*;
//!
//! let service = ConversionService::new();
//! let ctx = service.context();
//!
//! let ids = service.convert_argument(&Value::from("1,2,x"), &Argument::list_of(types::INT32), &ctx);
//! assert_eq!(ids, Some(Value::list([Value::Int32(1), Value::Int32(2)])));
//! assert_eq!(ctx.errors().len(), 1);
//! ```
//!
//! The descriptor model, values and errors live in `typeconv-core`; rule
//! storage and the resolution cache in `typeconv-registry`. Both are
//! re-exported here.

mod config;
mod context;
mod converter;
mod service;

pub mod naming;
mod rules;

pub use config::{DEFAULT_CACHE_CAPACITY, ServiceConfig};
pub use context::{Annotation, ConversionContext, ErrorSink};
pub use converter::{FunctionConverter, TypeConverter};
pub use service::{ConversionService, ConverterRef};

pub use typeconv_core::{
    Argument, ConversionError, Described, Elements, FromValue, ObjectValue, Rejection, RegistrationError, Stream,
    TypeEntry, TypeFlags, TypeHash, TypeTable, Value, ValueMap, qualifiers, types,
};
pub use typeconv_registry::{ConvertiblePair, MemoryPressure};

/// Everything needed to register rules and convert values.
pub mod prelude {
    pub use crate::{
        Annotation, Argument, ConversionContext, ConversionError, ConversionService, ServiceConfig, TypeConverter,
        TypeEntry, TypeHash, Value, qualifiers, types,
    };
}
