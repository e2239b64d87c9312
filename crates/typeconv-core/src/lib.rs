//! Core types for the typeconv runtime conversion engine.
//!
//! This crate holds everything the engine needs to *describe* a conversion:
//!
//! - [`TypeHash`]: deterministic descriptor identity
//! - [`TypeTable`]: descriptor storage, aliases, and hierarchy resolution
//! - [`Value`]: the dynamically typed values being converted
//! - [`Argument`]: parameterized type references (`list<int32>`)
//! - [`ConversionError`] / [`RegistrationError`]: failure reporting
//!
//! Rule storage and lookup live in `typeconv-registry`; the conversion facade
//! and built-in rules live in the `typeconv` crate.

mod argument;
mod convert;
mod entry;
mod error;
mod type_hash;
mod type_table;
mod value;

pub mod types;

pub use argument::Argument;
pub use convert::{Described, FromValue};
pub use entry::{TypeEntry, TypeFlags};
pub use error::{ConversionError, RegistrationError, Rejection};
pub use type_hash::{TypeHash, hash_constants, qualifiers};
pub use type_table::TypeTable;
pub use value::{Elements, ObjectValue, Stream, Value, ValueMap};

