//! Rule storage and resolution caching for the typeconv conversion engine.
//!
//! - [`ConvertiblePair`]: the (source, target, qualifier) key a rule is stored under
//! - [`ConverterRegistry`]: the key-to-rule map and its hierarchy-driven lookup
//! - [`ConverterCache`]: a bounded LRU of resolved keys, with memory-pressure relief
//!
//! Both containers are generic over the rule type, which the facade crate
//! instantiates with its converter trait object.

mod cache;
mod pair;
mod registry;

pub use cache::{ConverterCache, MemoryPressure};
pub use pair::ConvertiblePair;
pub use registry::ConverterRegistry;
