//! ConversionService - the conversion facade.
//!
//! The service owns the type table, the rule registry and the resolution
//! cache, and answers one question: *can this value become that type, and if
//! so, what is it?* Conversion is total: every failure is reported as `None`,
//! with the reason (when a rule knows it) recorded on the context.
//!
//! # Conversion Flow
//!
//! 1. `Null` converts to nothing; an `any` target returns the value as is.
//! 2. If the value is already an instance of the target and is not a
//!    container, it is returned unchanged.
//! 3. The key `(value type, target, formatting qualifier)` is looked up in the
//!    cache, then resolved against the registry by walking both hierarchies.
//! 4. The winning rule runs; nested values recurse through the service.
//!
//! # Example
//!
//! ```
//! use typeconv::{ConversionService, Value, types};
//!
//! let service = ConversionService::new();
//! let ctx = service.context();
//! assert_eq!(service.convert(&Value::from("42"), types::INT32, &ctx), Some(Value::Int32(42)));
//! assert_eq!(service.convert_into::<i64>(&Value::Int32(7), &ctx), Some(7));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use typeconv_core::{Argument, FromValue, TypeFlags, TypeHash, TypeTable, Value, types};
use typeconv_registry::{ConverterCache, ConverterRegistry, ConvertiblePair, MemoryPressure};

use crate::converter::FunctionConverter;
use crate::{ConversionContext, ServiceConfig, TypeConverter, rules};

/// Shared rule handle.
pub type ConverterRef = Arc<dyn TypeConverter>;

/// Runtime type conversion engine.
///
/// All methods take `&self`; a service can be shared across threads and
/// extended with new rules while in use.
pub struct ConversionService {
    types: TypeTable,
    converters: ConverterRegistry<dyn TypeConverter>,
    cache: ConverterCache<dyn TypeConverter>,
    /// Advanced by every rule registration.
    revision: AtomicU64,
    config: ServiceConfig,
}

impl ConversionService {
    /// A service with default configuration and the built-in rule library.
    pub fn new() -> Self {
        Self::with_config(ServiceConfig::default())
    }

    /// A service with the built-in rule library.
    pub fn with_config(config: ServiceConfig) -> Self {
        let service = Self::without_rules(config);
        rules::register_defaults(&service);
        tracing::debug!(rules = service.converters.len(), "conversion service ready");
        service
    }

    /// A service that knows the built-in descriptors but has no rules.
    pub fn without_rules(config: ServiceConfig) -> Self {
        Self {
            types: TypeTable::with_builtins(),
            converters: ConverterRegistry::new(),
            cache: ConverterCache::new(config.cache_capacity),
            revision: AtomicU64::new(0),
            config,
        }
    }

    // ==========================================================================
    // Accessors
    // ==========================================================================

    /// The descriptor table. Register application types here; cached
    /// resolutions made before a registration are not reused after it.
    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// A fresh context using the configured locale and charset.
    pub fn context(&self) -> ConversionContext {
        ConversionContext::new(self.config.locale.clone(), self.config.charset)
    }

    /// Number of registered rules.
    pub fn converter_count(&self) -> usize {
        self.converters.len()
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a rule for `source -> target`, replacing any previous one.
    pub fn add_converter<F>(&self, source: TypeHash, target: TypeHash, rule: F) -> &Self
    where
        F: Fn(&ConversionService, &Value, TypeHash, &ConversionContext) -> Option<Value> + Send + Sync + 'static,
    {
        self.add_type_converter(ConvertiblePair::new(source, target), Arc::new(rule))
    }

    /// Register a rule that applies only when the context carries an
    /// annotation of kind `qualifier`.
    pub fn add_formatting_converter<F>(&self, source: TypeHash, target: TypeHash, qualifier: TypeHash, rule: F) -> &Self
    where
        F: Fn(&ConversionService, &Value, TypeHash, &ConversionContext) -> Option<Value> + Send + Sync + 'static,
    {
        self.add_type_converter(ConvertiblePair::formatted(source, target, qualifier), Arc::new(rule))
    }

    /// Register a total function as the rule for `source -> target`.
    pub fn add_function<F>(&self, source: TypeHash, target: TypeHash, function: F) -> &Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.add_type_converter(ConvertiblePair::new(source, target), Arc::new(FunctionConverter(function)))
    }

    /// Register a prepared rule under an explicit key.
    ///
    /// Clears the resolution cache: the new rule may be more specific than a
    /// previously resolved one.
    pub fn add_type_converter(&self, pair: ConvertiblePair, rule: ConverterRef) -> &Self {
        let pair = ConvertiblePair::with_qualifier(
            self.types.normalize(pair.source),
            self.types.normalize(pair.target),
            pair.qualifier.map(|q| self.types.normalize(q)),
        );
        let replaced = self.converters.insert(pair, rule).is_some();
        tracing::debug!(
            source = %self.types.name_of(pair.source),
            target = %self.types.name_of(pair.target),
            replaced,
            "registered converter"
        );
        self.revision.fetch_add(1, Ordering::AcqRel);
        self.cache.clear();
        self
    }

    // ==========================================================================
    // Conversion
    // ==========================================================================

    /// Convert `value` to `target`.
    ///
    /// Returns `None` if no rule applies or the applicable rule declines.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn convert(&self, value: &Value, target: TypeHash, context: &ConversionContext) -> Option<Value> {
        if value.is_null() {
            return None;
        }
        let target = self.types.normalize(target);
        if target == types::ANY {
            return Some(value.clone());
        }

        let source = self.source_type(value);
        if !self.types.is_container(source) && self.types.is_instance(source, target) {
            return Some(value.clone());
        }

        let qualifier = self.formatting_qualifier(context);
        let pair = ConvertiblePair::with_qualifier(source, target, qualifier);
        let epoch = self.epoch();
        let converter = match self.cache.get(&pair, epoch) {
            Some(converter) => {
                tracing::trace!(%pair, "converter cache hit");
                converter
            }
            None => {
                let converter = self.find_type_converter(source, target, qualifier)?;
                self.cache.put(pair, Arc::clone(&converter), epoch);
                converter
            }
        };
        converter.convert(self, value, target, context)
    }

    /// Convert using a fresh context from [`context`](Self::context).
    pub fn convert_to(&self, value: &Value, target: TypeHash) -> Option<Value> {
        self.convert(value, target, &self.context())
    }

    /// Convert to the descriptor of `argument`, with its type parameters as the
    /// context's type variables.
    pub fn convert_argument(&self, value: &Value, argument: &Argument, context: &ConversionContext) -> Option<Value> {
        self.convert(value, argument.ty(), &context.with_argument(argument))
    }

    /// Convert and unwrap into a Rust type.
    pub fn convert_into<T: FromValue>(&self, value: &Value, context: &ConversionContext) -> Option<T> {
        self.convert(value, T::type_hash(), context).and_then(T::from_value)
    }

    /// Whether a rule (or the identity shortcut) exists for `source -> target`.
    ///
    /// A `true` answer does not guarantee a particular value converts.
    pub fn can_convert(&self, source: TypeHash, target: TypeHash) -> bool {
        let target = self.types.normalize(target);
        target == types::ANY
            || (!self.types.is_container(source) && self.types.is_instance(source, target))
            || self.find_type_converter(source, target, None).is_some()
    }

    /// Resolve the rule for a key by walking both hierarchies, bypassing the cache.
    ///
    /// With a qualifier, qualified rules anywhere in the hierarchies are
    /// preferred; unqualified rules are the fallback.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn find_type_converter(
        &self,
        source: TypeHash,
        target: TypeHash,
        qualifier: Option<TypeHash>,
    ) -> Option<ConverterRef> {
        let sources = self.types.hierarchy(source);
        let targets = self.types.hierarchy(target);
        match self.converters.find(&sources, &targets, qualifier) {
            Some((found, converter)) => {
                tracing::debug!(
                    source = %self.types.name_of(source),
                    target = %self.types.name_of(target),
                    via = %found,
                    "resolved converter"
                );
                Some(converter)
            }
            None => {
                tracing::debug!(
                    source = %self.types.name_of(source),
                    target = %self.types.name_of(target),
                    "no converter"
                );
                None
            }
        }
    }

    /// Shed cached resolutions under memory pressure. Returns the number evicted.
    pub fn relieve_memory_pressure(&self, pressure: MemoryPressure) -> usize {
        self.cache.relieve(pressure)
    }

    /// Number of cached resolutions.
    pub fn cached_resolutions(&self) -> usize {
        self.cache.len()
    }

    /// Resolutions are valid while neither rules nor descriptors change.
    fn epoch(&self) -> u64 {
        self.revision.load(Ordering::Acquire) + self.types.generation()
    }

    /// Runtime descriptor of a value. Array descriptors are registered on demand.
    fn source_type(&self, value: &Value) -> TypeHash {
        match value {
            Value::Array { component, .. } => self.types.array_of(*component),
            other => other.type_hash(),
        }
    }

    /// Kind of the first annotation that is a formatting qualifier.
    fn formatting_qualifier(&self, context: &ConversionContext) -> Option<TypeHash> {
        context
            .annotations()
            .iter()
            .map(|annotation| annotation.kind)
            .find(|&kind| self.types.has_flags(kind, TypeFlags::FORMATTING))
    }
}

impl Default for ConversionService {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConversionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionService")
            .field("types", &self.types)
            .field("converters", &self.converters)
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish()
    }
}
