//! TypeTable - descriptor storage and hierarchy resolution.
//!
//! The table maps each [`TypeHash`] to a [`TypeEntry`] and answers the one
//! question the conversion engine keeps asking: in what order should the
//! supertypes of a descriptor be tried?
//!
//! # Hierarchy Order
//!
//! For a class `C` with base chain `C -> B -> ...`:
//!
//! 1. `C` itself
//! 2. every interface of `C`, depth first, each one followed by its own
//!    super-interfaces (an interface reachable twice is listed once, at its
//!    first position)
//! 3. each base class in turn, each followed by its interfaces as in step 2
//! 4. `any[]` if `C` is an array
//! 5. `any`
//!
//! Interfaces skip step 3. A hash with no entry resolves to `[hash, any]`.
//! Results are memoized until the next registration. Every registration
//! also advances [`generation`](TypeTable::generation), so callers holding
//! results derived from hierarchies can tell when theirs are out of date.
//!
//! # Thread Safety
//!
//! All state sits behind `parking_lot` locks so a table can be shared by
//! concurrent conversions. Array descriptors are registered lazily the first
//! time a value of that array type is converted.
//!
//! # Example
//!
//! ```
//! use typeconv_core::{TypeEntry, TypeHash, TypeTable, types};
//!
//! let table = TypeTable::with_builtins();
//! let hierarchy = table.hierarchy(types::STRING);
//! assert_eq!(&hierarchy[..], &[types::STRING, types::TEXT, types::ANY]);
//!
//! let animal = table.register(TypeEntry::class("Animal")).unwrap();
//! let dog = table.register(TypeEntry::class("Dog").with_base(animal)).unwrap();
//! assert!(table.is_instance(dog, animal));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::{RegistrationError, TypeEntry, TypeFlags, TypeHash, types};

/// Descriptor storage with memoized hierarchy resolution.
#[derive(Default)]
pub struct TypeTable {
    entries: RwLock<FxHashMap<TypeHash, TypeEntry>>,
    /// Alias hash to canonical hash.
    aliases: RwLock<FxHashMap<TypeHash, TypeHash>>,
    hierarchies: RwLock<FxHashMap<TypeHash, Arc<[TypeHash]>>>,
    generation: AtomicU64,
}

impl TypeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table holding the built-in descriptors and aliases.
    pub fn with_builtins() -> Self {
        let table = Self::new();
        {
            let mut entries = table.entries.write();
            for entry in builtin_entries() {
                entries.insert(entry.type_hash, entry);
            }
        }
        {
            let mut aliases = table.aliases.write();
            for (alias, target) in BUILTIN_ALIASES {
                aliases.insert(TypeHash::from_name(alias), *target);
            }
        }
        table
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a descriptor, returning its hash.
    ///
    /// Clears memoized hierarchies, since the new entry may now appear in them.
    pub fn register(&self, entry: TypeEntry) -> Result<TypeHash, RegistrationError> {
        if entry.is_enum() && entry.constants.is_empty() {
            return Err(RegistrationError::InvalidEnum {
                name: entry.name,
                reason: "no constants".into(),
            });
        }

        let hash = entry.type_hash;
        let mut entries = self.entries.write();
        if entries.contains_key(&hash) || self.aliases.read().contains_key(&hash) {
            return Err(RegistrationError::DuplicateType(entry.name));
        }
        entries.insert(hash, entry);
        self.invalidate();
        Ok(hash)
    }

    /// Bind `alias` as another name for `target`.
    pub fn register_alias(&self, alias: &str, target: TypeHash) -> Result<(), RegistrationError> {
        let alias_hash = TypeHash::from_name(alias);
        if self.entries.read().contains_key(&alias_hash) {
            return Err(RegistrationError::DuplicateType(alias.to_string()));
        }
        let mut aliases = self.aliases.write();
        if aliases.contains_key(&alias_hash) {
            return Err(RegistrationError::DuplicateAlias(alias.to_string()));
        }
        aliases.insert(alias_hash, target);
        drop(aliases);
        self.invalidate();
        Ok(())
    }

    /// The array descriptor for `component`, registering it on first use.
    pub fn array_of(&self, component: TypeHash) -> TypeHash {
        let component = self.normalize(component);
        let hash = TypeHash::array_of(component);
        if self.entries.read().contains_key(&hash) {
            return hash;
        }

        let entry = TypeEntry::array(component, &self.name_of(component));
        let mut entries = self.entries.write();
        if !entries.contains_key(&hash) {
            entries.insert(hash, entry);
            self.invalidate();
        }
        hash
    }

    /// Counter advanced by every registration.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn invalidate(&self) {
        self.hierarchies.write().clear();
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Resolve an alias to its canonical descriptor. Non-aliases map to themselves.
    pub fn normalize(&self, hash: TypeHash) -> TypeHash {
        self.aliases.read().get(&hash).copied().unwrap_or(hash)
    }

    /// Look up an entry by hash (after alias normalization).
    pub fn get(&self, hash: TypeHash) -> Option<TypeEntry> {
        let hash = self.normalize(hash);
        self.entries.read().get(&hash).cloned()
    }

    /// Look up an entry by name or alias.
    pub fn get_by_name(&self, name: &str) -> Option<TypeEntry> {
        self.get(TypeHash::from_name(name))
    }

    pub fn contains(&self, hash: TypeHash) -> bool {
        let hash = self.normalize(hash);
        self.entries.read().contains_key(&hash)
    }

    /// Registered name, or the hash itself for unknown descriptors.
    pub fn name_of(&self, hash: TypeHash) -> String {
        let hash = self.normalize(hash);
        match self.entries.read().get(&hash) {
            Some(entry) => entry.name.clone(),
            None => hash.to_string(),
        }
    }

    /// Whether the descriptor carries all of `flags`.
    pub fn has_flags(&self, hash: TypeHash, flags: TypeFlags) -> bool {
        let hash = self.normalize(hash);
        self.entries.read().get(&hash).is_some_and(|e| e.flags.contains(flags))
    }

    /// Component descriptor of an array.
    pub fn component_of(&self, hash: TypeHash) -> Option<TypeHash> {
        let hash = self.normalize(hash);
        self.entries.read().get(&hash).and_then(|e| e.component)
    }

    /// Whether `constant` names a member of the enumeration `hash`.
    pub fn has_enum_constant(&self, hash: TypeHash, constant: &str) -> bool {
        let hash = self.normalize(hash);
        self.entries.read().get(&hash).is_some_and(|e| e.has_constant(constant))
    }

    /// Number of registered descriptors (aliases excluded).
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    // ==========================================================================
    // Hierarchy Resolution
    // ==========================================================================

    /// Ordered supertypes of `hash`, most specific first.
    pub fn hierarchy(&self, hash: TypeHash) -> Arc<[TypeHash]> {
        let hash = self.normalize(hash);
        if let Some(cached) = self.hierarchies.read().get(&hash) {
            return Arc::clone(cached);
        }

        // Entries stay read-locked until the memo is written so a concurrent
        // registration cannot slip in between and leave a stale list behind.
        let entries = self.entries.read();
        let resolved: Arc<[TypeHash]> = compute_hierarchy(&entries, hash).into();
        self.hierarchies.write().insert(hash, Arc::clone(&resolved));
        resolved
    }

    /// Whether a value of type `source` is usable where `target` is expected.
    pub fn is_instance(&self, source: TypeHash, target: TypeHash) -> bool {
        let target = self.normalize(target);
        target == types::ANY || self.hierarchy(source).contains(&target)
    }

    /// Whether `hash` is an iterable or a map.
    pub fn is_container(&self, hash: TypeHash) -> bool {
        let hierarchy = self.hierarchy(hash);
        hierarchy.contains(&types::ITERABLE) || hierarchy.contains(&types::MAP)
    }
}

fn compute_hierarchy(entries: &FxHashMap<TypeHash, TypeEntry>, hash: TypeHash) -> Vec<TypeHash> {
    let mut out = Vec::new();
    let Some(entry) = entries.get(&hash) else {
        out.push(hash);
        push_unique(&mut out, types::ANY);
        return out;
    };

    populate_interfaces(entries, hash, &mut out);

    if !entry.is_interface() {
        let mut visited = vec![hash];
        let mut current = entry.base_class;
        while let Some(base) = current {
            if base == types::ANY || visited.contains(&base) {
                break;
            }
            visited.push(base);
            populate_interfaces(entries, base, &mut out);
            current = entries.get(&base).and_then(|e| e.base_class);
        }
    }

    if entry.is_array() {
        push_unique(&mut out, types::ANY_ARRAY);
    }
    push_unique(&mut out, types::ANY);
    out
}

/// Append `hash`, then each interface it implements followed by that
/// interface's own super-interfaces.
fn populate_interfaces(entries: &FxHashMap<TypeHash, TypeEntry>, hash: TypeHash, out: &mut Vec<TypeHash>) {
    push_unique(out, hash);
    let Some(entry) = entries.get(&hash) else {
        return;
    };
    for &interface in &entry.interfaces {
        if !out.contains(&interface) {
            populate_interfaces(entries, interface, out);
        }
    }
}

fn push_unique(out: &mut Vec<TypeHash>, hash: TypeHash) {
    if !out.contains(&hash) {
        out.push(hash);
    }
}

impl fmt::Debug for TypeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeTable")
            .field("entries", &self.entries.read().len())
            .field("aliases", &self.aliases.read().len())
            .field("memoized", &self.hierarchies.read().len())
            .finish()
    }
}

// ==========================================================================
// Built-ins
// ==========================================================================

const BUILTIN_ALIASES: &[(&str, TypeHash)] = &[
    ("i8", types::INT8),
    ("byte", types::INT8),
    ("i16", types::INT16),
    ("short", types::INT16),
    ("i32", types::INT32),
    ("int", types::INT32),
    ("integer", types::INT32),
    ("i64", types::INT64),
    ("long", types::INT64),
    ("f32", types::FLOAT32),
    ("float", types::FLOAT32),
    ("f64", types::FLOAT64),
    ("double", types::FLOAT64),
    ("boolean", types::BOOL),
    ("character", types::CHAR),
    ("String", types::STRING),
    ("str", types::STRING),
    ("object", types::ANY),
];

fn builtin_entries() -> Vec<TypeEntry> {
    let numeric = |name: &str| TypeEntry::class(name).with_base(types::NUMBER);
    vec![
        TypeEntry::class("any"),
        TypeEntry::array(types::ANY, "any"),
        // Text
        TypeEntry::interface("text"),
        TypeEntry::class("string").with_interface(types::TEXT),
        TypeEntry::class("char"),
        TypeEntry::class("bool"),
        // Numbers
        TypeEntry::abstract_class("number"),
        numeric("int8"),
        numeric("int16"),
        numeric("int32"),
        numeric("int64"),
        numeric("float32"),
        numeric("float64"),
        numeric("bigint"),
        numeric("decimal"),
        TypeEntry::class("bytes"),
        // Containers
        TypeEntry::interface("iterable"),
        TypeEntry::interface("collection").with_interface(types::ITERABLE),
        TypeEntry::interface("list").with_interface(types::COLLECTION),
        TypeEntry::interface("set").with_interface(types::COLLECTION),
        TypeEntry::interface("map"),
        TypeEntry::class("linked_map").with_interface(types::MAP),
        TypeEntry::class("properties").with_interface(types::MAP),
        TypeEntry::class("optional"),
        TypeEntry::class("optional_int"),
        TypeEntry::class("optional_long"),
        TypeEntry::abstract_class("enum"),
        // Leaf values
        TypeEntry::class("url"),
        TypeEntry::class("uri"),
        TypeEntry::class("locale"),
        TypeEntry::class("charset"),
        TypeEntry::class("currency"),
        TypeEntry::class("time_zone"),
        TypeEntry::class("uuid"),
        TypeEntry::class("path"),
        // Date and time
        TypeEntry::class("zoned_date_time"),
        TypeEntry::class("local_date_time"),
        TypeEntry::class("local_date"),
        TypeEntry::class("date"),
        // I/O
        TypeEntry::abstract_class("input_stream"),
        // Qualifiers
        TypeEntry::qualifier("format"),
        TypeEntry::qualifier("readable_bytes"),
    ]
}
