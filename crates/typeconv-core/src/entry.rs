//! Type table entries.
//!
//! A [`TypeEntry`] records what the hierarchy resolver needs to know about a
//! descriptor: its single base class, the interfaces it implements, and a
//! handful of flags. Arrays additionally carry their component descriptor and
//! enumerations their constant names.

use bitflags::bitflags;

use crate::{TypeHash, types};

bitflags! {
    /// Descriptor traits consulted during resolution.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TypeFlags: u8 {
        /// Interface-like: contributes to hierarchies but has no base class.
        const INTERFACE = 1 << 0;
        /// Cannot have direct instances.
        const ABSTRACT = 1 << 1;
        /// Array descriptor; `component` is set.
        const ARRAY = 1 << 2;
        /// Enumeration descriptor; `constants` lists its members.
        const ENUM = 1 << 3;
        /// Annotation kind that selects formatting rules.
        const FORMATTING = 1 << 4;
    }
}

/// Type table entry for a single descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeEntry {
    /// Registered name.
    pub name: String,
    /// Type hash for identity.
    pub type_hash: TypeHash,
    pub flags: TypeFlags,

    // === Inheritance ===
    /// Base class (single inheritance). `None` means the universal type.
    pub base_class: Option<TypeHash>,
    /// Implemented interfaces, in declaration order.
    pub interfaces: Vec<TypeHash>,

    // === Shape ===
    /// Element descriptor of an array.
    pub component: Option<TypeHash>,
    /// Constant names of an enumeration.
    pub constants: Vec<String>,
}

impl TypeEntry {
    fn new(name: impl Into<String>, flags: TypeFlags) -> Self {
        let name = name.into();
        let type_hash = TypeHash::from_name(&name);
        Self {
            name,
            type_hash,
            flags,
            base_class: None,
            interfaces: Vec::new(),
            component: None,
            constants: Vec::new(),
        }
    }

    /// A concrete class.
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeFlags::empty())
    }

    /// A class without direct instances.
    pub fn abstract_class(name: impl Into<String>) -> Self {
        Self::new(name, TypeFlags::ABSTRACT)
    }

    /// An interface.
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeFlags::INTERFACE | TypeFlags::ABSTRACT)
    }

    /// An enumeration with the given constants, deriving from [`types::ENUM`].
    pub fn enumeration<I, S>(name: impl Into<String>, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entry = Self::new(name, TypeFlags::ENUM).with_base(types::ENUM);
        entry.constants = constants.into_iter().map(Into::into).collect();
        entry
    }

    /// An annotation kind that selects formatting rules.
    pub fn qualifier(name: impl Into<String>) -> Self {
        Self::new(name, TypeFlags::INTERFACE | TypeFlags::FORMATTING)
    }

    /// The array descriptor whose elements are `component`.
    pub fn array(component: TypeHash, component_name: &str) -> Self {
        Self {
            name: format!("{}[]", component_name),
            type_hash: TypeHash::array_of(component),
            flags: TypeFlags::ARRAY,
            base_class: None,
            interfaces: Vec::new(),
            component: Some(component),
            constants: Vec::new(),
        }
    }

    // === Builder Methods ===

    /// Set the base class.
    pub fn with_base(mut self, base: TypeHash) -> Self {
        self.base_class = Some(base);
        self
    }

    /// Add an implemented interface.
    pub fn with_interface(mut self, interface: TypeHash) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Add flags.
    pub fn with_flags(mut self, flags: TypeFlags) -> Self {
        self.flags |= flags;
        self
    }

    // === Queries ===

    pub fn is_interface(&self) -> bool {
        self.flags.contains(TypeFlags::INTERFACE)
    }

    pub fn is_array(&self) -> bool {
        self.flags.contains(TypeFlags::ARRAY)
    }

    pub fn is_enum(&self) -> bool {
        self.flags.contains(TypeFlags::ENUM)
    }

    /// Whether `name` is one of this enumeration's constants.
    pub fn has_constant(&self, name: &str) -> bool {
        self.constants.iter().any(|c| c == name)
    }
}
