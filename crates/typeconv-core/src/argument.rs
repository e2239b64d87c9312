//! Typed arguments: a descriptor plus the type parameters it is instantiated with.

use std::fmt;

use crate::{TypeHash, types};

/// A named, possibly parameterized type reference such as `E: list<int32>`.
///
/// Arguments carry generic information the flat [`TypeHash`] cannot: the
/// element type of a list, the key and value types of a map. Container rules
/// read them back from the conversion context as type variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Argument {
    name: String,
    ty: TypeHash,
    type_parameters: Vec<Argument>,
}

impl Argument {
    /// A named argument with no type parameters.
    pub fn named(name: impl Into<String>, ty: TypeHash) -> Self {
        Self {
            name: name.into(),
            ty,
            type_parameters: Vec::new(),
        }
    }

    /// An unnamed argument.
    pub fn of(ty: TypeHash) -> Self {
        Self::named("", ty)
    }

    /// The unconstrained argument.
    pub fn any() -> Self {
        Self::of(types::ANY)
    }

    /// `list<E>`.
    pub fn list_of(element: impl Into<Argument>) -> Self {
        Self::of(types::LIST).with_parameter(element.into().renamed("E"))
    }

    /// `set<E>`.
    pub fn set_of(element: impl Into<Argument>) -> Self {
        Self::of(types::SET).with_parameter(element.into().renamed("E"))
    }

    /// `map<K, V>`.
    pub fn map_of(key: impl Into<Argument>, value: impl Into<Argument>) -> Self {
        Self::of(types::MAP)
            .with_parameter(key.into().renamed("K"))
            .with_parameter(value.into().renamed("V"))
    }

    /// `optional<T>`.
    pub fn optional_of(inner: impl Into<Argument>) -> Self {
        Self::of(types::OPTIONAL).with_parameter(inner.into().renamed("T"))
    }

    // === Builder Methods ===

    /// Append a type parameter.
    pub fn with_parameter(mut self, parameter: Argument) -> Self {
        self.type_parameters.push(parameter);
        self
    }

    /// Replace the name.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    // === Accessors ===

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> TypeHash {
        self.ty
    }

    pub fn type_parameters(&self) -> &[Argument] {
        &self.type_parameters
    }

    pub fn first_type_parameter(&self) -> Option<&Argument> {
        self.type_parameters.first()
    }
}

impl From<TypeHash> for Argument {
    fn from(ty: TypeHash) -> Self {
        Argument::of(ty)
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.name.is_empty() {
            write!(f, "{}: ", self.name)?;
        }
        write!(f, "{}", self.ty)?;
        if !self.type_parameters.is_empty() {
            f.write_str("<")?;
            for (i, param) in self.type_parameters.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", param)?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}
