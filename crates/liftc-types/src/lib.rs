//! Type vocabulary for liftc
//!
//! Identifiers, resolved names and the small enums that describe type members.
//! Type *shapes* live next to the syntax tree in `liftc-hir` since they point
//! back at declaration nodes.

pub mod name;

pub use name::{NameKind, NameMaker, ResolvedName, Symbol};

use serde::{Deserialize, Serialize};

/// Unique identifier for a type shape
pub type TypeId = u32;

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

/// Whether a type (or property) can be instantiated (or has storage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Abstractness {
    /// Interfaces; abstract properties have no backing storage
    Abstract,
    /// Classes; concrete properties are backed
    Concrete,
}

/// What a method member does when invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodKind {
    Normal,
    Getter,
    Setter,
    Constructor,
}

/// Static types attached to declarations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    Any,
    Void,
    Int,
    String,
    Symbol,
    /// The type of the `empty` placeholder value
    Empty,
    /// An opaque bundle of getter/setter slots built by `makeClosRec`
    ClosureRecord,
    /// Reference to a type shape
    Named(TypeId),
    /// Generic instantiation of a type shape
    Generic { base: TypeId, type_args: Vec<Type> },
    /// Type parameter reference
    TypeVar(String),
    List(Box<Type>),
    Nullable(Box<Type>),
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Any => write!(f, "Any"),
            Type::Void => write!(f, "Void"),
            Type::Int => write!(f, "Int"),
            Type::String => write!(f, "String"),
            Type::Symbol => write!(f, "Symbol"),
            Type::Empty => write!(f, "Empty"),
            Type::ClosureRecord => write!(f, "ClosureRecord"),
            Type::Named(id) => write!(f, "type#{}", id),
            Type::Generic { base, type_args } => {
                write!(f, "type#{}<", base)?;
                for (i, arg) in type_args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ">")
            }
            Type::TypeVar(name) => write!(f, "{}", name),
            Type::List(elem) => write!(f, "List<{}>", elem),
            Type::Nullable(inner) => write!(f, "{}?", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_display() {
        let list = Type::List(Box::new(Type::Nullable(Box::new(Type::Symbol))));
        assert_eq!(list.to_string(), "List<Symbol?>");
        let generic = Type::Generic {
            base: 3,
            type_args: vec![Type::Int, Type::TypeVar("T".to_string())],
        };
        assert_eq!(generic.to_string(), "type#3<Int, T>");
    }
}
