//! High-level Intermediate Representation (HIR) for liftc
//!
//! A module is one arena-allocated syntax tree plus the registry of type
//! shapes that upstream passes computed for it. Passes mutate both in place.

pub mod module;
pub mod node;
pub mod planter;
pub mod pseudo;
pub mod shape;
pub mod tree;

pub use module::{HirError, Module};
pub use node::*;
pub use planter::Planter;
pub use pseudo::PseudoCode;
pub use shape::{MemberRef, MethodShape, PropertyShape, SuperType, TypeBinding, TypeRegistry, TypeShape};
pub use tree::{Node, Orphan, Tree, VisitCue};
