//! Type shapes: the structural description of classes and interfaces.
//!
//! Shapes are computed upstream. Passes may add members to a shape of the
//! module being compiled; each pass is the sole writer while it runs.

use crate::node::NodeId;
use liftc_diagnostics::Span;
use liftc_types::{Abstractness, MethodKind, ResolvedName, Symbol, Type, TypeId, Visibility};
use serde::{Deserialize, Serialize};

/// A binding of one of a supertype's type parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeBinding {
    pub param: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuperType {
    /// `None` for supertypes that have no shape (e.g. `Any`)
    pub definition: Option<TypeId>,
    #[serde(default)]
    pub bindings: Vec<TypeBinding>,
}

impl SuperType {
    pub fn of(definition: TypeId) -> Self {
        Self {
            definition: Some(definition),
            bindings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodShape {
    pub enclosing: TypeId,
    pub name: ResolvedName,
    pub symbol: Symbol,
    /// The declaration that defines the method
    pub decl: Option<NodeId>,
    pub visibility: Visibility,
    pub kind: MethodKind,
    /// Whether subtypes may override
    pub open: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyShape {
    pub enclosing: TypeId,
    pub name: ResolvedName,
    pub symbol: Symbol,
    pub decl: Option<NodeId>,
    pub visibility: Visibility,
    pub abstractness: Abstractness,
    /// Name of the getter method, if reads go through one
    pub getter: Option<ResolvedName>,
    pub setter: Option<ResolvedName>,
}

/// Either kind of member, for code that treats them uniformly.
#[derive(Debug, Clone, Copy)]
pub enum MemberRef<'a> {
    Method(&'a MethodShape),
    Property(&'a PropertyShape),
}

impl<'a> MemberRef<'a> {
    pub fn name(&self) -> &'a ResolvedName {
        match self {
            MemberRef::Method(m) => &m.name,
            MemberRef::Property(p) => &p.name,
        }
    }

    pub fn symbol(&self) -> &'a Symbol {
        match self {
            MemberRef::Method(m) => &m.symbol,
            MemberRef::Property(p) => &p.symbol,
        }
    }

    pub fn decl(&self) -> Option<NodeId> {
        match self {
            MemberRef::Method(m) => m.decl,
            MemberRef::Property(p) => p.decl,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeShape {
    pub id: TypeId,
    pub name: ResolvedName,
    /// Name of the module that defines the type
    pub module: String,
    pub abstractness: Abstractness,
    #[serde(default)]
    pub super_types: Vec<SuperType>,
    #[serde(default)]
    pub methods: Vec<MethodShape>,
    #[serde(default)]
    pub properties: Vec<PropertyShape>,
    #[serde(default)]
    pub sealed: bool,
    #[serde(default)]
    pub pos: Span,
}

impl TypeShape {
    /// Methods, then properties.
    pub fn members(&self) -> impl Iterator<Item = MemberRef<'_>> {
        self.methods
            .iter()
            .map(MemberRef::Method)
            .chain(self.properties.iter().map(MemberRef::Property))
    }

    pub fn members_matching<'a>(&'a self, symbol: &'a Symbol) -> impl Iterator<Item = MemberRef<'a>> {
        self.members().filter(move |m| m.symbol() == symbol)
    }

    pub fn constructors(&self) -> impl Iterator<Item = &MethodShape> {
        self.methods
            .iter()
            .filter(|m| m.kind == MethodKind::Constructor)
    }

    pub fn super_type_ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.super_types.iter().filter_map(|st| st.definition)
    }
}

/// All type shapes known while compiling a module, indexed by [`TypeId`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeRegistry {
    shapes: Vec<TypeShape>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self { shapes: Vec::new() }
    }

    /// Register a new memberless shape and return its id.
    pub fn define(
        &mut self,
        name: ResolvedName,
        module: impl Into<String>,
        abstractness: Abstractness,
    ) -> TypeId {
        let id = self.shapes.len() as TypeId;
        self.shapes.push(TypeShape {
            id,
            name,
            module: module.into(),
            abstractness,
            super_types: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            sealed: false,
            pos: Span::DUMMY,
        });
        id
    }

    /// Register a fully built shape. Its id must be the next free one.
    pub fn insert(&mut self, shape: TypeShape) -> TypeId {
        let id = self.shapes.len() as TypeId;
        assert_eq!(shape.id, id, "type shape ids must be dense");
        self.shapes.push(shape);
        id
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeShape> {
        self.shapes.get(id as usize)
    }

    pub fn get_mut(&mut self, id: TypeId) -> Option<&mut TypeShape> {
        self.shapes.get_mut(id as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeShape> {
        self.shapes.iter()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Look a shape up by its resolved name.
    pub fn by_name(&self, name: &ResolvedName) -> Option<&TypeShape> {
        self.shapes.iter().find(|s| &s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_members_matching_constructor_symbol() {
        let mut types = TypeRegistry::new();
        let c = types.define(ResolvedName::source("C", 0), "m", Abstractness::Concrete);
        let shape = types.get_mut(c).unwrap();
        shape.methods.push(MethodShape {
            enclosing: c,
            name: ResolvedName::source("constructor", 1),
            symbol: Symbol::constructor(),
            decl: None,
            visibility: Visibility::Public,
            kind: MethodKind::Constructor,
            open: false,
        });
        shape.properties.push(PropertyShape {
            enclosing: c,
            name: ResolvedName::source("p", 2),
            symbol: Symbol::new("p"),
            decl: None,
            visibility: Visibility::Private,
            abstractness: Abstractness::Concrete,
            getter: None,
            setter: None,
        });

        let shape = types.get(c).unwrap();
        assert_eq!(shape.members().count(), 2);
        let constructor = Symbol::constructor();
        assert_eq!(shape.members_matching(&constructor).count(), 1);
        assert_eq!(shape.constructors().count(), 1);
        assert_eq!(types.by_name(&ResolvedName::source("C", 0)).map(|s| s.id), Some(c));
    }
}
