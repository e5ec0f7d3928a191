//! A compilation unit: one syntax tree plus the type shapes it defines or uses.

use crate::node::{NodeId, NodeKind};
use crate::shape::TypeRegistry;
use crate::tree::Tree;
use liftc_diagnostics::Span;
use liftc_types::{NameKind, NameMaker, ResolvedName, TypeId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Problems with a serialized module.
#[derive(Debug, Error)]
pub enum HirError {
    #[error("malformed module JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("root {0} is not a node of the tree")]
    MissingRoot(NodeId),

    #[error("root {root} has parent {parent}")]
    RootHasParent { root: NodeId, parent: NodeId },

    #[error("root {0} is not a block")]
    RootNotBlock(NodeId),

    #[error("{child} disagrees with its parent {parent:?} about their link")]
    ParentMismatch {
        child: NodeId,
        parent: Option<NodeId>,
    },

    #[error("{node} refers to unknown type #{ty}")]
    UnknownType { node: NodeId, ty: TypeId },

    #[error("type shape at index {index} claims id {id}")]
    ShapeIdMismatch { index: usize, id: TypeId },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub tree: Tree,
    /// The module-level block
    pub root: NodeId,
    pub types: TypeRegistry,
    #[serde(skip)]
    pub names: NameMaker,
}

impl Module {
    /// An empty module whose root is an empty block.
    pub fn new(name: impl Into<String>) -> Self {
        let mut tree = Tree::new();
        let root = tree
            .alloc(NodeKind::Block(Default::default()), Span::DUMMY)
            .into_root();
        Self {
            name: name.into(),
            tree,
            root,
            types: TypeRegistry::new(),
            names: NameMaker::new(),
        }
    }

    /// Load and validate a module. The name maker is reseeded so that fresh
    /// names never collide with names already in the module.
    pub fn from_json(json: &str) -> Result<Self, HirError> {
        let mut module: Module = serde_json::from_str(json)?;
        module.validate()?;
        module.names = NameMaker::starting_after(module.max_uid());
        Ok(module)
    }

    pub fn to_json(&self) -> Result<String, HirError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the structural invariants passes rely on.
    pub fn validate(&self) -> Result<(), HirError> {
        if !self.tree.contains(self.root) {
            return Err(HirError::MissingRoot(self.root));
        }
        if let Some(parent) = self.tree.parent(self.root) {
            return Err(HirError::RootHasParent {
                root: self.root,
                parent,
            });
        }
        if !self.tree.kind(self.root).is_block() {
            return Err(HirError::RootNotBlock(self.root));
        }
        if let Some(&(child, parent)) = self.tree.inconsistencies().first() {
            return Err(HirError::ParentMismatch { child, parent });
        }
        for (index, shape) in self.types.iter().enumerate() {
            if shape.id as usize != index {
                return Err(HirError::ShapeIdMismatch {
                    index,
                    id: shape.id,
                });
            }
        }
        for node in self.tree.preorder(self.root) {
            if let Some(ty) = self.referenced_type(node) {
                if self.types.get(ty).is_none() {
                    return Err(HirError::UnknownType { node, ty });
                }
            }
        }
        Ok(())
    }

    fn referenced_type(&self, node: NodeId) -> Option<TypeId> {
        use crate::node::DeclRole;
        match self.tree.kind(node) {
            NodeKind::Fun(fun) => fun.defines_type,
            NodeKind::Decl(decl) => match decl.role {
                DeclRole::ImpliedThis(ty) | DeclRole::TypeDecl(ty) | DeclRole::TypePlaceholder(ty) => {
                    Some(ty)
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Largest uid of any non-builtin name in the tree or the type shapes.
    pub fn max_uid(&self) -> u32 {
        let mut max = 0;
        let mut see = |name: &ResolvedName| {
            if name.kind != NameKind::Builtin {
                max = max.max(name.uid);
            }
        };
        for index in 0..self.tree.len() {
            match self.tree.kind(NodeId(index as u32)) {
                NodeKind::Decl(decl) => see(&decl.name),
                NodeKind::Name(name) => see(&name.name),
                NodeKind::Block(block) => {
                    if let Some(label) = &block.label {
                        see(label);
                    }
                }
                _ => {}
            }
        }
        for shape in self.types.iter() {
            see(&shape.name);
            for member in shape.members() {
                see(member.name());
            }
        }
        max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::DeclNode;
    use crate::planter::Planter;
    use liftc_types::Abstractness;

    fn sample() -> Module {
        let mut module = Module::new("test");
        let c = module
            .types
            .define(ResolvedName::source("C", 4), "test", Abstractness::Concrete);
        let x = ResolvedName::source("x", 9);
        let stmts = Planter::grow(&mut module.tree, Span::DUMMY, |p| {
            p.decl(DeclNode::local(x.clone()), |p| p.int(1));
            p.type_fun(c, |p| p.block(|_| {}));
        });
        let root = module.root;
        module.tree.insert_children(root, 0, stmts);
        module
    }

    #[test]
    fn test_json_round_trip_reseeds_names() {
        let module = sample();
        let json = module.to_json().unwrap();
        let mut loaded = Module::from_json(&json).unwrap();
        assert_eq!(loaded.tree.children(loaded.root).len(), 2);
        assert_eq!(loaded.types.len(), 1);
        assert_eq!(loaded.max_uid(), 9);
        assert_eq!(loaded.names.unused_temporary_name("cr").uid, 10);
    }

    #[test]
    fn test_rejects_unknown_type() {
        let mut module = sample();
        module.types = TypeRegistry::new();
        let json = module.to_json().unwrap();
        assert!(matches!(
            Module::from_json(&json),
            Err(HirError::UnknownType { ty: 0, .. })
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(Module::from_json("{"), Err(HirError::Json(_))));
    }
}
