//! Finding local types, their methods, and the variables those methods capture.

use super::{LocalTypeConverter, MethodRecord};
use indexmap::IndexMap;
use liftc_hir::{DeclRole, NameUse, NodeId, NodeKind, VisitCue};
use liftc_types::{NameKind, ResolvedName, TypeId};
use std::collections::HashSet;

/// Names that are defined by a local type and so never captured by it.
pub(super) type ConvertedNames = IndexMap<TypeId, HashSet<ResolvedName>>;

impl LocalTypeConverter<'_> {
    /// Register every type-defining function and the method declarations in
    /// its body. `ty` is the type whose body `node` is in.
    pub(super) fn find_method_decls(&mut self, node: NodeId, ty: Option<TypeId>) {
        let mut ty_for_children = ty;
        match self.module.tree.kind(node) {
            NodeKind::Fun(fun) => {
                if let Some(defined) = fun.defines_type {
                    if self.module.types.get(defined).is_some() {
                        ty_for_children = Some(defined);
                        self.type_definitions.insert(defined, node);
                        // Types without methods still need extracting.
                        self.methods_by_type.entry(defined).or_default();
                    }
                }
            }
            NodeKind::Decl(decl) => {
                if matches!(decl.role, DeclRole::Method { .. }) {
                    if let Some(ty) = ty {
                        self.methods_by_type.entry(ty).or_default().push(MethodRecord {
                            decl: node,
                            free_vars: Default::default(),
                        });
                    }
                }
                let bound = match decl.role {
                    DeclRole::TypeDecl(bound) => Some(bound),
                    _ => self
                        .module
                        .tree
                        .decl_init(node)
                        .and_then(|init| self.module.tree.kind(init).type_defined()),
                };
                if let Some(bound) = bound {
                    self.type_bindings.insert(decl.name.clone(), bound);
                }
            }
            _ => {}
        }
        for child in self.module.tree.children(node).to_vec() {
            self.find_method_decls(child, ty_for_children);
        }
    }

    /// Per local type: its name, every name declared in its body including
    /// block labels, plus the members of and names bound to every local type.
    pub(super) fn find_converted(&self) -> ConvertedNames {
        let tree = self.tree();
        let mut shared: HashSet<ResolvedName> = self.type_bindings.keys().cloned().collect();
        let mut converted = ConvertedNames::new();
        for (&ty, &fun) in &self.type_definitions {
            let mut names = HashSet::new();
            if let Some(shape) = self.module.types.get(ty) {
                names.insert(shape.name.clone());
            }
            if let Some(body) = tree.fun_body(fun) {
                tree.visit_preorder(body, &mut |_, node| {
                    match &node.kind {
                        NodeKind::Decl(decl) => {
                            if decl.role.is_type_member() {
                                shared.insert(decl.name.clone());
                            }
                            names.insert(decl.name.clone());
                        }
                        NodeKind::Block(block) => {
                            if let Some(label) = &block.label {
                                names.insert(label.clone());
                            }
                        }
                        _ => {}
                    }
                    VisitCue::Continue
                });
            }
            converted.insert(ty, names);
        }
        for names in converted.values_mut() {
            names.extend(shared.iter().cloned());
        }
        converted
    }

    /// Fill in each method's free variables and note which are read or written.
    pub(super) fn find_free_vars(&mut self, converted: &ConvertedNames) {
        let empty = HashSet::new();
        let mut reads = Vec::new();
        let mut writes = Vec::new();
        let tree = &self.module.tree;
        for (ty, methods) in self.methods_by_type.iter_mut() {
            let converted = converted.get(ty).unwrap_or(&empty);
            for method in methods.iter_mut() {
                tree.visit_preorder(method.decl, &mut |_, node| match &node.kind {
                    // A nested type captures for itself.
                    NodeKind::Fun(fun) if fun.defines_type.is_some() => VisitCue::SkipChildren,
                    NodeKind::Name(name) => {
                        if name.name.kind != NameKind::Builtin && !converted.contains(&name.name) {
                            method.free_vars.insert(name.name.clone());
                            match name.usage {
                                NameUse::Read => reads.push(name.name.clone()),
                                NameUse::Write => writes.push(name.name.clone()),
                            }
                        }
                        VisitCue::Continue
                    }
                    _ => VisitCue::Continue,
                });
            }
        }
        self.vars_read.extend(reads);
        self.vars_written.extend(writes);
    }
}
