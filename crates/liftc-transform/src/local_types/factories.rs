//! Parameter metadata for methods of lifted types.
//!
//! Later passes turn property bags like `({ x: 1, y: 2 })` into positional
//! argument lists using this metadata.

use super::LocalTypeConverter;
use liftc_hir::{DeclRole, NodeId, NodeKind, Tree};
use liftc_types::{Symbol, TypeId};

impl LocalTypeConverter<'_> {
    pub(super) fn store_parameter_metadata(&mut self) {
        let methods: Vec<(TypeId, NodeId)> = self
            .methods_by_type
            .iter()
            .flat_map(|(&ty, methods)| methods.iter().map(move |m| (ty, m.decl)))
            .collect();
        for (ty, decl) in methods {
            let tree = self.tree();
            let Some(parts) = tree.kind(decl).as_decl() else {
                continue;
            };
            if parts.parameter_names.is_some() {
                continue;
            }
            let has_shape = self
                .module
                .types
                .get(ty)
                .map_or(false, |shape| shape.methods.iter().any(|m| m.name == parts.name));
            let fun = tree
                .decl_init(decl)
                .filter(|&init| tree.kind(init).as_fun().is_some());
            let names = match fun {
                Some(fun) if has_shape => parameter_names(tree, fun),
                _ => None,
            };
            if let Some(names) = names {
                if let NodeKind::Decl(parts) = self.module.tree.kind_mut(decl) {
                    parts.parameter_names = Some(names);
                }
            }
        }
    }
}

/// Words of `fun`'s formals other than `this`, with a `None` marking where the
/// optional ones start (or the end, when none is optional). `None` if a
/// formal has no word or a required formal follows an optional one.
pub(super) fn parameter_names(tree: &Tree, fun: NodeId) -> Option<Vec<Option<Symbol>>> {
    let mut names = Vec::new();
    let mut saw_optional = false;
    for &formal in tree.fun_formals(fun) {
        let decl = tree.kind(formal).as_decl()?;
        if matches!(decl.role, DeclRole::ImpliedThis(_)) {
            continue;
        }
        let word = decl.word.clone()?;
        if decl.optional || decl.has_default {
            if !saw_optional {
                saw_optional = true;
                names.push(None);
            }
        } else if saw_optional {
            return None;
        }
        names.push(Some(word));
    }
    if !saw_optional {
        names.push(None);
    }
    Some(names)
}
