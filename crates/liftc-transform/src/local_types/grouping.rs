//! Grouping captured variables by the scope that declares them.

use super::LocalTypeConverter;
use indexmap::{IndexMap, IndexSet};
use liftc_diagnostics::{Diagnostic, DiagnosticCode};
use liftc_hir::{NodeId, NodeKind};
use liftc_types::ResolvedName;

impl LocalTypeConverter<'_> {
    /// Pair each scope with the free variables declared directly in it.
    /// Formal parameters belong to their function's body so that a function's
    /// parameters and locals share one record.
    pub(super) fn group_free_variables(
        &mut self,
        free_vars: &IndexSet<ResolvedName>,
    ) -> Vec<(NodeId, Vec<ResolvedName>)> {
        let mut decls: IndexMap<ResolvedName, Vec<NodeId>> = IndexMap::new();
        self.find_variables(self.module.root, 0, free_vars, &mut decls);
        if log::log_enabled!(log::Level::Trace) {
            log::trace!("Free variable declarations:");
            for (var, ds) in &decls {
                for &d in ds {
                    log::trace!("  {:<16} {}", var.to_string(), liftc_hir::pseudo::render(self.tree(), d));
                }
            }
        }

        let mut groups: IndexMap<NodeId, Vec<ResolvedName>> = IndexMap::new();
        for (name, decl_list) in decls {
            if let [first, second, ..] = &decl_list[..] {
                let tree = self.tree();
                let diagnostic = Diagnostic::error(
                    DiagnosticCode::CannotCaptureMultiplyDeclared,
                    format!("cannot capture `{}`: it is declared more than once", name),
                )
                .with_span(tree.pos(*first))
                .with_label(tree.pos(*second), "also declared here")
                .with_value(&name)
                .with_value(format!("{}..{}", tree.pos(*second).start, tree.pos(*second).end))
                .build();
                log::debug!("leaving {} unconverted: declared {} times", name, decl_list.len());
                self.diagnostics.push(diagnostic);
                continue;
            }
            let tree = self.tree();
            let Some(parent) = tree.parent(decl_list[0]) else {
                continue;
            };
            let scope = match tree.kind(parent) {
                NodeKind::Fun(_) => tree.fun_body(parent).unwrap_or(parent),
                _ => parent,
            };
            groups.entry(scope).or_default().push(name);
        }
        groups.into_iter().collect()
    }

    /// Collect declarations of free variables that are not at module level.
    fn find_variables(
        &self,
        node: NodeId,
        fn_depth: usize,
        free_vars: &IndexSet<ResolvedName>,
        decls: &mut IndexMap<ResolvedName, Vec<NodeId>>,
    ) {
        let tree = self.tree();
        let fn_depth = match tree.kind(node) {
            NodeKind::Fun(_) => fn_depth + 1,
            NodeKind::Decl(decl) if fn_depth > 0 && free_vars.contains(&decl.name) => {
                decls.entry(decl.name.clone()).or_default().push(node);
                fn_depth
            }
            _ => fn_depth,
        };
        for &child in tree.children(node) {
            self.find_variables(child, fn_depth, free_vars, decls);
        }
    }
}
