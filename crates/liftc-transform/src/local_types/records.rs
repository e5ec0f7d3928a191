//! Building closure records and declaring them where their variables live.

use super::{ClosureRecordInfo, LocalTypeConverter, RecordIdx};
use indexmap::IndexMap;
use liftc_hir::{Builtin, DeclNode, NodeId, Orphan, Planter, Value};
use liftc_types::{ResolvedName, Symbol, Type};

impl LocalTypeConverter<'_> {
    /// Synthesize `let cr#N = makeClosRec(\word, x, \getter, fn () => x, ...)`
    /// for the variables of one scope. Getters and setters are only built for
    /// variables that some method reads or writes.
    pub(super) fn create_closure_record(&mut self, scope: NodeId, vars: Vec<ResolvedName>) -> RecordIdx {
        let pos = self.tree().pos(scope).left_edge();
        let temporary = self.module.names.unused_temporary_name("cr");
        let mut slots = Vec::with_capacity(vars.len());
        for var in &vars {
            let getter = self.vars_read.contains(var);
            let setter_param = if self.vars_written.contains(var) {
                Some(self.module.names.unused_temporary_name("v"))
            } else {
                None
            };
            slots.push((var, getter, setter_param));
        }

        let decl = Planter::grow_one(&mut self.module.tree, pos, |p| {
            p.decl(DeclNode::local(temporary.clone()).with_type(Type::ClosureRecord), |p| {
                p.call_builtin(Builtin::MakeClosRec, |p| {
                    for (var, getter, setter_param) in &slots {
                        p.value(Value::Symbol(Symbol::new("word")));
                        p.ln(var);
                        if *getter {
                            p.value(Value::Symbol(Symbol::new("getter")));
                            p.fun(|p| p.rn(var));
                        }
                        if let Some(new_value) = setter_param {
                            p.value(Value::Symbol(Symbol::new("setter")));
                            p.fun(|p| {
                                p.bare_decl(DeclNode::local(new_value.clone()));
                                p.call_builtin(Builtin::SetLocal, |p| {
                                    p.ln(var);
                                    p.rn(new_value);
                                });
                            });
                        }
                    }
                });
            });
        });

        self.records.push(ClosureRecordInfo {
            vars,
            decl: Some(decl),
            temporary,
            containing_scope: scope,
            type_wiring: IndexMap::new(),
        });
        self.records.len() - 1
    }

    /// Put each record's declaration at the start of its scope, wrapping the
    /// scope in a block when it is a bare expression.
    pub(super) fn declare_closure_record_temporaries(&mut self) {
        let mut by_scope: IndexMap<NodeId, Vec<Orphan>> = IndexMap::new();
        for record in &mut self.records {
            if let Some(decl) = record.decl.take() {
                by_scope.entry(record.containing_scope).or_default().push(decl);
            }
        }
        for (scope, decls) in by_scope {
            let tree = &mut self.module.tree;
            let block = if tree.kind(scope).is_block() {
                scope
            } else if tree.parent(scope).is_some() {
                tree.wrap_in_block(scope)
            } else {
                log::warn!("closure record scope {} is detached; dropping its records", scope);
                continue;
            };
            tree.insert_children(block, 0, decls);
        }
    }
}
