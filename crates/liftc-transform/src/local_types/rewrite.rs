//! Turning uses of captured variables into closure record accesses.

use super::LocalTypeConverter;
use liftc_hir::{Builtin, DeclRole, NameUse, NodeId, NodeKind, Planter, VisitCue};
use liftc_types::{ResolvedName, TypeId};
use std::collections::HashMap;

/// Where a captured variable lives: the property holding its record and its
/// slot in that record.
#[derive(Clone)]
struct Slot {
    property: ResolvedName,
    index: i64,
}

impl LocalTypeConverter<'_> {
    /// Rewrite captured variables in every method of `ty`.
    pub(super) fn rewrite_free_variable_uses(&mut self, ty: TypeId, fun: NodeId) {
        let mut slots: HashMap<ResolvedName, Slot> = HashMap::new();
        for record in &self.records {
            let Some(&alias) = record.type_wiring.get(&ty) else {
                continue;
            };
            let property = &self.aliases[alias].property;
            for (index, var) in record.vars.iter().enumerate() {
                slots.insert(
                    var.clone(),
                    Slot {
                        property: property.clone(),
                        index: index as i64,
                    },
                );
            }
        }
        if slots.is_empty() {
            return;
        }

        let tree = self.tree();
        let Some(body) = tree.fun_body(fun) else {
            return;
        };
        let mut methods: Vec<(NodeId, ResolvedName)> = Vec::new();
        tree.visit_preorder(body, &mut |id, node| {
            let NodeKind::Fun(f) = &node.kind else {
                return VisitCue::Continue;
            };
            if f.defines_type.is_some() {
                return VisitCue::SkipChildren;
            }
            let this = tree.fun_formals(id).iter().find_map(|&formal| {
                let decl = tree.kind(formal).as_decl()?;
                matches!(decl.role, DeclRole::ImpliedThis(_)).then(|| decl.name.clone())
            });
            match this {
                Some(this) => {
                    methods.push((id, this));
                    VisitCue::SkipChildren
                }
                None => VisitCue::Continue,
            }
        });

        for (method, this) in methods {
            self.rewrite_in_method(method, &this, &slots);
        }
    }

    /// Reads become `getCR(getp(prop, this), i)`; assignments become
    /// `setCR(getp(prop, this), i, value)`.
    fn rewrite_in_method(&mut self, method: NodeId, this: &ResolvedName, slots: &HashMap<ResolvedName, Slot>) {
        let tree = self.tree();
        let mut reads = Vec::new();
        let mut writes = Vec::new();
        tree.visit_preorder(method, &mut |id, node| {
            match &node.kind {
                NodeKind::Fun(f) if f.defines_type.is_some() => return VisitCue::SkipChildren,
                NodeKind::Name(name) if name.usage == NameUse::Read && slots.contains_key(&name.name) => {
                    reads.push(id);
                }
                NodeKind::Call => {
                    if let [callee, target, _] = node.children() {
                        let assigns_slot = tree.kind(*callee).builtin() == Some(Builtin::SetLocal)
                            && matches!(
                                tree.kind(*target).as_name(),
                                Some(n) if n.usage == NameUse::Write && slots.contains_key(&n.name)
                            );
                        if assigns_slot {
                            writes.push(id);
                        }
                    }
                }
                _ => {}
            }
            VisitCue::Continue
        });

        for read in reads {
            let tree = self.tree();
            let Some(name) = tree.kind(read).as_name() else {
                continue;
            };
            let slot = &slots[&name.name];
            let pos = tree.pos(read);
            let replacement = Planter::grow_one(&mut self.module.tree, pos, |p| {
                p.call_builtin(Builtin::GetCR, |p| {
                    p.at(pos.left_edge());
                    p.call_builtin(Builtin::Getp, |p| {
                        p.rn(&slot.property);
                        p.rn(this);
                    });
                    p.int(slot.index);
                });
            });
            self.module.tree.replace(read, replacement).into_root();
        }

        // Innermost first, so `a = (b = c)` still finds `b = c` under `a`.
        for write in writes.into_iter().rev() {
            let tree = self.tree();
            let &[_, target, value] = tree.children(write) else {
                continue;
            };
            let Some(name) = tree.kind(target).as_name() else {
                continue;
            };
            let slot = slots[&name.name].clone();
            let pos = tree.pos(write);
            let value = self.module.tree.detach(value);
            let replacement = Planter::grow_one(&mut self.module.tree, pos, |p| {
                p.call_builtin(Builtin::SetCR, |p| {
                    p.at(pos.left_edge());
                    p.call_builtin(Builtin::Getp, |p| {
                        p.rn(&slot.property);
                        p.rn(this);
                    });
                    p.int(slot.index);
                    p.replant(value);
                });
            });
            self.module.tree.replace(write, replacement).into_root();
        }
    }
}
