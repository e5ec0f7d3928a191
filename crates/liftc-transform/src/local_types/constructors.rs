//! Threading closure records through constructors and construction sites.

use super::{AliasIdx, LocalTypeConverter};
use liftc_diagnostics::{Diagnostic, DiagnosticCode};
use liftc_hir::{pseudo, Builtin, DeclNode, DeclRole, NodeId, NodeKind, Orphan, Planter, Value};
use liftc_types::{Abstractness, ResolvedName, Symbol, Type, TypeId};

impl LocalTypeConverter<'_> {
    /// Aliases whose property belongs to `ty` itself, in record order.
    fn owned_aliases(&self, ty: TypeId) -> Vec<AliasIdx> {
        let mut owned: Vec<AliasIdx> = self
            .records
            .iter()
            .filter_map(|record| record.type_wiring.get(&ty).copied())
            .filter(|&alias| self.aliases[alias].owner == ty)
            .collect();
        owned.sort_by_key(|&alias| self.aliases[alias].record);
        owned
    }

    /// Give every constructor of concrete `ty` one parameter per record the
    /// type stores, right after `this`, and store each into its property.
    pub(super) fn add_constructor_parameters(&mut self, ty: TypeId) {
        let owned = self.owned_aliases(ty);
        if owned.is_empty() {
            return;
        }
        let constructor = Symbol::constructor();
        let constructors: Vec<NodeId> = match self.module.types.get(ty) {
            Some(shape) => shape
                .members_matching(&constructor)
                .filter_map(|member| member.decl())
                .collect(),
            None => return,
        };

        for decl in constructors {
            let tree = self.tree();
            let Some(fun) = tree
                .decl_init(decl)
                .filter(|&init| tree.kind(init).as_fun().is_some())
            else {
                continue;
            };
            let this_decl = tree.fun_formals(fun).iter().copied().find(|&formal| {
                matches!(
                    tree.kind(formal).as_decl().map(|d| &d.role),
                    Some(DeclRole::ImpliedThis(_))
                )
            });
            let Some(this_decl) = this_decl else {
                continue;
            };
            let Some(this_name) = tree.kind(this_decl).as_decl().map(|d| d.name.clone()) else {
                continue;
            };
            let Some(this_index) = tree.index_in_parent(this_decl) else {
                continue;
            };
            let Some(body) = tree.fun_body(fun) else {
                continue;
            };
            log::debug!(
                "Constructor of {} before:\n{}",
                self.type_label(ty),
                pseudo::render(tree, fun)
            );

            let pos = tree.pos(this_decl).left_edge();
            let mut formals: Vec<Orphan> = Vec::with_capacity(owned.len());
            let mut property_sets: Vec<Orphan> = Vec::with_capacity(owned.len());
            for (index, &alias) in owned.iter().enumerate() {
                let formal_name = self.module.names.unused_source_name("cr");
                let property = self.aliases[alias].property.clone();
                formals.push(Planter::grow_one(&mut self.module.tree, pos, |p| {
                    p.bare_decl(
                        DeclNode::local(formal_name.clone())
                            .with_type(Type::ClosureRecord)
                            .synthetic(),
                    );
                }));
                property_sets.push(Planter::grow_one(&mut self.module.tree, pos, |p| {
                    p.call_builtin(Builtin::Setp, |p| {
                        p.ln(&property);
                        p.rn(&this_name);
                        p.rn(&formal_name);
                    });
                }));
                self.aliases[alias].constructor_parameter_index = Some(index);
            }

            let tree = &mut self.module.tree;
            let body = if tree.kind(body).is_block() {
                body
            } else {
                tree.wrap_in_block(body)
            };
            tree.insert_children(fun, this_index + 1, formals);
            tree.insert_children(body, 0, property_sets);
            log::debug!(
                "Constructor of {} after:\n{}",
                self.type_label(ty),
                pseudo::render(self.tree(), fun)
            );
        }
    }

    /// Concrete types must give every member an explicit visibility.
    /// Reported once per type.
    pub(super) fn check_for_missing_visibility(&mut self, ty: TypeId) {
        let Some(shape) = self.module.types.get(ty) else {
            return;
        };
        if shape.abstractness == Abstractness::Abstract {
            return;
        }
        let tree = self.tree();
        let missing: Vec<(String, NodeId)> = shape
            .members()
            .filter_map(|member| {
                let decl = member.decl()?;
                let parts = tree.kind(decl).as_decl()?;
                parts
                    .visibility
                    .is_none()
                    .then(|| (member.name().to_string(), decl))
            })
            .collect();
        let Some(&(_, first)) = missing.first() else {
            return;
        };
        let names: Vec<&str> = missing.iter().map(|(name, _)| name.as_str()).collect();
        let mut builder = Diagnostic::error(
            DiagnosticCode::MissingMemberVisibility,
            format!(
                "members of {} need an explicit visibility: {}",
                shape.name,
                names.join(", ")
            ),
        )
        .with_span(tree.pos(first))
        .with_value(&shape.name);
        for (name, _) in &missing {
            builder = builder.with_value(name);
        }
        let diagnostic = builder.build();
        self.diagnostics.push(diagnostic);
    }

    /// Pass the records a type stores to every `new` of that type.
    pub(super) fn curry_class_constructors(&mut self) {
        let tree = self.tree();
        let news: Vec<NodeId> = tree
            .preorder(self.module.root)
            .into_iter()
            .filter(|&call| {
                matches!(tree.kind(call), NodeKind::Call)
                    && tree.children(call).len() >= 2
                    && tree.kind(tree.children(call)[0]).builtin() == Some(Builtin::New)
            })
            .collect();

        for call in news {
            let tree = self.tree();
            let mut type_node = tree.children(call)[1];
            if matches!(tree.kind(type_node), NodeKind::Call)
                && tree.children(type_node).len() >= 2
                && tree.kind(tree.children(type_node)[0]).builtin() == Some(Builtin::Angle)
            {
                type_node = tree.children(type_node)[1];
            }
            let Some(ty) = self.constructed_type(type_node) else {
                continue;
            };
            let mut aliases: Vec<AliasIdx> = self
                .owned_aliases(ty)
                .into_iter()
                .filter(|&alias| self.aliases[alias].constructor_parameter_index.is_some())
                .collect();
            if aliases.is_empty() {
                continue;
            }
            aliases.sort_by_key(|&alias| self.aliases[alias].constructor_parameter_index);

            let pos = tree.pos(type_node).right_edge();
            let method = self.enclosing_method(call);
            let mut args = Vec::with_capacity(aliases.len());
            for alias in aliases {
                let record = &self.records[self.aliases[alias].record];
                // Inside a lifted method the temporary is out of scope, but
                // the method's own type may hold the same record.
                let through_this = method.as_ref().and_then(|(outer, this)| {
                    let outer_alias = record.type_wiring.get(outer)?;
                    Some((self.aliases[*outer_alias].property.clone(), this.clone()))
                });
                let temporary = record.temporary.clone();
                args.push(Planter::grow_one(&mut self.module.tree, pos, |p| {
                    match &through_this {
                        Some((property, this)) => p.call_builtin(Builtin::Getp, |p| {
                            p.rn(property);
                            p.rn(this);
                        }),
                        None => p.rn(&temporary),
                    }
                }));
            }
            if method.is_some() {
                // A local binding of the type is out of scope too.
                if matches!(self.tree().kind(type_node), NodeKind::Name(_)) {
                    let reified = Planter::grow_one(&mut self.module.tree, pos, |p| {
                        p.value(Value::Type(ty));
                    });
                    self.module.tree.replace(type_node, reified).into_root();
                }
            }
            self.module.tree.insert_children(call, 2, args);
        }
    }

    /// The type named by the type operand of `new`.
    fn constructed_type(&self, node: NodeId) -> Option<TypeId> {
        match self.tree().kind(node) {
            NodeKind::Value(Value::Type(ty)) => Some(*ty),
            NodeKind::Name(name) => self
                .type_bindings
                .get(&name.name)
                .copied()
                .or_else(|| self.module.types.by_name(&name.name).map(|shape| shape.id)),
            _ => None,
        }
    }

    /// The type and `this` of the innermost method around `node`.
    fn enclosing_method(&self, node: NodeId) -> Option<(TypeId, ResolvedName)> {
        let tree = self.tree();
        tree.ancestors(node)
            .filter(|&ancestor| tree.kind(ancestor).as_fun().is_some())
            .find_map(|fun| {
                tree.fun_formals(fun).iter().find_map(|&formal| {
                    let decl = tree.kind(formal).as_decl()?;
                    match decl.role {
                        DeclRole::ImpliedThis(ty) => Some((ty, decl.name.clone())),
                        _ => None,
                    }
                })
            })
    }
}
