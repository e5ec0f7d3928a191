//! Giving each type a property through which its methods reach their records.

use super::{AliasIdx, ClosureRecordAlias, LocalTypeConverter, RecordIdx};
use indexmap::{IndexMap, IndexSet};
use liftc_diagnostics::{Diagnostic, DiagnosticCode};
use liftc_hir::{
    Builtin, DeclNode, DeclRole, MethodShape, NodeId, Planter, PropertyShape, SuperType,
};
use liftc_types::{Abstractness, MethodKind, ResolvedName, Symbol, Type, TypeId, Visibility};
use std::collections::HashSet;

/// Records a type can reach, each with the aliases it inherits or defines.
pub(super) type InheritedAliases = IndexMap<RecordIdx, Vec<AliasIdx>>;

pub(super) enum Propagation {
    InProgress,
    Done(InheritedAliases),
}

/// An abstract property a concrete type must implement.
struct Override {
    symbol: Symbol,
    backing: ResolvedName,
}

impl LocalTypeConverter<'_> {
    /// Make sure instances of `ty` can reach every record that `ty` or one of
    /// its supertypes needs. Supertypes are handled first.
    pub(super) fn define_properties_for_closure_records(&mut self, ty: TypeId) -> InheritedAliases {
        match self.properties_defined.get(&ty) {
            Some(Propagation::Done(aliases)) => return aliases.clone(),
            Some(Propagation::InProgress) => {
                self.report_supertype_cycle(ty);
                return InheritedAliases::new();
            }
            None => {}
        }
        self.properties_defined.insert(ty, Propagation::InProgress);

        let needed = self.needed_records(ty);

        let mut inherited = InheritedAliases::new();
        let super_types: Vec<TypeId> = self
            .module
            .types
            .get(ty)
            .map(|shape| shape.super_type_ids().collect())
            .unwrap_or_default();
        for super_type in super_types {
            if self.module.types.get(super_type).is_none() {
                continue;
            }
            // Recurse even into other modules' types: they may extend ours.
            for (record, aliases) in self.define_properties_for_closure_records(super_type) {
                inherited.entry(record).or_default().extend(aliases);
            }
        }

        let definition = self.type_definitions.get(&ty).copied();
        if let (Some(fun), true) = (definition, self.is_same_module(ty)) {
            let abstractness = self
                .module
                .types
                .get(ty)
                .map_or(Abstractness::Concrete, |shape| shape.abstractness);
            let mut all_needed: Vec<RecordIdx> =
                needed.into_iter().chain(inherited.keys().copied()).collect();
            all_needed.sort_unstable();
            all_needed.dedup();

            for record in all_needed {
                let inherited_aliases = inherited.get(&record).cloned().unwrap_or_default();
                let alias = match abstractness {
                    Abstractness::Abstract => match inherited_aliases.first() {
                        Some(&alias) => alias,
                        None => {
                            let alias = self.define_property(
                                record,
                                ty,
                                fun,
                                Visibility::Protected,
                                Abstractness::Abstract,
                                None,
                            );
                            inherited.entry(record).or_default().push(alias);
                            alias
                        }
                    },
                    Abstractness::Concrete => {
                        // Every concrete type stores its own copy, even below a
                        // concrete supertype.
                        let backed = self.define_property(
                            record,
                            ty,
                            fun,
                            Visibility::Private,
                            Abstractness::Concrete,
                            None,
                        );
                        let backing = self.aliases[backed].property.clone();
                        for &alias in &inherited_aliases {
                            if self.aliases[alias].abstractness != Abstractness::Abstract {
                                continue;
                            }
                            let symbol = self.aliases[alias].symbol.clone();
                            self.define_property(
                                record,
                                ty,
                                fun,
                                Visibility::Private,
                                Abstractness::Abstract,
                                Some(Override {
                                    symbol,
                                    backing: backing.clone(),
                                }),
                            );
                        }
                        inherited.entry(record).or_default().push(backed);
                        backed
                    }
                };
                self.records[record].type_wiring.insert(ty, alias);
            }
        }

        self.properties_defined
            .insert(ty, Propagation::Done(inherited.clone()));
        inherited
    }

    /// Records the methods of `ty` read or write.
    fn direct_needs(&self, ty: TypeId) -> IndexSet<RecordIdx> {
        let mut needed = IndexSet::new();
        if let Some(methods) = self.methods_by_type.get(&ty) {
            let free_vars: HashSet<&ResolvedName> =
                methods.iter().flat_map(|m| m.free_vars.iter()).collect();
            for (idx, record) in self.records.iter().enumerate() {
                if record.vars.iter().any(|v| free_vars.contains(v)) {
                    needed.insert(idx);
                }
            }
        }
        needed
    }

    /// Direct needs of `ty`, plus the needs of types defined inside `ty`'s
    /// body whose record is built outside `ty`. A lifted method of `ty`
    /// reaches those only through `this`.
    fn needed_records(&self, ty: TypeId) -> IndexSet<RecordIdx> {
        let mut needed = self.direct_needs(ty);
        let Some(&fun) = self.type_definitions.get(&ty) else {
            return needed;
        };
        let tree = self.tree();
        let inside = |node: NodeId| node == fun || tree.ancestors(node).any(|a| a == fun);
        for (&nested, &nested_fun) in &self.type_definitions {
            if nested == ty || !inside(nested_fun) {
                continue;
            }
            for record in self.direct_needs(nested) {
                if !inside(self.records[record].containing_scope) {
                    needed.insert(record);
                }
            }
        }
        needed
    }

    fn report_supertype_cycle(&mut self, ty: TypeId) {
        let (name, pos) = match self.module.types.get(ty) {
            Some(shape) => (shape.name.to_string(), shape.pos),
            None => (format!("type#{}", ty), Default::default()),
        };
        log::debug!("supertype cycle through {}", name);
        self.diagnostics.push(
            Diagnostic::warning(
                DiagnosticCode::SupertypeCycle,
                format!("{} is its own supertype", name),
            )
            .with_span(pos)
            .with_value(name)
            .build(),
        );
    }

    /// The body block of a type-defining function.
    fn type_body(&mut self, fun: NodeId) -> Option<NodeId> {
        let tree = &mut self.module.tree;
        let body = tree.fun_body(fun)?;
        if tree.kind(body).is_block() {
            Some(body)
        } else {
            Some(tree.wrap_in_block(body))
        }
    }

    /// Add a property holding `record` to the end of `ty`'s body. With an
    /// override, the property implements an inherited abstract one by reading
    /// the backing property through a getter.
    fn define_property(
        &mut self,
        record: RecordIdx,
        ty: TypeId,
        fun: NodeId,
        visibility: Visibility,
        abstractness: Abstractness,
        overriding: Option<Override>,
    ) -> AliasIdx {
        let body = self.type_body(fun);
        let name = self.module.names.unused_source_name("cr");
        let symbol = match &overriding {
            Some(o) => o.symbol.clone(),
            None => self.unused_symbol(ty, &name),
        };

        let mut decl_id = None;
        if let Some(body) = body {
            let pos = self.tree().pos(body).right_edge();
            let decl = Planter::grow_one(&mut self.module.tree, pos, |p| {
                p.bare_decl(
                    DeclNode::new(
                        name.clone(),
                        DeclRole::Property {
                            symbol: symbol.clone(),
                            abstractness,
                        },
                    )
                    .with_visibility(visibility)
                    .with_type(Type::ClosureRecord)
                    .synthetic(),
                );
            });
            decl_id = Some(decl.id());
            self.module.tree.push_child(body, decl);
        }

        let getter = match (overriding, body) {
            (Some(o), Some(body)) => Some(self.define_delegating_getter(ty, body, &o.symbol, &o.backing)),
            _ => None,
        };

        if let Some(shape) = self.module.types.get_mut(ty) {
            shape.properties.push(PropertyShape {
                enclosing: ty,
                name: name.clone(),
                symbol: symbol.clone(),
                decl: decl_id,
                visibility,
                abstractness,
                getter,
                setter: None,
            });
        }

        self.aliases.push(ClosureRecordAlias {
            record,
            owner: ty,
            property: name,
            symbol,
            abstractness,
            constructor_parameter_index: None,
        });
        self.aliases.len() - 1
    }

    /// `@getter(\sym) let get.cr = fn (this) { getp(backing, this) }`
    fn define_delegating_getter(
        &mut self,
        ty: TypeId,
        body: NodeId,
        symbol: &Symbol,
        backing: &ResolvedName,
    ) -> ResolvedName {
        let getter_name = self.module.names.unused_source_name("get.cr");
        let this_name = self.module.names.unused_source_name("this");
        let visibility = Visibility::Protected;
        let pos = self.tree().pos(body).right_edge();
        let decl = Planter::grow_one(&mut self.module.tree, pos, |p| {
            let role = DeclRole::Method {
                symbol: symbol.clone(),
                kind: MethodKind::Getter,
            };
            p.decl(
                DeclNode::new(getter_name.clone(), role)
                    .with_visibility(visibility)
                    .synthetic(),
                |p| {
                    p.fun(|p| {
                        p.bare_decl(
                            DeclNode::new(this_name.clone(), DeclRole::ImpliedThis(ty))
                                .with_type(Type::Named(ty)),
                        );
                        p.call_builtin(Builtin::Getp, |p| {
                            p.rn(backing);
                            p.rn(&this_name);
                        });
                    });
                },
            );
        });
        let decl_id = decl.id();
        self.module.tree.push_child(body, decl);

        // Extracted and given parameter metadata like any other method.
        self.methods_by_type.entry(ty).or_default().push(super::MethodRecord {
            decl: decl_id,
            free_vars: Default::default(),
        });
        if let Some(shape) = self.module.types.get_mut(ty) {
            shape.methods.push(MethodShape {
                enclosing: ty,
                name: getter_name.clone(),
                symbol: symbol.clone(),
                decl: Some(decl_id),
                visibility,
                kind: MethodKind::Getter,
                open: false,
            });
        }
        getter_name
    }

    /// A symbol for a synthesized member of `ty` that no member of `ty` or
    /// of its supertypes uses.
    fn unused_symbol(&mut self, ty: TypeId, name: &ResolvedName) -> Symbol {
        let used = self.used_symbols(ty);
        let mut candidate = Symbol::new(name.to_string());
        while used.contains(&candidate) {
            candidate = Symbol::new(self.module.names.unused_source_name(&name.base).to_string());
        }
        self.used_symbols
            .entry(ty)
            .or_default()
            .insert(candidate.clone());
        candidate
    }

    fn used_symbols(&mut self, ty: TypeId) -> HashSet<Symbol> {
        if let Some(used) = self.used_symbols.get(&ty) {
            return used.clone();
        }
        // Seeded empty so that supertype cycles terminate.
        self.used_symbols.insert(ty, HashSet::new());
        let mut used = HashSet::new();
        let super_types: Vec<SuperType> = self
            .module
            .types
            .get(ty)
            .map(|shape| shape.super_types.clone())
            .unwrap_or_default();
        for super_type in super_types.iter().filter_map(|st| st.definition) {
            used.extend(self.used_symbols(super_type));
        }
        if let Some(shape) = self.module.types.get(ty) {
            used.extend(shape.members().map(|m| m.symbol().clone()));
        }
        self.used_symbols.insert(ty, used.clone());
        used
    }
}
