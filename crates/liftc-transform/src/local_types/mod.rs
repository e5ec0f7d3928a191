//! Closure conversion for locally defined types
//!
//! Classes and interfaces may be declared inside functions and refer to the
//! enclosing function's variables. Backends need every type declared once, at
//! module top level, with a fixed member list. This pass lifts local types to
//! the top level and makes their captures explicit:
//!
//! ```text
//! let f = fn (x) {
//!   class C { let m = fn (this) { x }; let constructor = fn (this) {} }
//!   new C()
//! }
//! ```
//!
//! becomes
//!
//! ```text
//! @fromType(C) let m = fn (this) { getCR(getp(cr__5, this), 0) };
//! @fromType(C) let constructor = fn (this, cr__6) { setp(cr__5, this, cr__6) };
//! @private @property(\cr__5) @fromType(C) let cr__5: ClosureRecord;
//! let f = fn (x) {
//!   let cr#4 = makeClosRec(\word, x, \getter, fn () => x);
//!   let C = C__0;
//!   new C(cr#4)
//! }
//! ```
//!
//! Variables declared in the same scope share one closure record. Each type
//! that needs a record reaches it through a property: abstract types declare
//! an abstract property, concrete types back it and override inherited
//! abstract ones. Constructors of concrete types take one extra parameter per
//! record, in record creation order, and every `new` site passes them.

mod constructors;
mod extract;
mod factories;
mod free_vars;
mod grouping;
mod properties;
mod records;
mod rewrite;


use indexmap::{IndexMap, IndexSet};
use liftc_diagnostics::Diagnostics;
use liftc_hir::{Module, NodeId, Orphan, Tree};
use liftc_types::{Abstractness, ResolvedName, Symbol, TypeId};
use std::collections::{HashMap, HashSet};

use properties::Propagation;

/// A type that was lifted to the module top level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedType {
    pub shape: TypeId,
    /// The top-level node right after the type's extracted members
    pub after_members: Option<NodeId>,
}

/// What the pass hands to the sealed-type checker and to backends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertedTypeInfo {
    pub types: Vec<ConvertedType>,
}

impl ConvertedTypeInfo {
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }
}

/// Lift every locally defined type in `module` to the top level.
///
/// Problems are reported to `diagnostics`; the pass always completes and
/// leaves captures it could not convert as they were.
pub fn convert_local_types(module: &mut Module, diagnostics: &mut Diagnostics) -> ConvertedTypeInfo {
    LocalTypeConverter::new(module, diagnostics).convert()
}

type RecordIdx = usize;
type AliasIdx = usize;

/// A method of a local type and the names it uses but does not declare.
struct MethodRecord {
    decl: NodeId,
    free_vars: IndexSet<ResolvedName>,
}

/// One closure record: the captured variables of a single scope.
/// Records are ordered by their index in [`LocalTypeConverter::records`].
struct ClosureRecordInfo {
    vars: Vec<ResolvedName>,
    /// `let cr#N = makeClosRec(...)`, until it is declared in its scope
    decl: Option<Orphan>,
    temporary: ResolvedName,
    containing_scope: NodeId,
    /// The alias through which each type's methods reach this record
    type_wiring: IndexMap<TypeId, AliasIdx>,
}

/// Links a record to the property of `owner` that holds it.
struct ClosureRecordAlias {
    record: RecordIdx,
    owner: TypeId,
    property: ResolvedName,
    symbol: Symbol,
    abstractness: Abstractness,
    constructor_parameter_index: Option<usize>,
}

struct LocalTypeConverter<'m> {
    module: &'m mut Module,
    diagnostics: &'m mut Diagnostics,
    /// Type-defining function of each local type
    type_definitions: IndexMap<TypeId, NodeId>,
    methods_by_type: IndexMap<TypeId, Vec<MethodRecord>>,
    /// Local names bound to a type-defining function
    type_bindings: HashMap<ResolvedName, TypeId>,
    vars_read: HashSet<ResolvedName>,
    vars_written: HashSet<ResolvedName>,
    records: Vec<ClosureRecordInfo>,
    aliases: Vec<ClosureRecordAlias>,
    properties_defined: HashMap<TypeId, Propagation>,
    used_symbols: HashMap<TypeId, HashSet<Symbol>>,
}

impl<'m> LocalTypeConverter<'m> {
    fn new(module: &'m mut Module, diagnostics: &'m mut Diagnostics) -> Self {
        Self {
            module,
            diagnostics,
            type_definitions: IndexMap::new(),
            methods_by_type: IndexMap::new(),
            type_bindings: HashMap::new(),
            vars_read: HashSet::new(),
            vars_written: HashSet::new(),
            records: Vec::new(),
            aliases: Vec::new(),
            properties_defined: HashMap::new(),
            used_symbols: HashMap::new(),
        }
    }

    fn tree(&self) -> &Tree {
        &self.module.tree
    }

    fn is_same_module(&self, ty: TypeId) -> bool {
        self.module
            .types
            .get(ty)
            .map_or(false, |shape| shape.module == self.module.name)
    }

    fn type_label(&self, ty: TypeId) -> String {
        self.module
            .types
            .get(ty)
            .map_or_else(|| format!("type#{}", ty), |shape| shape.name.to_string())
    }

    fn convert(mut self) -> ConvertedTypeInfo {
        let root = self.module.root;
        self.find_method_decls(root, None);
        let converted = self.find_converted();
        self.find_free_vars(&converted);
        self.log_methods();

        let free_vars: IndexSet<ResolvedName> = self
            .methods_by_type
            .values()
            .flatten()
            .flat_map(|method| method.free_vars.iter().cloned())
            .collect();
        for (scope, vars) in self.group_free_variables(&free_vars) {
            self.create_closure_record(scope, vars);
        }
        self.log_records();

        let local_types: Vec<TypeId> = self.methods_by_type.keys().copied().collect();
        for &ty in &local_types {
            self.define_properties_for_closure_records(ty);
        }
        self.log_properties();

        for &ty in &local_types {
            let concrete = self
                .module
                .types
                .get(ty)
                .map_or(false, |shape| shape.abstractness == Abstractness::Concrete);
            if concrete && self.is_same_module(ty) {
                self.add_constructor_parameters(ty);
            }
        }
        let definitions: Vec<(TypeId, NodeId)> =
            self.type_definitions.iter().map(|(&ty, &fun)| (ty, fun)).collect();
        for &(ty, _) in &definitions {
            self.check_for_missing_visibility(ty);
        }
        for &(ty, fun) in &definitions {
            if self.is_same_module(ty) {
                self.rewrite_free_variable_uses(ty, fun);
            }
        }

        self.store_parameter_metadata();
        let info = self.extract_members_to_root();
        self.curry_class_constructors();
        self.declare_closure_record_temporaries();
        info
    }

    fn log_methods(&self) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        log::debug!("Methods to convert:");
        for (&ty, methods) in &self.methods_by_type {
            for method in methods {
                let name = self
                    .tree()
                    .kind(method.decl)
                    .as_decl()
                    .map(|decl| decl.name.to_string())
                    .unwrap_or_default();
                let free: Vec<String> = method.free_vars.iter().map(|v| v.to_string()).collect();
                log::debug!("  {:<16} {:<16} {}", self.type_label(ty), name, free.join(","));
            }
        }
    }

    fn log_records(&self) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        log::debug!("Closure records:");
        for record in &self.records {
            let vars: Vec<String> = record.vars.iter().map(|v| v.to_string()).collect();
            log::debug!("  {:<16} {}", record.temporary.to_string(), vars.join(", "));
        }
    }

    fn log_properties(&self) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        log::debug!("Closure record properties:");
        for record in &self.records {
            for (&ty, &alias) in &record.type_wiring {
                let alias = &self.aliases[alias];
                log::debug!(
                    "  {:<16} {:<16} {} ({:?}, owned by {})",
                    record.temporary.to_string(),
                    self.type_label(ty),
                    alias.property,
                    alias.abstractness,
                    self.type_label(alias.owner),
                );
            }
        }
    }
}
