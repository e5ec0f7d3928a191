//! Moving the members of local types to the module top level.

use super::{ConvertedType, ConvertedTypeInfo, LocalTypeConverter};
use liftc_hir::{Builtin, DeclNode, DeclRole, NodeId, NodeKind, Orphan, Planter, Value};
use liftc_types::{Type, TypeId};

impl LocalTypeConverter<'_> {
    /// Replant each local type's body statements at the top level, before the
    /// top-level statement that contains the type. Members are tagged with the
    /// type they came from and the type-defining function collapses to the
    /// reified type.
    pub(super) fn extract_members_to_root(&mut self) -> ConvertedTypeInfo {
        let mut converted = Vec::new();
        let local_types: Vec<TypeId> = self.methods_by_type.keys().copied().collect();
        for ty in local_types {
            let Some(&fun) = self.type_definitions.get(&ty) else {
                continue;
            };
            let Some(anchor) = self.insertion_point(fun) else {
                log::warn!("{} is not under the module root; left in place", self.type_label(ty));
                continue;
            };

            let tree = self.tree();
            let body = tree.fun_body(fun);
            let statements: Vec<NodeId> = match body {
                Some(body) if tree.kind(body).is_block() => tree
                    .children(body)
                    .iter()
                    .copied()
                    .filter(|&s| !(tree.kind(s).is_block() && tree.children(s).is_empty()))
                    .collect(),
                Some(body) => vec![body],
                None => Vec::new(),
            };
            let pos = body.map_or_else(|| tree.pos(fun), |body| tree.pos(body)).left_edge();

            let mut extracted: Vec<Orphan> = Vec::with_capacity(statements.len());
            let mut member_count = 0;
            for statement in statements {
                if let NodeKind::Decl(decl) = self.module.tree.kind_mut(statement) {
                    if decl.role.is_type_member() && decl.from_type.is_none() {
                        decl.from_type = Some(ty);
                        member_count += 1;
                    }
                }
                extracted.push(self.module.tree.detach(statement));
            }
            if member_count == 0 {
                // Empty interfaces still need a trace at the top level.
                let placeholder = self.module.names.unused_temporary_name("typePlaceholder");
                extracted.extend(Planter::grow(&mut self.module.tree, pos, |p| {
                    p.bare_decl(
                        DeclNode::new(placeholder.clone(), DeclRole::TypePlaceholder(ty))
                            .with_type(Type::Empty)
                            .synthetic(),
                    );
                    p.call_builtin(Builtin::SetLocal, |p| {
                        p.ln(&placeholder);
                        p.value(Value::Empty);
                    });
                }));
            }
            log::debug!(
                "extracting {} statements of {} ({} members)",
                extracted.len(),
                self.type_label(ty),
                member_count
            );

            let root = self.module.root;
            let tree = &mut self.module.tree;
            let index = tree.index_in_parent(anchor).unwrap_or(0);
            tree.insert_children(root, index, extracted);

            let fun_pos = tree.pos(fun);
            let reified = Planter::grow_one(tree, fun_pos, |p| p.value(Value::Type(ty)));
            let reified_id = reified.id();
            if tree.parent(fun).is_some() {
                tree.replace(fun, reified).into_root();
            } else {
                reified.into_root();
            }

            converted.push(ConvertedType {
                shape: ty,
                after_members: Some(if anchor == fun { reified_id } else { anchor }),
            });
        }
        ConvertedTypeInfo { types: converted }
    }

    /// The top-level statement containing `fun`, moved back past any
    /// type declarations right before it so members precede them.
    fn insertion_point(&self, fun: NodeId) -> Option<NodeId> {
        let tree = self.tree();
        let root = self.module.root;
        let mut anchor = std::iter::once(fun)
            .chain(tree.ancestors(fun))
            .find(|&node| tree.parent(node) == Some(root))?;
        while let Some(index) = tree.index_in_parent(anchor).filter(|&i| i > 0) {
            let before = tree.children(root)[index - 1];
            let is_type_decl = matches!(
                tree.kind(before).as_decl().map(|d| &d.role),
                Some(DeclRole::TypeDecl(_))
            );
            if !is_type_decl {
                break;
            }
            anchor = before;
        }
        Some(anchor)
    }
}
