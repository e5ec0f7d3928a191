//! Closure-driven builder for growing subtrees.
//!
//! ```
//! use liftc_diagnostics::Span;
//! use liftc_hir::{Builtin, Planter, Tree};
//! use liftc_types::ResolvedName;
//!
//! let mut tree = Tree::new();
//! let x = ResolvedName::source("x", 0);
//! let call = Planter::grow_one(&mut tree, Span::DUMMY, |p| {
//!     p.call_builtin(Builtin::SetLocal, |p| {
//!         p.ln(&x);
//!         p.int(1);
//!     });
//! });
//! assert_eq!(tree.children(call.id()).len(), 3);
//! ```

use crate::node::{BlockNode, Builtin, DeclNode, FunNode, NameRef, NameUse, NodeKind, Value};
use crate::tree::{Orphan, Tree};
use liftc_diagnostics::Span;
use liftc_types::{ResolvedName, TypeId};

pub struct Planter<'t> {
    tree: &'t mut Tree,
    pos: Span,
    planted: Vec<Orphan>,
}

impl<'t> Planter<'t> {
    /// Run `f` and return every top-level tree it planted, in order.
    pub fn grow(tree: &'t mut Tree, pos: Span, f: impl FnOnce(&mut Planter<'_>)) -> Vec<Orphan> {
        let mut planter = Planter {
            tree,
            pos,
            planted: Vec::new(),
        };
        f(&mut planter);
        planter.planted
    }

    /// Like [`Planter::grow`] for builders that plant exactly one tree.
    pub fn grow_one(tree: &'t mut Tree, pos: Span, f: impl FnOnce(&mut Planter<'_>)) -> Orphan {
        let mut planted = Self::grow(tree, pos, f);
        assert_eq!(planted.len(), 1, "grow_one planted {} trees", planted.len());
        planted.remove(0)
    }

    /// Position for subsequently planted nodes.
    pub fn at(&mut self, pos: Span) -> &mut Self {
        self.pos = pos;
        self
    }

    fn node(&mut self, kind: NodeKind, children: impl FnOnce(&mut Planter<'_>)) {
        let grown = Planter::grow(&mut *self.tree, self.pos, children);
        let node = self.tree.alloc(kind, self.pos);
        let id = node.id();
        self.tree.insert_children(id, 0, grown);
        self.planted.push(node);
    }

    fn leaf(&mut self, kind: NodeKind) {
        let node = self.tree.alloc(kind, self.pos);
        self.planted.push(node);
    }

    pub fn block(&mut self, statements: impl FnOnce(&mut Planter<'_>)) {
        self.node(NodeKind::Block(BlockNode::default()), statements);
    }

    pub fn labeled_block(&mut self, label: &ResolvedName, statements: impl FnOnce(&mut Planter<'_>)) {
        let kind = NodeKind::Block(BlockNode {
            label: Some(label.clone()),
        });
        self.node(kind, statements);
    }

    /// A declaration; `init` plants at most one initializer.
    pub fn decl(&mut self, decl: DeclNode, init: impl FnOnce(&mut Planter<'_>)) {
        self.node(NodeKind::Decl(decl), init);
    }

    /// A declaration without an initializer.
    pub fn bare_decl(&mut self, decl: DeclNode) {
        self.leaf(NodeKind::Decl(decl));
    }

    /// A function; `parts` plants the formals and then the body.
    pub fn fun(&mut self, parts: impl FnOnce(&mut Planter<'_>)) {
        self.node(NodeKind::Fun(FunNode::default()), parts);
    }

    /// A function whose body defines the given type.
    pub fn type_fun(&mut self, defines: TypeId, parts: impl FnOnce(&mut Planter<'_>)) {
        let kind = NodeKind::Fun(FunNode {
            defines_type: Some(defines),
        });
        self.node(kind, parts);
    }

    /// A call; `parts` plants the callee and then the arguments.
    pub fn call(&mut self, parts: impl FnOnce(&mut Planter<'_>)) {
        self.node(NodeKind::Call, parts);
    }

    pub fn call_builtin(&mut self, builtin: Builtin, args: impl FnOnce(&mut Planter<'_>)) {
        self.node(NodeKind::Call, |p| {
            p.value(Value::Builtin(builtin));
            args(p);
        });
    }

    /// A name whose value is read.
    pub fn rn(&mut self, name: &ResolvedName) {
        self.leaf(NodeKind::Name(NameRef {
            name: name.clone(),
            usage: NameUse::Read,
        }));
    }

    /// A name that is assigned.
    pub fn ln(&mut self, name: &ResolvedName) {
        self.leaf(NodeKind::Name(NameRef {
            name: name.clone(),
            usage: NameUse::Write,
        }));
    }

    pub fn value(&mut self, value: Value) {
        self.leaf(NodeKind::Value(value));
    }

    pub fn int(&mut self, n: i64) {
        self.value(Value::Int(n));
    }

    /// Attach an existing detached tree.
    pub fn replant(&mut self, orphan: Orphan) {
        self.planted.push(orphan);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftc_types::Symbol;

    #[test]
    fn test_grow_nested_function() {
        let mut tree = Tree::new();
        let x = ResolvedName::source("x", 1);
        let f = ResolvedName::source("f", 2);
        let decl = Planter::grow_one(&mut tree, Span::DUMMY, |p| {
            p.decl(DeclNode::local(f.clone()), |p| {
                p.fun(|p| {
                    p.bare_decl(DeclNode::local(x.clone()).with_word(Symbol::new("x")));
                    p.block(|p| p.rn(&x));
                });
            });
        });

        let fun = tree.decl_init(decl.id()).unwrap();
        assert_eq!(tree.fun_formals(fun).len(), 1);
        let body = tree.fun_body(fun).unwrap();
        assert!(tree.kind(body).is_block());
        assert_eq!(tree.parent(body), Some(fun));
        assert_eq!(tree.parent(fun), Some(decl.id()));
        assert!(tree.inconsistencies().is_empty());
    }

    #[test]
    fn test_replant_moves_existing_tree() {
        let mut tree = Tree::new();
        let x = ResolvedName::source("x", 1);
        let leaf = Planter::grow_one(&mut tree, Span::DUMMY, |p| p.rn(&x));
        let leaf_id = leaf.id();
        let block = Planter::grow_one(&mut tree, Span::DUMMY, |p| {
            p.block(|p| p.replant(leaf));
        });
        assert_eq!(tree.children(block.id()), &[leaf_id]);
    }
}
