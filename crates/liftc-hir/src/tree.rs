//! Arena-allocated syntax tree.
//!
//! Nodes are addressed by [`NodeId`] and never freed; a node that is no longer
//! reachable from the module root is simply garbage. Ownership is explicit:
//! every attach operation consumes an [`Orphan`], and the only ways to get one
//! are [`Tree::alloc`] and [`Tree::detach`]. A node therefore has at most one
//! parent at any time.

use crate::node::{BlockNode, NodeId, NodeKind};
use liftc_diagnostics::Span;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub pos: Span,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Node {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// A node with no parent, ready to be attached somewhere.
#[must_use = "an orphan that is never attached is lost"]
#[derive(Debug, PartialEq, Eq)]
pub struct Orphan(NodeId);

impl Orphan {
    pub fn id(&self) -> NodeId {
        self.0
    }

    /// Give up the right to attach this node, keeping it as a tree root.
    pub fn into_root(self) -> NodeId {
        self.0
    }
}

/// Returned by preorder visitors to steer the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitCue {
    Continue,
    /// Do not visit this node's children
    SkipChildren,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Number of nodes ever allocated, reachable or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn alloc(&mut self, kind: NodeKind, pos: Span) -> Orphan {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            pos,
            children: Vec::new(),
            parent: None,
        });
        Orphan(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    pub fn pos(&self, id: NodeId) -> Span {
        self.nodes[id.index()].pos
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// Position of `id` among its parent's children.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// `id`'s parent, grandparent, and so on up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    pub fn push_child(&mut self, parent: NodeId, child: Orphan) {
        let index = self.children(parent).len();
        self.insert_children(parent, index, [child]);
    }

    /// Attach `children` so that the first of them ends up at `index`.
    pub fn insert_children(
        &mut self,
        parent: NodeId,
        index: usize,
        children: impl IntoIterator<Item = Orphan>,
    ) {
        let ids: Vec<NodeId> = children.into_iter().map(|orphan| orphan.0).collect();
        for &id in &ids {
            let node = &mut self.nodes[id.index()];
            assert!(
                node.parent.is_none(),
                "{} is already attached to {:?}",
                id,
                node.parent
            );
            node.parent = Some(parent);
        }
        let siblings = &mut self.nodes[parent.index()].children;
        let index = index.min(siblings.len());
        siblings.splice(index..index, ids);
    }

    /// Free `id` from its parent.
    pub fn detach(&mut self, id: NodeId) -> Orphan {
        if let Some(parent) = self.nodes[id.index()].parent.take() {
            self.nodes[parent.index()].children.retain(|&c| c != id);
        }
        Orphan(id)
    }

    /// Put `new` where `old` is, returning `old` detached.
    pub fn replace(&mut self, old: NodeId, new: Orphan) -> Orphan {
        let parent = self.parent(old);
        let index = self.index_in_parent(old);
        let old = self.detach(old);
        match (parent, index) {
            (Some(parent), Some(index)) => self.insert_children(parent, index, [new]),
            _ => panic!("cannot replace {}: it has no parent", old.0),
        }
        old
    }

    /// Replace `id` with a block containing just `id`, returning the block.
    pub fn wrap_in_block(&mut self, id: NodeId) -> NodeId {
        let block = self.alloc(NodeKind::Block(BlockNode::default()), self.pos(id));
        let block_id = block.id();
        let wrapped = self.replace(id, block);
        self.push_child(block_id, wrapped);
        block_id
    }

    /// Copy the subtree rooted at `id`.
    pub fn deep_copy(&mut self, id: NodeId) -> Orphan {
        let kind = self.kind(id).clone();
        let copy = self.alloc(kind, self.pos(id));
        for child in self.children(id).to_vec() {
            let child_copy = self.deep_copy(child);
            self.push_child(copy.id(), child_copy);
        }
        copy
    }

    /// Visit `start` and its descendants in preorder.
    pub fn visit_preorder(&self, start: NodeId, f: &mut impl FnMut(NodeId, &Node) -> VisitCue) {
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if f(id, node) == VisitCue::Continue {
                stack.extend(node.children.iter().rev().copied());
            }
        }
    }

    /// `start` and all its descendants in preorder.
    pub fn preorder(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.visit_preorder(start, &mut |id, _| {
            out.push(id);
            VisitCue::Continue
        });
        out
    }

    /// Formal parameter declarations of a function.
    pub fn fun_formals(&self, fun: NodeId) -> &[NodeId] {
        let children = self.children(fun);
        match children.split_last() {
            Some((_, formals)) => formals,
            None => children,
        }
    }

    /// The body of a function.
    pub fn fun_body(&self, fun: NodeId) -> Option<NodeId> {
        self.last_child(fun)
    }

    /// The initializer of a declaration.
    pub fn decl_init(&self, decl: NodeId) -> Option<NodeId> {
        self.child(decl, 0)
    }

    /// Nodes whose parent link and parent's child list disagree.
    /// An empty result means the single-parent invariant holds.
    pub fn inconsistencies(&self) -> Vec<(NodeId, Option<NodeId>)> {
        let mut seen_as_child = vec![None; self.nodes.len()];
        let mut bad = Vec::new();
        for (index, node) in self.nodes.iter().enumerate() {
            let parent = NodeId(index as u32);
            for &child in &node.children {
                if !self.contains(child) {
                    bad.push((child, Some(parent)));
                    continue;
                }
                if seen_as_child[child.index()].replace(parent).is_some()
                    || self.node(child).parent != Some(parent)
                {
                    bad.push((child, Some(parent)));
                }
            }
        }
        for (index, node) in self.nodes.iter().enumerate() {
            if node.parent.is_some() && seen_as_child[index].is_none() {
                bad.push((NodeId(index as u32), node.parent));
            }
        }
        bad
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NameRef, NameUse, Value};
    use liftc_types::ResolvedName;

    fn leaf(tree: &mut Tree, n: i64) -> Orphan {
        tree.alloc(NodeKind::Value(Value::Int(n)), Span::DUMMY)
    }

    fn block(tree: &mut Tree) -> Orphan {
        tree.alloc(NodeKind::Block(BlockNode::default()), Span::DUMMY)
    }

    #[test]
    fn test_insert_and_detach_keep_links_consistent() {
        let mut tree = Tree::new();
        let root = block(&mut tree).into_root();
        let a = leaf(&mut tree, 1);
        let b = leaf(&mut tree, 2);
        let (a_id, b_id) = (a.id(), b.id());
        tree.push_child(root, a);
        tree.insert_children(root, 0, [b]);

        assert_eq!(tree.children(root), &[b_id, a_id]);
        assert_eq!(tree.index_in_parent(a_id), Some(1));

        let moved = tree.detach(b_id);
        assert_eq!(tree.parent(b_id), None);
        assert_eq!(tree.children(root), &[a_id]);
        tree.push_child(root, moved);
        assert_eq!(tree.children(root), &[a_id, b_id]);
        assert!(tree.inconsistencies().is_empty());
    }

    #[test]
    #[should_panic(expected = "already attached")]
    fn test_attaching_twice_panics() {
        let mut tree = Tree::new();
        let root = block(&mut tree).into_root();
        let other = block(&mut tree).into_root();
        let a = leaf(&mut tree, 1);
        let id = a.id();
        tree.push_child(root, a);
        // Forging a second orphan for an attached node is a contract violation.
        tree.push_child(other, Orphan(id));
    }

    #[test]
    fn test_replace_and_wrap() {
        let mut tree = Tree::new();
        let root = block(&mut tree).into_root();
        let a = leaf(&mut tree, 1);
        let a_id = a.id();
        tree.push_child(root, a);

        let name = tree.alloc(
            NodeKind::Name(NameRef {
                name: ResolvedName::source("x", 0),
                usage: NameUse::Read,
            }),
            Span::DUMMY,
        );
        let name_id = name.id();
        let old = tree.replace(a_id, name);
        assert_eq!(old.id(), a_id);
        assert_eq!(tree.children(root), &[name_id]);

        let wrapper = tree.wrap_in_block(name_id);
        assert_eq!(tree.children(root), &[wrapper]);
        assert_eq!(tree.children(wrapper), &[name_id]);
        assert_eq!(tree.ancestors(name_id).collect::<Vec<_>>(), vec![wrapper, root]);
        assert!(tree.inconsistencies().is_empty());
    }

    #[test]
    fn test_preorder_skips_children_on_request() {
        let mut tree = Tree::new();
        let root = block(&mut tree).into_root();
        let inner = block(&mut tree);
        let inner_id = inner.id();
        let deep = leaf(&mut tree, 3);
        tree.push_child(inner_id, deep);
        tree.push_child(root, inner);
        let shallow = leaf(&mut tree, 4);
        let shallow_id = shallow.id();
        tree.push_child(root, shallow);

        let mut seen = Vec::new();
        tree.visit_preorder(root, &mut |id, _| {
            seen.push(id);
            if id == inner_id {
                VisitCue::SkipChildren
            } else {
                VisitCue::Continue
            }
        });
        assert_eq!(seen, vec![root, inner_id, shallow_id]);
        assert_eq!(tree.preorder(root).len(), 4);
    }

    #[test]
    fn test_deep_copy_is_detached() {
        let mut tree = Tree::new();
        let root = block(&mut tree).into_root();
        let a = leaf(&mut tree, 1);
        tree.push_child(root, a);

        let copy = tree.deep_copy(root);
        assert_ne!(copy.id(), root);
        assert_eq!(tree.parent(copy.id()), None);
        assert_eq!(tree.children(copy.id()).len(), 1);
        assert_eq!(tree.kind(tree.children(copy.id())[0]), &NodeKind::Value(Value::Int(1)));
    }
}
