//! Readable pseudo-code rendering of subtrees for logs, the CLI and tests.
//!
//! The output is not meant to be parsed back. Declarations show their role
//! metadata as `@attributes`; assignments through `setLocal` show as `a = b`.

use crate::node::{Builtin, DeclNode, DeclRole, NodeId, NodeKind, Value};
use crate::shape::TypeRegistry;
use crate::tree::Tree;
use liftc_types::{Abstractness, MethodKind, Type, TypeId};
use std::fmt::Write;

const INDENT: &str = "  ";

pub struct PseudoCode<'a> {
    tree: &'a Tree,
    types: Option<&'a TypeRegistry>,
}

/// Render without type names; types show as `type#N`.
pub fn render(tree: &Tree, node: NodeId) -> String {
    PseudoCode::new(tree).render(node)
}

impl<'a> PseudoCode<'a> {
    pub fn new(tree: &'a Tree) -> Self {
        Self { tree, types: None }
    }

    /// Show type shapes by name.
    pub fn with_types(mut self, types: &'a TypeRegistry) -> Self {
        self.types = Some(types);
        self
    }

    pub fn render(&self, node: NodeId) -> String {
        let mut out = String::new();
        if self.tree.kind(node).is_block() && self.tree.parent(node).is_none() {
            // Module roots print as a statement list.
            for &stmt in self.tree.children(node) {
                self.statement(&mut out, stmt, 0);
            }
        } else {
            self.expr(&mut out, node, 0);
        }
        out
    }

    fn type_name(&self, id: TypeId) -> String {
        self.types
            .and_then(|types| types.get(id))
            .map(|shape| shape.name.to_string())
            .unwrap_or_else(|| format!("type#{}", id))
    }

    fn type_text(&self, ty: &Type) -> String {
        match ty {
            Type::Named(id) => self.type_name(*id),
            Type::Generic { base, type_args } => {
                let args: Vec<String> = type_args.iter().map(|t| self.type_text(t)).collect();
                format!("{}<{}>", self.type_name(*base), args.join(", "))
            }
            Type::List(elem) => format!("List<{}>", self.type_text(elem)),
            Type::Nullable(inner) => format!("{}?", self.type_text(inner)),
            other => other.to_string(),
        }
    }

    fn newline(out: &mut String, depth: usize) {
        out.push('\n');
        for _ in 0..depth {
            out.push_str(INDENT);
        }
    }

    fn statement(&self, out: &mut String, node: NodeId, depth: usize) {
        for _ in 0..depth {
            out.push_str(INDENT);
        }
        self.expr(out, node, depth);
        if !self.tree.kind(node).is_block() {
            out.push(';');
        }
        out.push('\n');
    }

    fn block_body(&self, out: &mut String, node: NodeId, depth: usize) {
        let stmts = self.tree.children(node);
        if stmts.is_empty() {
            out.push_str("{}");
            return;
        }
        out.push('{');
        out.push('\n');
        for &stmt in stmts {
            self.statement(out, stmt, depth + 1);
        }
        for _ in 0..depth {
            out.push_str(INDENT);
        }
        out.push('}');
    }

    fn comma_list(&self, out: &mut String, nodes: &[NodeId], depth: usize) {
        for (i, &node) in nodes.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.expr(out, node, depth);
        }
    }

    fn expr(&self, out: &mut String, node: NodeId, depth: usize) {
        let children = self.tree.children(node);
        match self.tree.kind(node) {
            NodeKind::Block(block) => {
                if let Some(label) = &block.label {
                    let _ = write!(out, "{}: ", label);
                }
                self.block_body(out, node, depth);
            }
            NodeKind::Decl(decl) => {
                self.decl_head(out, decl);
                if let Some(&init) = children.first() {
                    out.push_str(" = ");
                    self.expr(out, init, depth);
                }
            }
            NodeKind::Fun(fun) => {
                if let Some(ty) = fun.defines_type {
                    let _ = write!(out, "@typeDefining({}) ", self.type_name(ty));
                }
                out.push_str("fn (");
                self.comma_list(out, self.tree.fun_formals(node), depth);
                out.push(')');
                if let Some(body) = self.tree.fun_body(node) {
                    out.push(' ');
                    if self.tree.kind(body).is_block() {
                        self.expr(out, body, depth);
                    } else {
                        out.push_str("=> ");
                        self.expr(out, body, depth);
                    }
                }
            }
            NodeKind::Call => self.call(out, children, depth),
            NodeKind::Name(name) => {
                let _ = write!(out, "{}", name.name);
            }
            NodeKind::Value(value) => self.value(out, value),
        }
    }

    fn call(&self, out: &mut String, children: &[NodeId], depth: usize) {
        let Some((&callee, args)) = children.split_first() else {
            out.push_str("<empty call>");
            return;
        };
        match self.tree.kind(callee).builtin() {
            Some(Builtin::SetLocal) if args.len() == 2 => {
                self.expr(out, args[0], depth);
                out.push_str(" = ");
                self.expr(out, args[1], depth);
            }
            Some(Builtin::New) if !args.is_empty() => {
                out.push_str("new ");
                self.expr(out, args[0], depth);
                out.push('(');
                self.comma_list(out, &args[1..], depth);
                out.push(')');
            }
            Some(Builtin::Angle) if !args.is_empty() => {
                self.expr(out, args[0], depth);
                out.push('<');
                self.comma_list(out, &args[1..], depth);
                out.push('>');
            }
            _ => {
                self.expr(out, callee, depth);
                out.push('(');
                if args.len() > 1 && args.iter().any(|&a| self.tree.kind(a).as_fun().is_some()) {
                    // Arguments holding functions read better one per line.
                    for (i, &arg) in args.iter().enumerate() {
                        Self::newline(out, depth + 1);
                        self.expr(out, arg, depth + 1);
                        if i + 1 < args.len() {
                            out.push(',');
                        }
                    }
                    Self::newline(out, depth);
                } else {
                    self.comma_list(out, args, depth);
                }
                out.push(')');
            }
        }
    }

    fn decl_head(&self, out: &mut String, decl: &DeclNode) {
        if let Some(visibility) = decl.visibility {
            let _ = write!(out, "@{} ", visibility.as_str());
        }
        match &decl.role {
            DeclRole::Local => {}
            DeclRole::ImpliedThis(ty) => {
                let _ = write!(out, "@impliedThis({}) ", self.type_name(*ty));
            }
            DeclRole::Method { symbol, kind } => {
                let kind = match kind {
                    MethodKind::Normal => "method",
                    MethodKind::Getter => "getter",
                    MethodKind::Setter => "setter",
                    MethodKind::Constructor => "constructor",
                };
                let _ = write!(out, "@{}({}) ", kind, symbol);
            }
            DeclRole::Property {
                symbol,
                abstractness,
            } => {
                if *abstractness == Abstractness::Abstract {
                    out.push_str("@abstract ");
                }
                let _ = write!(out, "@property({}) ", symbol);
            }
            DeclRole::TypeDecl(ty) => {
                let _ = write!(out, "@typeDecl({}) ", self.type_name(*ty));
            }
            DeclRole::TypePlaceholder(ty) => {
                let _ = write!(out, "@typePlaceholder({}) ", self.type_name(*ty));
            }
        }
        if decl.synthetic {
            out.push_str("@synthetic ");
        }
        if let Some(ty) = decl.from_type {
            let _ = write!(out, "@fromType({}) ", self.type_name(ty));
        }
        if let Some(names) = &decl.parameter_names {
            let names: Vec<String> = names
                .iter()
                .map(|n| n.as_ref().map_or_else(|| "null".to_string(), |s| s.to_string()))
                .collect();
            let _ = write!(out, "@parameterNames({}) ", names.join(", "));
        }
        if let Some(word) = &decl.word {
            let _ = write!(out, "@word({}) ", word);
        }
        if decl.optional {
            out.push_str("@optional ");
        }
        let _ = write!(out, "let {}", decl.name);
        if let Some(ty) = &decl.declared_type {
            let _ = write!(out, ": {}", self.type_text(ty));
        }
    }

    fn value(&self, out: &mut String, value: &Value) {
        match value {
            Value::Void => out.push_str("void"),
            Value::Empty => out.push_str("empty"),
            Value::Null => out.push_str("null"),
            Value::Bool(b) => {
                let _ = write!(out, "{}", b);
            }
            Value::Int(n) => {
                let _ = write!(out, "{}", n);
            }
            Value::Str(s) => {
                let _ = write!(out, "{:?}", s);
            }
            Value::Symbol(s) => {
                let _ = write!(out, "{}", s);
            }
            Value::Builtin(b) => out.push_str(b.name()),
            Value::Type(ty) => out.push_str(&self.type_name(*ty)),
            Value::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.value(out, item);
                }
                out.push(']');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planter::Planter;
    use liftc_diagnostics::Span;
    use liftc_types::{ResolvedName, Symbol, Visibility};

    #[test]
    fn test_render_assignment_and_decl() {
        let mut tree = Tree::new();
        let x = ResolvedName::source("x", 1);
        let block = Planter::grow_one(&mut tree, Span::DUMMY, |p| {
            p.block(|p| {
                p.decl(
                    DeclNode::local(x.clone()).with_type(Type::Int).with_visibility(Visibility::Private),
                    |p| p.int(1),
                );
                p.call_builtin(Builtin::SetLocal, |p| {
                    p.ln(&x);
                    p.int(2);
                });
            });
        });
        let text = render(&tree, block.id());
        assert!(text.contains("@private let x__1: Int = 1;"), "{}", text);
        assert!(text.contains("x__1 = 2;"), "{}", text);
    }

    #[test]
    fn test_render_shows_type_names_when_known() {
        let mut types = TypeRegistry::new();
        let c = types.define(ResolvedName::source("C", 0), "m", Abstractness::Concrete);
        let mut tree = Tree::new();
        let call = Planter::grow_one(&mut tree, Span::DUMMY, |p| {
            p.call_builtin(Builtin::New, |p| {
                p.value(Value::Type(c));
                p.value(Value::Symbol(Symbol::new("a")));
            });
        });
        assert_eq!(render(&tree, call.id()), "new type#0(\\a)");
        assert_eq!(
            PseudoCode::new(&tree).with_types(&types).render(call.id()),
            "new C__0(\\a)"
        );
    }
}
