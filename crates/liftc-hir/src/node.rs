//! Node kinds and the strongly typed roles a declaration can play.

use liftc_types::{Abstractness, MethodKind, ResolvedName, Symbol, Type, TypeId, Visibility};
use serde::{Deserialize, Serialize};

/// Index of a node in its [`Tree`](crate::Tree) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Runtime-provided operators that passes recognize by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Builtin {
    /// `new(Type, args...)`
    New,
    /// Generic instantiation: `angle(Type, typeArgs...)`
    Angle,
    /// `makeClosRec(\word, x, \getter, fn, \setter, fn, ...)`
    MakeClosRec,
    /// Local assignment: `setLocal(x, value)`
    SetLocal,
    /// Read slot `i` of a closure record: `getCR(record, i)`
    GetCR,
    /// Write slot `i` of a closure record: `setCR(record, i, value)`
    SetCR,
    /// Backed property read: `getp(property, this)`
    Getp,
    /// Backed property write: `setp(property, this, value)`
    Setp,
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::New => "new",
            Builtin::Angle => "angle",
            Builtin::MakeClosRec => "makeClosRec",
            Builtin::SetLocal => "setLocal",
            Builtin::GetCR => "getCR",
            Builtin::SetCR => "setCR",
            Builtin::Getp => "getp",
            Builtin::Setp => "setp",
        }
    }
}

/// Constant values held by leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Void,
    /// The sole value of type `Empty`
    Empty,
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Symbol(Symbol),
    Builtin(Builtin),
    /// A reified type
    Type(TypeId),
    List(Vec<Value>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NameUse {
    /// The name's value is read
    Read,
    /// The name is the target of an assignment
    Write,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRef {
    pub name: ResolvedName,
    pub usage: NameUse,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockNode {
    /// Jump label; declared by the block
    pub label: Option<ResolvedName>,
}

/// A function. Children are formal parameter declarations followed by the body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunNode {
    /// Set when this function's body is a type definition
    pub defines_type: Option<TypeId>,
}

/// What a declaration means to passes that care about types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclRole {
    /// Ordinary local variable or formal parameter
    Local,
    /// The implied `this` formal of a method of the given type
    ImpliedThis(TypeId),
    /// A method member; the initializer is a function
    Method { symbol: Symbol, kind: MethodKind },
    /// A property member
    Property {
        symbol: Symbol,
        abstractness: Abstractness,
    },
    /// Module-level declaration of a type's constructor reference
    TypeDecl(TypeId),
    /// Stand-in for a type that has no members of its own
    TypePlaceholder(TypeId),
}

impl DeclRole {
    pub fn is_type_member(&self) -> bool {
        matches!(self, DeclRole::Method { .. } | DeclRole::Property { .. })
    }

    pub fn member_symbol(&self) -> Option<&Symbol> {
        match self {
            DeclRole::Method { symbol, .. } | DeclRole::Property { symbol, .. } => Some(symbol),
            _ => None,
        }
    }
}

/// A declaration. Its only child, if any, is the initializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclNode {
    pub name: ResolvedName,
    pub role: DeclRole,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub declared_type: Option<Type>,
    /// Keyword by which an argument for this formal may be passed
    #[serde(default)]
    pub word: Option<Symbol>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub has_default: bool,
    /// Introduced by the compiler rather than the author
    #[serde(default)]
    pub synthetic: bool,
    /// The type this member was extracted from
    #[serde(default)]
    pub from_type: Option<TypeId>,
    /// Formal parameter words for factories: a `None` separates required
    /// parameters from optional ones.
    #[serde(default)]
    pub parameter_names: Option<Vec<Option<Symbol>>>,
}

impl DeclNode {
    pub fn new(name: ResolvedName, role: DeclRole) -> Self {
        Self {
            name,
            role,
            visibility: None,
            declared_type: None,
            word: None,
            optional: false,
            has_default: false,
            synthetic: false,
            from_type: None,
            parameter_names: None,
        }
    }

    pub fn local(name: ResolvedName) -> Self {
        Self::new(name, DeclRole::Local)
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn with_type(mut self, ty: Type) -> Self {
        self.declared_type = Some(ty);
        self
    }

    pub fn with_word(mut self, word: Symbol) -> Self {
        self.word = Some(word);
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Block(BlockNode),
    Decl(DeclNode),
    Fun(FunNode),
    /// Callee first, then arguments
    Call,
    Name(NameRef),
    Value(Value),
}

impl NodeKind {
    pub fn as_decl(&self) -> Option<&DeclNode> {
        match self {
            NodeKind::Decl(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn as_fun(&self) -> Option<&FunNode> {
        match self {
            NodeKind::Fun(fun) => Some(fun),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&NameRef> {
        match self {
            NodeKind::Name(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self, NodeKind::Block(_))
    }

    pub fn builtin(&self) -> Option<Builtin> {
        match self {
            NodeKind::Value(Value::Builtin(b)) => Some(*b),
            _ => None,
        }
    }

    /// The type defined by a type-defining function.
    pub fn type_defined(&self) -> Option<TypeId> {
        self.as_fun().and_then(|fun| fun.defines_type)
    }
}
