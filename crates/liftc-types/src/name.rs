//! Resolved names and symbols.
//!
//! A [`ResolvedName`] is an identity, not a spelling: two names with the same
//! base text but different uids are different bindings.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NameKind {
    /// Derived from a name the author wrote
    Source,
    /// Introduced by the compiler
    Temporary,
    /// Provided by the language runtime, never declared in a module
    Builtin,
}

/// A name after resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResolvedName {
    pub kind: NameKind,
    pub base: String,
    pub uid: u32,
}

impl ResolvedName {
    pub fn source(base: impl Into<String>, uid: u32) -> Self {
        Self {
            kind: NameKind::Source,
            base: base.into(),
            uid,
        }
    }

    pub fn temporary(base: impl Into<String>, uid: u32) -> Self {
        Self {
            kind: NameKind::Temporary,
            base: base.into(),
            uid,
        }
    }

    pub fn builtin(base: impl Into<String>) -> Self {
        Self {
            kind: NameKind::Builtin,
            base: base.into(),
            uid: 0,
        }
    }
}

impl fmt::Display for ResolvedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NameKind::Source => write!(f, "{}__{}", self.base, self.uid),
            NameKind::Temporary => write!(f, "{}#{}", self.base, self.uid),
            NameKind::Builtin => write!(f, "{}", self.base),
        }
    }
}

/// A symbol: the dot-accessible key of a member, or a keyword marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    pub fn new(text: impl Into<String>) -> Self {
        Symbol(text.into())
    }

    /// The symbol shared by all constructors of a type.
    pub fn constructor() -> Self {
        Symbol::new("constructor")
    }

    pub fn text(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\\{}", self.0)
    }
}

/// Hands out names that no other binding in the module uses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NameMaker {
    next_uid: u32,
}

impl NameMaker {
    pub fn new() -> Self {
        Self { next_uid: 0 }
    }

    /// A maker whose names never collide with uids up to and including `max_uid`.
    pub fn starting_after(max_uid: u32) -> Self {
        Self {
            next_uid: max_uid.saturating_add(1),
        }
    }

    fn fresh_uid(&mut self) -> u32 {
        let uid = self.next_uid;
        self.next_uid += 1;
        uid
    }

    pub fn unused_source_name(&mut self, base: &str) -> ResolvedName {
        let uid = self.fresh_uid();
        ResolvedName::source(base, uid)
    }

    pub fn unused_temporary_name(&mut self, base: &str) -> ResolvedName {
        let uid = self.fresh_uid();
        ResolvedName::temporary(base, uid)
    }

    /// Make sure future names are above `uid`.
    pub fn reserve(&mut self, uid: u32) {
        if uid >= self.next_uid {
            self.next_uid = uid.saturating_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_distinguishes_kinds() {
        assert_eq!(ResolvedName::source("x", 3).to_string(), "x__3");
        assert_eq!(ResolvedName::temporary("cr", 7).to_string(), "cr#7");
        assert_eq!(ResolvedName::builtin("console").to_string(), "console");
        assert_eq!(Symbol::new("word").to_string(), "\\word");
    }

    #[test]
    fn test_name_maker_never_reuses_uids() {
        let mut names = NameMaker::starting_after(10);
        let a = names.unused_source_name("cr");
        let b = names.unused_temporary_name("cr");
        assert_eq!(a.uid, 11);
        assert_eq!(b.uid, 12);
        assert_ne!(a, ResolvedName::source("cr", 12));

        names.reserve(40);
        assert_eq!(names.unused_source_name("v").uid, 41);
        names.reserve(5);
        assert_eq!(names.unused_source_name("v").uid, 42);
    }
}
