//! `SimpleIdent`: a non-empty name, cheap to clone and compare.
//!
//! No string interner table is carried over from the teacher (`tsz_common`'s
//! `Interner`/`Atom`) — this phase processes a handful of files per library
//! rather than a whole program, so the interning table's upkeep cost isn't
//! worth paying. See `DESIGN.md`.

use std::fmt;
use std::sync::Arc;

#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct SimpleIdent(Arc<str>);

impl SimpleIdent {
    /// The call-signature synthetic name (`Apply`).
    pub const APPLY: &'static str = "Apply";
    /// The namespaced-member synthetic name (`^`), used when a value and a
    /// namespace of the same name merge (§4.5 rule 2) and when hoisting a
    /// call signature out of an object type (§4.7 Hoisting).
    pub const NAMESPACED: &'static str = "^";
    pub const DEFAULT: &'static str = "default";
    pub const GLOBAL: &'static str = "Global";
    pub const CONSTRUCTOR: &'static str = "constructor";
    pub const STD: &'static str = "std";
    pub const NODE: &'static str = "node";

    const RESERVED: &'static [&'static str] = &[
        Self::DEFAULT,
        Self::APPLY,
        Self::NAMESPACED,
        Self::GLOBAL,
        Self::CONSTRUCTOR,
        Self::STD,
        Self::NODE,
    ];

    /// Builds a `SimpleIdent`. Panics on an empty name: every named
    /// declaration's identifier is non-empty by construction (the parser
    /// contract never hands us an anonymous one; anonymous object/function
    /// types are named later by `DeriveNonConflictingName`).
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "SimpleIdent must be non-empty");
        SimpleIdent(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_reserved(&self) -> bool {
        Self::RESERVED.contains(&self.0.as_ref())
    }

    pub fn apply() -> Self {
        Self::new(Self::APPLY)
    }

    pub fn namespaced() -> Self {
        Self::new(Self::NAMESPACED)
    }

    pub fn default_export() -> Self {
        Self::new(Self::DEFAULT)
    }

    pub fn global() -> Self {
        Self::new(Self::GLOBAL)
    }
}

impl fmt::Debug for SimpleIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimpleIdent({:?})", self.0)
    }
}

impl fmt::Display for SimpleIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SimpleIdent {
    fn from(value: &str) -> Self {
        SimpleIdent::new(value)
    }
}

impl From<String> for SimpleIdent {
    fn from(value: String) -> Self {
        SimpleIdent::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_idents_hash_equal() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let a = SimpleIdent::new("Foo");
        let b = SimpleIdent::new("Foo".to_string());
        assert_eq!(a, b);

        let mut ha = DefaultHasher::new();
        a.hash(&mut ha);
        let mut hb = DefaultHasher::new();
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn reserved_singletons_are_flagged() {
        assert!(SimpleIdent::new("default").is_reserved());
        assert!(SimpleIdent::new("std").is_reserved());
        assert!(!SimpleIdent::new("Foo").is_reserved());
    }

    #[test]
    #[should_panic]
    fn empty_name_panics() {
        SimpleIdent::new("");
    }
}
