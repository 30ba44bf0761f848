//! `QIdent`: an ordered sequence of `SimpleIdent`s. Equality is
//! componentwise (derived `PartialEq` on the backing `Vec` already gives us
//! that).

use crate::simple_ident::SimpleIdent;
use std::fmt;

#[derive(Clone, Eq, PartialEq, Hash, Default)]
pub struct QIdent(Vec<SimpleIdent>);

impl QIdent {
    pub fn new(parts: Vec<SimpleIdent>) -> Self {
        QIdent(parts)
    }

    pub fn single(part: SimpleIdent) -> Self {
        QIdent(vec![part])
    }

    pub fn parts(&self) -> &[SimpleIdent] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn head(&self) -> Option<&SimpleIdent> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&SimpleIdent> {
        self.0.last()
    }

    pub fn add(&self, ident: SimpleIdent) -> QIdent {
        let mut parts = self.0.clone();
        parts.push(ident);
        QIdent(parts)
    }

    pub fn replace_last(&self, ident: SimpleIdent) -> QIdent {
        let mut parts = self.0.clone();
        if let Some(last) = parts.last_mut() {
            *last = ident;
        } else {
            parts.push(ident);
        }
        QIdent(parts)
    }

    pub fn starts_with(&self, prefix: &QIdent) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }
}

impl fmt::Debug for QIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for QIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.0.iter().map(|p| p.as_str()).collect();
        write!(f, "{}", parts.join("."))
    }
}

impl FromIterator<SimpleIdent> for QIdent {
    fn from_iter<I: IntoIterator<Item = SimpleIdent>>(iter: I) -> Self {
        QIdent(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_componentwise() {
        let a = QIdent::new(vec![SimpleIdent::new("A"), SimpleIdent::new("B")]);
        let b = QIdent::new(vec![SimpleIdent::new("A"), SimpleIdent::new("B")]);
        let c = QIdent::new(vec![SimpleIdent::new("A"), SimpleIdent::new("C")]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn add_and_replace_last() {
        let q = QIdent::single(SimpleIdent::new("A"));
        let added = q.add(SimpleIdent::new("B"));
        assert_eq!(added.to_string(), "A.B");
        let replaced = added.replace_last(SimpleIdent::new("C"));
        assert_eq!(replaced.to_string(), "A.C");
    }
}
