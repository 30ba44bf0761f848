//! Library names: either unscoped (`lodash`) or scoped (`@types/node` →
//! scope `"types"`, name `"node"`). Unlike `ModuleName`, the `@types` scope
//! is kept verbatim here — this is the name of the npm package itself, not
//! a module path derived from it.

use std::fmt;

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct LibraryName {
    pub scope: Option<String>,
    pub name: String,
}

impl LibraryName {
    pub fn unscoped(name: impl Into<String>) -> Self {
        LibraryName {
            scope: None,
            name: name.into(),
        }
    }

    pub fn scoped(scope: impl Into<String>, name: impl Into<String>) -> Self {
        LibraryName {
            scope: Some(scope.into()),
            name: name.into(),
        }
    }

    /// Parses `"lodash"` or `"@scope/name"`.
    pub fn parse(s: &str) -> LibraryName {
        if let Some(rest) = s.strip_prefix('@') {
            if let Some((scope, name)) = rest.split_once('/') {
                return LibraryName::scoped(scope, name);
            }
        }
        LibraryName::unscoped(s)
    }

    pub fn is_std(&self) -> bool {
        self.scope.is_none() && self.name == "std"
    }
}

impl fmt::Display for LibraryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "@{scope}/{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unscoped() {
        let l = LibraryName::parse("lodash");
        assert_eq!(l.scope, None);
        assert_eq!(l.name, "lodash");
    }

    #[test]
    fn parses_scoped() {
        let l = LibraryName::parse("@types/node");
        assert_eq!(l.scope.as_deref(), Some("types"));
        assert_eq!(l.name, "node");
        assert_eq!(l.to_string(), "@types/node");
    }
}
