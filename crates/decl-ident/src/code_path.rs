//! `CodePath`: the canonical qualified name of a declaration within a
//! library, used for identity-by-location (§3.1, invariant 5).

use crate::library_name::LibraryName;
use crate::qident::QIdent;
use crate::simple_ident::SimpleIdent;

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum CodePath {
    NoPath,
    HasPath { lib: LibraryName, path: QIdent },
}

impl CodePath {
    pub fn has_path(lib: LibraryName, path: QIdent) -> CodePath {
        CodePath::HasPath { lib, path }
    }

    pub fn is_no_path(&self) -> bool {
        matches!(self, CodePath::NoPath)
    }

    pub fn add(&self, ident: SimpleIdent) -> CodePath {
        match self {
            CodePath::NoPath => CodePath::NoPath,
            CodePath::HasPath { lib, path } => CodePath::HasPath {
                lib: lib.clone(),
                path: path.add(ident),
            },
        }
    }

    pub fn replace_last(&self, ident: SimpleIdent) -> CodePath {
        match self {
            CodePath::NoPath => CodePath::NoPath,
            CodePath::HasPath { lib, path } => CodePath::HasPath {
                lib: lib.clone(),
                path: path.replace_last(ident),
            },
        }
    }

    /// Asserts the path is already `HasPath`, for call sites past
    /// initialization where a `NoPath` would be a pipeline bug.
    pub fn force_has_path(&self) -> (&LibraryName, &QIdent) {
        match self {
            CodePath::HasPath { lib, path } => (lib, path),
            CodePath::NoPath => panic!("forceHasPath called on NoPath outside initialization"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_extends_the_path() {
        let cp = CodePath::has_path(
            LibraryName::unscoped("lodash"),
            QIdent::single(SimpleIdent::new("Foo")),
        );
        let extended = cp.add(SimpleIdent::new("bar"));
        let (_, path) = extended.force_has_path();
        assert_eq!(path.to_string(), "Foo.bar");
    }

    #[test]
    #[should_panic]
    fn force_has_path_panics_on_no_path() {
        CodePath::NoPath.force_has_path();
    }

    #[test]
    fn no_path_add_stays_no_path() {
        assert!(CodePath::NoPath.add(SimpleIdent::new("x")).is_no_path());
    }
}
