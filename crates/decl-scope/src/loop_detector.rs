//! `LoopDetector`: a small persistent value threaded through every
//! recursive lookup/expansion so a cyclic reference (e.g. an interface
//! that, through aliases, ends up extending itself) backs off instead of
//! recursing forever (§4.3, §4.6, §4.7 `PreferTypeAlias`).

use decl_ident::CodePath;

/// One recursion site: identified by the `CodePath` of the declaration
/// being entered, which is stable across clones of the tree (unlike a
/// tree reference or pointer) and is exactly the identity §3.1 defines
/// for a declaration.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Cycle(pub Vec<CodePath>);

#[derive(Clone, Debug, Default)]
pub struct LoopDetector {
    visited: Vec<CodePath>,
}

impl LoopDetector {
    pub fn initial() -> Self {
        LoopDetector { visited: Vec::new() }
    }

    /// Extends the detector with `path`, or returns the `Cycle` that
    /// would result if `path` is already on the visited stack.
    pub fn including(&self, path: &CodePath) -> Result<LoopDetector, Cycle> {
        if path.is_no_path() {
            // Declarations without a stable path (synthetic/anonymous
            // nodes not yet assigned one) can't be cycle-detected this
            // way; let them through rather than false-positive.
            let mut visited = self.visited.clone();
            visited.push(path.clone());
            return Ok(LoopDetector { visited });
        }
        if self.visited.contains(path) {
            let mut cycle = self.visited.clone();
            cycle.push(path.clone());
            return Err(Cycle(cycle));
        }
        let mut visited = self.visited.clone();
        visited.push(path.clone());
        Ok(LoopDetector { visited })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_ident::{LibraryName, QIdent, SimpleIdent};

    fn path(name: &str) -> CodePath {
        CodePath::has_path(
            LibraryName::unscoped("lib"),
            QIdent::single(SimpleIdent::new(name)),
        )
    }

    #[test]
    fn including_extends_on_first_visit() {
        let d = LoopDetector::initial();
        let d2 = d.including(&path("A")).unwrap();
        assert!(d2.including(&path("B")).is_ok());
    }

    #[test]
    fn including_signals_a_cycle_on_revisit() {
        let d = LoopDetector::initial().including(&path("A")).unwrap();
        let err = d.including(&path("A")).unwrap_err();
        assert_eq!(err.0.len(), 2);
    }
}
