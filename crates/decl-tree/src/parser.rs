//! The parser contract a host hands to the driver (§6.1): turn a `.d.ts`
//! source file into a `ParsedFile` tree, preserving comment attachment on
//! members and directives. This crate only defines the seam — an actual
//! lexer/parser implementation is a separate concern outside this phase's
//! scope (see SPEC_FULL.md's Non-goals).

use crate::directive::Directive;
use crate::tree::{Container, Tree};
use std::path::Path;

pub trait DeclParser {
    fn parse(&self, path: &Path) -> Result<Tree, String>;
}

/// Builds an empty, unattributed `ParsedFile` — the identity element for
/// `FlattenTrees::flatten`, and a convenient base for hand-built test
/// fixtures that don't go through a real parser.
pub fn empty_parsed_file(is_module: bool) -> Tree {
    Tree::ParsedFile {
        directives: Vec::new(),
        is_module,
        container: Container::new(Vec::new()),
    }
}

pub fn parsed_file(directives: Vec<Directive>, is_module: bool, members: Vec<Tree>) -> Tree {
    Tree::ParsedFile {
        directives,
        is_module,
        container: Container::new(members),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::Directive;

    struct FixtureParser;

    impl DeclParser for FixtureParser {
        fn parse(&self, path: &Path) -> Result<Tree, String> {
            if path.extension().and_then(|e| e.to_str()) != Some("ts") {
                return Err(format!("not a declaration file: {}", path.display()));
            }
            Ok(parsed_file(vec![Directive::NoStdLib], true, Vec::new()))
        }
    }

    #[test]
    fn parser_rejects_non_declaration_extensions() {
        let parser = FixtureParser;
        assert!(parser.parse(Path::new("index.ts")).is_ok());
        assert!(parser.parse(Path::new("index.json")).is_err());
    }
}
