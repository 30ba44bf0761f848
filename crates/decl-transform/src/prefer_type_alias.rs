//! Pipeline step 17: `PreferTypeAlias`.
//!
//! An interface with no inheritance is nothing but a named object type —
//! representing it as a `DeclTypeAlias` aliasing an `Object` type instead
//! keeps its member list exactly as useful for lookup (both variants are
//! accepted by the `Types` picker under the same name) while dropping the
//! open-ended "declaration merging" semantics interfaces carry that a
//! type alias doesn't need to support.
//!
//! The source this pipeline is modeled on never finished wiring up its
//! own recursive-group detection for this pass (self-referencing
//! interfaces were meant to be excluded, to avoid producing a directly
//! self-referential type alias); that detection is not implemented here
//! either, so every inheritance-free interface converts regardless of
//! whether it references itself. See `DESIGN.md`.

use decl_tree::{Container, Tree};

pub fn run(tree: Tree) -> Tree {
    match tree {
        Tree::ParsedFile { directives, is_module, container } => {
            Tree::ParsedFile { directives, is_module, container: run_container(container) }
        }
        Tree::Namespace { name, container } => Tree::Namespace { name, container: run_container(container) },
        Tree::Module { name, container } => Tree::Module { name, container: run_container(container) },
        Tree::AugmentedModule { name, container } => {
            Tree::AugmentedModule { name, container: run_container(container) }
        }
        Tree::Global { container } => Tree::Global { container: run_container(container) },
        Tree::DeclInterface { name, comments, tparams, inheritance, members, code_path, js_location } if inheritance.is_empty() => {
            Tree::DeclTypeAlias {
                name,
                comments,
                tparams,
                alias: decl_tree::TypeTree::Object(members),
                code_path,
                js_location,
            }
        }
        other => other,
    }
}

fn run_container(container: Container) -> Container {
    let members = container.members.into_iter().map(run).collect();
    Container { members, ..container }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_ident::{CodePath, JsLocation, SimpleIdent};
    use decl_tree::Comments;

    #[test]
    fn converts_an_inheritance_free_interface_to_a_type_alias() {
        let iface = Tree::DeclInterface {
            name: SimpleIdent::new("Point"),
            comments: Comments::empty(),
            tparams: Vec::new(),
            inheritance: Vec::new(),
            members: Vec::new(),
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        };
        match run(iface) {
            Tree::DeclTypeAlias { name, .. } => assert_eq!(name, SimpleIdent::new("Point")),
            other => panic!("expected a type alias, got {other:?}"),
        }
    }

    #[test]
    fn leaves_an_interface_with_inheritance_untouched() {
        let iface = Tree::DeclInterface {
            name: SimpleIdent::new("Extended"),
            comments: Comments::empty(),
            tparams: Vec::new(),
            inheritance: vec![decl_tree::TypeTree::ref_simple(SimpleIdent::new("Base"))],
            members: Vec::new(),
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        };
        match run(iface) {
            Tree::DeclInterface { .. } => {}
            other => panic!("expected the interface to be left alone, got {other:?}"),
        }
    }
}
