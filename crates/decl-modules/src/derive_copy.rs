//! Derive copy: re-exporting a declaration under a new name/path produces
//! a structurally-updated copy rather than moving the original (§4.6).

use decl_ident::{CodePath, JsLocation, QIdent, SimpleIdent};
use decl_tree::{Tree, TypeTree};

/// Rebuilds `decl` as it should appear at `new_path`/`new_location`, with
/// `new_name` if the copy is being renamed (e.g. `export { a as b }`).
pub fn derive_copy(
    decl: &Tree,
    new_name: Option<SimpleIdent>,
    new_path: CodePath,
    new_location: JsLocation,
) -> Tree {
    let name = new_name.unwrap_or_else(|| decl.name().cloned().unwrap_or_else(SimpleIdent::default_export));
    match decl {
        Tree::DeclClass { code_path, .. } => {
            // A derived class inherits from its origin via a synthetic
            // `Ref`, and is marked `declared` since it has no body of its
            // own to re-emit.
            let origin_ref = match code_path {
                CodePath::HasPath { path, .. } => TypeTree::Ref(path.clone(), Vec::new()),
                CodePath::NoPath => TypeTree::Ref(QIdent::single(name.clone()), Vec::new()),
            };
            Tree::DeclClass {
                name,
                comments: decl_tree::Comments::empty(),
                declared: true,
                is_abstract: false,
                tparams: Vec::new(),
                parent: Some(origin_ref),
                implements: Vec::new(),
                members: Vec::new(),
                code_path: new_path,
                js_location: new_location,
            }
        }
        Tree::DeclInterface { code_path, .. } => {
            // An interface can't be `declared`/aliased-by-extension the
            // way a class can, so it becomes a type alias to its origin.
            let origin_ref = match code_path {
                CodePath::HasPath { path, .. } => TypeTree::Ref(path.clone(), Vec::new()),
                CodePath::NoPath => TypeTree::Ref(QIdent::single(name.clone()), Vec::new()),
            };
            Tree::DeclTypeAlias {
                name,
                comments: decl_tree::Comments::empty(),
                tparams: Vec::new(),
                alias: origin_ref,
                code_path: new_path,
                js_location: new_location,
            }
        }
        Tree::DeclFunction { sig, comments, declared, .. } => Tree::DeclFunction {
            name,
            comments: comments.clone(),
            declared: *declared,
            sig: sig.clone(),
            code_path: new_path,
            js_location: new_location,
        },
        Tree::DeclVar { tpe, comments, declared, readonly, .. } => Tree::DeclVar {
            name,
            comments: comments.clone(),
            declared: *declared,
            readonly: *readonly,
            tpe: tpe.clone(),
            code_path: new_path,
            js_location: new_location,
        },
        Tree::DeclEnum {
            comments,
            declared,
            is_const,
            is_value,
            members,
            ..
        } => Tree::DeclEnum {
            name,
            comments: comments.clone(),
            declared: *declared,
            is_const: *is_const,
            is_value: *is_value,
            members: members.clone(),
            exported_from: None,
            code_path: new_path,
            js_location: new_location,
        },
        Tree::DeclTypeAlias { tparams, alias, comments, .. } => Tree::DeclTypeAlias {
            name,
            comments: comments.clone(),
            tparams: tparams.clone(),
            alias: alias.clone(),
            code_path: new_path,
            js_location: new_location,
        },
        Tree::Namespace { container, .. } => {
            let members = recompute_child_paths(&container.members, &new_path);
            Tree::Namespace {
                name,
                container: decl_tree::Container {
                    members,
                    code_path: new_path,
                    js_location: new_location,
                    ..container.clone()
                },
            }
        }
        other => other.clone(),
    }
}

/// After rebasing a container's code path, every child's path must be
/// recomputed relative to the new base rather than kept pointing at the
/// origin.
fn recompute_child_paths(members: &[Tree], base: &CodePath) -> Vec<Tree> {
    members
        .iter()
        .map(|m| {
            let mut clone = m.clone();
            if let Some(name) = clone.name().cloned() {
                clone.set_code_path(base.add(name));
            }
            clone
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_ident::LibraryName;

    #[test]
    fn derive_copy_of_a_class_inherits_from_the_origin() {
        let origin_path = CodePath::has_path(
            LibraryName::unscoped("lib"),
            QIdent::single(SimpleIdent::new("Original")),
        );
        let class = Tree::DeclClass {
            name: SimpleIdent::new("Original"),
            comments: decl_tree::Comments::empty(),
            declared: false,
            is_abstract: false,
            tparams: Vec::new(),
            parent: None,
            implements: Vec::new(),
            members: Vec::new(),
            code_path: origin_path.clone(),
            js_location: JsLocation::Zero,
        };

        let new_path = CodePath::has_path(
            LibraryName::unscoped("lib"),
            QIdent::single(SimpleIdent::new("Renamed")),
        );
        let copy = derive_copy(
            &class,
            Some(SimpleIdent::new("Renamed")),
            new_path,
            JsLocation::Zero,
        );

        match copy {
            Tree::DeclClass { name, declared, parent, .. } => {
                assert_eq!(name, SimpleIdent::new("Renamed"));
                assert!(declared);
                assert!(parent.is_some());
            }
            _ => panic!("expected class"),
        }
    }

    #[test]
    fn derive_copy_of_an_interface_becomes_a_type_alias() {
        let origin_path = CodePath::has_path(
            LibraryName::unscoped("lib"),
            QIdent::single(SimpleIdent::new("IFoo")),
        );
        let iface = Tree::DeclInterface {
            name: SimpleIdent::new("IFoo"),
            comments: decl_tree::Comments::empty(),
            tparams: Vec::new(),
            inheritance: Vec::new(),
            members: Vec::new(),
            code_path: origin_path,
            js_location: JsLocation::Zero,
        };

        let copy = derive_copy(&iface, None, CodePath::NoPath, JsLocation::Zero);
        assert!(matches!(copy, Tree::DeclTypeAlias { .. }));
    }
}
