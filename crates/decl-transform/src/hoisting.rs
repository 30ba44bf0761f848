//! Hoisting: lifting members of an object type up to standalone
//! declarations of the same library surface (§4.7 "Hoisting", used by
//! `VarToNamespace` and by export expansion).
//!
//! `Hoisting.declared` is hardcoded to `false` in the original converter;
//! whether it should propagate from the enclosing var's `declared` flag
//! is left unresolved there (§9 Open Questions) — this port keeps the
//! same hardcoded `false`, recorded in `DESIGN.md`.

use decl_ident::{CodePath, JsLocation, SimpleIdent};
use decl_tree::{Comments, MemberTree, MethodType, Tree, TypeTree};

/// Extracts standalone declarations from an object type's members: call
/// signatures become a function named `^`, normal methods become
/// functions, properties become vars. Getters/setters and constructors
/// are dropped — they have no standalone-declaration equivalent at this
/// phase.
pub fn hoist(members: &[MemberTree], base_path: &CodePath, base_location: &JsLocation) -> Vec<Tree> {
    members
        .iter()
        .filter_map(|m| hoist_one(m, base_path, base_location))
        .collect()
}

fn hoist_one(member: &MemberTree, base_path: &CodePath, base_location: &JsLocation) -> Option<Tree> {
    match member {
        MemberTree::Call { sig, comments } => {
            let name = SimpleIdent::namespaced();
            Some(Tree::DeclFunction {
                name: name.clone(),
                comments: comments.clone(),
                declared: false,
                sig: sig.clone(),
                code_path: base_path.add(name),
                js_location: base_location.clone(),
            })
        }
        MemberTree::Function {
            name,
            method_type: MethodType::Normal,
            sig,
            comments,
            ..
        } => Some(Tree::DeclFunction {
            name: name.clone(),
            comments: comments.clone(),
            declared: false,
            sig: sig.clone(),
            code_path: base_path.add(name.clone()),
            js_location: base_location.clone(),
        }),
        MemberTree::Property { name, tpe, is_readonly, comments, .. } => Some(Tree::DeclVar {
            name: name.clone(),
            comments: comments.clone(),
            declared: false,
            readonly: *is_readonly,
            tpe: tpe.clone(),
            code_path: base_path.add(name.clone()),
            js_location: base_location.clone(),
        }),
        // Getters/setters, index signatures, mapped members, and
        // constructors have no standalone-declaration shape.
        MemberTree::Function { .. } | MemberTree::Ctor { .. } | MemberTree::Index { .. } | MemberTree::TypeMapped { .. } => {
            None
        }
    }
}

/// Pulls the member list out of an object type, or `None` if `t` isn't an
/// object type (after following trivial wrapping — callers that need
/// alias-following go through `decl_scope::follow_alias` first).
pub fn object_members(t: &TypeTree) -> Option<&[MemberTree]> {
    match t {
        TypeTree::Object(members) => Some(members),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_ident::{LibraryName, QIdent};

    fn base() -> (CodePath, JsLocation) {
        (
            CodePath::has_path(LibraryName::unscoped("lib"), QIdent::new(Vec::new())),
            JsLocation::Zero,
        )
    }

    #[test]
    fn hoists_call_signature_as_namespaced_function() {
        let (path, loc) = base();
        let members = vec![MemberTree::Call {
            sig: decl_tree::FunctionSig::new(Vec::new(), None),
            comments: Comments::empty(),
        }];
        let hoisted = hoist(&members, &path, &loc);
        assert_eq!(hoisted.len(), 1);
        assert_eq!(hoisted[0].name(), Some(&SimpleIdent::namespaced()));
        assert!(matches!(hoisted[0], Tree::DeclFunction { .. }));
    }

    #[test]
    fn drops_getters_and_ctors() {
        let (path, loc) = base();
        let members = vec![
            MemberTree::Function {
                name: SimpleIdent::new("x"),
                method_type: MethodType::Getter,
                is_static: false,
                is_readonly: false,
                sig: decl_tree::FunctionSig::new(Vec::new(), None),
                comments: Comments::empty(),
            },
            MemberTree::Ctor {
                sig: decl_tree::FunctionSig::new(Vec::new(), None),
                comments: Comments::empty(),
            },
        ];
        assert!(hoist(&members, &path, &loc).is_empty());
    }

    #[test]
    fn hoists_property_as_var_and_method_as_function() {
        let (path, loc) = base();
        let members = vec![
            MemberTree::Property {
                name: SimpleIdent::new("p"),
                tpe: Some(TypeTree::ref_simple(SimpleIdent::new("string"))),
                is_static: false,
                is_readonly: true,
                is_optional: false,
                comments: Comments::empty(),
            },
            MemberTree::Function {
                name: SimpleIdent::new("m"),
                method_type: MethodType::Normal,
                is_static: false,
                is_readonly: false,
                sig: decl_tree::FunctionSig::new(Vec::new(), None),
                comments: Comments::empty(),
            },
        ];
        let hoisted = hoist(&members, &path, &loc);
        assert_eq!(hoisted.len(), 2);
        assert!(matches!(hoisted[0], Tree::DeclVar { .. }));
        assert!(matches!(hoisted[1], Tree::DeclFunction { .. }));
    }
}
