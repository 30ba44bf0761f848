//! Pipeline step 18: `ExtractInterfaces`.
//!
//! An anonymous object type used anywhere other than directly as a type
//! alias's own body (where it's already named by the alias) is hoisted
//! into a standalone, sibling `DeclInterface` and replaced at its use
//! site with a `Ref` — a target language without structural object types
//! needs every such shape to have a name.

use decl_ident::{CodePath, JsLocation, QIdent, SimpleIdent};
use decl_tree::{Container, FunctionSig, MemberTree, Tree, TypeTree};
use std::collections::HashSet;

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
        other => other,
    }
}

fn run_container(container: Container) -> Container {
    let mut names: HashSet<SimpleIdent> = container.members.iter().filter_map(|m| m.name().cloned()).collect();
    let mut extra: Vec<Tree> = Vec::new();
    let code_path = container.code_path.clone();
    let js_location = container.js_location.clone();

    let mut members: Vec<Tree> = container
        .members
        .iter()
        .cloned()
        .map(|m| process_decl(m, &code_path, &js_location, &mut names, &mut extra))
        .collect();
    members.append(&mut extra);
    Container { members, ..container }
}

fn process_decl(
    tree: Tree,
    code_path: &CodePath,
    js_location: &JsLocation,
    names: &mut HashSet<SimpleIdent>,
    extra: &mut Vec<Tree>,
) -> Tree {
    match tree {
        Tree::ParsedFile { .. } | Tree::Namespace { .. } | Tree::Module { .. } | Tree::AugmentedModule { .. } | Tree::Global { .. } => {
            run(tree)
        }
        Tree::DeclTypeAlias { name, comments, tparams, alias, code_path: cp, js_location: jl } => {
            let alias = extract_nested(alias, code_path, js_location, names, extra);
            Tree::DeclTypeAlias { name, comments, tparams, alias, code_path: cp, js_location: jl }
        }
        Tree::DeclVar { name, comments, declared, readonly, tpe, code_path: cp, js_location: jl } => {
            let tpe = tpe.map(|t| extract_type(t, code_path, js_location, names, extra));
            Tree::DeclVar { name, comments, declared, readonly, tpe, code_path: cp, js_location: jl }
        }
        Tree::DeclFunction { name, comments, declared, sig, code_path: cp, js_location: jl } => {
            let sig = extract_sig(sig, code_path, js_location, names, extra);
            Tree::DeclFunction { name, comments, declared, sig, code_path: cp, js_location: jl }
        }
        Tree::DeclClass { name, comments, declared, is_abstract, tparams, parent, implements, members, code_path: cp, js_location: jl } => {
            let parent = parent.map(|p| extract_type(p, code_path, js_location, names, extra));
            let implements = implements.into_iter().map(|t| extract_type(t, code_path, js_location, names, extra)).collect();
            let members = members.into_iter().map(|m| extract_member(m, code_path, js_location, names, extra)).collect();
            Tree::DeclClass { name, comments, declared, is_abstract, tparams, parent, implements, members, code_path: cp, js_location: jl }
        }
        Tree::DeclInterface { name, comments, tparams, inheritance, members, code_path: cp, js_location: jl } => {
            let inheritance = inheritance.into_iter().map(|t| extract_type(t, code_path, js_location, names, extra)).collect();
            let members = members.into_iter().map(|m| extract_member(m, code_path, js_location, names, extra)).collect();
            Tree::DeclInterface { name, comments, tparams, inheritance, members, code_path: cp, js_location: jl }
        }
        other => other,
    }
}

fn extract_member(
    member: MemberTree,
    code_path: &CodePath,
    js_location: &JsLocation,
    names: &mut HashSet<SimpleIdent>,
    extra: &mut Vec<Tree>,
) -> MemberTree {
    match member {
        MemberTree::Property { name, tpe, is_static, is_readonly, is_optional, comments } => MemberTree::Property {
            name,
            tpe: tpe.map(|t| extract_type(t, code_path, js_location, names, extra)),
            is_static,
            is_readonly,
            is_optional,
            comments,
        },
        MemberTree::Function { name, method_type, is_static, is_readonly, sig, comments } => MemberTree::Function {
            name,
            method_type,
            is_static,
            is_readonly,
            sig: extract_sig(sig, code_path, js_location, names, extra),
            comments,
        },
        MemberTree::Call { sig, comments } => MemberTree::Call { sig: extract_sig(sig, code_path, js_location, names, extra), comments },
        MemberTree::Ctor { sig, comments } => MemberTree::Ctor { sig: extract_sig(sig, code_path, js_location, names, extra), comments },
        MemberTree::Index { indexing, value_type, comments } => {
            MemberTree::Index { indexing, value_type: extract_type(value_type, code_path, js_location, names, extra), comments }
        }
        other => other,
    }
}

fn extract_sig(
    sig: FunctionSig,
    code_path: &CodePath,
    js_location: &JsLocation,
    names: &mut HashSet<SimpleIdent>,
    extra: &mut Vec<Tree>,
) -> FunctionSig {
    FunctionSig {
        type_params: sig.type_params,
        params: sig
            .params
            .into_iter()
            .map(|mut p| {
                p.tpe = p.tpe.map(|t| extract_type(t, code_path, js_location, names, extra));
                p
            })
            .collect(),
        result_type: sig.result_type.map(|t| Box::new(extract_type(*t, code_path, js_location, names, extra))),
    }
}

/// Materializes a top-level `Object` type into a new sibling interface;
/// any other shape just recurses into its children.
fn extract_type(
    tpe: TypeTree,
    code_path: &CodePath,
    js_location: &JsLocation,
    names: &mut HashSet<SimpleIdent>,
    extra: &mut Vec<Tree>,
) -> TypeTree {
    match tpe {
        TypeTree::Object(members) => {
            let members: Vec<MemberTree> =
                members.into_iter().map(|m| extract_member(m, code_path, js_location, names, extra)).collect();
            materialize(members, code_path, js_location, names, extra)
        }
        other => extract_nested(other, code_path, js_location, names, extra),
    }
}

/// Like `extract_type`, but an `Object` encountered at the very top isn't
/// itself materialized — used for a `DeclTypeAlias`'s own body, which is
/// already the named thing.
fn extract_nested(
    tpe: TypeTree,
    code_path: &CodePath,
    js_location: &JsLocation,
    names: &mut HashSet<SimpleIdent>,
    extra: &mut Vec<Tree>,
) -> TypeTree {
    match tpe {
        TypeTree::Object(members) => {
            TypeTree::Object(members.into_iter().map(|m| extract_member(m, code_path, js_location, names, extra)).collect())
        }
        TypeTree::Ref(qident, args) => {
            TypeTree::Ref(qident, args.into_iter().map(|a| extract_type(a, code_path, js_location, names, extra)).collect())
        }
        TypeTree::Union(ts) => TypeTree::Union(ts.into_iter().map(|t| extract_type(t, code_path, js_location, names, extra)).collect()),
        TypeTree::Intersect(ts) => {
            TypeTree::Intersect(ts.into_iter().map(|t| extract_type(t, code_path, js_location, names, extra)).collect())
        }
        TypeTree::Tuple(elems) => TypeTree::Tuple(
            elems
                .into_iter()
                .map(|mut e| {
                    e.tpe = extract_type(e.tpe, code_path, js_location, names, extra);
                    e
                })
                .collect(),
        ),
        TypeTree::Function(sig) => TypeTree::Function(extract_sig(sig, code_path, js_location, names, extra)),
        TypeTree::Constructor(sig, abs) => TypeTree::Constructor(extract_sig(sig, code_path, js_location, names, extra), abs),
        TypeTree::KeyOf(t) => TypeTree::KeyOf(Box::new(extract_type(*t, code_path, js_location, names, extra))),
        TypeTree::Lookup(from, key) => TypeTree::Lookup(
            Box::new(extract_type(*from, code_path, js_location, names, extra)),
            Box::new(extract_type(*key, code_path, js_location, names, extra)),
        ),
        TypeTree::Conditional(pred, t, f) => TypeTree::Conditional(
            Box::new(extract_type(*pred, code_path, js_location, names, extra)),
            Box::new(extract_type(*t, code_path, js_location, names, extra)),
            Box::new(extract_type(*f, code_path, js_location, names, extra)),
        ),
        TypeTree::Extends(t, e) => TypeTree::Extends(
            Box::new(extract_type(*t, code_path, js_location, names, extra)),
            Box::new(extract_type(*e, code_path, js_location, names, extra)),
        ),
        TypeTree::Is(name, t) => TypeTree::Is(name, Box::new(extract_type(*t, code_path, js_location, names, extra))),
        other => other,
    }
}

fn materialize(
    members: Vec<MemberTree>,
    code_path: &CodePath,
    js_location: &JsLocation,
    names: &mut HashSet<SimpleIdent>,
    extra: &mut Vec<Tree>,
) -> TypeTree {
    let name = crate::derive_name::ident_for("Anon", &members, |candidate| !names.contains(&SimpleIdent::new(candidate)));
    names.insert(name.clone());
    extra.push(Tree::DeclInterface {
        name: name.clone(),
        comments: decl_tree::Comments::empty(),
        tparams: Vec::new(),
        inheritance: Vec::new(),
        members,
        code_path: code_path.add(name.clone()),
        js_location: js_location.clone(),
    });
    TypeTree::ref_simple(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_ident::LibraryName;

    #[test]
    fn hoists_an_anonymous_object_property_type_into_a_sibling_interface() {
        let var = Tree::DeclVar {
            name: SimpleIdent::new("point"),
            comments: decl_tree::Comments::empty(),
            declared: true,
            readonly: false,
            tpe: Some(TypeTree::Object(vec![MemberTree::Property {
                name: SimpleIdent::new("x"),
                tpe: Some(TypeTree::ref_simple(SimpleIdent::new("number"))),
                is_static: false,
                is_readonly: false,
                is_optional: false,
                comments: decl_tree::Comments::empty(),
            }])),
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        };
        let root = Tree::ParsedFile {
            directives: Vec::new(),
            is_module: false,
            container: Container::new(vec![var]).with_code_path(CodePath::has_path(
                LibraryName::unscoped("lib"),
                QIdent::new(Vec::new()),
            )),
        };

        let result = run(root);
        let Tree::ParsedFile { container, .. } = result else { panic!() };
        assert_eq!(container.members.len(), 2);
        match &container.members[0] {
            Tree::DeclVar { tpe: Some(TypeTree::Ref(_, _)), .. } => {}
            other => panic!("expected var type replaced with a Ref, got {other:?}"),
        }
        assert!(matches!(container.members[1], Tree::DeclInterface { .. }));
    }

    #[test]
    fn does_not_extract_a_type_aliass_own_top_level_object_body() {
        let alias = Tree::DeclTypeAlias {
            name: SimpleIdent::new("Point"),
            comments: decl_tree::Comments::empty(),
            tparams: Vec::new(),
            alias: TypeTree::Object(Vec::new()),
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        };
        let root = Tree::ParsedFile { directives: Vec::new(), is_module: false, container: Container::new(vec![alias]) };

        let result = run(root);
        let Tree::ParsedFile { container, .. } = result else { panic!() };
        assert_eq!(container.members.len(), 1);
    }
}
