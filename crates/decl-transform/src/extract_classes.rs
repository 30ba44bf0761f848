//! Pipeline step 19: `ExtractClasses` (+ `ExpandCallables`).
//!
//! A `Constructor` type (`new (...) => T`), wherever it occurs, is hoisted
//! into a standalone sibling `DeclClass` carrying a matching `Ctor`
//! member, the same way `ExtractInterfaces` hoists anonymous object
//! types — a target language's class system has no literal "constructor
//! type" to translate to directly.
//!
//! `ExpandCallables` rewrites a `Call` member sitting alongside other
//! members into a normal method named `SimpleIdent::apply()`, so the
//! rest of the pipeline can treat it uniformly; it's skipped for the
//! `react` library, where a callable-and-propertied shape models a
//! function component and losing its direct callability would be wrong.

use decl_ident::{CodePath, JsLocation, LibraryName, SimpleIdent};
use decl_tree::{Container, FunctionSig, MemberTree, MethodType, Tree, TypeTree};
use std::collections::HashSet;

pub fn run(tree: Tree, lib_name: &LibraryName) -> Tree {
    let expand_callables = lib_name.name != "react";
    match tree {
        Tree::ParsedFile { directives, is_module, container } => {
            Tree::ParsedFile { directives, is_module, container: run_container(container, expand_callables) }
        }
        Tree::Namespace { name, container } => Tree::Namespace { name, container: run_container(container, expand_callables) },
        Tree::Module { name, container } => Tree::Module { name, container: run_container(container, expand_callables) },
        Tree::AugmentedModule { name, container } => {
            Tree::AugmentedModule { name, container: run_container(container, expand_callables) }
        }
        Tree::Global { container } => Tree::Global { container: run_container(container, expand_callables) },
        other => other,
    }
}

fn run_container(container: Container, expand_callables: bool) -> Container {
    let mut names: HashSet<SimpleIdent> = container.members.iter().filter_map(|m| m.name().cloned()).collect();
    let mut extra: Vec<Tree> = Vec::new();
    let code_path = container.code_path.clone();
    let js_location = container.js_location.clone();

    let mut members: Vec<Tree> = container
        .members
        .iter()
        .cloned()
        .map(|m| process_decl(m, &code_path, &js_location, expand_callables, &mut names, &mut extra))
        .collect();
    members.append(&mut extra);
    Container { members, ..container }
}

fn process_decl(
    tree: Tree,
    code_path: &CodePath,
    js_location: &JsLocation,
    expand_callables: bool,
    names: &mut HashSet<SimpleIdent>,
    extra: &mut Vec<Tree>,
) -> Tree {
    match tree {
        Tree::ParsedFile { directives, is_module, container } => {
            return Tree::ParsedFile { directives, is_module, container: run_container(container, expand_callables) };
        }
        Tree::Namespace { name, container } => {
            return Tree::Namespace { name, container: run_container(container, expand_callables) };
        }
        Tree::Module { name, container } => {
            return Tree::Module { name, container: run_container(container, expand_callables) };
        }
        Tree::AugmentedModule { name, container } => {
            return Tree::AugmentedModule { name, container: run_container(container, expand_callables) };
        }
        Tree::Global { container } => {
            return Tree::Global { container: run_container(container, expand_callables) };
        }
        _ => {}
    }
    match tree {
        Tree::DeclTypeAlias { name, comments, tparams, alias, code_path: cp, js_location: jl } => {
            let alias = extract_type(alias, code_path, js_location, names, extra);
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
            let members = members.into_iter().map(|m| extract_member(m, code_path, js_location, names, extra)).collect();
            let members = if expand_callables { expand_callables_in(members) } else { members };
            Tree::DeclClass { name, comments, declared, is_abstract, tparams, parent, implements, members, code_path: cp, js_location: jl }
        }
        Tree::DeclInterface { name, comments, tparams, inheritance, members, code_path: cp, js_location: jl } => {
            let members = members.into_iter().map(|m| extract_member(m, code_path, js_location, names, extra)).collect();
            let members = if expand_callables { expand_callables_in(members) } else { members };
            Tree::DeclInterface { name, comments, tparams, inheritance, members, code_path: cp, js_location: jl }
        }
        other => other,
    }
}

/// A `Call` member sharing an object with other members becomes a named
/// `apply` method instead.
fn expand_callables_in(members: Vec<MemberTree>) -> Vec<MemberTree> {
    if members.len() <= 1 {
        return members;
    }
    members
        .into_iter()
        .map(|m| match m {
            MemberTree::Call { sig, comments } => MemberTree::Function {
                name: SimpleIdent::apply(),
                method_type: MethodType::Normal,
                is_static: false,
                is_readonly: false,
                sig,
                comments,
            },
            other => other,
        })
        .collect()
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

fn extract_type(
    tpe: TypeTree,
    code_path: &CodePath,
    js_location: &JsLocation,
    names: &mut HashSet<SimpleIdent>,
    extra: &mut Vec<Tree>,
) -> TypeTree {
    match tpe {
        TypeTree::Constructor(sig, _abstract) => {
            let sig = extract_sig(sig, code_path, js_location, names, extra);
            materialize(sig, code_path, js_location, names, extra)
        }
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
        TypeTree::KeyOf(t) => TypeTree::KeyOf(Box::new(extract_type(*t, code_path, js_location, names, extra))),
        TypeTree::Lookup(from, key) => TypeTree::Lookup(
            Box::new(extract_type(*from, code_path, js_location, names, extra)),
            Box::new(extract_type(*key, code_path, js_location, names, extra)),
        ),
        other => other,
    }
}

fn materialize(
    sig: FunctionSig,
    code_path: &CodePath,
    js_location: &JsLocation,
    names: &mut HashSet<SimpleIdent>,
    extra: &mut Vec<Tree>,
) -> TypeTree {
    let ctor_member = vec![MemberTree::Ctor { sig, comments: decl_tree::Comments::empty() }];
    let name = crate::derive_name::ident_for("Instantiable", &ctor_member, |candidate| {
        !names.contains(&SimpleIdent::new(candidate))
    });
    names.insert(name.clone());
    extra.push(Tree::DeclClass {
        name: name.clone(),
        comments: decl_tree::Comments::empty(),
        declared: true,
        is_abstract: false,
        tparams: Vec::new(),
        parent: None,
        implements: Vec::new(),
        members: ctor_member,
        code_path: code_path.add(name.clone()),
        js_location: js_location.clone(),
    });
    TypeTree::ref_simple(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_ident::{JsLocation, SimpleIdent};
    use decl_tree::{Comments, FunctionSig};

    #[test]
    fn hoists_a_constructor_type_into_a_sibling_class() {
        let var = Tree::DeclVar {
            name: SimpleIdent::new("ctor"),
            comments: Comments::empty(),
            declared: true,
            readonly: false,
            tpe: Some(TypeTree::Constructor(FunctionSig::new(Vec::new(), None), false)),
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        };
        let root = Tree::ParsedFile { directives: Vec::new(), is_module: false, container: Container::new(vec![var]) };

        let result = run(root, &LibraryName::unscoped("lib"));
        let Tree::ParsedFile { container, .. } = result else { panic!() };
        assert_eq!(container.members.len(), 2);
        assert!(matches!(container.members[1], Tree::DeclClass { .. }));
    }

    #[test]
    fn expands_a_callable_objects_call_member_into_an_apply_method() {
        let iface = Tree::DeclInterface {
            name: SimpleIdent::new("Factory"),
            comments: Comments::empty(),
            tparams: Vec::new(),
            inheritance: Vec::new(),
            members: vec![
                MemberTree::Call { sig: FunctionSig::new(Vec::new(), None), comments: Comments::empty() },
                MemberTree::Property {
                    name: SimpleIdent::new("version"),
                    tpe: Some(TypeTree::ref_simple(SimpleIdent::new("string"))),
                    is_static: false,
                    is_readonly: false,
                    is_optional: false,
                    comments: Comments::empty(),
                },
            ],
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        };
        let root = Tree::ParsedFile { directives: Vec::new(), is_module: false, container: Container::new(vec![iface]) };

        let result = run(root, &LibraryName::unscoped("lib"));
        let Tree::ParsedFile { container, .. } = result else { panic!() };
        match &container.members[0] {
            Tree::DeclInterface { members, .. } => {
                assert!(members.iter().any(|m| m.name() == Some(&SimpleIdent::apply())));
            }
            other => panic!("expected interface, got {other:?}"),
        }
    }
}
