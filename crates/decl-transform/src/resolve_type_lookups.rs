//! Pipeline step 16: `ResolveTypeLookups`.
//!
//! `T["key"]` (`TypeTree::Lookup`) is resolved to the concrete type of
//! `key` on `T` whenever `T` is (after following aliases) an object shape
//! with a matching member — the indexed-access form has no counterpart in
//! a target language without structural indexed types.

use decl_scope::{follow_alias, Scope};
use decl_tree::{Container, MemberTree, Tree, TypeTree};

pub fn run<'a>(tree: &'a Tree, scope: &Scope<'a>) -> Tree {
    rewrite_tree(tree, scope)
}

fn rewrite_tree<'a>(tree: &'a Tree, scope: &Scope<'a>) -> Tree {
    match tree {
        Tree::ParsedFile { directives, is_module, container } => Tree::ParsedFile {
            directives: directives.clone(),
            is_module: *is_module,
            container: rewrite_container(container, &scope.nested(tree)),
        },
        Tree::Namespace { name, container } => {
            Tree::Namespace { name: name.clone(), container: rewrite_container(container, &scope.nested(tree)) }
        }
        Tree::Module { name, container } => {
            Tree::Module { name: name.clone(), container: rewrite_container(container, &scope.nested(tree)) }
        }
        Tree::AugmentedModule { name, container } => {
            Tree::AugmentedModule { name: name.clone(), container: rewrite_container(container, &scope.nested(tree)) }
        }
        Tree::Global { container } => Tree::Global { container: rewrite_container(container, &scope.nested(tree)) },
        Tree::DeclTypeAlias { name, comments, tparams, alias, code_path, js_location } => {
            let s = scope.with_type_params(tparams);
            Tree::DeclTypeAlias {
                name: name.clone(),
                comments: comments.clone(),
                tparams: tparams.clone(),
                alias: rewrite_type(alias, &s),
                code_path: code_path.clone(),
                js_location: js_location.clone(),
            }
        }
        Tree::DeclClass { name, comments, declared, is_abstract, tparams, parent, implements, members, code_path, js_location } => {
            let s = scope.with_type_params(tparams);
            Tree::DeclClass {
                name: name.clone(),
                comments: comments.clone(),
                declared: *declared,
                is_abstract: *is_abstract,
                tparams: tparams.clone(),
                parent: parent.as_ref().map(|p| rewrite_type(p, &s)),
                implements: implements.iter().map(|t| rewrite_type(t, &s)).collect(),
                members: members.iter().map(|m| rewrite_member(m, &s)).collect(),
                code_path: code_path.clone(),
                js_location: js_location.clone(),
            }
        }
        Tree::DeclInterface { name, comments, tparams, inheritance, members, code_path, js_location } => {
            let s = scope.with_type_params(tparams);
            Tree::DeclInterface {
                name: name.clone(),
                comments: comments.clone(),
                tparams: tparams.clone(),
                inheritance: inheritance.iter().map(|t| rewrite_type(t, &s)).collect(),
                members: members.iter().map(|m| rewrite_member(m, &s)).collect(),
                code_path: code_path.clone(),
                js_location: js_location.clone(),
            }
        }
        Tree::DeclVar { name, comments, declared, readonly, tpe, code_path, js_location } => Tree::DeclVar {
            name: name.clone(),
            comments: comments.clone(),
            declared: *declared,
            readonly: *readonly,
            tpe: tpe.as_ref().map(|t| rewrite_type(t, scope)),
            code_path: code_path.clone(),
            js_location: js_location.clone(),
        },
        other => other.clone(),
    }
}

fn rewrite_container<'a>(container: &Container, scope: &Scope<'a>) -> Container {
    Container { members: container.members.iter().map(|m| rewrite_tree(m, scope)).collect(), ..container.clone() }
}

fn rewrite_member(member: &MemberTree, scope: &Scope<'_>) -> MemberTree {
    match member {
        MemberTree::Property { name, tpe, is_static, is_readonly, is_optional, comments } => MemberTree::Property {
            name: name.clone(),
            tpe: tpe.as_ref().map(|t| rewrite_type(t, scope)),
            is_static: *is_static,
            is_readonly: *is_readonly,
            is_optional: *is_optional,
            comments: comments.clone(),
        },
        other => other.clone(),
    }
}

fn rewrite_type(tpe: &TypeTree, scope: &Scope<'_>) -> TypeTree {
    match tpe {
        TypeTree::Lookup(from, key) => {
            let from = rewrite_type(from, scope);
            let key = rewrite_type(key, scope);
            resolve_lookup(&from, &key, scope).unwrap_or(TypeTree::Lookup(Box::new(from), Box::new(key)))
        }
        TypeTree::Union(ts) => TypeTree::Union(ts.iter().map(|t| rewrite_type(t, scope)).collect()),
        TypeTree::Intersect(ts) => TypeTree::Intersect(ts.iter().map(|t| rewrite_type(t, scope)).collect()),
        TypeTree::Object(members) => TypeTree::Object(members.iter().map(|m| rewrite_member(m, scope)).collect()),
        TypeTree::Tuple(elems) => TypeTree::Tuple(
            elems
                .iter()
                .map(|e| {
                    let mut e = e.clone();
                    e.tpe = rewrite_type(&e.tpe, scope);
                    e
                })
                .collect(),
        ),
        TypeTree::Function(sig) => TypeTree::Function(rewrite_sig(sig, scope)),
        TypeTree::Constructor(sig, abs) => TypeTree::Constructor(rewrite_sig(sig, scope), *abs),
        TypeTree::KeyOf(t) => TypeTree::KeyOf(Box::new(rewrite_type(t, scope))),
        other => other.clone(),
    }
}

fn rewrite_sig(sig: &decl_tree::FunctionSig, scope: &Scope<'_>) -> decl_tree::FunctionSig {
    let s = scope.with_type_params(&sig.type_params);
    decl_tree::FunctionSig {
        type_params: sig.type_params.clone(),
        params: sig
            .params
            .iter()
            .map(|p| {
                let mut p = p.clone();
                p.tpe = p.tpe.as_ref().map(|t| rewrite_type(t, &s));
                p
            })
            .collect(),
        result_type: sig.result_type.as_ref().map(|t| Box::new(rewrite_type(t, &s))),
    }
}

fn resolve_lookup(from: &TypeTree, key: &TypeTree, scope: &Scope<'_>) -> Option<TypeTree> {
    let TypeTree::Literal(decl_tree::LiteralValue::Str(key_name)) = key else { return None };
    let followed = follow_alias(from, scope);
    let members: &[MemberTree] = match &followed {
        TypeTree::Object(members) => members,
        TypeTree::Ref(qident, args) if args.is_empty() => {
            let hits = scope.enable_unqualified_lookup().lookup_type(qident);
            match hits.as_slice() {
                [Tree::DeclInterface { members, .. }] => members,
                [Tree::DeclClass { members, .. }] => members,
                _ => return None,
            }
        }
        _ => return None,
    };
    members.iter().find_map(|m| match m {
        MemberTree::Property { name, tpe: Some(tpe), .. } if name.as_str() == key_name => Some(tpe.clone()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_common::TracingLogger;
    use decl_ident::{CodePath, JsLocation, LibraryName, QIdent, SimpleIdent};
    use decl_tree::Comments;

    #[test]
    fn resolves_a_literal_key_lookup_against_an_interface() {
        let iface = Tree::DeclInterface {
            name: SimpleIdent::new("Box"),
            comments: Comments::empty(),
            tparams: Vec::new(),
            inheritance: Vec::new(),
            members: vec![MemberTree::Property {
                name: SimpleIdent::new("value"),
                tpe: Some(TypeTree::ref_simple(SimpleIdent::new("number"))),
                is_static: false,
                is_readonly: false,
                is_optional: false,
                comments: Comments::empty(),
            }],
            code_path: CodePath::has_path(LibraryName::unscoped("lib"), QIdent::single(SimpleIdent::new("Box"))),
            js_location: JsLocation::Zero,
        };
        let var = Tree::DeclVar {
            name: SimpleIdent::new("v"),
            comments: Comments::empty(),
            declared: true,
            readonly: false,
            tpe: Some(TypeTree::Lookup(
                Box::new(TypeTree::ref_simple(SimpleIdent::new("Box"))),
                Box::new(TypeTree::Literal(decl_tree::LiteralValue::Str("value".into()))),
            )),
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        };
        let root = Tree::ParsedFile { directives: Vec::new(), is_module: false, container: Container::new(vec![iface, var]) };
        let logger = TracingLogger;
        let scope = Scope::root(LibraryName::unscoped("lib"), false, &root, &[], &logger);

        let result = run(&root, &scope);
        let Tree::ParsedFile { container, .. } = result else { panic!() };
        match &container.members[1] {
            Tree::DeclVar { tpe: Some(t), .. } => assert_eq!(*t, TypeTree::ref_simple(SimpleIdent::new("number"))),
            _ => panic!("expected resolved var type"),
        }
    }
}
