//! Pipeline step 12: `DefaultedTypeArguments ⋙ TypeAliasIntersection ⋙
//! RejiggerIntersections`.
//!
//! Three independent type-level simplifications, run back-to-back under
//! one scoped descent (same combining rationale as `combined_early`).

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
        Tree::Namespace { name, container } => Tree::Namespace {
            name: name.clone(),
            container: rewrite_container(container, &scope.nested(tree)),
        },
        Tree::Module { name, container } => Tree::Module {
            name: name.clone(),
            container: rewrite_container(container, &scope.nested(tree)),
        },
        Tree::AugmentedModule { name, container } => Tree::AugmentedModule {
            name: name.clone(),
            container: rewrite_container(container, &scope.nested(tree)),
        },
        Tree::Global { container } => Tree::Global { container: rewrite_container(container, &scope.nested(tree)) },
        Tree::DeclTypeAlias { name, comments, tparams, alias, code_path, js_location } => {
            let s = scope.with_type_params(tparams);
            let rewritten_alias = rewrite_type(alias, &s);
            if let Some(decl) = try_alias_intersection(name, tparams, &rewritten_alias, code_path, js_location, &s) {
                return decl;
            }
            Tree::DeclTypeAlias {
                name: name.clone(),
                comments: comments.clone(),
                tparams: tparams.clone(),
                alias: rewritten_alias,
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
    Container {
        members: container.members.iter().map(|m| rewrite_tree(m, scope)).collect(),
        ..container.clone()
    }
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

/// `DefaultedTypeArguments`: a `Ref` with fewer type arguments than the
/// target declares type parameters for is filled out with the target's
/// declared defaults (when present) for the missing trailing slots.
fn rewrite_type(tpe: &TypeTree, scope: &Scope<'_>) -> TypeTree {
    match tpe {
        TypeTree::Ref(qident, args) => {
            let args: Vec<TypeTree> = args.iter().map(|a| rewrite_type(a, scope)).collect();
            let filled = fill_defaulted_args(qident, args, scope);
            let intersected = rejigger_intersect_candidate(&filled);
            intersected.unwrap_or(filled)
        }
        TypeTree::Union(ts) => TypeTree::Union(ts.iter().map(|t| rewrite_type(t, scope)).collect()),
        TypeTree::Intersect(ts) => {
            rejigger_intersections(ts.iter().map(|t| rewrite_type(t, scope)).collect())
        }
        TypeTree::Object(members) => TypeTree::Object(members.iter().map(|m| rewrite_member(m, scope)).collect()),
        TypeTree::Function(sig) => TypeTree::Function(rewrite_sig(sig, scope)),
        TypeTree::Constructor(sig, abstract_) => TypeTree::Constructor(rewrite_sig(sig, scope), *abstract_),
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
        TypeTree::KeyOf(t) => TypeTree::KeyOf(Box::new(rewrite_type(t, scope))),
        TypeTree::Lookup(from, key) => {
            TypeTree::Lookup(Box::new(rewrite_type(from, scope)), Box::new(rewrite_type(key, scope)))
        }
        TypeTree::Conditional(pred, t, f) => TypeTree::Conditional(
            Box::new(rewrite_type(pred, scope)),
            Box::new(rewrite_type(t, scope)),
            Box::new(rewrite_type(f, scope)),
        ),
        TypeTree::Extends(t, e) => TypeTree::Extends(Box::new(rewrite_type(t, scope)), Box::new(rewrite_type(e, scope))),
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

fn fill_defaulted_args(qident: &decl_ident::QIdent, args: Vec<TypeTree>, scope: &Scope<'_>) -> TypeTree {
    let hits = scope.enable_unqualified_lookup().lookup_type(qident);
    let tparams = match hits.as_slice() {
        [Tree::DeclInterface { tparams, .. }] => tparams.as_slice(),
        [Tree::DeclClass { tparams, .. }] => tparams.as_slice(),
        [Tree::DeclTypeAlias { tparams, .. }] => tparams.as_slice(),
        _ => return TypeTree::Ref(qident.clone(), args),
    };
    if args.len() >= tparams.len() {
        return TypeTree::Ref(qident.clone(), args);
    }
    let mut filled = args;
    for tp in &tparams[filled.len()..] {
        match &tp.default {
            Some(default) => filled.push(default.as_ref().clone()),
            None => break,
        }
    }
    TypeTree::Ref(qident.clone(), filled)
}

/// `TypeAliasIntersection`: `type T = A & B & { ...members }` becomes
/// `interface T extends A, B { ...members }` when every component is a
/// legal-inheritance shape (a non-abstract `Ref` whose followed-alias
/// target is itself a `Ref`, a non-type-mapping `Object`, or a
/// `Function`) and nothing uncategorized remains.
fn try_alias_intersection(
    name: &decl_ident::SimpleIdent,
    tparams: &[decl_tree::TypeParam],
    alias: &TypeTree,
    code_path: &decl_ident::CodePath,
    js_location: &decl_ident::JsLocation,
    scope: &Scope<'_>,
) -> Option<Tree> {
    let TypeTree::Intersect(parts) = alias else { return None };

    let mut inheritance = Vec::new();
    let mut members: Vec<MemberTree> = Vec::new();
    for part in parts {
        match part {
            TypeTree::Ref(qident, _) if !is_abstract_ref(qident, scope) => {
                let followed = follow_alias(part, scope);
                match &followed {
                    TypeTree::Ref(_, _) | TypeTree::Function(_) => inheritance.push(part.clone()),
                    TypeTree::Object(object_members) if !has_type_mapping(object_members) => {
                        inheritance.push(part.clone())
                    }
                    _ => return None,
                }
            }
            TypeTree::Object(object_members) if !has_type_mapping(object_members) => {
                members.extend(object_members.iter().cloned());
            }
            _ => return None,
        }
    }

    Some(Tree::DeclInterface {
        name: name.clone(),
        comments: decl_tree::Comments::empty(),
        tparams: tparams.to_vec(),
        inheritance,
        members,
        code_path: code_path.clone(),
        js_location: js_location.clone(),
    })
}

fn is_abstract_ref(qident: &decl_ident::QIdent, scope: &Scope<'_>) -> bool {
    qident.len() == 1 && qident.head().map(|h| scope.is_abstract(h)).unwrap_or(false)
}

fn has_type_mapping(members: &[MemberTree]) -> bool {
    members.iter().any(|m| matches!(m, MemberTree::TypeMapped { .. }))
}

/// `RejiggerIntersections`: flattens nested intersections, drops `any`
/// components (an intersection with `any` is just `any` downstream, but
/// dropping the redundant members keeps the non-trivial ones visible for
/// later passes), and deduplicates structurally-identical components.
fn rejigger_intersections(parts: Vec<TypeTree>) -> TypeTree {
    let mut flat: Vec<TypeTree> = Vec::new();
    for part in parts {
        match part {
            TypeTree::Intersect(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }
    flat.retain(|t| !t.is_any());
    let mut deduped: Vec<TypeTree> = Vec::new();
    for t in flat {
        if !deduped.contains(&t) {
            deduped.push(t);
        }
    }
    match deduped.len() {
        0 => TypeTree::any(),
        1 => deduped.into_iter().next().unwrap(),
        _ => TypeTree::Intersect(deduped),
    }
}

fn rejigger_intersect_candidate(tpe: &TypeTree) -> Option<TypeTree> {
    match tpe {
        TypeTree::Intersect(parts) => Some(rejigger_intersections(parts.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_common::TracingLogger;
    use decl_ident::{CodePath, JsLocation, LibraryName, QIdent, SimpleIdent};
    use decl_tree::Comments;

    #[test]
    fn rejigger_intersections_flattens_and_dedupes() {
        let a = TypeTree::ref_simple(SimpleIdent::new("A"));
        let nested = TypeTree::Intersect(vec![a.clone(), TypeTree::any()]);
        let result = rejigger_intersections(vec![nested, a.clone()]);
        assert_eq!(result, a);
    }

    #[test]
    fn type_alias_intersection_of_two_refs_becomes_an_interface() {
        let iface_a = Tree::DeclInterface {
            name: SimpleIdent::new("A"),
            comments: Comments::empty(),
            tparams: Vec::new(),
            inheritance: Vec::new(),
            members: Vec::new(),
            code_path: CodePath::has_path(LibraryName::unscoped("lib"), QIdent::single(SimpleIdent::new("A"))),
            js_location: JsLocation::Zero,
        };
        let iface_b = Tree::DeclInterface {
            name: SimpleIdent::new("B"),
            comments: Comments::empty(),
            tparams: Vec::new(),
            inheritance: Vec::new(),
            members: Vec::new(),
            code_path: CodePath::has_path(LibraryName::unscoped("lib"), QIdent::single(SimpleIdent::new("B"))),
            js_location: JsLocation::Zero,
        };
        let alias = Tree::DeclTypeAlias {
            name: SimpleIdent::new("AB"),
            comments: Comments::empty(),
            tparams: Vec::new(),
            alias: TypeTree::Intersect(vec![
                TypeTree::ref_simple(SimpleIdent::new("A")),
                TypeTree::ref_simple(SimpleIdent::new("B")),
            ]),
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        };
        let root = Tree::ParsedFile {
            directives: Vec::new(),
            is_module: false,
            container: Container::new(vec![iface_a, iface_b, alias]),
        };
        let logger = TracingLogger;
        let scope = Scope::root(LibraryName::unscoped("lib"), false, &root, &[], &logger);

        let result = run(&root, &scope);
        match result {
            Tree::ParsedFile { container, .. } => match &container.members[2] {
                Tree::DeclInterface { inheritance, .. } => assert_eq!(inheritance.len(), 2),
                other => panic!("expected interface, got {other:?}"),
            },
            _ => panic!("expected parsed file"),
        }
    }
}
