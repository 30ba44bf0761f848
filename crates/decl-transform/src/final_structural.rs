//! Pipeline step 20: `SplitMethods ⋙ RemoveDifficultInheritance ⋙
//! VarToNamespace`, the pipeline's last combined stage.

use decl_ident::SimpleIdent;
use decl_scope::Scope;
use decl_tree::{Comments, Container, FunctionParam, FunctionSig, MemberTree, Tree, TypeTree};

const MAX_OVERLOADS: usize = 50;
const MAX_PARAMS_TO_EXPAND: usize = 20;

pub fn run<'a>(tree: &'a Tree, scope: &Scope<'a>) -> Tree {
    match tree {
        Tree::ParsedFile { directives, is_module, container } => Tree::ParsedFile {
            directives: directives.clone(),
            is_module: *is_module,
            container: run_container(container, &scope.nested(tree)),
        },
        Tree::Namespace { name, container } => {
            Tree::Namespace { name: name.clone(), container: run_container(container, &scope.nested(tree)) }
        }
        Tree::Module { name, container } => {
            Tree::Module { name: name.clone(), container: run_container(container, &scope.nested(tree)) }
        }
        Tree::AugmentedModule { name, container } => {
            Tree::AugmentedModule { name: name.clone(), container: run_container(container, &scope.nested(tree)) }
        }
        Tree::Global { container } => Tree::Global { container: run_container(container, &scope.nested(tree)) },
        other => other.clone(),
    }
}

fn run_container<'a>(container: &Container, scope: &Scope<'a>) -> Container {
    let mut members = Vec::with_capacity(container.members.len());
    for member in &container.members {
        members.extend(process_decl(member, scope));
    }
    Container { members, ..container.clone() }
}

fn process_decl(tree: &Tree, scope: &Scope<'_>) -> Vec<Tree> {
    match tree {
        Tree::ParsedFile { .. } | Tree::Namespace { .. } | Tree::Module { .. } | Tree::AugmentedModule { .. } | Tree::Global { .. } => {
            vec![run(tree, scope)]
        }
        Tree::DeclClass { name, comments, declared, is_abstract, tparams, parent, implements, members, code_path, js_location } => {
            let parent = remove_difficult_parent(parent.clone(), scope);
            let implements = remove_difficult_refs(implements.clone(), scope);
            let members = split_methods(members.clone());
            vec![Tree::DeclClass {
                name: name.clone(),
                comments: comments.clone(),
                declared: *declared,
                is_abstract: *is_abstract,
                tparams: tparams.clone(),
                parent,
                implements,
                members,
                code_path: code_path.clone(),
                js_location: js_location.clone(),
            }]
        }
        Tree::DeclInterface { name, comments, tparams, inheritance, members, code_path, js_location } => {
            let inheritance = remove_difficult_refs(inheritance.clone(), scope);
            let members = split_methods(members.clone());
            vec![Tree::DeclInterface {
                name: name.clone(),
                comments: comments.clone(),
                tparams: tparams.clone(),
                inheritance,
                members,
                code_path: code_path.clone(),
                js_location: js_location.clone(),
            }]
        }
        Tree::DeclFunction { name, comments, declared, sig, code_path, js_location } => {
            let sigs = expand_sig(sig);
            sigs.into_iter()
                .enumerate()
                .map(|(i, sig)| Tree::DeclFunction {
                    name: name.clone(),
                    comments: if i == 0 { comments.clone() } else { Comments::empty() },
                    declared: *declared,
                    sig,
                    code_path: code_path.clone(),
                    js_location: js_location.clone(),
                })
                .collect()
        }
        Tree::DeclVar { name, tpe: Some(TypeTree::Object(members)), code_path, js_location, .. } => {
            let hoisted = crate::hoisting::hoist(members, code_path, js_location);
            vec![Tree::Namespace { name: name.clone(), container: Container::new(hoisted).with_code_path(code_path.clone()).with_js_location(js_location.clone()) }]
        }
        other => vec![other.clone()],
    }
}

fn remove_difficult_parent(parent: Option<TypeTree>, scope: &Scope<'_>) -> Option<TypeTree> {
    parent.filter(|p| resolves_to_class(p, scope))
}

fn remove_difficult_refs(refs: Vec<TypeTree>, scope: &Scope<'_>) -> Vec<TypeTree> {
    refs.into_iter().filter(|t| resolves_to_type_decl(t, scope)).collect()
}

fn resolves_to_class(t: &TypeTree, scope: &Scope<'_>) -> bool {
    match t {
        TypeTree::Ref(qident, _) => {
            let hits = scope.enable_unqualified_lookup().lookup_type(qident);
            hits.iter().any(|h| matches!(h, Tree::DeclClass { .. }))
        }
        _ => false,
    }
}

fn resolves_to_type_decl(t: &TypeTree, scope: &Scope<'_>) -> bool {
    match t {
        TypeTree::Ref(qident, _) => {
            let hits = scope.enable_unqualified_lookup().lookup_type(qident);
            hits.iter().any(|h| matches!(h, Tree::DeclClass { .. } | Tree::DeclInterface { .. }))
        }
        _ => false,
    }
}

/// `SplitMethods`: a member whose signature has a union-typed parameter
/// is expanded into one overload per combination of the unions'
/// alternatives, dropping trailing `undefined` alternatives (equivalent
/// to making that overload shorter) and keeping the first overload's
/// comments only. Literal members of a union (e.g. `"a" | "b"`) are
/// grouped into a single alternative instead of each spawning their own
/// overload. Capped at `MAX_OVERLOADS` combinations and
/// `MAX_PARAMS_TO_EXPAND` parameters — past either, the signature is left
/// as a single overload rather than risk a combinatorial blowup.
fn split_methods(members: Vec<MemberTree>) -> Vec<MemberTree> {
    let mut out = Vec::with_capacity(members.len());
    for member in members {
        match member {
            MemberTree::Function { name, method_type, is_static, is_readonly, sig, comments } => {
                let sigs = expand_sig(&sig);
                for (i, sig) in sigs.into_iter().enumerate() {
                    out.push(MemberTree::Function {
                        name: name.clone(),
                        method_type,
                        is_static,
                        is_readonly,
                        sig,
                        comments: if i == 0 { comments.clone() } else { Comments::empty() },
                    });
                }
            }
            MemberTree::Call { sig, comments } => {
                let sigs = expand_sig(&sig);
                for (i, sig) in sigs.into_iter().enumerate() {
                    out.push(MemberTree::Call { sig, comments: if i == 0 { comments.clone() } else { Comments::empty() } });
                }
            }
            MemberTree::Ctor { sig, comments } => {
                let sigs = expand_sig(&sig);
                for (i, sig) in sigs.into_iter().enumerate() {
                    out.push(MemberTree::Ctor { sig, comments: if i == 0 { comments.clone() } else { Comments::empty() } });
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn expand_sig(sig: &FunctionSig) -> Vec<FunctionSig> {
    if sig.params.len() > MAX_PARAMS_TO_EXPAND || sig.params.is_empty() {
        return vec![sig.clone()];
    }
    let alternatives: Vec<Vec<Option<TypeTree>>> = sig
        .params
        .iter()
        .map(|p| match &p.tpe {
            Some(TypeTree::Union(ts)) if ts.len() > 1 => union_alternatives(ts),
            other => vec![other.clone()],
        })
        .collect();

    let total: usize = alternatives.iter().map(|a| a.len()).product();
    if total <= 1 || total > MAX_OVERLOADS {
        return vec![sig.clone()];
    }

    let mut combos: Vec<Vec<Option<TypeTree>>> = vec![Vec::new()];
    for alt in &alternatives {
        let mut next = Vec::with_capacity(combos.len() * alt.len());
        for combo in &combos {
            for choice in alt {
                let mut extended = combo.clone();
                extended.push(choice.clone());
                next.push(extended);
            }
        }
        combos = next;
    }

    let mut sigs: Vec<FunctionSig> = combos
        .into_iter()
        .map(|types| {
            let mut params: Vec<FunctionParam> =
                sig.params.iter().zip(types).map(|(p, t)| FunctionParam { tpe: t, ..p.clone() }).collect();
            while matches!(params.last(), Some(p) if p.tpe.as_ref().is_some_and(is_undefined)) {
                params.pop();
            }
            FunctionSig { type_params: sig.type_params.clone(), params, result_type: sig.result_type.clone() }
        })
        .collect();

    sigs.sort_by_key(|s| s.params.len());
    sigs.dedup();
    sigs
}

/// Literal members of a union are grouped into a single alternative — the
/// union of just those literals — rather than each spawning its own
/// overload; every non-literal member still splits individually.
fn union_alternatives(ts: &[TypeTree]) -> Vec<Option<TypeTree>> {
    let (literals, rest): (Vec<TypeTree>, Vec<TypeTree>) =
        ts.iter().cloned().partition(|t| matches!(t, TypeTree::Literal(_)));
    let mut alts: Vec<Option<TypeTree>> = rest.into_iter().map(Some).collect();
    match literals.len() {
        0 => {}
        1 => alts.push(literals.into_iter().next()),
        _ => alts.push(Some(TypeTree::Union(literals))),
    }
    alts
}

fn is_undefined(t: &TypeTree) -> bool {
    matches!(t, TypeTree::Ref(q, args) if args.is_empty() && q.len() == 1 && q.head().map(SimpleIdent::as_str) == Some("undefined"))
}
