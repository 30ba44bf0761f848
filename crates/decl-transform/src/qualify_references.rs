//! Pipeline step 5: `QualifyReferences`.
//!
//! Rewrites every type reference's `QIdent` from however it was spelled
//! at the use site (possibly relative to an enclosing namespace, possibly
//! a bare global name) to the absolute path of whatever it resolved to —
//! so every later pass can compare two references for "same declaration"
//! by equality instead of re-running scope lookup.

use decl_common::{Diagnostic, Logger};
use decl_ident::QIdent;
use decl_scope::Scope;
use decl_tree::{Container, MemberTree, Tree, TypeTree};

pub fn run<'a>(tree: &'a Tree, scope: &Scope<'a>) -> Tree {
    qualify_tree(tree, scope)
}

fn qualify_tree<'a>(tree: &'a Tree, scope: &Scope<'a>) -> Tree {
    match tree {
        Tree::ParsedFile { directives, is_module, container } => Tree::ParsedFile {
            directives: directives.clone(),
            is_module: *is_module,
            container: qualify_container(container, &scope.nested(tree)),
        },
        Tree::Namespace { name, container } => Tree::Namespace {
            name: name.clone(),
            container: qualify_container(container, &scope.nested(tree)),
        },
        Tree::Module { name, container } => Tree::Module {
            name: name.clone(),
            container: qualify_container(container, &scope.nested(tree)),
        },
        Tree::AugmentedModule { name, container } => Tree::AugmentedModule {
            name: name.clone(),
            container: qualify_container(container, &scope.nested(tree)),
        },
        Tree::Global { container } => Tree::Global { container: qualify_container(container, &scope.nested(tree)) },
        Tree::DeclClass { name, comments, declared, is_abstract, tparams, parent, implements, members, code_path, js_location } => {
            let s = scope.with_type_params(tparams);
            Tree::DeclClass {
                name: name.clone(),
                comments: comments.clone(),
                declared: *declared,
                is_abstract: *is_abstract,
                tparams: tparams.clone(),
                parent: parent.as_ref().map(|p| qualify_type(p, &s)),
                implements: implements.iter().map(|t| qualify_type(t, &s)).collect(),
                members: members.iter().map(|m| qualify_member(m, &s)).collect(),
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
                inheritance: inheritance.iter().map(|t| qualify_type(t, &s)).collect(),
                members: members.iter().map(|m| qualify_member(m, &s)).collect(),
                code_path: code_path.clone(),
                js_location: js_location.clone(),
            }
        }
        Tree::DeclTypeAlias { name, comments, tparams, alias, code_path, js_location } => {
            let s = scope.with_type_params(tparams);
            Tree::DeclTypeAlias {
                name: name.clone(),
                comments: comments.clone(),
                tparams: tparams.clone(),
                alias: qualify_type(alias, &s),
                code_path: code_path.clone(),
                js_location: js_location.clone(),
            }
        }
        Tree::DeclVar { name, comments, declared, readonly, tpe, code_path, js_location } => Tree::DeclVar {
            name: name.clone(),
            comments: comments.clone(),
            declared: *declared,
            readonly: *readonly,
            tpe: tpe.as_ref().map(|t| qualify_type(t, scope)),
            code_path: code_path.clone(),
            js_location: js_location.clone(),
        },
        Tree::DeclFunction { name, comments, declared, sig, code_path, js_location } => {
            let s = scope.with_type_params(&sig.type_params);
            Tree::DeclFunction {
                name: name.clone(),
                comments: comments.clone(),
                declared: *declared,
                sig: qualify_sig(sig, &s),
                code_path: code_path.clone(),
                js_location: js_location.clone(),
            }
        }
        other => other.clone(),
    }
}

fn qualify_container<'a>(container: &Container, scope: &Scope<'a>) -> Container {
    Container {
        members: container.members.iter().map(|m| qualify_tree(m, scope)).collect(),
        ..container.clone()
    }
}

fn qualify_member(member: &MemberTree, scope: &Scope<'_>) -> MemberTree {
    match member {
        MemberTree::Call { sig, comments } => MemberTree::Call { sig: qualify_sig(sig, scope), comments: comments.clone() },
        MemberTree::Ctor { sig, comments } => MemberTree::Ctor { sig: qualify_sig(sig, scope), comments: comments.clone() },
        MemberTree::Function { name, method_type, is_static, is_readonly, sig, comments } => MemberTree::Function {
            name: name.clone(),
            method_type: *method_type,
            is_static: *is_static,
            is_readonly: *is_readonly,
            sig: qualify_sig(sig, scope),
            comments: comments.clone(),
        },
        MemberTree::Property { name, tpe, is_static, is_readonly, is_optional, comments } => MemberTree::Property {
            name: name.clone(),
            tpe: tpe.as_ref().map(|t| qualify_type(t, scope)),
            is_static: *is_static,
            is_readonly: *is_readonly,
            is_optional: *is_optional,
            comments: comments.clone(),
        },
        MemberTree::Index { indexing, value_type, comments } => MemberTree::Index {
            indexing: indexing.clone(),
            value_type: qualify_type(value_type, scope),
            comments: comments.clone(),
        },
        MemberTree::TypeMapped { key, from, as_name, optional, readonly, value_type, comments } => MemberTree::TypeMapped {
            key: key.clone(),
            from: qualify_type(from, scope),
            as_name: as_name.as_ref().map(|t| qualify_type(t, scope)),
            optional: *optional,
            readonly: *readonly,
            value_type: qualify_type(value_type, scope),
            comments: comments.clone(),
        },
    }
}

fn qualify_sig(sig: &decl_tree::FunctionSig, scope: &Scope<'_>) -> decl_tree::FunctionSig {
    let s = scope.with_type_params(&sig.type_params);
    decl_tree::FunctionSig {
        type_params: sig.type_params.clone(),
        params: sig
            .params
            .iter()
            .map(|p| {
                let mut p = p.clone();
                p.tpe = p.tpe.map(|t| qualify_type(&t, &s));
                p
            })
            .collect(),
        result_type: sig.result_type.as_ref().map(|t| Box::new(qualify_type(t, &s))),
    }
}

fn qualify_type(tpe: &TypeTree, scope: &Scope<'_>) -> TypeTree {
    match tpe {
        TypeTree::Ref(qident, args) => {
            let rewritten = resolve_and_qualify(qident, scope);
            TypeTree::Ref(rewritten, args.iter().map(|a| qualify_type(a, scope)).collect())
        }
        TypeTree::Object(members) => TypeTree::Object(members.iter().map(|m| qualify_member(m, scope)).collect()),
        TypeTree::Function(sig) => TypeTree::Function(qualify_sig(sig, scope)),
        TypeTree::Constructor(sig, abstract_) => TypeTree::Constructor(qualify_sig(sig, scope), *abstract_),
        TypeTree::Is(name, t) => TypeTree::Is(name.clone(), Box::new(qualify_type(t, scope))),
        TypeTree::Tuple(elems) => TypeTree::Tuple(
            elems
                .iter()
                .map(|e| {
                    let mut e = e.clone();
                    e.tpe = qualify_type(&e.tpe, scope);
                    e
                })
                .collect(),
        ),
        TypeTree::Repeated(t) => TypeTree::Repeated(Box::new(qualify_type(t, scope))),
        TypeTree::KeyOf(t) => TypeTree::KeyOf(Box::new(qualify_type(t, scope))),
        TypeTree::Lookup(from, key) => {
            TypeTree::Lookup(Box::new(qualify_type(from, scope)), Box::new(qualify_type(key, scope)))
        }
        TypeTree::Asserts(name, t) => {
            TypeTree::Asserts(name.clone(), t.as_ref().map(|t| Box::new(qualify_type(t, scope))))
        }
        TypeTree::Union(ts) => TypeTree::Union(ts.iter().map(|t| qualify_type(t, scope)).collect()),
        TypeTree::Intersect(ts) => TypeTree::Intersect(ts.iter().map(|t| qualify_type(t, scope)).collect()),
        TypeTree::Conditional(pred, t, f) => TypeTree::Conditional(
            Box::new(qualify_type(pred, scope)),
            Box::new(qualify_type(t, scope)),
            Box::new(qualify_type(f, scope)),
        ),
        TypeTree::Extends(t, e) => TypeTree::Extends(Box::new(qualify_type(t, scope)), Box::new(qualify_type(e, scope))),
        other => other.clone(),
    }
}

/// Resolves `qident` in `scope`; on a unique hit with a known code path,
/// returns that path's `QIdent`. Type parameters never get rewritten
/// (they have no code path). On a miss or an ambiguous hit the original
/// spelling is kept and a diagnostic is logged — this pass never fails
/// the library over an unresolved reference.
fn resolve_and_qualify(qident: &QIdent, scope: &Scope<'_>) -> QIdent {
    if let Some(head) = qident.head() {
        if qident.len() == 1 && scope.is_abstract(head) {
            return qident.clone();
        }
    }

    let hits = scope.enable_unqualified_lookup().lookup_type(qident);
    match hits.as_slice() {
        [single] => match single.code_path() {
            Some(decl_ident::CodePath::HasPath { path, .. }) => path.clone(),
            _ => qident.clone(),
        },
        _ => {
            scope.logger().log(Diagnostic::InferenceMiss {
                site: qident.to_string(),
                what: "reference target".to_string(),
            });
            qident.clone()
        }
    }
}
