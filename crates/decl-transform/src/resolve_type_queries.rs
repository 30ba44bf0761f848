//! Pipeline step 7: `ResolveTypeQueries`.
//!
//! `typeof x` (`TypeTree::Query`) is resolved to the type of whatever `x`
//! names: a `DeclVar`'s annotated type, a `DeclFunction`'s signature type,
//! or (for a class/interface/namespace, which have no single "value
//! type") a plain reference to the named declaration — callers further
//! down the pipeline that need the constructor shape specifically go
//! through `decl_scope::follow_alias` themselves. Left unresolved (the
//! query kept as-is) on a miss or an ambiguous hit.

use decl_scope::Scope;
use decl_tree::{Container, MemberTree, Tree, TypeTree};

pub fn run<'a>(tree: &'a Tree, scope: &Scope<'a>) -> Tree {
    resolve_tree(tree, scope)
}

fn resolve_tree<'a>(tree: &'a Tree, scope: &Scope<'a>) -> Tree {
    match tree {
        Tree::ParsedFile { directives, is_module, container } => Tree::ParsedFile {
            directives: directives.clone(),
            is_module: *is_module,
            container: resolve_container(container, &scope.nested(tree)),
        },
        Tree::Namespace { name, container } => Tree::Namespace {
            name: name.clone(),
            container: resolve_container(container, &scope.nested(tree)),
        },
        Tree::Module { name, container } => Tree::Module {
            name: name.clone(),
            container: resolve_container(container, &scope.nested(tree)),
        },
        Tree::AugmentedModule { name, container } => Tree::AugmentedModule {
            name: name.clone(),
            container: resolve_container(container, &scope.nested(tree)),
        },
        Tree::Global { container } => Tree::Global { container: resolve_container(container, &scope.nested(tree)) },
        Tree::DeclVar { name, comments, declared, readonly, tpe, code_path, js_location } => Tree::DeclVar {
            name: name.clone(),
            comments: comments.clone(),
            declared: *declared,
            readonly: *readonly,
            tpe: tpe.as_ref().map(|t| resolve_type(t, scope)),
            code_path: code_path.clone(),
            js_location: js_location.clone(),
        },
        Tree::DeclClass { name, comments, declared, is_abstract, tparams, parent, implements, members, code_path, js_location } => {
            Tree::DeclClass {
                name: name.clone(),
                comments: comments.clone(),
                declared: *declared,
                is_abstract: *is_abstract,
                tparams: tparams.clone(),
                parent: parent.as_ref().map(|t| resolve_type(t, scope)),
                implements: implements.iter().map(|t| resolve_type(t, scope)).collect(),
                members: members.iter().map(|m| resolve_member(m, scope)).collect(),
                code_path: code_path.clone(),
                js_location: js_location.clone(),
            }
        }
        Tree::DeclInterface { name, comments, tparams, inheritance, members, code_path, js_location } => {
            Tree::DeclInterface {
                name: name.clone(),
                comments: comments.clone(),
                tparams: tparams.clone(),
                inheritance: inheritance.iter().map(|t| resolve_type(t, scope)).collect(),
                members: members.iter().map(|m| resolve_member(m, scope)).collect(),
                code_path: code_path.clone(),
                js_location: js_location.clone(),
            }
        }
        Tree::DeclTypeAlias { name, comments, tparams, alias, code_path, js_location } => Tree::DeclTypeAlias {
            name: name.clone(),
            comments: comments.clone(),
            tparams: tparams.clone(),
            alias: resolve_type(alias, scope),
            code_path: code_path.clone(),
            js_location: js_location.clone(),
        },
        other => other.clone(),
    }
}

fn resolve_container<'a>(container: &Container, scope: &Scope<'a>) -> Container {
    Container {
        members: container.members.iter().map(|m| resolve_tree(m, scope)).collect(),
        ..container.clone()
    }
}

fn resolve_member(member: &MemberTree, scope: &Scope<'_>) -> MemberTree {
    match member {
        MemberTree::Property { name, tpe, is_static, is_readonly, is_optional, comments } => MemberTree::Property {
            name: name.clone(),
            tpe: tpe.as_ref().map(|t| resolve_type(t, scope)),
            is_static: *is_static,
            is_readonly: *is_readonly,
            is_optional: *is_optional,
            comments: comments.clone(),
        },
        other => other.clone(),
    }
}

fn resolve_type(tpe: &TypeTree, scope: &Scope<'_>) -> TypeTree {
    match tpe {
        TypeTree::Query(qident) => {
            let hits = scope.enable_unqualified_lookup().lookup(qident);
            match hits.as_slice() {
                [Tree::DeclVar { tpe: Some(t), .. }] => t.clone(),
                [Tree::DeclVar { tpe: None, .. }] => TypeTree::any(),
                [Tree::DeclFunction { sig, .. }] => TypeTree::Function(sig.clone()),
                [Tree::DeclClass { name, .. }] | [Tree::DeclInterface { name, .. }] => TypeTree::ref_simple(name.clone()),
                _ => tpe.clone(),
            }
        }
        TypeTree::Union(ts) => TypeTree::Union(ts.iter().map(|t| resolve_type(t, scope)).collect()),
        TypeTree::Intersect(ts) => TypeTree::Intersect(ts.iter().map(|t| resolve_type(t, scope)).collect()),
        TypeTree::Ref(q, args) => TypeTree::Ref(q.clone(), args.iter().map(|t| resolve_type(t, scope)).collect()),
        TypeTree::KeyOf(t) => TypeTree::KeyOf(Box::new(resolve_type(t, scope))),
        TypeTree::Repeated(t) => TypeTree::Repeated(Box::new(resolve_type(t, scope))),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_common::TracingLogger;
    use decl_ident::{CodePath, JsLocation, LibraryName, QIdent, SimpleIdent};
    use decl_tree::Comments;

    #[test]
    fn typeof_a_var_resolves_to_its_annotated_type() {
        let source = Tree::DeclVar {
            name: SimpleIdent::new("x"),
            comments: Comments::empty(),
            declared: true,
            readonly: false,
            tpe: Some(TypeTree::ref_simple(SimpleIdent::new("number"))),
            code_path: CodePath::has_path(LibraryName::unscoped("lib"), QIdent::single(SimpleIdent::new("x"))),
            js_location: JsLocation::Zero,
        };
        let user = Tree::DeclVar {
            name: SimpleIdent::new("y"),
            comments: Comments::empty(),
            declared: true,
            readonly: false,
            tpe: Some(TypeTree::Query(QIdent::single(SimpleIdent::new("x")))),
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        };
        let root = Tree::ParsedFile {
            directives: Vec::new(),
            is_module: false,
            container: Container::new(vec![source, user]),
        };
        let logger = TracingLogger;
        let scope = Scope::root(LibraryName::unscoped("lib"), false, &root, &[], &logger);

        let result = run(&root, &scope);
        match result {
            Tree::ParsedFile { container, .. } => match &container.members[1] {
                Tree::DeclVar { tpe: Some(t), .. } => assert_eq!(*t, TypeTree::ref_simple(SimpleIdent::new("number"))),
                _ => panic!("expected resolved var"),
            },
            _ => panic!("expected parsed file"),
        }
    }
}
