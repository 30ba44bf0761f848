//! Pipeline step 8: `ReplaceExports`.
//!
//! Every `Export` member of a container is rewritten in place to the
//! concrete declarations it introduces, via `decl_modules::exports`'s
//! `expand_export` (§4.6). After this pass no `Export` nodes remain
//! anywhere in the tree other than `ExportAsNamespace`, which has no
//! expansion of its own (it only affects how the *library* is named when
//! consumed, handled by `decl-resolver`).

use decl_modules::expand_export;
use decl_scope::Scope;
use decl_tree::{Container, Tree};

pub fn run<'a>(tree: &'a Tree, scope: &Scope<'a>) -> Tree {
    replace_in(tree, scope)
}

fn replace_in(tree: &Tree, scope: &Scope<'_>) -> Tree {
    match tree {
        Tree::ParsedFile { directives, is_module, container } => Tree::ParsedFile {
            directives: directives.clone(),
            is_module: *is_module,
            container: replace_container(container, &scope.nested(tree)),
        },
        Tree::Namespace { name, container } => Tree::Namespace {
            name: name.clone(),
            container: replace_container(container, &scope.nested(tree)),
        },
        Tree::Module { name, container } => Tree::Module {
            name: name.clone(),
            container: replace_container(container, &scope.nested(tree)),
        },
        Tree::AugmentedModule { name, container } => Tree::AugmentedModule {
            name: name.clone(),
            container: replace_container(container, &scope.nested(tree)),
        },
        Tree::Global { container } => Tree::Global { container: replace_container(container, &scope.nested(tree)) },
        other => other.clone(),
    }
}

fn replace_container(container: &Container, scope: &Scope<'_>) -> Container {
    let mut members = Vec::with_capacity(container.members.len());
    for member in &container.members {
        match member {
            Tree::Export { kind, exported, .. } => {
                let expanded = expand_export(&container.code_path, &container.js_location, *kind, exported, scope);
                members.extend(expanded.into_iter());
            }
            other => members.push(replace_in(other, scope)),
        }
    }
    Container { members, ..container.clone() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_common::TracingLogger;
    use decl_ident::{CodePath, JsLocation, LibraryName, QIdent, SimpleIdent};
    use decl_tree::{Comments, ExportKind, Exportee};

    #[test]
    fn named_export_is_replaced_by_its_expansion() {
        let iface = Tree::DeclInterface {
            name: SimpleIdent::new("IFoo"),
            comments: Comments::empty(),
            tparams: Vec::new(),
            inheritance: Vec::new(),
            members: Vec::new(),
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        };
        let export = Tree::Export {
            type_only: false,
            kind: ExportKind::Named,
            exported: Exportee::Tree(Box::new(iface)),
            comments: Comments::empty(),
        };
        let root = Tree::ParsedFile {
            directives: Vec::new(),
            is_module: true,
            container: Container::new(vec![export])
                .with_code_path(CodePath::has_path(LibraryName::unscoped("lib"), QIdent::new(Vec::new()))),
        };
        let logger = TracingLogger;
        let scope = Scope::root(LibraryName::unscoped("lib"), false, &root, &[], &logger);

        let result = run(&root, &scope);
        match result {
            Tree::ParsedFile { container, .. } => {
                assert_eq!(container.members.len(), 1);
                assert!(!matches!(container.members[0], Tree::Export { .. }));
            }
            _ => panic!("expected parsed file"),
        }
    }
}
