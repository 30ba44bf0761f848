//! Pipeline step 4: `HandleCommonJsModules ⋙ RewriteExportStarAs`.

use decl_ident::SimpleIdent;
use decl_tree::{Container, ExportKind, Exportee, Imported, Importee, Tree};

/// `HandleCommonJsModules`: a module whose entire public surface is a
/// single `export = X` (modeled here as a lone `Defaulted` export of a
/// container-shaped declaration — a namespace or a default-exported
/// object) is realized by splicing that container's members directly
/// into the module, rather than leaving them nested one level under
/// `default`. This mirrors CommonJS's `module.exports = ns` making the
/// module itself *be* `ns`, not a module that merely has a `default`.
pub fn handle_commonjs_modules(tree: Tree) -> Tree {
    match tree {
        Tree::Module { name, container } => Tree::Module {
            name,
            container: splice_single_default_namespace(container),
        },
        Tree::ParsedFile { directives, is_module, container } => Tree::ParsedFile {
            directives,
            is_module,
            container: splice_single_default_namespace(container),
        },
        other => other,
    }
}

fn splice_single_default_namespace(container: Container) -> Container {
    let is_sole_commonjs_export = container.members.len() == 1
        && matches!(
            &container.members[0],
            Tree::Export { kind: ExportKind::Defaulted, exported: Exportee::Tree(boxed), .. }
                if boxed.is_container()
        );
    if !is_sole_commonjs_export {
        return container;
    }
    let Tree::Export { exported: Exportee::Tree(boxed), .. } = container.members.into_iter().next().unwrap() else {
        unreachable!()
    };
    Container {
        members: boxed.members().to_vec(),
        ..Container::new(Vec::new())
    }
}

/// `RewriteExportStarAs`: `export * as ns from "m"` is modeled as a
/// `Namespaced` export of a `Star` exportee; this rewrites it into the
/// equivalent `import * as ns from "m"; export { ns }` shape — a plain
/// namespace import re-exported under the `Named` kind — so later passes
/// (`ReplaceExports`, import expansion) only ever have to deal with one
/// star-handling shape instead of two.
pub fn rewrite_export_star_as(tree: Tree) -> Tree {
    match tree {
        Tree::Export {
            type_only,
            kind: ExportKind::Namespaced,
            exported: Exportee::Star { from },
            comments,
        } => {
            let alias = SimpleIdent::namespaced();
            let import = Tree::Import {
                type_only,
                imported: vec![Imported::Star(alias)],
                from: Importee::Module(from),
                comments: comments.clone(),
            };
            Tree::Export {
                type_only,
                kind: ExportKind::Named,
                exported: Exportee::Tree(Box::new(import)),
                comments,
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_ident::{CodePath, JsLocation, ModuleName};
    use decl_tree::Comments;

    #[test]
    fn handle_commonjs_modules_splices_the_sole_default_namespace() {
        let ns = Tree::Namespace {
            name: SimpleIdent::new("NS"),
            container: Container::new(vec![Tree::DeclVar {
                name: SimpleIdent::new("x"),
                comments: Comments::empty(),
                declared: true,
                readonly: false,
                tpe: None,
                code_path: CodePath::NoPath,
                js_location: JsLocation::Zero,
            }]),
        };
        let export = Tree::Export {
            type_only: false,
            kind: ExportKind::Defaulted,
            exported: Exportee::Tree(Box::new(ns)),
            comments: Comments::empty(),
        };
        let module = Tree::Module {
            name: ModuleName::new(None, vec!["m".to_string()]),
            container: Container::new(vec![export]),
        };

        let result = handle_commonjs_modules(module);
        match result {
            Tree::Module { container, .. } => assert_eq!(container.members.len(), 1),
            _ => panic!("expected module"),
        }
    }

    #[test]
    fn rewrite_export_star_as_becomes_a_namespace_import_export() {
        let export = Tree::Export {
            type_only: false,
            kind: ExportKind::Namespaced,
            exported: Exportee::Star { from: ModuleName::new(None, vec!["m".to_string()]) },
            comments: Comments::empty(),
        };
        let rewritten = rewrite_export_star_as(export);
        match rewritten {
            Tree::Export { kind: ExportKind::Named, exported: Exportee::Tree(boxed), .. } => {
                assert!(matches!(*boxed, Tree::Import { .. }));
            }
            _ => panic!("expected named export of an import"),
        }
    }
}
