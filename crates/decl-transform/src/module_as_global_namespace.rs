//! Pipeline step 9: `ModuleAsGlobalNamespace`.
//!
//! A UMD-style library pairs `export as namespace Foo` with a
//! `declare module "this-library"` block naming its own public module:
//! once exports have been expanded, that `Module`'s members are what
//! `Foo` should resolve to as a global. This rewrites the pair — the
//! top-level `Module` whose name is the library's own identity module,
//! plus the `ExportAsNamespace` marker naming it — into a `Namespace`
//! holding those same members under the UMD global name, and drops the
//! marker (it has no further meaning past this point).

use decl_ident::ModuleName;
use decl_tree::Tree;

pub fn run(tree: Tree, identity_module: &ModuleName) -> Tree {
    match tree {
        Tree::ParsedFile { directives, is_module, container } => {
            let global_name = container.members.iter().find_map(|m| match m {
                Tree::ExportAsNamespace(name) => Some(name.clone()),
                _ => None,
            });
            let Some(global_name) = global_name else {
                return Tree::ParsedFile { directives, is_module, container };
            };
            let members = container
                .members
                .into_iter()
                .filter(|m| !matches!(m, Tree::ExportAsNamespace(_)))
                .flat_map(|m| match m {
                    Tree::Module { name, container: mod_container } if &name == identity_module => {
                        vec![Tree::Namespace { name: global_name.clone(), container: mod_container }]
                    }
                    other => vec![other],
                })
                .collect();
            Tree::ParsedFile { directives, is_module, container: decl_tree::Container { members, ..container } }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_ident::{CodePath, JsLocation, SimpleIdent};
    use decl_tree::{Comments, Container};

    #[test]
    fn pairs_export_as_namespace_with_the_identity_module() {
        let identity = ModuleName::new(None, vec!["my-lib".to_string()]);
        let module = Tree::Module {
            name: identity.clone(),
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
        let file = Tree::ParsedFile {
            directives: Vec::new(),
            is_module: false,
            container: Container::new(vec![module, Tree::ExportAsNamespace(SimpleIdent::new("MyLib"))]),
        };

        let result = run(file, &identity);
        match result {
            Tree::ParsedFile { container, .. } => {
                assert_eq!(container.members.len(), 1);
                match &container.members[0] {
                    Tree::Namespace { name, .. } => assert_eq!(name, &SimpleIdent::new("MyLib")),
                    _ => panic!("expected namespace"),
                }
            }
            _ => panic!("expected parsed file"),
        }
    }
}
