//! Pipeline step 10: `MoveGlobals`.
//!
//! `declare global { ... }` is purely syntactic — it marks its contents
//! as belonging to the global scope no matter how deeply the block
//! itself is nested, which `SetJsLocation` already captured. Once that's
//! recorded, the `Global` wrapper adds nothing and its members are
//! spliced directly into the enclosing container, bottom-up so a
//! `Global` nested inside a namespace is flattened before its own
//! siblings are considered.

use decl_tree::{Container, Tree};

pub fn run(tree: Tree) -> Tree {
    match tree {
        Tree::ParsedFile { directives, is_module, container } => Tree::ParsedFile {
            directives,
            is_module,
            container: run_container(container),
        },
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
    let members: Vec<Tree> = container.members.into_iter().map(run).collect();
    let members = members
        .into_iter()
        .flat_map(|m| match m {
            Tree::Global { container } => container.members,
            other => vec![other],
        })
        .collect();
    Container { members, ..container }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_ident::{CodePath, JsLocation, SimpleIdent};
    use decl_tree::Comments;

    fn var(name: &str) -> Tree {
        Tree::DeclVar {
            name: SimpleIdent::new(name),
            comments: Comments::empty(),
            declared: true,
            readonly: false,
            tpe: None,
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        }
    }

    #[test]
    fn splices_a_nested_global_blocks_members_into_its_module() {
        let global = Tree::Global { container: Container::new(vec![var("x")]) };
        let module = Tree::Module {
            name: decl_ident::ModuleName::new(None, vec!["m".to_string()]),
            container: Container::new(vec![global]),
        };
        let result = run(module);
        match result {
            Tree::Module { container, .. } => {
                assert_eq!(container.members.len(), 1);
                assert!(matches!(container.members[0], Tree::DeclVar { .. }));
            }
            _ => panic!("expected module"),
        }
    }
}
