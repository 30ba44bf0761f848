//! `SetJsLocation` (pipeline step 2): initializes every declaration's JS
//! location from the root `global` binding site, descending through
//! namespaces/modules/augmented modules/global blocks via
//! `JsLocation::navigate`.

use decl_ident::{ContainerEntry, JsLocation};
use decl_tree::Tree;

pub fn run(tree: Tree) -> Tree {
    set_at(tree, &JsLocation::Global(decl_ident::QIdent::new(Vec::new())))
}

fn set_at(tree: Tree, loc: &JsLocation) -> Tree {
    let mut tree = tree;
    tree.set_js_location(loc.clone());

    let child_loc = match &tree {
        Tree::Namespace { name, .. } => loc.navigate(&ContainerEntry::Namespace(name.clone())),
        Tree::Module { name, .. } => loc.navigate(&ContainerEntry::DeclareModule(name.clone())),
        Tree::AugmentedModule { name, .. } => {
            loc.navigate(&ContainerEntry::AugmentedModule(name.clone()))
        }
        Tree::Global { .. } => loc.navigate(&ContainerEntry::Global),
        _ => loc.navigate(&ContainerEntry::Transparent),
    };

    if let Some(members) = tree.members_mut() {
        let rewritten: Vec<Tree> = std::mem::take(members)
            .into_iter()
            .map(|m| set_at(m, &child_loc))
            .collect();
        *tree.members_mut().unwrap() = rewritten;
    }
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_ident::{CodePath, SimpleIdent};
    use decl_tree::{Comments, Container};

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
    fn top_level_member_gets_a_global_location() {
        let file = Tree::ParsedFile {
            directives: Vec::new(),
            is_module: false,
            container: Container::new(vec![var("x")]),
        };
        let result = run(file);
        assert!(matches!(
            result.members()[0].js_location(),
            Some(JsLocation::Global(_))
        ));
    }

    #[test]
    fn module_member_gets_a_module_location() {
        let module = Tree::Module {
            name: decl_ident::ModuleName::new(None, vec!["m".to_string()]),
            container: Container::new(vec![var("x")]),
        };
        let file = Tree::ParsedFile {
            directives: Vec::new(),
            is_module: false,
            container: Container::new(vec![module]),
        };
        let result = run(file);
        match &result.members()[0] {
            Tree::Module { container, .. } => {
                assert!(matches!(container.members[0].js_location(), Some(JsLocation::Module(_, _))));
            }
            _ => panic!("expected module"),
        }
    }
}
