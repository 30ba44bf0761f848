//! `AugmentModules`: folding `declare module "m" { … }` augmentations
//! into their target module (§4.6, pipeline step 6).

use decl_ident::SimpleIdent;
use decl_tree::{Container, Tree};

/// Walks `root`'s direct members, merging every `AugmentedModule` into
/// the `Module` it targets (matched by name), retargeting the augmented
/// members' code paths onto the target's path. Consumed augmentations
/// are removed; an augmentation with no matching target is a types-only
/// remnant and is kept as-is to preserve typedness.
pub fn augment_modules(root: Tree) -> Tree {
    let Tree::ParsedFile { directives, is_module, container } = root else {
        return root;
    };

    let (augments, mut rest): (Vec<Tree>, Vec<Tree>) = container
        .members
        .into_iter()
        .partition(|m| matches!(m, Tree::AugmentedModule { .. }));

    let mut unconsumed = Vec::new();
    for aug in augments {
        let Tree::AugmentedModule { name, container: aug_container } = &aug else {
            unreachable!()
        };
        let target = rest.iter_mut().find(|m| match m {
            Tree::Module { name: target_name, .. } => target_name == name,
            _ => false,
        });
        match target {
            Some(Tree::Module { container: target_container, .. }) => {
                let retargeted = retarget(&aug_container.members, target_container);
                target_container.members.extend(retargeted);
            }
            _ => {
                // No declared module found under this name; check for a
                // default-exported namespace acting as the module's public
                // surface before giving up.
                let default_ns = rest.iter_mut().find_map(|m| match m {
                    Tree::Module { name: target_name, container } if target_name == name => {
                        container.members.iter_mut().find(|member| {
                            member.name().map(|n| n.as_str() == "default").unwrap_or(false)
                                && member.is_container()
                        })
                    }
                    _ => None,
                });
                match default_ns {
                    Some(ns) => {
                        if let Some(members) = ns.members_mut() {
                            members.extend(aug_container.members.clone());
                        }
                    }
                    None => unconsumed.push(aug),
                }
            }
        }
    }
    rest.extend(unconsumed);

    Tree::ParsedFile {
        directives,
        is_module,
        container: Container { members: rest, ..container },
    }
}

fn retarget(members: &[Tree], target: &Container) -> Vec<Tree> {
    members
        .iter()
        .map(|m| {
            let mut clone = m.clone();
            if let Some(name) = clone.name().cloned() {
                clone.set_code_path(target.code_path.add(name));
            }
            clone
        })
        .collect()
}

#[allow(dead_code)]
fn unused_import_guard(_: SimpleIdent) {}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_ident::{CodePath, JsLocation, LibraryName, ModuleName, QIdent};
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
    fn augmentation_merges_into_its_target_module() {
        let target_path = CodePath::has_path(LibraryName::unscoped("lib"), QIdent::new(Vec::new()));
        let module = Tree::Module {
            name: ModuleName::new(None, vec!["express".to_string()]),
            container: Container::new(vec![var("existing")]).with_code_path(target_path),
        };
        let aug = Tree::AugmentedModule {
            name: ModuleName::new(None, vec!["express".to_string()]),
            container: Container::new(vec![var("extra")]),
        };
        let root = Tree::ParsedFile {
            directives: Vec::new(),
            is_module: false,
            container: Container::new(vec![module, aug]),
        };

        let result = augment_modules(root);
        match result {
            Tree::ParsedFile { container, .. } => {
                assert_eq!(container.members.len(), 1);
                match &container.members[0] {
                    Tree::Module { container, .. } => assert_eq!(container.members.len(), 2),
                    _ => panic!("expected module"),
                }
            }
            _ => panic!("expected parsed file"),
        }
    }
}
