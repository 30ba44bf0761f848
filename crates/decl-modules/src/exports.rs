//! Export expansion: rewriting an `Export` node into the declarations it
//! actually introduces into its owning container (§4.6 "Exports
//! expansion").

use crate::derive_copy::derive_copy;
use crate::imports::{expand_import, ExpandedMod};
use decl_ident::{CodePath, JsLocation, SimpleIdent};
use decl_scope::Scope;
use decl_tree::{ExportKind, Exportee, Tree};

/// Expands one `Export` node, owned by a container whose code path and JS
/// location are `owner_path`/`owner_location`, into the concrete
/// declarations it introduces.
pub fn expand_export(
    owner_path: &CodePath,
    owner_location: &JsLocation,
    kind: ExportKind,
    exported: &Exportee,
    scope: &Scope,
) -> Vec<Tree> {
    match exported {
        Exportee::Tree(boxed) => match boxed.as_ref() {
            Tree::Import { .. } => expand_export_of_import(owner_path, owner_location, kind, boxed, scope),
            other => expand_tree_export(owner_path, owner_location, kind, other, None),
        },
        Exportee::Names { from, idents } => {
            let source_scope = match from {
                Some(module_name) => scope.module_scope(module_name).unwrap_or_else(|| scope.clone()),
                None => scope.clone(),
            };
            idents
                .iter()
                .flat_map(|(qident, alias)| {
                    let name = alias.clone().unwrap_or_else(|| qident.last().cloned().unwrap());
                    source_scope
                        .lookup(qident)
                        .into_iter()
                        .map(move |d| {
                            derive_copy(
                                d,
                                Some(name.clone()),
                                owner_path.add(name.clone()),
                                owner_location.clone(),
                            )
                        })
                })
                .collect()
        }
        Exportee::Star { from } => {
            let Some(mod_scope) = scope.module_scope(from) else {
                return Vec::new();
            };
            let Some(&module_tree) = mod_scope.stack().last() else {
                return Vec::new();
            };
            module_tree
                .members()
                .iter()
                .filter(|m| m.name().map(|n| n.as_str() != "default").unwrap_or(false))
                .map(|m| {
                    let name = m.name().cloned().unwrap();
                    derive_copy(m, None, owner_path.add(name), owner_location.clone())
                })
                .collect()
        }
    }
}

/// Export of a named declaration (§4.6's `export(owner, kind, decl,
/// renamed)`), dispatching on `kind`.
fn expand_tree_export(
    owner_path: &CodePath,
    owner_location: &JsLocation,
    kind: ExportKind,
    decl: &Tree,
    renamed: Option<SimpleIdent>,
) -> Vec<Tree> {
    match kind {
        ExportKind::Namespaced => {
            if decl.is_container() {
                decl.members()
                    .iter()
                    .filter_map(|m| {
                        let name = m.name().cloned()?;
                        Some(derive_copy(
                            m,
                            None,
                            owner_path.add(name),
                            owner_location.clone(),
                        ))
                    })
                    .collect()
            } else {
                let namespaced_name = SimpleIdent::namespaced();
                vec![derive_copy(
                    decl,
                    Some(namespaced_name.clone()),
                    owner_path.add(namespaced_name),
                    owner_location.clone(),
                )]
            }
        }
        ExportKind::Named => {
            let name = renamed
                .or_else(|| decl.name().cloned())
                .unwrap_or_else(SimpleIdent::default_export);
            vec![derive_copy(
                decl,
                Some(name.clone()),
                owner_path.add(name),
                owner_location.clone(),
            )]
        }
        ExportKind::Defaulted => {
            let name = SimpleIdent::default_export();
            vec![derive_copy(
                decl,
                Some(name.clone()),
                owner_path.add(name),
                owner_location.clone(),
            )]
        }
    }
}

/// `export { i } from "m"` re-exporting an import target rather than a
/// local declaration: resolve the import, then export each resulting
/// declaration under the imported ident's name.
fn expand_export_of_import(
    owner_path: &CodePath,
    owner_location: &JsLocation,
    kind: ExportKind,
    import: &Tree,
    scope: &Scope,
) -> Vec<Tree> {
    match expand_import(import, scope) {
        Some(ExpandedMod::Picked { things }) => things
            .into_iter()
            .flat_map(|(d, _)| expand_tree_export(owner_path, owner_location, kind.clone(), d, None))
            .collect(),
        Some(ExpandedMod::Whole { defaults, namespaced, rest, .. }) => defaults
            .into_iter()
            .chain(namespaced)
            .chain(rest)
            .flat_map(|d| expand_tree_export(owner_path, owner_location, kind.clone(), d, None))
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_common::TracingLogger;
    use decl_ident::{LibraryName, QIdent};
    use decl_tree::{Comments, Container};

    #[test]
    fn named_export_of_a_local_interface_derive_copies_it_under_the_owner() {
        let iface = Tree::DeclInterface {
            name: SimpleIdent::new("IFoo"),
            comments: Comments::empty(),
            tparams: Vec::new(),
            inheritance: Vec::new(),
            members: Vec::new(),
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        };
        let root = Tree::ParsedFile {
            directives: Vec::new(),
            is_module: true,
            container: Container::new(Vec::new()),
        };
        let logger = TracingLogger;
        let scope = Scope::root(LibraryName::unscoped("lib"), false, &root, &[], &logger);

        let owner_path = CodePath::has_path(LibraryName::unscoped("lib"), QIdent::new(Vec::new()));
        let expanded = expand_tree_export(&owner_path, &JsLocation::Zero, ExportKind::Named, &iface, None);
        assert_eq!(expanded.len(), 1);
        assert!(matches!(expanded[0], Tree::DeclTypeAlias { .. }));
        let _ = scope;
    }
}
