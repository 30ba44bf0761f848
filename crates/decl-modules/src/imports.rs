//! Import expansion: resolving an `Import` node's `from` into the actual
//! declarations it introduces, relative to the scope it was found in
//! (§4.6 "Imports expansion").

use decl_ident::QIdent;
use decl_scope::{AnyDecl, Picker, Scope};
use decl_tree::{Imported, Importee, Tree};

/// What an `Import` resolves to: either the whole module (a namespace
/// import, `import * as X from "m"`), or a specific set of picked names.
pub enum ExpandedMod<'a> {
    Whole {
        defaults: Vec<&'a Tree>,
        namespaced: Vec<&'a Tree>,
        rest: Vec<&'a Tree>,
        scope: Scope<'a>,
    },
    Picked {
        things: Vec<(&'a Tree, Scope<'a>)>,
    },
}

pub fn expand_import<'a>(import: &Tree, scope: &Scope<'a>) -> Option<ExpandedMod<'a>> {
    let Tree::Import { imported, from, .. } = import else {
        return None;
    };

    match from {
        Importee::Module(module_name) => {
            let mod_scope = scope.module_scope(module_name)?;
            let root = *mod_scope.stack().last()?;

            if imported.iter().any(|i| matches!(i, Imported::Star(_))) {
                let mut defaults = Vec::new();
                let mut namespaced = Vec::new();
                let mut rest = Vec::new();
                for member in root.members() {
                    match member.name().map(|n| n.as_str()) {
                        Some("default") => defaults.push(member),
                        Some("^") => namespaced.push(member),
                        _ => rest.push(member),
                    }
                }
                Some(ExpandedMod::Whole {
                    defaults,
                    namespaced,
                    rest,
                    scope: mod_scope,
                })
            } else {
                let picker = AnyDecl;
                let things = imported
                    .iter()
                    .filter_map(|i| i.name())
                    .flat_map(|name| {
                        let found = root
                            .members()
                            .iter()
                            .filter(|m| m.name() == Some(name) && picker.accepts(m));
                        found.map(|m| (m, mod_scope.nested(m)))
                    })
                    .collect();
                Some(ExpandedMod::Picked { things })
            }
        }
        Importee::Local(qident) => {
            let mut things = scope.lookup_include_scope(qident);
            // `import X = A.B.C` with no further qualification is a
            // single-name pick: the search above resolves the whole
            // qualified path already.
            if things.is_empty() {
                things = scope.lookup_include_scope(&QIdent::single(
                    qident.parts().last().unwrap().clone(),
                ));
            }
            Some(ExpandedMod::Picked { things })
        }
    }
}
