//! `FlattenTrees`: merging two parsed files (or a file and an in-progress
//! accumulator) into one by pairwise reconciling members with the same
//! name (§4.5). Idempotent: `merge(a, merge(a, b)) == merge(a, b)`, because
//! every rule below either recurses into an equally-idempotent merge or
//! picks a side deterministically (union/intersection, "prefer longer
//! list", "prefer non-`NoPath`") rather than accumulating state that would
//! grow on a repeated merge with identical input.

use crate::comments::Comments;
use crate::member::MemberTree;
use crate::tree::{Container, EnumMember, Tree};
use crate::types::{TypeParam, TypeTree};
use decl_ident::{CodePath, JsLocation, ModuleName, SimpleIdent};
use rustc_hash::FxHashMap;

/// Merges two whole parsed trees (two files, or a file and the running
/// accumulator) into one. Named members are grouped and reconciled
/// pairwise via `merge_named`; unnamed members (bare `Global` blocks,
/// `Import`/`Export`/`ExportAsNamespace` nodes) only combine when both are
/// `Global`, and otherwise are kept side by side in encounter order.
pub fn flatten(a: Tree, b: Tree) -> Tree {
    match (a, b) {
        (
            Tree::ParsedFile {
                directives: da,
                is_module: ma,
                container: ca,
            },
            Tree::ParsedFile {
                directives: db,
                is_module: mb,
                container: cb,
            },
        ) => {
            let mut directives = da;
            for d in db {
                if !directives.contains(&d) {
                    directives.push(d);
                }
            }
            Tree::ParsedFile {
                directives,
                is_module: ma || mb,
                container: merge_containers(ca, cb),
            }
        }
        (a, b) => merge_named(a, b).unwrap_or(b),
    }
}

/// Re-normalizes a single tree by merging any of its members that share a
/// name into one (`FlattenTrees.applySingle`, pipeline step 11).
pub fn apply_single(tree: Tree) -> Tree {
    match tree {
        Tree::ParsedFile {
            directives,
            is_module,
            container,
        } => Tree::ParsedFile {
            directives,
            is_module,
            container: apply_single_container(container),
        },
        Tree::Namespace { name, container } => Tree::Namespace {
            name,
            container: apply_single_container(container),
        },
        Tree::Module { name, container } => Tree::Module {
            name,
            container: apply_single_container(container),
        },
        Tree::AugmentedModule { name, container } => Tree::AugmentedModule {
            name,
            container: apply_single_container(container),
        },
        Tree::Global { container } => Tree::Global {
            container: apply_single_container(container),
        },
        other => other,
    }
}

fn apply_single_container(container: Container) -> Container {
    let merged = merge_member_list(container.members);
    Container {
        members: merged,
        ..container
    }
}

fn merge_containers(a: Container, b: Container) -> Container {
    let mut members = a.members;
    members.extend(b.members);
    let members = merge_member_list(members);
    Container {
        comments: Comments::merge(&a.comments, &b.comments),
        declared: a.declared && b.declared,
        members,
        code_path: prefer_has_path(a.code_path, b.code_path),
        js_location: merge_js_location(a.js_location, b.js_location),
    }
}

/// Groups members by name (falling back to "unnamed, own bucket" for
/// `Global`/`Import`/`Export`/`ExportAsNamespace`), then folds each
/// same-name group pairwise via `merge_named`, and finally appends every
/// unnamed member in its original position. `Global` blocks are the one
/// unnamed shape that still combines with its peers.
fn merge_member_list(members: Vec<Tree>) -> Vec<Tree> {
    let mut order: Vec<SimpleIdent> = Vec::new();
    let mut groups: FxHashMap<SimpleIdent, Vec<Tree>> = FxHashMap::default();
    let mut module_order: Vec<ModuleName> = Vec::new();
    let mut module_groups: FxHashMap<ModuleName, Vec<Tree>> = FxHashMap::default();
    let mut globals: Vec<Tree> = Vec::new();
    let mut unnamed: Vec<Tree> = Vec::new();

    for m in members {
        if let Some(name) = m.name().cloned() {
            if !groups.contains_key(&name) {
                order.push(name.clone());
            }
            groups.entry(name).or_default().push(m);
        } else if let Some(module_name) = m.module_name().cloned() {
            if !module_groups.contains_key(&module_name) {
                module_order.push(module_name.clone());
            }
            module_groups.entry(module_name).or_default().push(m);
        } else if matches!(m, Tree::Global { .. }) {
            globals.push(m);
        } else {
            unnamed.push(m);
        }
    }

    let mut result = Vec::new();
    for name in order {
        let group = groups.remove(&name).unwrap();
        result.push(fold_group(group));
    }
    for name in module_order {
        let group = module_groups.remove(&name).unwrap();
        result.push(fold_group(group));
    }
    if !globals.is_empty() {
        let merged_global = globals
            .into_iter()
            .reduce(|a, b| merge_named(a, b).expect("Global+Global always merges"))
            .unwrap();
        result.push(merged_global);
    }
    result.extend(unnamed);
    result
}

fn fold_group(group: Vec<Tree>) -> Tree {
    let mut iter = group.into_iter();
    let first = iter.next().unwrap();
    iter.fold(first, |acc, next| {
        merge_named(acc, next.clone()).unwrap_or(next)
    })
}

/// The ten named-merge rules of §4.5, tried as an ordered match. Returns
/// `None` when neither side recognizes the other as a mergeable peer
/// (different kinds, or same kind but not a rule §4.5 covers) — callers
/// then keep both members side by side.
fn merge_named(a: Tree, b: Tree) -> Option<Tree> {
    match (a, b) {
        // Rule 1 + rule 3: Namespace+Namespace and Module+Module share one
        // recursive-merge rule, keyed by their respective name types.
        (Tree::Namespace { name, container: ca }, Tree::Namespace { container: cb, .. }) => {
            Some(Tree::Namespace {
                name,
                container: merge_containers(ca, cb),
            })
        }
        (Tree::Module { name, container: ca }, Tree::Module { container: cb, .. }) => {
            Some(Tree::Module {
                name,
                container: merge_containers(ca, cb),
            })
        }
        (
            Tree::AugmentedModule { name, container: ca },
            Tree::AugmentedModule { container: cb, .. },
        ) => Some(Tree::AugmentedModule {
            name,
            container: merge_containers(ca, cb),
        }),
        (Tree::Global { container: ca }, Tree::Global { container: cb }) => Some(Tree::Global {
            container: merge_containers(ca, cb),
        }),

        // Rule 2: Namespace + Function|Var of the same name. The namespace
        // wins; the value becomes a `^`-named member inside it.
        (Tree::Namespace { name, container }, value @ (Tree::DeclFunction { .. } | Tree::DeclVar { .. }))
        | (value @ (Tree::DeclFunction { .. } | Tree::DeclVar { .. }), Tree::Namespace { name, container }) => {
            let namespaced = rename(value, SimpleIdent::new(SimpleIdent::NAMESPACED));
            let mut members = container.members;
            members.push(namespaced);
            Some(Tree::Namespace {
                name,
                container: Container { members, ..container },
            })
        }

        // Rule 4: Class + Class.
        (
            Tree::DeclClass {
                name,
                comments: ca,
                declared: da,
                is_abstract: aa,
                tparams: tpa,
                parent: pa,
                implements: ia,
                members: ma,
                code_path: cpa,
                js_location: jla,
            },
            Tree::DeclClass {
                comments: cb,
                declared: db,
                is_abstract: ab,
                tparams: tpb,
                parent: pb,
                implements: ib,
                members: mb,
                code_path: cpb,
                js_location: jlb,
                ..
            },
        ) => Some(Tree::DeclClass {
            name,
            comments: Comments::merge(&ca, &cb),
            declared: da || db,
            is_abstract: aa && ab,
            tparams: longer(tpa, tpb),
            parent: pa.or(pb),
            implements: union_implements(ia, ib),
            members: new_class_members(ma, mb),
            code_path: prefer_has_path(cpa, cpb),
            js_location: merge_js_location(jla, jlb),
        }),

        // Rule 5: Class + Interface, same name: fold the interface into
        // the class (interface's inheritance becomes additional
        // `implements`, members merge the same way as class+class).
        (
            Tree::DeclClass {
                name,
                comments: ca,
                declared,
                is_abstract,
                tparams: tpa,
                parent,
                implements: ia,
                members: ma,
                code_path,
                js_location,
            },
            Tree::DeclInterface {
                comments: cb,
                tparams: tpb,
                inheritance,
                members: mb,
                ..
            },
        )
        | (
            Tree::DeclInterface {
                comments: cb,
                tparams: tpb,
                inheritance,
                members: mb,
                ..
            },
            Tree::DeclClass {
                name,
                comments: ca,
                declared,
                is_abstract,
                tparams: tpa,
                parent,
                implements: ia,
                members: ma,
                code_path,
                js_location,
            },
        ) => Some(Tree::DeclClass {
            name,
            comments: Comments::merge(&ca, &cb),
            declared,
            is_abstract,
            tparams: longer(tpa, tpb),
            parent,
            implements: union_implements(ia, inheritance),
            members: new_class_members(ma, mb),
            code_path,
            js_location,
        }),

        // Rule 6: Interface + Interface.
        (
            Tree::DeclInterface {
                name,
                comments: ca,
                tparams: tpa,
                inheritance: iha,
                members: ma,
                code_path: cpa,
                js_location: jla,
            },
            Tree::DeclInterface {
                comments: cb,
                tparams: tpb,
                inheritance: ihb,
                members: mb,
                code_path: cpb,
                js_location: jlb,
                ..
            },
        ) => Some(Tree::DeclInterface {
            name,
            comments: Comments::merge(&ca, &cb),
            tparams: longer(tpa, tpb),
            inheritance: union_implements(iha, ihb),
            members: new_class_members(ma, mb),
            code_path: prefer_has_path(cpa, cpb),
            js_location: merge_js_location(jla, jlb),
        }),

        // Rule 7: Enum + Enum.
        (
            Tree::DeclEnum {
                name,
                comments: ca,
                declared: da,
                is_const: ica,
                is_value: iva,
                members: ma,
                exported_from: efa,
                code_path: cpa,
                js_location: jla,
            },
            Tree::DeclEnum {
                comments: cb,
                declared: db,
                is_const: icb,
                is_value: ivb,
                members: mb,
                exported_from: efb,
                ..
            },
        ) => {
            debug_assert_eq!(ica, icb, "isConst must match across merged enum fragments");
            let mut members = ma;
            for m in mb {
                if !members.iter().any(|existing| existing.name == m.name) {
                    members.push(m);
                }
            }
            Some(Tree::DeclEnum {
                name,
                comments: Comments::merge(&ca, &cb),
                declared: da || db,
                is_const: ica,
                is_value: iva || ivb,
                members,
                exported_from: efa.or(efb),
                code_path: cpa,
                js_location: jla,
            })
        }

        // Rule 8: TypeAlias + TypeAlias.
        (
            Tree::DeclTypeAlias {
                name,
                comments: ca,
                tparams: tpa,
                alias: aa,
                code_path,
                js_location,
            },
            Tree::DeclTypeAlias {
                comments: cb,
                tparams: tpb,
                alias: ab,
                ..
            },
        ) => {
            let a_trivial = ca.has_marker(&crate::comments::CommentMarker::IsTrivial);
            let b_trivial = cb.has_marker(&crate::comments::CommentMarker::IsTrivial);
            let (alias, comments) = if a_trivial && !b_trivial {
                (ab, cb)
            } else if b_trivial && !a_trivial {
                (aa, ca)
            } else {
                (
                    TypeTree::Intersect(vec![aa, ab]),
                    Comments::merge(&ca, &cb),
                )
            };
            Some(Tree::DeclTypeAlias {
                name,
                comments,
                tparams: longer(tpa, tpb),
                alias,
                code_path,
                js_location,
            })
        }

        // Rule 9: Var + Var.
        (
            Tree::DeclVar {
                name,
                comments: ca,
                declared: da,
                readonly: ra,
                tpe: ta,
                code_path,
                js_location,
            },
            Tree::DeclVar {
                comments: cb,
                declared: db,
                readonly: rb,
                tpe: tb,
                ..
            },
        ) => Some(Tree::DeclVar {
            name,
            comments: Comments::merge(&ca, &cb),
            declared: da || db,
            readonly: ra && rb,
            tpe: both_types(ta, tb),
            code_path,
            js_location,
        }),

        _ => None,
    }
}

fn rename(tree: Tree, new_name: SimpleIdent) -> Tree {
    match tree {
        Tree::DeclFunction { comments, declared, sig, code_path, js_location, .. } => {
            Tree::DeclFunction { name: new_name, comments, declared, sig, code_path, js_location }
        }
        Tree::DeclVar { comments, declared, readonly, tpe, code_path, js_location, .. } => {
            Tree::DeclVar { name: new_name, comments, declared, readonly, tpe, code_path, js_location }
        }
        other => other,
    }
}

fn longer<T>(a: Vec<T>, b: Vec<T>) -> Vec<T> {
    if b.len() > a.len() {
        b
    } else {
        a
    }
}

fn prefer_has_path(a: CodePath, b: CodePath) -> CodePath {
    if a.is_no_path() {
        b
    } else {
        a
    }
}

fn merge_js_location(a: JsLocation, b: JsLocation) -> JsLocation {
    match (&a, &b) {
        (JsLocation::Both { .. }, _) => a,
        (_, JsLocation::Both { .. }) => b,
        (JsLocation::Zero, _) => b,
        _ => a,
    }
}

fn union_implements(a: Vec<TypeTree>, b: Vec<TypeTree>) -> Vec<TypeTree> {
    let mut result = a;
    for t in b {
        if !result.contains(&t) {
            result.push(t);
        }
    }
    result
}

/// `bothTypes`: intersects two optional types, dropping `never` and
/// preferring a concrete type over a `typeof` query (§4.5 rule 9).
fn both_types(a: Option<TypeTree>, b: Option<TypeTree>) -> Option<TypeTree> {
    match (a, b) {
        (None, x) | (x, None) => x,
        (Some(a), Some(b)) => {
            if a.is_never() {
                return Some(b);
            }
            if b.is_never() {
                return Some(a);
            }
            match (&a, &b) {
                (TypeTree::Query(_), _) => Some(b),
                (_, TypeTree::Query(_)) => Some(a),
                _ if a == b => Some(a),
                _ => Some(TypeTree::Intersect(vec![a, b])),
            }
        }
    }
}

/// `newClassMembers`: sibling `Property`s merge by `(name, isStatic)`
/// (intersecting types, merging comments); `Index` members merge by
/// indexing pattern (intersecting value types); everything else is
/// appended side by side.
fn new_class_members(a: Vec<MemberTree>, b: Vec<MemberTree>) -> Vec<MemberTree> {
    let mut result = a;
    'outer: for incoming in b {
        if let MemberTree::Property {
            name: in_name,
            tpe: in_tpe,
            is_static: in_static,
            is_readonly: in_ro,
            is_optional: in_opt,
            comments: in_comments,
        } = &incoming
        {
            for existing in result.iter_mut() {
                if let MemberTree::Property {
                    name,
                    tpe,
                    is_static,
                    is_readonly,
                    is_optional,
                    comments,
                } = existing
                {
                    if name == in_name && is_static == in_static {
                        *tpe = both_types(tpe.take(), in_tpe.clone());
                        *is_readonly = *is_readonly && *in_ro;
                        *is_optional = *is_optional || *in_opt;
                        *comments = Comments::merge(comments, in_comments);
                        continue 'outer;
                    }
                }
            }
        }
        if let MemberTree::Index {
            indexing: in_indexing,
            value_type: in_value,
            comments: in_comments,
        } = &incoming
        {
            for existing in result.iter_mut() {
                if let MemberTree::Index {
                    indexing,
                    value_type,
                    comments,
                } = existing
                {
                    if indexing == in_indexing {
                        *value_type = both_types(Some(value_type.clone()), Some(in_value.clone()))
                            .unwrap_or_else(|| in_value.clone());
                        *comments = Comments::merge(comments, in_comments);
                        continue 'outer;
                    }
                }
            }
        }
        result.push(incoming);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_ident::QIdent;

    fn empty_class(name: &str, is_abstract: bool, parent: Option<TypeTree>) -> Tree {
        Tree::DeclClass {
            name: SimpleIdent::new(name),
            comments: Comments::empty(),
            declared: true,
            is_abstract,
            tparams: Vec::new(),
            parent,
            implements: Vec::new(),
            members: Vec::new(),
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        }
    }

    fn property(name: &str) -> MemberTree {
        MemberTree::Property {
            name: SimpleIdent::new(name),
            tpe: Some(TypeTree::ref_simple(SimpleIdent::new("string"))),
            is_static: false,
            is_readonly: false,
            is_optional: false,
            comments: Comments::empty(),
        }
    }

    #[test]
    fn class_plus_class_unions_abstractness_and_members() {
        let p = TypeTree::ref_simple(SimpleIdent::new("Base"));
        let mut a = empty_class("Widget", true, Some(p.clone()));
        if let Tree::DeclClass { members, .. } = &mut a {
            members.push(property("m"));
        }
        let b = empty_class("Widget", false, None);

        let merged = merge_named(a, b).expect("class+class should merge");
        match merged {
            Tree::DeclClass {
                is_abstract,
                parent,
                members,
                ..
            } => {
                assert!(!is_abstract);
                assert_eq!(parent, Some(p));
                assert_eq!(members.len(), 1);
            }
            _ => panic!("expected class"),
        }
    }

    #[test]
    fn enum_plus_enum_unions_is_value_and_dedupes_members() {
        let member = |n: &str| EnumMember {
            name: SimpleIdent::new(n),
            literal_value: None,
            comments: Comments::empty(),
        };
        let a = Tree::DeclEnum {
            name: SimpleIdent::new("Color"),
            comments: Comments::empty(),
            declared: true,
            is_const: false,
            is_value: false,
            members: vec![member("Red")],
            exported_from: None,
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        };
        let b = Tree::DeclEnum {
            name: SimpleIdent::new("Color"),
            comments: Comments::empty(),
            declared: true,
            is_const: false,
            is_value: true,
            members: vec![member("Red"), member("Blue")],
            exported_from: None,
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        };

        let merged = merge_named(a, b).expect("enum+enum should merge");
        match merged {
            Tree::DeclEnum { is_value, members, .. } => {
                assert!(is_value);
                assert_eq!(members.len(), 2);
            }
            _ => panic!("expected enum"),
        }
    }

    #[test]
    fn var_plus_var_intersects_types_and_drops_never() {
        let a = Tree::DeclVar {
            name: SimpleIdent::new("x"),
            comments: Comments::empty(),
            declared: true,
            readonly: true,
            tpe: Some(TypeTree::ref_simple(SimpleIdent::new("never"))),
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        };
        let b = Tree::DeclVar {
            name: SimpleIdent::new("x"),
            comments: Comments::empty(),
            declared: false,
            readonly: true,
            tpe: Some(TypeTree::ref_simple(SimpleIdent::new("number"))),
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        };

        let merged = merge_named(a, b).expect("var+var should merge");
        match merged {
            Tree::DeclVar { tpe, .. } => {
                assert_eq!(tpe, Some(TypeTree::ref_simple(SimpleIdent::new("number"))));
            }
            _ => panic!("expected var"),
        }
    }

    #[test]
    fn merge_is_idempotent_on_repeated_class_fragments() {
        let a = empty_class("Widget", false, None);
        let once = merge_named(a.clone(), a.clone()).unwrap();
        let twice = merge_named(once.clone(), a).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn namespace_plus_var_same_name_nests_a_namespaced_copy() {
        let ns = Tree::Namespace {
            name: SimpleIdent::new("Foo"),
            container: Container::new(Vec::new()),
        };
        let var = Tree::DeclVar {
            name: SimpleIdent::new("Foo"),
            comments: Comments::empty(),
            declared: true,
            readonly: false,
            tpe: None,
            code_path: CodePath::has_path(
                decl_ident::LibraryName::unscoped("lib"),
                QIdent::single(SimpleIdent::new("Foo")),
            ),
            js_location: JsLocation::Zero,
        };

        let merged = merge_named(ns, var).expect("namespace+var should merge");
        match merged {
            Tree::Namespace { container, .. } => {
                assert_eq!(container.members.len(), 1);
                assert_eq!(
                    container.members[0].name(),
                    Some(&SimpleIdent::new(SimpleIdent::NAMESPACED))
                );
            }
            _ => panic!("expected namespace"),
        }
    }
}
