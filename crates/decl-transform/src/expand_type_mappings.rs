//! Pipeline steps 13-14: `ExpandTypeMappings` and its `.After` rerun.
//!
//! A mapped type (`{ [K in keyof T]: U }`, the single `TypeMapped` member
//! an `Object` can carry) has no direct counterpart in a target language
//! without first-class mapped types, so it's expanded here into one
//! concrete `Property` per key of its `from` clause.

use decl_common::Diagnostic;
use decl_ident::SimpleIdent;
use decl_scope::{follow_alias, Scope};
use decl_tree::{Container, MappedModifier, MemberTree, Tree, TypeTree};

/// Why a particular mapped type couldn't be expanded. Logged via
/// `Diagnostic::TypeMappingProblem`, never fatal: the member is left as a
/// `TypeMapped` for a later pass (or a human) to deal with.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Problem {
    /// `from` is `keyof T` where `T` is a bound type parameter — its keys
    /// aren't knowable without a concrete instantiation.
    NotStatic,
    /// `from` isn't a shape this pass knows how to enumerate keys from.
    InvalidType,
    /// Following `from` through alias hops didn't terminate.
    Loop,
    /// `from`'s `keyof` target couldn't be resolved in scope.
    TypeNotFound,
    /// `from`'s `keyof` target resolved to something that isn't an
    /// object-shaped declaration (a function, a primitive, ...).
    NotKeysFromTarget,
    /// The target has no own members to take keys from.
    NoMembers,
    /// `as_name` renames keys to something other than the key itself —
    /// template literal key remapping isn't supported.
    UnsupportedTM,
    /// `from` is a key union but couldn't be fully resolved to literals.
    CouldNotPickKeys,
    /// A predicate-qualified mapped type (`[K in keyof T as ...]`) using
    /// an unsupported predicate shape.
    UnsupportedPredicate,
}

impl Problem {
    fn describe(self) -> &'static str {
        match self {
            Problem::NotStatic => "keyof applied to an unresolved type parameter",
            Problem::InvalidType => "unsupported mapped-type source shape",
            Problem::Loop => "alias cycle while resolving mapped-type source",
            Problem::TypeNotFound => "mapped-type source not found in scope",
            Problem::NotKeysFromTarget => "mapped-type source isn't object-shaped",
            Problem::NoMembers => "mapped-type source has no members",
            Problem::UnsupportedTM => "key renaming via `as` isn't supported",
            Problem::CouldNotPickKeys => "mapped-type key union didn't resolve to literals",
            Problem::UnsupportedPredicate => "unsupported mapped-type key predicate",
        }
    }
}

struct KeyInfo {
    name: SimpleIdent,
    prop_type: Option<TypeTree>,
    readonly: bool,
    optional: bool,
}

pub fn run<'a>(tree: &'a Tree, scope: &Scope<'a>) -> Tree {
    rewrite_tree(tree, scope)
}

/// Reruns the same expansion once more, late in the pipeline, after
/// `ResolveTypeLookups` and the const-enum/ctor/type-parameter passes have
/// had a chance to simplify `keyof` targets that were too indirect to
/// resolve on the first pass (e.g. a mapped type over an alias of an
/// alias that only became a plain object type after later simplification).
pub fn run_after<'a>(tree: &'a Tree, scope: &Scope<'a>) -> Tree {
    run(tree, scope)
}

fn rewrite_tree<'a>(tree: &'a Tree, scope: &Scope<'a>) -> Tree {
    match tree {
        Tree::ParsedFile { directives, is_module, container } => Tree::ParsedFile {
            directives: directives.clone(),
            is_module: *is_module,
            container: rewrite_container(container, &scope.nested(tree)),
        },
        Tree::Namespace { name, container } => {
            Tree::Namespace { name: name.clone(), container: rewrite_container(container, &scope.nested(tree)) }
        }
        Tree::Module { name, container } => {
            Tree::Module { name: name.clone(), container: rewrite_container(container, &scope.nested(tree)) }
        }
        Tree::AugmentedModule { name, container } => {
            Tree::AugmentedModule { name: name.clone(), container: rewrite_container(container, &scope.nested(tree)) }
        }
        Tree::Global { container } => Tree::Global { container: rewrite_container(container, &scope.nested(tree)) },
        Tree::DeclTypeAlias { name, comments, tparams, alias, code_path, js_location } => {
            let s = scope.with_type_params(tparams);
            Tree::DeclTypeAlias {
                name: name.clone(),
                comments: comments.clone(),
                tparams: tparams.clone(),
                alias: rewrite_type(alias, &s),
                code_path: code_path.clone(),
                js_location: js_location.clone(),
            }
        }
        Tree::DeclClass { name, comments, declared, is_abstract, tparams, parent, implements, members, code_path, js_location } => {
            let s = scope.with_type_params(tparams);
            Tree::DeclClass {
                name: name.clone(),
                comments: comments.clone(),
                declared: *declared,
                is_abstract: *is_abstract,
                tparams: tparams.clone(),
                parent: parent.clone(),
                implements: implements.clone(),
                members: members.iter().map(|m| rewrite_member(m, &s)).collect(),
                code_path: code_path.clone(),
                js_location: js_location.clone(),
            }
        }
        Tree::DeclInterface { name, comments, tparams, inheritance, members, code_path, js_location } => {
            let s = scope.with_type_params(tparams);
            Tree::DeclInterface {
                name: name.clone(),
                comments: comments.clone(),
                tparams: tparams.clone(),
                inheritance: inheritance.clone(),
                members: members.iter().map(|m| rewrite_member(m, &s)).collect(),
                code_path: code_path.clone(),
                js_location: js_location.clone(),
            }
        }
        Tree::DeclVar { name, comments, declared, readonly, tpe, code_path, js_location } => Tree::DeclVar {
            name: name.clone(),
            comments: comments.clone(),
            declared: *declared,
            readonly: *readonly,
            tpe: tpe.as_ref().map(|t| rewrite_type(t, scope)),
            code_path: code_path.clone(),
            js_location: js_location.clone(),
        },
        other => other.clone(),
    }
}

fn rewrite_container<'a>(container: &Container, scope: &Scope<'a>) -> Container {
    Container { members: container.members.iter().map(|m| rewrite_tree(m, scope)).collect(), ..container.clone() }
}

fn rewrite_member(member: &MemberTree, scope: &Scope<'_>) -> MemberTree {
    match member {
        MemberTree::Property { name, tpe, is_static, is_readonly, is_optional, comments } => MemberTree::Property {
            name: name.clone(),
            tpe: tpe.as_ref().map(|t| rewrite_type(t, scope)),
            is_static: *is_static,
            is_readonly: *is_readonly,
            is_optional: *is_optional,
            comments: comments.clone(),
        },
        other => other.clone(),
    }
}

fn rewrite_type(tpe: &TypeTree, scope: &Scope<'_>) -> TypeTree {
    match tpe {
        TypeTree::Object(members) => TypeTree::Object(expand_members(members, scope)),
        TypeTree::Union(ts) => TypeTree::Union(ts.iter().map(|t| rewrite_type(t, scope)).collect()),
        TypeTree::Intersect(ts) => TypeTree::Intersect(ts.iter().map(|t| rewrite_type(t, scope)).collect()),
        TypeTree::Tuple(elems) => TypeTree::Tuple(
            elems
                .iter()
                .map(|e| {
                    let mut e = e.clone();
                    e.tpe = rewrite_type(&e.tpe, scope);
                    e
                })
                .collect(),
        ),
        TypeTree::Function(sig) => TypeTree::Function(rewrite_sig(sig, scope)),
        TypeTree::Constructor(sig, abs) => TypeTree::Constructor(rewrite_sig(sig, scope), *abs),
        other => other.clone(),
    }
}

fn rewrite_sig(sig: &decl_tree::FunctionSig, scope: &Scope<'_>) -> decl_tree::FunctionSig {
    let s = scope.with_type_params(&sig.type_params);
    decl_tree::FunctionSig {
        type_params: sig.type_params.clone(),
        params: sig
            .params
            .iter()
            .map(|p| {
                let mut p = p.clone();
                p.tpe = p.tpe.as_ref().map(|t| rewrite_type(t, &s));
                p
            })
            .collect(),
        result_type: sig.result_type.as_ref().map(|t| Box::new(rewrite_type(t, &s))),
    }
}

fn expand_members(members: &[MemberTree], scope: &Scope<'_>) -> Vec<MemberTree> {
    let mut out = Vec::with_capacity(members.len());
    for member in members {
        match member {
            MemberTree::TypeMapped { key, from, as_name, optional, readonly, value_type, comments } => {
                match expand_one(key, from, as_name.as_deref(), *optional, *readonly, value_type, scope) {
                    Ok(mut expanded) => {
                        for m in &mut expanded {
                            *m = m.clone().with_comments(comments.clone());
                        }
                        out.extend(expanded);
                    }
                    Err(problem) => {
                        scope.logger().log(Diagnostic::TypeMappingProblem {
                            site: key.as_str().to_string(),
                            problem: problem.describe().to_string(),
                        });
                        out.push(member.clone());
                    }
                }
            }
            other => out.push(rewrite_member(other, scope)),
        }
    }
    out
}

fn expand_one(
    key: &SimpleIdent,
    from: &TypeTree,
    as_name: Option<&TypeTree>,
    optional: MappedModifier,
    readonly: MappedModifier,
    value_type: &TypeTree,
    scope: &Scope<'_>,
) -> Result<Vec<MemberTree>, Problem> {
    if let Some(name_type) = as_name {
        let is_identity = matches!(name_type, TypeTree::Ref(q, args) if args.is_empty() && q.len() == 1 && q.head() == Some(key));
        if !is_identity {
            return Err(Problem::UnsupportedTM);
        }
    }

    let keys = evaluate_keys(from, scope)?;
    Ok(keys
        .into_iter()
        .map(|info| MemberTree::Property {
            name: info.name.clone(),
            tpe: Some(substitute_key(value_type, key, info.name.as_str(), info.prop_type.as_ref())),
            is_static: false,
            is_readonly: apply_modifier(info.readonly, readonly),
            is_optional: apply_modifier(info.optional, optional),
            comments: decl_tree::Comments::empty(),
        })
        .collect())
}

fn apply_modifier(base: bool, modifier: MappedModifier) -> bool {
    match modifier {
        MappedModifier::Noop => base,
        MappedModifier::Add => true,
        MappedModifier::Remove => false,
    }
}

fn evaluate_keys(from: &TypeTree, scope: &Scope<'_>) -> Result<Vec<KeyInfo>, Problem> {
    match from {
        TypeTree::KeyOf(inner) => {
            if let TypeTree::Ref(qident, args) = inner.as_ref() {
                if args.is_empty() && qident.len() == 1 && scope.is_abstract(qident.head().unwrap()) {
                    return Err(Problem::NotStatic);
                }
            }
            let resolved = follow_alias(inner, scope);
            let members: &[MemberTree] = match &resolved {
                TypeTree::Object(members) => members,
                TypeTree::Ref(qident, _) => {
                    let hits = scope.enable_unqualified_lookup().lookup_type(qident);
                    match hits.as_slice() {
                        [Tree::DeclInterface { members, .. }] => members,
                        [Tree::DeclClass { members, .. }] => members,
                        [] => return Err(Problem::TypeNotFound),
                        _ => return Err(Problem::NotKeysFromTarget),
                    }
                }
                _ => return Err(Problem::NotKeysFromTarget),
            };
            if members.is_empty() {
                return Err(Problem::NoMembers);
            }
            Ok(members
                .iter()
                .filter_map(|m| match m {
                    MemberTree::Property { name, tpe, is_readonly, is_optional, .. } => Some(KeyInfo {
                        name: name.clone(),
                        prop_type: tpe.clone(),
                        readonly: *is_readonly,
                        optional: *is_optional,
                    }),
                    _ => None,
                })
                .collect())
        }
        TypeTree::Union(parts) => {
            let mut out = Vec::with_capacity(parts.len());
            for part in parts {
                match part {
                    TypeTree::Literal(decl_tree::LiteralValue::Str(s)) => {
                        out.push(KeyInfo { name: SimpleIdent::new(s), prop_type: None, readonly: false, optional: false })
                    }
                    TypeTree::Ref(qident, args) if args.is_empty() && qident.len() == 1 => out.push(KeyInfo {
                        name: qident.head().unwrap().clone(),
                        prop_type: None,
                        readonly: false,
                        optional: false,
                    }),
                    _ => return Err(Problem::CouldNotPickKeys),
                }
            }
            Ok(out)
        }
        TypeTree::Literal(decl_tree::LiteralValue::Str(s)) => {
            Ok(vec![KeyInfo { name: SimpleIdent::new(s), prop_type: None, readonly: false, optional: false }])
        }
        _ => Err(Problem::InvalidType),
    }
}

fn substitute_key(tpe: &TypeTree, key: &SimpleIdent, literal: &str, prop_type: Option<&TypeTree>) -> TypeTree {
    match tpe {
        TypeTree::Ref(qident, args) if args.is_empty() && qident.len() == 1 && qident.head() == Some(key) => {
            TypeTree::Literal(decl_tree::LiteralValue::Str(literal.to_string()))
        }
        TypeTree::Lookup(from, key_type) => {
            let is_key_ref =
                matches!(key_type.as_ref(), TypeTree::Ref(q, a) if a.is_empty() && q.len() == 1 && q.head() == Some(key));
            if is_key_ref {
                if let Some(prop_type) = prop_type {
                    return prop_type.clone();
                }
            }
            TypeTree::Lookup(
                Box::new(substitute_key(from, key, literal, prop_type)),
                Box::new(substitute_key(key_type, key, literal, prop_type)),
            )
        }
        TypeTree::Union(ts) => TypeTree::Union(ts.iter().map(|t| substitute_key(t, key, literal, prop_type)).collect()),
        TypeTree::Intersect(ts) => {
            TypeTree::Intersect(ts.iter().map(|t| substitute_key(t, key, literal, prop_type)).collect())
        }
        TypeTree::Object(members) => TypeTree::Object(
            members
                .iter()
                .map(|m| match m {
                    MemberTree::Property { name, tpe, is_static, is_readonly, is_optional, comments } => MemberTree::Property {
                        name: name.clone(),
                        tpe: tpe.as_ref().map(|t| substitute_key(t, key, literal, prop_type)),
                        is_static: *is_static,
                        is_readonly: *is_readonly,
                        is_optional: *is_optional,
                        comments: comments.clone(),
                    },
                    other => other.clone(),
                })
                .collect(),
        ),
        TypeTree::KeyOf(t) => TypeTree::KeyOf(Box::new(substitute_key(t, key, literal, prop_type))),
        _ => tpe.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_common::TracingLogger;
    use decl_ident::{CodePath, JsLocation, LibraryName, QIdent};
    use decl_tree::Comments;

    #[test]
    fn expands_a_keyof_mapped_type_over_an_interface() {
        let source = Tree::DeclInterface {
            name: SimpleIdent::new("Source"),
            comments: Comments::empty(),
            tparams: Vec::new(),
            inheritance: Vec::new(),
            members: vec![
                MemberTree::Property {
                    name: SimpleIdent::new("a"),
                    tpe: Some(TypeTree::ref_simple(SimpleIdent::new("string"))),
                    is_static: false,
                    is_readonly: false,
                    is_optional: false,
                    comments: Comments::empty(),
                },
                MemberTree::Property {
                    name: SimpleIdent::new("b"),
                    tpe: Some(TypeTree::ref_simple(SimpleIdent::new("number"))),
                    is_static: false,
                    is_readonly: false,
                    is_optional: false,
                    comments: Comments::empty(),
                },
            ],
            code_path: CodePath::has_path(LibraryName::unscoped("lib"), QIdent::single(SimpleIdent::new("Source"))),
            js_location: JsLocation::Zero,
        };
        let alias = Tree::DeclTypeAlias {
            name: SimpleIdent::new("Mapped"),
            comments: Comments::empty(),
            tparams: Vec::new(),
            alias: TypeTree::Object(vec![MemberTree::TypeMapped {
                key: SimpleIdent::new("K"),
                from: TypeTree::KeyOf(Box::new(TypeTree::ref_simple(SimpleIdent::new("Source")))),
                as_name: None,
                optional: MappedModifier::Noop,
                readonly: MappedModifier::Noop,
                value_type: TypeTree::Lookup(
                    Box::new(TypeTree::ref_simple(SimpleIdent::new("Source"))),
                    Box::new(TypeTree::ref_simple(SimpleIdent::new("K"))),
                ),
                comments: Comments::empty(),
            }]),
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        };
        let root = Tree::ParsedFile {
            directives: Vec::new(),
            is_module: false,
            container: Container::new(vec![source, alias]),
        };
        let logger = TracingLogger;
        let scope = Scope::root(LibraryName::unscoped("lib"), false, &root, &[], &logger);

        let result = run(&root, &scope);
        let Tree::ParsedFile { container, .. } = result else { panic!("expected parsed file") };
        match &container.members[1] {
            Tree::DeclTypeAlias { alias: TypeTree::Object(members), .. } => {
                assert_eq!(members.len(), 2);
                assert!(members.iter().any(|m| m.name() == Some(&SimpleIdent::new("a"))));
                assert!(members.iter().any(|m| m.name() == Some(&SimpleIdent::new("b"))));
            }
            other => panic!("expected an expanded object type alias, got {other:?}"),
        }
    }

    #[test]
    fn leaves_unresolvable_mapped_types_in_place_and_logs() {
        let alias = Tree::DeclTypeAlias {
            name: SimpleIdent::new("Mapped"),
            comments: Comments::empty(),
            tparams: Vec::new(),
            alias: TypeTree::Object(vec![MemberTree::TypeMapped {
                key: SimpleIdent::new("K"),
                from: TypeTree::KeyOf(Box::new(TypeTree::ref_simple(SimpleIdent::new("Missing")))),
                as_name: None,
                optional: MappedModifier::Noop,
                readonly: MappedModifier::Noop,
                value_type: TypeTree::ref_simple(SimpleIdent::new("K")),
                comments: Comments::empty(),
            }]),
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        };
        let root = Tree::ParsedFile { directives: Vec::new(), is_module: false, container: Container::new(vec![alias]) };
        let logger = TracingLogger;
        let scope = Scope::root(LibraryName::unscoped("lib"), false, &root, &[], &logger);

        let result = run(&root, &scope);
        let Tree::ParsedFile { container, .. } = result else { panic!("expected parsed file") };
        match &container.members[0] {
            Tree::DeclTypeAlias { alias: TypeTree::Object(members), .. } => {
                assert!(matches!(members[0], MemberTree::TypeMapped { .. }));
            }
            other => panic!("expected the type mapping left untouched, got {other:?}"),
        }
    }
}
