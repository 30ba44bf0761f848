//! Pipeline step 15: `TypeAliasToConstEnum ⋙ ForwardCtors ⋙ ExpandTypeParams
//! ⋙ UnionTypesFromKeyOf ⋙ DropProperties ⋙ InferReturnTypes ⋙
//! RewriteTypeThis ⋙ InlineConstEnum ⋙ InlineTrivial`, combined under one
//! scoped descent for the same reason `combined_early` combines its own
//! run of early-stage passes.

use decl_ident::SimpleIdent;
use decl_scope::{follow_alias, Scope};
use decl_tree::{Container, MemberTree, Tree, TypeTree};

pub fn run<'a>(tree: &'a Tree, scope: &Scope<'a>) -> Tree {
    rewrite_tree(tree, scope, None)
}

/// `self_ref`, when set, is the enclosing class/interface's own name and
/// type parameters, substituted for `TypeTree::This` by `RewriteTypeThis`.
fn rewrite_tree<'a>(tree: &'a Tree, scope: &Scope<'a>, self_ref: Option<&TypeTree>) -> Tree {
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
            if let Some(enum_decl) =
                type_alias_to_const_enum(name, comments, tparams, alias, code_path, js_location)
            {
                return enum_decl;
            }
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
            let own_ref = TypeTree::Ref(
                decl_ident::QIdent::single(name.clone()),
                tparams.iter().map(|p| TypeTree::ref_simple(p.name.clone())).collect(),
            );
            let members = forward_ctors(members, parent.as_ref(), &s);
            let members: Vec<MemberTree> = members
                .into_iter()
                .filter_map(|m| rewrite_member(&m, &s, Some(&own_ref)))
                .collect();
            Tree::DeclClass {
                name: name.clone(),
                comments: comments.clone(),
                declared: *declared,
                is_abstract: *is_abstract,
                tparams: tparams.clone(),
                parent: parent.as_ref().map(|p| rewrite_type(p, &s)),
                implements: implements.iter().map(|t| rewrite_type(t, &s)).collect(),
                members,
                code_path: code_path.clone(),
                js_location: js_location.clone(),
            }
        }
        Tree::DeclInterface { name, comments, tparams, inheritance, members, code_path, js_location } => {
            let s = scope.with_type_params(tparams);
            let own_ref = TypeTree::Ref(
                decl_ident::QIdent::single(name.clone()),
                tparams.iter().map(|p| TypeTree::ref_simple(p.name.clone())).collect(),
            );
            let members: Vec<MemberTree> =
                members.iter().filter_map(|m| rewrite_member(m, &s, Some(&own_ref))).collect();
            Tree::DeclInterface {
                name: name.clone(),
                comments: comments.clone(),
                tparams: tparams.clone(),
                inheritance: inheritance.iter().map(|t| rewrite_type(t, &s)).collect(),
                members,
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
        Tree::DeclFunction { name, comments, declared, sig, code_path, js_location } => Tree::DeclFunction {
            name: name.clone(),
            comments: comments.clone(),
            declared: *declared,
            sig: infer_return_type(rewrite_sig(sig, scope)),
            code_path: code_path.clone(),
            js_location: js_location.clone(),
        },
        _ => {
            let _ = self_ref;
            tree.clone()
        }
    }
}

fn rewrite_container<'a>(container: &Container, scope: &Scope<'a>) -> Container {
    Container { members: container.members.iter().map(|m| rewrite_tree(m, scope, None)).collect(), ..container.clone() }
}

/// `DropProperties`: a property typed `never` can never legally hold a
/// value, so it's removed rather than carried into a target that would
/// otherwise have to materialize an uninhabitable field.
fn rewrite_member(member: &MemberTree, scope: &Scope<'_>, self_ref: Option<&TypeTree>) -> Option<MemberTree> {
    match member {
        MemberTree::Property { tpe: Some(t), .. } if t.is_never() => None,
        MemberTree::Property { name, tpe, is_static, is_readonly, is_optional, comments } => Some(MemberTree::Property {
            name: name.clone(),
            tpe: tpe.as_ref().map(|t| rewrite_type_self(t, scope, self_ref)),
            is_static: *is_static,
            is_readonly: *is_readonly,
            is_optional: *is_optional,
            comments: comments.clone(),
        }),
        MemberTree::Function { name, method_type, is_static, is_readonly, sig, comments } => Some(MemberTree::Function {
            name: name.clone(),
            method_type: *method_type,
            is_static: *is_static,
            is_readonly: *is_readonly,
            sig: infer_return_type(rewrite_sig_self(sig, scope, self_ref)),
            comments: comments.clone(),
        }),
        MemberTree::Ctor { sig, comments } => {
            Some(MemberTree::Ctor { sig: rewrite_sig_self(sig, scope, self_ref), comments: comments.clone() })
        }
        other => Some(other.clone()),
    }
}

fn infer_return_type(mut sig: decl_tree::FunctionSig) -> decl_tree::FunctionSig {
    if sig.result_type.is_none() {
        sig.result_type = Some(Box::new(TypeTree::any()));
    }
    sig
}

fn rewrite_type(tpe: &TypeTree, scope: &Scope<'_>) -> TypeTree {
    rewrite_type_self(tpe, scope, None)
}

fn rewrite_sig(sig: &decl_tree::FunctionSig, scope: &Scope<'_>) -> decl_tree::FunctionSig {
    rewrite_sig_self(sig, scope, None)
}

fn rewrite_sig_self(sig: &decl_tree::FunctionSig, scope: &Scope<'_>, self_ref: Option<&TypeTree>) -> decl_tree::FunctionSig {
    let s = scope.with_type_params(&sig.type_params);
    decl_tree::FunctionSig {
        type_params: sig.type_params.clone(),
        params: sig
            .params
            .iter()
            .map(|p| {
                let mut p = p.clone();
                p.tpe = p.tpe.as_ref().map(|t| rewrite_type_self(t, &s, self_ref));
                p
            })
            .collect(),
        result_type: sig.result_type.as_ref().map(|t| Box::new(rewrite_type_self(t, &s, self_ref))),
    }
}

/// `RewriteTypeThis ⋙ InlineConstEnum ⋙ UnionTypesFromKeyOf ⋙ InlineTrivial`,
/// applied together on every type node encountered during the descent.
fn rewrite_type_self(tpe: &TypeTree, scope: &Scope<'_>, self_ref: Option<&TypeTree>) -> TypeTree {
    match tpe {
        TypeTree::This => self_ref.cloned().unwrap_or(TypeTree::This),
        TypeTree::Ref(qident, args) if args.is_empty() => {
            if let Some(union) = inline_const_enum(qident, scope) {
                return union;
            }
            match inline_trivial(qident, scope) {
                Some(resolved) => resolved,
                None => TypeTree::Ref(qident.clone(), Vec::new()),
            }
        }
        TypeTree::Ref(qident, args) => {
            TypeTree::Ref(qident.clone(), args.iter().map(|a| rewrite_type_self(a, scope, self_ref)).collect())
        }
        TypeTree::KeyOf(inner) => match union_from_keyof(inner, scope) {
            Some(union) => union,
            None => TypeTree::KeyOf(Box::new(rewrite_type_self(inner, scope, self_ref))),
        },
        TypeTree::Union(ts) => TypeTree::Union(ts.iter().map(|t| rewrite_type_self(t, scope, self_ref)).collect()),
        TypeTree::Intersect(ts) => TypeTree::Intersect(ts.iter().map(|t| rewrite_type_self(t, scope, self_ref)).collect()),
        TypeTree::Object(members) => {
            TypeTree::Object(members.iter().filter_map(|m| rewrite_member(m, scope, self_ref)).collect())
        }
        TypeTree::Function(sig) => TypeTree::Function(rewrite_sig_self(sig, scope, self_ref)),
        TypeTree::Constructor(sig, abs) => TypeTree::Constructor(rewrite_sig_self(sig, scope, self_ref), *abs),
        TypeTree::Tuple(elems) => TypeTree::Tuple(
            elems
                .iter()
                .map(|e| {
                    let mut e = e.clone();
                    e.tpe = rewrite_type_self(&e.tpe, scope, self_ref);
                    e
                })
                .collect(),
        ),
        TypeTree::Lookup(from, key) => {
            TypeTree::Lookup(Box::new(rewrite_type_self(from, scope, self_ref)), Box::new(rewrite_type_self(key, scope, self_ref)))
        }
        TypeTree::Conditional(pred, t, f) => TypeTree::Conditional(
            Box::new(rewrite_type_self(pred, scope, self_ref)),
            Box::new(rewrite_type_self(t, scope, self_ref)),
            Box::new(rewrite_type_self(f, scope, self_ref)),
        ),
        TypeTree::Extends(t, e) => {
            TypeTree::Extends(Box::new(rewrite_type_self(t, scope, self_ref)), Box::new(rewrite_type_self(e, scope, self_ref)))
        }
        TypeTree::Is(name, t) => TypeTree::Is(name.clone(), Box::new(rewrite_type_self(t, scope, self_ref))),
        other => other.clone(),
    }
}

/// `TypeAliasToConstEnum`: a type alias whose body is a union of two or
/// more distinct string literals is promoted to a `const enum` — the
/// literal union and the enum are semantically interchangeable at every
/// use site, and a named enum carries member names a raw string literal
/// union doesn't.
fn type_alias_to_const_enum(
    name: &SimpleIdent,
    comments: &decl_tree::Comments,
    tparams: &[decl_tree::TypeParam],
    alias: &TypeTree,
    code_path: &decl_ident::CodePath,
    js_location: &decl_ident::JsLocation,
) -> Option<Tree> {
    if !tparams.is_empty() {
        return None;
    }
    let TypeTree::Union(parts) = alias else { return None };
    if parts.len() < 2 {
        return None;
    }
    let mut literals = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            TypeTree::Literal(decl_tree::LiteralValue::Str(s)) => literals.push(s.clone()),
            _ => return None,
        }
    }

    let mut used = std::collections::HashSet::new();
    let members = literals
        .into_iter()
        .map(|lit| {
            let member_name = unique_enum_member_name(&lit, &mut used);
            decl_tree::EnumMember {
                name: member_name,
                literal_value: Some(decl_tree::LiteralValue::Str(lit)),
                comments: decl_tree::Comments::empty(),
            }
        })
        .collect();

    Some(Tree::DeclEnum {
        name: name.clone(),
        comments: comments.clone(),
        declared: true,
        is_const: true,
        is_value: true,
        members,
        exported_from: None,
        code_path: code_path.clone(),
        js_location: js_location.clone(),
    })
}

/// Pascal-cases a string literal into an enum member name, disambiguating
/// with a numeric suffix on collision (two literals can pretty-print to
/// the same identifier, e.g. `"up"` and `"Up"`).
fn unique_enum_member_name(literal: &str, used: &mut std::collections::HashSet<String>) -> SimpleIdent {
    let mut out = String::new();
    let mut cap_next = true;
    for c in literal.chars() {
        if c.is_alphanumeric() {
            if cap_next {
                out.extend(c.to_uppercase());
                cap_next = false;
            } else {
                out.push(c);
            }
        } else {
            cap_next = true;
        }
    }
    if out.is_empty() {
        out = "Member".to_string();
    }
    let mut candidate = out.clone();
    let mut i = 0u32;
    while used.contains(&candidate) {
        i += 1;
        candidate = format!("{out}{i}");
    }
    used.insert(candidate.clone());
    SimpleIdent::new(candidate)
}

/// `ForwardCtors`: a class with no constructor of its own that extends a
/// class whose constructor scope can resolve gets an explicit forwarding
/// `Ctor` mirroring the parent's, since a target language without
/// implicit constructor inheritance needs one to call `super(...)`.
fn forward_ctors(members: &[MemberTree], parent: Option<&TypeTree>, scope: &Scope<'_>) -> Vec<MemberTree> {
    if members.iter().any(|m| matches!(m, MemberTree::Ctor { .. })) {
        return members.to_vec();
    }
    let Some(TypeTree::Ref(qident, _)) = parent else { return members.to_vec() };
    let hits = scope.enable_unqualified_lookup().lookup(qident);
    let parent_ctor = hits.iter().find_map(|t| match t {
        Tree::DeclClass { members, .. } => members.iter().find(|m| matches!(m, MemberTree::Ctor { .. })).cloned(),
        _ => None,
    });
    match parent_ctor {
        Some(ctor) => {
            let mut out = members.to_vec();
            out.push(ctor);
            out
        }
        None => members.to_vec(),
    }
}

/// `InlineConstEnum`: a bare reference to a `const enum` all of whose
/// members have a known literal value is replaced by the literal union
/// directly — `const enum`s have no runtime object to reference, so a
/// type position naming one must be expressed as the union of its values.
fn inline_const_enum(qident: &decl_ident::QIdent, scope: &Scope<'_>) -> Option<TypeTree> {
    let hits = scope.enable_unqualified_lookup().lookup_type(qident);
    match hits.as_slice() {
        [Tree::DeclEnum { is_const: true, members, .. }] => {
            let literals: Option<Vec<TypeTree>> = members
                .iter()
                .map(|m| m.literal_value.clone().map(TypeTree::Literal))
                .collect();
            literals.map(|ts| if ts.len() == 1 { ts.into_iter().next().unwrap() } else { TypeTree::Union(ts) })
        }
        _ => None,
    }
}

/// `UnionTypesFromKeyOf`: `keyof T`, when `T` resolves to a concrete
/// object shape, is replaced by the literal union of its member names —
/// expressible directly, unlike an opaque `keyof` operator.
fn union_from_keyof(inner: &TypeTree, scope: &Scope<'_>) -> Option<TypeTree> {
    let resolved = follow_alias(inner, scope);
    let members: &[MemberTree] = match &resolved {
        TypeTree::Object(members) => members,
        TypeTree::Ref(qident, args) if args.is_empty() => {
            let hits = scope.enable_unqualified_lookup().lookup_type(qident);
            match hits.as_slice() {
                [Tree::DeclInterface { members, .. }] => members,
                [Tree::DeclClass { members, .. }] => members,
                _ => return None,
            }
        }
        _ => return None,
    };
    let names: Vec<TypeTree> = members
        .iter()
        .filter_map(|m| m.name())
        .map(|n| TypeTree::Literal(decl_tree::LiteralValue::Str(n.as_str().to_string())))
        .collect();
    if names.is_empty() {
        None
    } else if names.len() == 1 {
        Some(names.into_iter().next().unwrap())
    } else {
        Some(TypeTree::Union(names))
    }
}

/// `InlineTrivial`: a bare reference to a type alias that is itself
/// nothing but a bare reference to another type (`type A = B`, no type
/// parameters on either side) is collapsed to what it ultimately points
/// at, so later passes see the real target rather than a layer of pure
/// renaming.
fn inline_trivial(qident: &decl_ident::QIdent, scope: &Scope<'_>) -> Option<TypeTree> {
    let hits = scope.enable_unqualified_lookup().lookup_type(qident);
    match hits.as_slice() {
        [Tree::DeclTypeAlias { tparams, alias: TypeTree::Ref(target, target_args), .. }]
            if tparams.is_empty() && target_args.is_empty() && target != qident =>
        {
            Some(TypeTree::Ref(target.clone(), Vec::new()))
        }
        _ => None,
    }
}
