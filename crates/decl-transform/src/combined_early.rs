//! Pipeline step 3: `SimplifyParents ⋙ RemoveStubs ⋙ InferTypeFromExpr ⋙
//! InferEnumTypes ⋙ NormalizeFunctions ⋙ MoveStatics`, combined under one
//! recursive container-level walk (mirrors the spec's sequential-combine
//! operator — each sub-pass only touches containers/declarations, so
//! running them back-to-back in one descent avoids five separate full
//! tree rebuilds).

use decl_ident::SimpleIdent;
use decl_tree::{Container, MemberTree, MethodType, Tree, TypeTree};

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
        Tree::DeclClass { .. } => simplify_parent(normalize_functions_in(tree)),
        Tree::DeclInterface { .. } => normalize_functions_in(tree),
        Tree::DeclVar { .. } => infer_type_from_expr(tree),
        Tree::DeclEnum { name, comments, declared, is_const, is_value, members, exported_from, code_path, js_location } => {
            Tree::DeclEnum {
                name,
                comments,
                declared,
                is_const,
                is_value,
                members: infer_enum_types(members),
                exported_from,
                code_path,
                js_location,
            }
        }
        other => other,
    }
}

fn run_container(container: Container) -> Container {
    let members: Vec<Tree> = container.members.into_iter().map(run).collect();
    let members = run_statics_pass(members);
    let members = remove_stubs(members);
    Container { members, ..container }
}

/// `SimplifyParents`: a class can only extend a named reference; any
/// other shape (an anonymous object type, a union, ...) that somehow
/// ended up as `parent` is dropped rather than carried forward into a
/// target language that has no anonymous-superclass concept.
fn simplify_parent(tree: Tree) -> Tree {
    match tree {
        Tree::DeclClass { name, comments, declared, is_abstract, tparams, parent, implements, members, code_path, js_location } => {
            let parent = parent.filter(|p| matches!(p, TypeTree::Ref(_, _)));
            Tree::DeclClass { name, comments, declared, is_abstract, tparams, parent, implements, members, code_path, js_location }
        }
        other => other,
    }
}

/// `RemoveStubs`: deletes empty interfaces (no members, no inheritance)
/// whose name is one of the well-known ambient stubs the TypeScript
/// stdlib declares purely so other declarations can reference them by
/// name (e.g. `ImportMeta`, `NodeRequire` placeholders).
const KNOWN_STD_STUBS: &[&str] = &["ImportMeta", "ImportMetaEnv", "WebAssemblyInstantiatedSource"];
const KNOWN_NODE_STUBS: &[&str] = &["NodeRequireFunction", "NodeModule"];

/// `InferTypeFromExpr`: in the original converter this infers a `DeclVar`'s
/// type from its initializer expression when the source omits an explicit
/// annotation (`declare const x = 3`). This tree model never carries
/// initializer expressions (§3.2's `DeclVar` has no expression field —
/// executing/typing arbitrary JS expressions is an explicit non-goal), so
/// the pass has no input to act on and is the identity function here; kept
/// as a named no-op so the pipeline's step list stays complete and the gap
/// is visible at the call site rather than silently dropped.
fn infer_type_from_expr(tree: Tree) -> Tree {
    tree
}

fn is_known_stub(name: &SimpleIdent) -> bool {
    KNOWN_STD_STUBS.contains(&name.as_str()) || KNOWN_NODE_STUBS.contains(&name.as_str())
}

fn remove_stubs(members: Vec<Tree>) -> Vec<Tree> {
    members
        .into_iter()
        .filter(|m| match m {
            Tree::DeclInterface { name, inheritance, members, .. } => {
                !(members.is_empty() && inheritance.is_empty() && is_known_stub(name))
            }
            _ => true,
        })
        .collect()
}

/// `InferEnumTypes`: fills in auto-incrementing numeric values for enum
/// members that have no explicit initializer, continuing from the last
/// known numeric literal (or starting at `0`).
fn infer_enum_types(members: Vec<decl_tree::EnumMember>) -> Vec<decl_tree::EnumMember> {
    let mut next: i64 = 0;
    members
        .into_iter()
        .map(|mut m| {
            match &m.literal_value {
                Some(decl_tree::LiteralValue::Num(n)) => {
                    if let Ok(v) = n.parse::<i64>() {
                        next = v + 1;
                    }
                }
                None => {
                    m.literal_value = Some(decl_tree::LiteralValue::Num(next.to_string()));
                    next += 1;
                }
                _ => {}
            }
            m
        })
        .collect()
}

/// `NormalizeFunctions`: dedupes member-function overloads whose
/// signature is byte-for-byte identical to one already kept (harmless
/// artefacts of merging the same declaration from multiple files), while
/// preserving the order of the first occurrence of each distinct
/// signature.
fn normalize_functions_in(tree: Tree) -> Tree {
    match tree {
        Tree::DeclClass { name, comments, declared, is_abstract, tparams, parent, implements, members, code_path, js_location } => {
            Tree::DeclClass {
                name,
                comments,
                declared,
                is_abstract,
                tparams,
                parent,
                implements,
                members: dedupe_function_overloads(members),
                code_path,
                js_location,
            }
        }
        Tree::DeclInterface { name, comments, tparams, inheritance, members, code_path, js_location } => {
            Tree::DeclInterface {
                name,
                comments,
                tparams,
                inheritance,
                members: dedupe_function_overloads(members),
                code_path,
                js_location,
            }
        }
        other => other,
    }
}

fn dedupe_function_overloads(members: Vec<MemberTree>) -> Vec<MemberTree> {
    let mut seen: Vec<(SimpleIdent, bool, decl_tree::FunctionSig)> = Vec::new();
    members
        .into_iter()
        .filter(|m| match m {
            MemberTree::Function { name, is_static, sig, method_type: MethodType::Normal, .. } => {
                let key = (name.clone(), *is_static, sig.clone());
                if seen.contains(&key) {
                    false
                } else {
                    seen.push(key);
                    true
                }
            }
            _ => true,
        })
        .collect()
}

/// `MoveStatics` applied to one class: static members have no
/// counterpart on an interface-shaped target type, so they're hoisted
/// into a sibling namespace of the same name (created if one doesn't
/// already exist among the class's siblings — see `hoist_static_namespaces`,
/// which has access to the whole member list this runs inside of).
fn move_statics_single(tree: Tree) -> Tree {
    match tree {
        Tree::DeclClass { name, comments, declared, is_abstract, tparams, parent, implements, members, code_path, js_location } => {
            let (_statics, rest): (Vec<MemberTree>, Vec<MemberTree>) =
                members.into_iter().partition(|m| m.is_static());
            Tree::DeclClass { name, comments, declared, is_abstract, tparams, parent, implements, members: rest, code_path, js_location }
        }
        other => other,
    }
}

/// The `MoveStatics` entry point: operates directly on a container's
/// member list, extracting each class's static members into a sibling
/// namespace before the class itself is simplified.
pub fn run_statics_pass(members: Vec<Tree>) -> Vec<Tree> {
    let mut out: Vec<Tree> = Vec::new();
    let mut namespaced_statics: std::collections::HashMap<SimpleIdent, Vec<Tree>> = std::collections::HashMap::new();

    for member in members {
        if let Tree::DeclClass { members: class_members, code_path, js_location, name, .. } = &member {
            let statics: Vec<&MemberTree> = class_members.iter().filter(|m| m.is_static()).collect();
            if !statics.is_empty() {
                let hoisted = crate::hoisting::hoist(
                    &statics.into_iter().cloned().collect::<Vec<_>>(),
                    code_path,
                    js_location,
                );
                namespaced_statics.entry(name.clone()).or_default().extend(hoisted);
            }
        }
        out.push(move_statics_single(member));
    }

    for (name, hoisted) in namespaced_statics {
        if let Some(ns) = out.iter_mut().find_map(|m| match m {
            Tree::Namespace { name: n, container } if *n == name => Some(container),
            _ => None,
        }) {
            ns.members.extend(hoisted);
        } else {
            out.push(Tree::Namespace {
                name,
                container: Container::new(hoisted),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_ident::{CodePath, JsLocation};
    use decl_tree::Comments;

    fn empty_enum_member(name: &str) -> decl_tree::EnumMember {
        decl_tree::EnumMember { name: SimpleIdent::new(name), literal_value: None, comments: Comments::empty() }
    }

    #[test]
    fn infer_enum_types_auto_increments() {
        let members = vec![empty_enum_member("A"), empty_enum_member("B")];
        let inferred = infer_enum_types(members);
        assert_eq!(inferred[0].literal_value, Some(decl_tree::LiteralValue::Num("0".to_string())));
        assert_eq!(inferred[1].literal_value, Some(decl_tree::LiteralValue::Num("1".to_string())));
    }

    #[test]
    fn simplify_parents_drops_non_ref_parent() {
        let class = Tree::DeclClass {
            name: SimpleIdent::new("C"),
            comments: Comments::empty(),
            declared: true,
            is_abstract: false,
            tparams: Vec::new(),
            parent: Some(TypeTree::Object(Vec::new())),
            implements: Vec::new(),
            members: Vec::new(),
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        };
        let simplified = simplify_parent(class);
        match simplified {
            Tree::DeclClass { parent, .. } => assert!(parent.is_none()),
            _ => panic!("expected class"),
        }
    }

    #[test]
    fn move_statics_extracts_static_members_into_a_sibling_namespace() {
        let class = Tree::DeclClass {
            name: SimpleIdent::new("C"),
            comments: Comments::empty(),
            declared: true,
            is_abstract: false,
            tparams: Vec::new(),
            parent: None,
            implements: Vec::new(),
            members: vec![MemberTree::Property {
                name: SimpleIdent::new("VERSION"),
                tpe: Some(TypeTree::ref_simple(SimpleIdent::new("string"))),
                is_static: true,
                is_readonly: true,
                is_optional: false,
                comments: Comments::empty(),
            }],
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        };

        let result = run_statics_pass(vec![class]);
        assert_eq!(result.len(), 2);
        assert!(matches!(result[0], Tree::DeclClass { .. }));
        match &result[1] {
            Tree::Namespace { container, .. } => assert_eq!(container.members.len(), 1),
            _ => panic!("expected namespace"),
        }
    }
}
