//! `DeriveNonConflictingName` (§4.9): picks a name for an anonymous
//! object/function type being materialized into a standalone interface or
//! class, by enumerating candidate names built from its members until the
//! caller-supplied `tryCreate` predicate accepts one.

use decl_ident::SimpleIdent;
use decl_tree::{FunctionSig, Indexing, MemberTree, MethodType, TypeTree};

/// Short/long "detail" fragments contributed by one member, per §4.9's
/// per-kind rules.
fn member_detail(member: &MemberTree) -> (String, String) {
    match member {
        MemberTree::Call { sig, .. } => {
            let short = "Call".to_string();
            let long = format!("Call{}", param_name_fragment(sig));
            (short, long)
        }
        MemberTree::Ctor { sig, .. } => {
            let short = "Instantiable".to_string();
            let long = format!("Instantiable{}", result_fragment(sig));
            (short, long)
        }
        MemberTree::Function { name, .. } => {
            let short = pretty_name(name.as_str());
            (short.clone(), short)
        }
        MemberTree::Property { name, tpe, .. } => {
            let short = pretty_name(name.as_str());
            let long = format!("{short}{}", tpe.as_ref().map(pretty_type).unwrap_or_default());
            (short, long)
        }
        MemberTree::Index { indexing, value_type, .. } => match indexing {
            Indexing::Dict { name, .. } => {
                let short = format!("Dict{}", pretty_name(name.as_str()));
                let long = format!("{short}{}", pretty_type(value_type));
                (short, long)
            }
            Indexing::Single(q) => {
                let short = format!("Dict{}", q.to_string().replace('.', ""));
                (short.clone(), short)
            }
        },
        MemberTree::TypeMapped { key, .. } => {
            let short = format!("Mapped{}", pretty_name(key.as_str()));
            (short.clone(), short)
        }
    }
}

fn pretty_name(s: &str) -> String {
    let mut out = String::new();
    let mut cap_next = true;
    for c in s.chars() {
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
        "Anon".to_string()
    } else {
        out
    }
}

fn pretty_type(t: &TypeTree) -> String {
    match t {
        TypeTree::Ref(q, _) => pretty_name(&q.to_string()),
        TypeTree::Literal(_) => "Literal".to_string(),
        TypeTree::Object(_) => "Object".to_string(),
        TypeTree::Function(_) => "Fn".to_string(),
        _ => "Type".to_string(),
    }
}

fn param_name_fragment(sig: &FunctionSig) -> String {
    sig.params
        .iter()
        .map(|p| pretty_name(p.name.as_str()))
        .collect::<Vec<_>>()
        .join("")
}

fn result_fragment(sig: &FunctionSig) -> String {
    sig.result_type
        .as_ref()
        .map(|t| pretty_type(t))
        .unwrap_or_default()
}

/// Whichever overload has the most parameters, used as the "longest
/// overload" source of parameter-name fragments for call signatures.
fn longest_call_sig(members: &[MemberTree]) -> Option<&FunctionSig> {
    members
        .iter()
        .filter_map(|m| match m {
            MemberTree::Call { sig, .. } => Some(sig),
            _ => None,
        })
        .max_by_key(|sig| sig.params.len())
}

/// Enumerates `prefix + <candidate>` names, short-mode fragments first
/// (one member's short detail at a time, then increasing combinations),
/// then long-mode, then a numeric fallback, until `try_create` accepts
/// one.
pub fn derive_non_conflicting_name(
    prefix: &str,
    members: &[MemberTree],
    mut try_create: impl FnMut(&str) -> bool,
) -> String {
    let longest_call = longest_call_sig(members);
    let details: Vec<(String, String)> = members
        .iter()
        .map(|m| {
            if let MemberTree::Call { comments, .. } = m {
                if let Some(longest) = longest_call {
                    let synthetic = MemberTree::Call {
                        sig: longest.clone(),
                        comments: comments.clone(),
                    };
                    return member_detail(&synthetic);
                }
            }
            member_detail(m)
        })
        .collect();

    // Short-mode: prefix + increasing-length concatenations of short
    // fragments.
    for take in 0..=details.len() {
        let candidate = if take == 0 {
            prefix.to_string()
        } else {
            let joined: String = details[..take].iter().map(|(s, _)| s.as_str()).collect();
            format!("{prefix}{joined}")
        };
        if try_create(&candidate) {
            return candidate;
        }
    }

    // Long-mode: same, but with the long fragments.
    for take in 1..=details.len() {
        let joined: String = details[..take].iter().map(|(_, l)| l.as_str()).collect();
        let candidate = format!("{prefix}{joined}");
        if try_create(&candidate) {
            return candidate;
        }
    }

    // Final fallback: numeric suffixes.
    let mut i = 0u32;
    loop {
        let candidate = format!("{prefix}{i}");
        if try_create(&candidate) {
            return candidate;
        }
        i += 1;
    }
}

pub fn ident_for(prefix: &str, members: &[MemberTree], try_create: impl FnMut(&str) -> bool) -> SimpleIdent {
    SimpleIdent::new(derive_non_conflicting_name(prefix, members, try_create))
}

#[allow(dead_code)]
fn method_detail_kind(mt: MethodType) -> &'static str {
    match mt {
        MethodType::Normal => "method",
        MethodType::Getter => "getter",
        MethodType::Setter => "setter",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_tree::Comments;

    fn prop(name: &str) -> MemberTree {
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
    fn first_candidate_is_accepted_immediately_when_unique() {
        let members = vec![prop("foo")];
        let mut seen = Vec::new();
        let name = derive_non_conflicting_name("anon", &members, |c| {
            seen.push(c.to_string());
            true
        });
        assert_eq!(name, "anon");
        assert_eq!(seen, vec!["anon".to_string()]);
    }

    #[test]
    fn falls_through_to_long_mode_then_numeric_when_short_names_collide() {
        let members = vec![prop("foo")];
        let mut calls = 0;
        let name = derive_non_conflicting_name("anon", &members, |c| {
            calls += 1;
            c == "anon2"
        });
        assert_eq!(name, "anon2");
        assert!(calls > 1);
    }
}
