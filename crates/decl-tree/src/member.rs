//! Members of object-like types: call/construct signatures, methods,
//! properties, indexers, and mapped-type members (§3.2).

use crate::comments::Comments;
use crate::types::{FunctionSig, TypeTree};
use decl_ident::{QIdent, SimpleIdent};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum MethodType {
    Normal,
    Getter,
    Setter,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Indexing {
    Dict { name: SimpleIdent, key_type: TypeTree },
    Single(QIdent),
}

/// A mapped-type modifier (`+`/`-`/absent) applied to `readonly`/`?`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum MappedModifier {
    #[default]
    Noop,
    Add,
    Remove,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum MemberTree {
    Call {
        sig: FunctionSig,
        comments: Comments,
    },
    Ctor {
        sig: FunctionSig,
        comments: Comments,
    },
    Function {
        name: SimpleIdent,
        method_type: MethodType,
        is_static: bool,
        is_readonly: bool,
        sig: FunctionSig,
        comments: Comments,
    },
    Property {
        name: SimpleIdent,
        tpe: Option<TypeTree>,
        is_static: bool,
        is_readonly: bool,
        is_optional: bool,
        comments: Comments,
    },
    Index {
        indexing: Indexing,
        value_type: TypeTree,
        comments: Comments,
    },
    TypeMapped {
        key: SimpleIdent,
        from: TypeTree,
        as_name: Option<TypeTree>,
        optional: MappedModifier,
        readonly: MappedModifier,
        value_type: TypeTree,
        comments: Comments,
    },
}

impl MemberTree {
    pub fn name(&self) -> Option<&SimpleIdent> {
        match self {
            MemberTree::Function { name, .. } | MemberTree::Property { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_static(&self) -> bool {
        match self {
            MemberTree::Function { is_static, .. } | MemberTree::Property { is_static, .. } => {
                *is_static
            }
            _ => false,
        }
    }

    pub fn comments(&self) -> &Comments {
        match self {
            MemberTree::Call { comments, .. }
            | MemberTree::Ctor { comments, .. }
            | MemberTree::Function { comments, .. }
            | MemberTree::Property { comments, .. }
            | MemberTree::Index { comments, .. }
            | MemberTree::TypeMapped { comments, .. } => comments,
        }
    }

    pub fn with_comments(self, comments: Comments) -> Self {
        match self {
            MemberTree::Call { sig, .. } => MemberTree::Call { sig, comments },
            MemberTree::Ctor { sig, .. } => MemberTree::Ctor { sig, comments },
            MemberTree::Function {
                name,
                method_type,
                is_static,
                is_readonly,
                sig,
                ..
            } => MemberTree::Function {
                name,
                method_type,
                is_static,
                is_readonly,
                sig,
                comments,
            },
            MemberTree::Property {
                name,
                tpe,
                is_static,
                is_readonly,
                is_optional,
                ..
            } => MemberTree::Property {
                name,
                tpe,
                is_static,
                is_readonly,
                is_optional,
                comments,
            },
            MemberTree::Index {
                indexing,
                value_type,
                ..
            } => MemberTree::Index {
                indexing,
                value_type,
                comments,
            },
            MemberTree::TypeMapped {
                key,
                from,
                as_name,
                optional,
                readonly,
                value_type,
                ..
            } => MemberTree::TypeMapped {
                key,
                from,
                as_name,
                optional,
                readonly,
                value_type,
                comments,
            },
        }
    }
}
