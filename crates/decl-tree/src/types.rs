//! Type-level nodes (§3.2 Types) plus the function-signature and
//! type-parameter shapes shared by functions, methods, constructors, and
//! call/construct signatures.

use decl_ident::{QIdent, SimpleIdent};

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum LiteralValue {
    Str(String),
    Num(String),
    Bool(bool),
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TypeParam {
    pub name: SimpleIdent,
    pub upper_bound: Option<Box<TypeTree>>,
    pub default: Option<Box<TypeTree>>,
}

impl TypeParam {
    pub fn new(name: SimpleIdent) -> Self {
        TypeParam {
            name,
            upper_bound: None,
            default: None,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FunctionParam {
    pub name: SimpleIdent,
    pub tpe: Option<TypeTree>,
    pub is_optional: bool,
    /// Stringified default-value expression, if any. This phase never
    /// evaluates expressions, only carries them through.
    pub default_value: Option<String>,
}

impl FunctionParam {
    pub fn new(name: SimpleIdent, tpe: Option<TypeTree>) -> Self {
        FunctionParam {
            name,
            tpe,
            is_optional: false,
            default_value: None,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FunctionSig {
    pub type_params: Vec<TypeParam>,
    pub params: Vec<FunctionParam>,
    pub result_type: Option<Box<TypeTree>>,
}

impl FunctionSig {
    pub fn new(params: Vec<FunctionParam>, result_type: Option<TypeTree>) -> Self {
        FunctionSig {
            type_params: Vec::new(),
            params,
            result_type: result_type.map(Box::new),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TupleElem {
    pub label: Option<SimpleIdent>,
    pub tpe: TypeTree,
    pub optional: bool,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum TypeTree {
    Ref(QIdent, Vec<TypeTree>),
    Literal(LiteralValue),
    Object(Vec<crate::member::MemberTree>),
    Function(FunctionSig),
    Constructor(FunctionSig, bool),
    /// `x is T` type guards.
    Is(SimpleIdent, Box<TypeTree>),
    Tuple(Vec<TupleElem>),
    Query(QIdent),
    /// `...T` rest element type.
    Repeated(Box<TypeTree>),
    KeyOf(Box<TypeTree>),
    Lookup(Box<TypeTree>, Box<TypeTree>),
    This,
    /// `asserts x` / `asserts x is T`.
    Asserts(SimpleIdent, Option<Box<TypeTree>>),
    Union(Vec<TypeTree>),
    Intersect(Vec<TypeTree>),
    Conditional(Box<TypeTree>, Box<TypeTree>, Box<TypeTree>),
    Extends(Box<TypeTree>, Box<TypeTree>),
    Infer(TypeParam),
}

impl TypeTree {
    pub fn ref_simple(name: SimpleIdent) -> TypeTree {
        TypeTree::Ref(QIdent::single(name), Vec::new())
    }

    pub fn is_never(&self) -> bool {
        matches!(self, TypeTree::Ref(q, args) if args.is_empty() && q.len() == 1
            && q.head().map(SimpleIdent::as_str) == Some("never"))
    }

    pub fn is_any(&self) -> bool {
        matches!(self, TypeTree::Ref(q, args) if args.is_empty() && q.len() == 1
            && q.head().map(SimpleIdent::as_str) == Some("any"))
    }

    pub fn any() -> TypeTree {
        TypeTree::ref_simple(SimpleIdent::new("any"))
    }

    /// Walks aliasing-transparent wrappers away is not possible without a
    /// scope (alias bodies live in other declarations); callers that need
    /// "follow aliases" behavior go through `decl_scope::follow_alias`.
    pub fn children(&self) -> Vec<&TypeTree> {
        match self {
            TypeTree::Ref(_, args) => args.iter().collect(),
            TypeTree::Literal(_) | TypeTree::Query(_) | TypeTree::This => Vec::new(),
            TypeTree::Object(_) => Vec::new(),
            TypeTree::Function(sig) | TypeTree::Constructor(sig, _) => {
                sig.result_type.iter().map(|b| b.as_ref()).collect()
            }
            TypeTree::Is(_, t) => vec![t.as_ref()],
            TypeTree::Tuple(elems) => elems.iter().map(|e| &e.tpe).collect(),
            TypeTree::Repeated(t) | TypeTree::KeyOf(t) => vec![t.as_ref()],
            TypeTree::Lookup(from, key) => vec![from.as_ref(), key.as_ref()],
            TypeTree::Asserts(_, t) => t.iter().map(|b| b.as_ref()).collect(),
            TypeTree::Union(ts) | TypeTree::Intersect(ts) => ts.iter().collect(),
            TypeTree::Conditional(pred, t, f) => vec![pred.as_ref(), t.as_ref(), f.as_ref()],
            TypeTree::Extends(t, e) => vec![t.as_ref(), e.as_ref()],
            TypeTree::Infer(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_never_detects_the_never_ref() {
        assert!(TypeTree::ref_simple(SimpleIdent::new("never")).is_never());
        assert!(!TypeTree::ref_simple(SimpleIdent::new("string")).is_never());
    }
}
