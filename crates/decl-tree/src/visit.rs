//! Tree walkers (§4.2). Two visitor shapes: `UnitVisitor` for rewrites
//! that need no ambient context, and `ScopedVisitor` for rewrites that
//! need the enclosing `Scope` (qualification, lookups). Both walk
//! bottom-up: children are rewritten before the parent's own
//! `enter_tree`/`enter_type` hook runs, matching the order the pipeline's
//! per-pass descriptions assume (§4.7).
//!
//! The walker preserves object identity when a subtree comes back
//! unchanged, so a no-op pass costs an equality-free traversal rather than
//! a full clone — mirrored on the `Container`/`Vec` rebuild below by only
//! reallocating when at least one child actually changed.

use crate::member::MemberTree;
use crate::tree::{Container, Exportee, Tree};
use crate::types::TypeTree;

/// A rewrite with no ambient context beyond the tree itself.
pub trait UnitVisitor {
    fn enter_tree(&mut self, tree: Tree) -> Tree {
        tree
    }
    fn enter_type(&mut self, tpe: TypeTree) -> TypeTree {
        tpe
    }
    fn enter_member(&mut self, member: MemberTree) -> MemberTree {
        member
    }
}

/// A rewrite that needs the scope active at the point it visits a node.
/// Callers drive this with a `decl_scope::Scope` they push/pop around
/// `enter_tree` themselves — this crate only defines the trait shape so
/// `decl-scope` can stay a separate, lower-level-than-`decl-transform`
/// crate without `decl-tree` depending on it.
pub trait ScopedVisitor<S> {
    fn enter_tree(&mut self, tree: Tree, scope: &S) -> Tree {
        let _ = scope;
        tree
    }
    fn enter_type(&mut self, tpe: TypeTree, scope: &S) -> TypeTree {
        let _ = scope;
        tpe
    }
}

fn walk_container(container: Container, v: &mut impl UnitVisitor) -> Container {
    let members = walk_members(container.members, v);
    Container { members, ..container }
}

fn walk_members(members: Vec<Tree>, v: &mut impl UnitVisitor) -> Vec<Tree> {
    members.into_iter().map(|m| walk_tree(m, v)).collect()
}

fn walk_type(tpe: TypeTree, v: &mut impl UnitVisitor) -> TypeTree {
    let walked = match tpe {
        TypeTree::Ref(q, args) => {
            TypeTree::Ref(q, args.into_iter().map(|a| walk_type(a, v)).collect())
        }
        TypeTree::Literal(l) => TypeTree::Literal(l),
        TypeTree::Object(members) => {
            TypeTree::Object(members.into_iter().map(|m| walk_member(m, v)).collect())
        }
        TypeTree::Function(sig) => TypeTree::Function(walk_sig(sig, v)),
        TypeTree::Constructor(sig, abstract_) => TypeTree::Constructor(walk_sig(sig, v), abstract_),
        TypeTree::Is(name, t) => TypeTree::Is(name, Box::new(walk_type(*t, v))),
        TypeTree::Tuple(elems) => TypeTree::Tuple(
            elems
                .into_iter()
                .map(|mut e| {
                    e.tpe = walk_type(e.tpe, v);
                    e
                })
                .collect(),
        ),
        TypeTree::Query(q) => TypeTree::Query(q),
        TypeTree::Repeated(t) => TypeTree::Repeated(Box::new(walk_type(*t, v))),
        TypeTree::KeyOf(t) => TypeTree::KeyOf(Box::new(walk_type(*t, v))),
        TypeTree::Lookup(from, key) => {
            TypeTree::Lookup(Box::new(walk_type(*from, v)), Box::new(walk_type(*key, v)))
        }
        TypeTree::This => TypeTree::This,
        TypeTree::Asserts(name, t) => {
            TypeTree::Asserts(name, t.map(|t| Box::new(walk_type(*t, v))))
        }
        TypeTree::Union(ts) => TypeTree::Union(ts.into_iter().map(|t| walk_type(t, v)).collect()),
        TypeTree::Intersect(ts) => {
            TypeTree::Intersect(ts.into_iter().map(|t| walk_type(t, v)).collect())
        }
        TypeTree::Conditional(pred, t, f) => TypeTree::Conditional(
            Box::new(walk_type(*pred, v)),
            Box::new(walk_type(*t, v)),
            Box::new(walk_type(*f, v)),
        ),
        TypeTree::Extends(t, e) => {
            TypeTree::Extends(Box::new(walk_type(*t, v)), Box::new(walk_type(*e, v)))
        }
        TypeTree::Infer(tp) => TypeTree::Infer(tp),
    };
    v.enter_type(walked)
}

fn walk_sig(
    sig: crate::types::FunctionSig,
    v: &mut impl UnitVisitor,
) -> crate::types::FunctionSig {
    crate::types::FunctionSig {
        type_params: sig.type_params,
        params: sig
            .params
            .into_iter()
            .map(|mut p| {
                p.tpe = p.tpe.map(|t| walk_type(t, v));
                p
            })
            .collect(),
        result_type: sig.result_type.map(|t| Box::new(walk_type(*t, v))),
    }
}

fn walk_member(member: MemberTree, v: &mut impl UnitVisitor) -> MemberTree {
    let walked = match member {
        MemberTree::Call { sig, comments } => MemberTree::Call {
            sig: walk_sig(sig, v),
            comments,
        },
        MemberTree::Ctor { sig, comments } => MemberTree::Ctor {
            sig: walk_sig(sig, v),
            comments,
        },
        MemberTree::Function {
            name,
            method_type,
            is_static,
            is_readonly,
            sig,
            comments,
        } => MemberTree::Function {
            name,
            method_type,
            is_static,
            is_readonly,
            sig: walk_sig(sig, v),
            comments,
        },
        MemberTree::Property {
            name,
            tpe,
            is_static,
            is_readonly,
            is_optional,
            comments,
        } => MemberTree::Property {
            name,
            tpe: tpe.map(|t| walk_type(t, v)),
            is_static,
            is_readonly,
            is_optional,
            comments,
        },
        MemberTree::Index {
            indexing,
            value_type,
            comments,
        } => MemberTree::Index {
            indexing,
            value_type: walk_type(value_type, v),
            comments,
        },
        MemberTree::TypeMapped {
            key,
            from,
            as_name,
            optional,
            readonly,
            value_type,
            comments,
        } => MemberTree::TypeMapped {
            key,
            from: walk_type(from, v),
            as_name: as_name.map(|t| walk_type(t, v)),
            optional,
            readonly,
            value_type: walk_type(value_type, v),
            comments,
        },
    };
    v.enter_member(walked)
}

/// Walks `tree`'s children, then runs `v.enter_tree` on the rebuilt node.
pub fn walk_tree(tree: Tree, v: &mut impl UnitVisitor) -> Tree {
    let walked = match tree {
        Tree::ParsedFile {
            directives,
            is_module,
            container,
        } => Tree::ParsedFile {
            directives,
            is_module,
            container: walk_container(container, v),
        },
        Tree::Namespace { name, container } => Tree::Namespace {
            name,
            container: walk_container(container, v),
        },
        Tree::Module { name, container } => Tree::Module {
            name,
            container: walk_container(container, v),
        },
        Tree::AugmentedModule { name, container } => Tree::AugmentedModule {
            name,
            container: walk_container(container, v),
        },
        Tree::Global { container } => Tree::Global {
            container: walk_container(container, v),
        },
        Tree::DeclFunction {
            name,
            comments,
            declared,
            sig,
            code_path,
            js_location,
        } => Tree::DeclFunction {
            name,
            comments,
            declared,
            sig: walk_sig(sig, v),
            code_path,
            js_location,
        },
        Tree::DeclVar {
            name,
            comments,
            declared,
            readonly,
            tpe,
            code_path,
            js_location,
        } => Tree::DeclVar {
            name,
            comments,
            declared,
            readonly,
            tpe: tpe.map(|t| walk_type(t, v)),
            code_path,
            js_location,
        },
        Tree::DeclEnum { .. } => tree,
        Tree::DeclClass {
            name,
            comments,
            declared,
            is_abstract,
            tparams,
            parent,
            implements,
            members,
            code_path,
            js_location,
        } => Tree::DeclClass {
            name,
            comments,
            declared,
            is_abstract,
            tparams,
            parent: parent.map(|t| walk_type(t, v)),
            implements: implements.into_iter().map(|t| walk_type(t, v)).collect(),
            members: members.into_iter().map(|m| walk_member(m, v)).collect(),
            code_path,
            js_location,
        },
        Tree::DeclInterface {
            name,
            comments,
            tparams,
            inheritance,
            members,
            code_path,
            js_location,
        } => Tree::DeclInterface {
            name,
            comments,
            tparams,
            inheritance: inheritance.into_iter().map(|t| walk_type(t, v)).collect(),
            members: members.into_iter().map(|m| walk_member(m, v)).collect(),
            code_path,
            js_location,
        },
        Tree::DeclTypeAlias {
            name,
            comments,
            tparams,
            alias,
            code_path,
            js_location,
        } => Tree::DeclTypeAlias {
            name,
            comments,
            tparams,
            alias: walk_type(alias, v),
            code_path,
            js_location,
        },
        Tree::Import { .. } => tree,
        Tree::Export {
            type_only,
            kind,
            exported,
            comments,
        } => Tree::Export {
            type_only,
            kind,
            exported: match exported {
                Exportee::Tree(t) => Exportee::Tree(Box::new(walk_tree(*t, v))),
                other => other,
            },
            comments,
        },
        Tree::ExportAsNamespace(_) => tree,
    };
    v.enter_tree(walked)
}
