//! Owned, sum-typed AST for normalized TypeScript declaration trees
//! (§3.2). A `Tree` is a plain Rust enum holding `Vec`-owned children —
//! no arena, no shared mutable state — so a rewrite pass is just "build a
//! new tree from the old one," matching the functional pass pipeline in
//! `decl-transform`.

pub mod comments;
pub mod directive;
pub mod member;
pub mod merge;
pub mod parser;
pub mod tree;
pub mod types;
pub mod visit;

pub use comments::{Comment, CommentMarker, Comments};
pub use directive::Directive;
pub use member::{Indexing, MappedModifier, MemberTree, MethodType};
pub use merge::{apply_single, flatten};
pub use parser::{empty_parsed_file, parsed_file, DeclParser};
pub use tree::{Container, EnumMember, ExportKind, Exportee, Imported, Importee, Tree};
pub use types::{FunctionParam, FunctionSig, LiteralValue, TupleElem, TypeParam, TypeTree};
pub use visit::{walk_tree, ScopedVisitor, UnitVisitor};
