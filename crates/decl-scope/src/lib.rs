//! Nested, cached, loop-detecting symbol lookup over a library's merged
//! tree and its transitive dependencies (§4.3).

pub mod loop_detector;
pub mod picker;
pub mod scope;

pub use loop_detector::{Cycle, LoopDetector};
pub use picker::{AnyDecl, Modules, Picker, PickerKind, Types, Values};
pub use scope::{follow_alias, Scope};
