//! Common types and utilities shared across the declaration-tree conversion
//! pipeline: ordered-sequence containers, MD5 content digests, the
//! non-fatal diagnostic/logger pair, the `PhaseRes` fatal-error envelope,
//! and the minimal filesystem contract (§6.2).

pub mod containers;
pub mod digest;
pub mod diagnostics;
pub mod errors;
pub mod fs;

pub use containers::{PartialFn, Seq};
pub use diagnostics::{Diagnostic, DiagnosticCategory, Logger, TracingLogger};
pub use errors::{FailureCause, PhaseError, PhaseRes};
pub use fs::{Fs, MemFs, RealFs, WriteOutcome};
