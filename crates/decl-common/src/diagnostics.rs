//! Non-fatal diagnostics: logged, never bubbled.
//!
//! Mirrors the shape of `tsz_common::diagnostics` (category + code +
//! message) but keyed to this pipeline's own taxonomy rather than
//! TypeScript's compiler diagnostics.

use std::fmt;
use tracing::{debug, warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticCategory {
    Warning,
    Info,
}

/// A non-fatal problem encountered while processing a library. Unlike
/// `PhaseError` (see `errors.rs`), nothing here aborts the library: each
/// variant corresponds to a place in the spec where "logged" is the
/// prescribed behavior.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// A module referenced by import/export could not be resolved, at a
    /// non-pedantic site.
    ResolveWarning { module: String },
    /// `LoopDetector::including` signalled a cycle; the triggering
    /// transformation backed off and returned its input unchanged.
    CycleDetected { site: String },
    /// `ExpandTypeMappings` could not evaluate a mapped type's keys.
    TypeMappingProblem { site: String, problem: String },
    /// A transformation that wants to infer something (return types, enum
    /// member types, ...) could not, and left its input unchanged.
    InferenceMiss { site: String, what: String },
    /// A glob pattern used during filesystem scanning produced no matches
    /// or itself failed to evaluate; the pattern is skipped.
    GlobExpansionFailed { pattern: String, reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ResolveWarning { module } => {
                write!(f, "could not resolve module \"{module}\"")
            }
            Diagnostic::CycleDetected { site } => write!(f, "cycle detected at {site}"),
            Diagnostic::TypeMappingProblem { site, problem } => {
                write!(f, "type mapping problem at {site}: {problem}")
            }
            Diagnostic::InferenceMiss { site, what } => {
                write!(f, "could not infer {what} at {site}")
            }
            Diagnostic::GlobExpansionFailed { pattern, reason } => {
                write!(f, "glob pattern \"{pattern}\" skipped: {reason}")
            }
        }
    }
}

impl Diagnostic {
    pub fn category(&self) -> DiagnosticCategory {
        match self {
            Diagnostic::ResolveWarning { .. } => DiagnosticCategory::Warning,
            Diagnostic::GlobExpansionFailed { .. } => DiagnosticCategory::Warning,
            Diagnostic::CycleDetected { .. }
            | Diagnostic::TypeMappingProblem { .. }
            | Diagnostic::InferenceMiss { .. } => DiagnosticCategory::Info,
        }
    }
}

/// A sink for non-fatal diagnostics. The default `TracingLogger` forwards to
/// `tracing`; an in-memory `CollectingLogger` is available for tests that
/// want to assert on what was logged without installing a subscriber.
pub trait Logger: Send + Sync {
    fn log(&self, diagnostic: Diagnostic);
}

#[derive(Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, diagnostic: Diagnostic) {
        match diagnostic.category() {
            DiagnosticCategory::Warning => warn!(%diagnostic, "pipeline diagnostic"),
            DiagnosticCategory::Info => debug!(%diagnostic, "pipeline diagnostic"),
        }
    }
}

#[derive(Default)]
pub struct CollectingLogger {
    pub entries: std::sync::Mutex<Vec<Diagnostic>>,
}

impl Logger for CollectingLogger {
    fn log(&self, diagnostic: Diagnostic) {
        self.entries.lock().unwrap().push(diagnostic);
    }
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Info => write!(f, "info"),
        }
    }
}
