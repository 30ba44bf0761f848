//! Fatal error propagation: `PhaseRes`, the three-case result the phase
//! driver returns per library, and the small `thiserror` enum of concrete
//! fatal causes.

use thiserror::Error;

/// Why a library's processing failed outright, recorded per-source in
/// `PhaseRes::Failure`.
#[derive(Clone, Debug, Error)]
pub enum FailureCause {
    /// A downstream (dependency) failure; `stack` names the chain of
    /// library sources that led here, innermost first.
    #[error("failed via dependency chain: {0:?}")]
    Stack(Vec<String>),
    /// A direct failure at this library: a fatal parse error, a pedantic
    /// resolve error promoted to fatal, etc.
    #[error("{0}")]
    Msg(String),
}

/// The three-case result of processing one library, per §4.4/§7.
#[derive(Clone, Debug)]
pub enum PhaseRes<Source, T> {
    Ok(T),
    /// The source was configured as ignored, or is part of a detected
    /// circular-dependency group.
    Ignore,
    /// One or more sources (this one, or a transitive dependency) failed
    /// fatally.
    Failure(Vec<(Source, FailureCause)>),
}

impl<Source, T> PhaseRes<Source, T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, PhaseRes::Ok(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> PhaseRes<Source, U> {
        match self {
            PhaseRes::Ok(v) => PhaseRes::Ok(f(v)),
            PhaseRes::Ignore => PhaseRes::Ignore,
            PhaseRes::Failure(fs) => PhaseRes::Failure(fs),
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> PhaseRes<Source, U>) -> PhaseRes<Source, U> {
        match self {
            PhaseRes::Ok(v) => f(v),
            PhaseRes::Ignore => PhaseRes::Ignore,
            PhaseRes::Failure(fs) => PhaseRes::Failure(fs),
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            PhaseRes::Ok(v) => Some(v),
            _ => None,
        }
    }
}

/// Fatal errors that can escape a single file's preparation or a library's
/// dependency resolution.
#[derive(Clone, Debug, Error)]
pub enum PhaseError {
    #[error("parse error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("missing module \"{module}\" at a pedantic site")]
    PedanticMissingModule { module: String },

    #[error(
        "Missing typescript definitions for the following libraries: {0}. \
         Try to add a corresponding `@types` npm package, or use `stIgnore` to ignore"
    )]
    Unresolved(String),
}

impl PhaseError {
    pub fn unresolved(names: &[String]) -> Self {
        PhaseError::Unresolved(names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_message_matches_spec_text() {
        let err = PhaseError::unresolved(&["left-pad".to_string(), "is-odd".to_string()]);
        assert_eq!(
            err.to_string(),
            "Missing typescript definitions for the following libraries: left-pad, is-odd. \
             Try to add a corresponding `@types` npm package, or use `stIgnore` to ignore"
        );
    }

    #[test]
    fn phase_res_and_then_short_circuits_on_ignore() {
        let res: PhaseRes<String, i32> = PhaseRes::Ignore;
        let chained = res.and_then(|v| PhaseRes::Ok(v + 1));
        assert!(matches!(chained, PhaseRes::Ignore));
    }
}
