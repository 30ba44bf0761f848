//! `ModuleName` and `ModuleNameParser`: normalizing npm/ambient module
//! specifiers, file paths, and library identities into one canonical shape.

use crate::library_name::LibraryName;
use std::fmt;
use std::path::Path;

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ModuleName {
    pub scope: Option<String>,
    pub fragments: Vec<String>,
}

impl ModuleName {
    pub fn new(scope: Option<String>, fragments: Vec<String>) -> Self {
        ModuleName { scope, fragments }
    }

    /// The identity module of a library: the module a bare `import "libName"`
    /// resolves to.
    pub fn identity(lib: &LibraryName) -> ModuleName {
        ModuleName {
            scope: lib.scope.clone(),
            fragments: vec![lib.name.clone()],
        }
    }

    pub fn from_string(s: &str, keep_index: bool) -> Result<ModuleName, String> {
        let fragments: Vec<String> = s.split('/').map(|s| s.to_string()).collect();
        ModuleNameParser::apply(&fragments, keep_index)
    }

    pub fn from_relative_path(path: &Path, keep_index: bool) -> Result<ModuleName, String> {
        let fragments: Vec<String> = path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        ModuleNameParser::apply(&fragments, keep_index)
    }

    pub fn value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rest = self.fragments.join("/");
        match &self.scope {
            Some(scope) => write!(f, "@{scope}/{rest}"),
            None => write!(f, "{rest}"),
        }
    }
}

pub struct ModuleNameParser;

impl ModuleNameParser {
    /// Normalizes a raw fragment list (e.g. a module specifier split on `/`,
    /// or a file path's components) into a canonical `ModuleName`.
    ///
    /// Rules, applied in order: drop a leading `@types` fragment; a leading
    /// `@scope` fragment becomes the module's scope; strip a leading `~`
    /// from every fragment; split a `scope__name` fragment into scope +
    /// name when no scope has been found yet; strip a trailing
    /// `.d.ts`/`.d.mts`/`.d.cts`/`.ts` suffix from the last fragment; when
    /// `keep_index_fragment` is false,
    /// drop a trailing `index` fragment.
    pub fn apply(fragments: &[String], keep_index_fragment: bool) -> Result<ModuleName, String> {
        let mut frags: Vec<String> = fragments.to_vec();

        if frags.first().map(String::as_str) == Some("@types") {
            frags.remove(0);
        }

        let mut scope: Option<String> = None;

        if let Some(first) = frags.first() {
            if let Some(stripped) = first.strip_prefix('@') {
                scope = Some(stripped.to_string());
                frags.remove(0);
            }
        }

        for frag in &mut frags {
            if let Some(stripped) = frag.strip_prefix('~') {
                *frag = stripped.to_string();
            }
        }

        if scope.is_none() {
            if let Some(first) = frags.first().cloned() {
                if let Some(idx) = first.find("__") {
                    let (s, rest) = first.split_at(idx);
                    let name = &rest[2..];
                    if !s.is_empty() && !name.is_empty() {
                        scope = Some(s.to_string());
                        frags[0] = name.to_string();
                    }
                }
            }
        }

        if let Some(last) = frags.last_mut() {
            for suffix in [".d.ts", ".d.mts", ".d.cts", ".ts"] {
                if let Some(stripped) = last.strip_suffix(suffix) {
                    *last = stripped.to_string();
                    break;
                }
            }
        }

        if !keep_index_fragment && frags.last().map(String::as_str) == Some("index") {
            frags.pop();
        }

        if frags.is_empty() {
            return Err("empty fragment list after normalization".to_string());
        }

        Ok(ModuleName {
            scope,
            fragments: frags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_has_no_scope() {
        let fragments = vec![".".to_string(), "relative".to_string(), "path".to_string()];
        let m = ModuleNameParser::apply(&fragments, true).unwrap();
        assert_eq!(m.scope, None);
        assert_eq!(m.fragments, vec![".".to_string(), "relative".to_string(), "path".to_string()]);
    }

    #[test]
    fn babel_scoped_package() {
        let fragments = vec!["@babel".to_string(), "plugin-transform-runtime".to_string()];
        let m = ModuleNameParser::apply(&fragments, true).unwrap();
        assert_eq!(m.scope.as_deref(), Some("babel"));
        assert_eq!(m.fragments, vec!["plugin-transform-runtime"]);
    }

    #[test]
    fn types_babel_core_index_drops_scope_marker_and_index() {
        let fragments = vec![
            "@types".to_string(),
            "babel__core".to_string(),
            "index.d.ts".to_string(),
        ];
        let m = ModuleNameParser::apply(&fragments, false).unwrap();
        assert_eq!(m.value(), "@babel/core");
    }

    #[test]
    fn invariant_11_types_node_keep_index() {
        let fragments = vec!["@types".to_string(), "node".to_string()];
        let m = ModuleNameParser::apply(&fragments, true).unwrap();
        assert_eq!(m.value(), "node");
    }

    #[test]
    fn invariant_12_angular_core_double_underscore() {
        let fragments = vec!["angular__core".to_string()];
        let m = ModuleNameParser::apply(&fragments, true).unwrap();
        assert_eq!(m.value(), "@angular/core");
    }

    #[test]
    fn dot_mts_and_cts_suffixes_are_stripped_like_dot_d_ts() {
        let mts = vec!["foo.d.mts".to_string()];
        assert_eq!(ModuleNameParser::apply(&mts, true).unwrap().value(), "foo");
        let cts = vec!["foo.d.cts".to_string()];
        assert_eq!(ModuleNameParser::apply(&cts, true).unwrap().value(), "foo");
    }

    #[test]
    fn empty_fragment_list_is_an_error() {
        let fragments = vec!["index".to_string()];
        assert!(ModuleNameParser::apply(&fragments, false).is_err());
    }

    #[test]
    fn normalizer_is_idempotent_on_its_own_output() {
        let fragments = vec!["@types".to_string(), "babel__core".to_string()];
        let once = ModuleNameParser::apply(&fragments, true).unwrap();
        let again_fragments: Vec<String> = match &once.scope {
            Some(s) => vec![format!("@{s}"), once.fragments[0].clone()],
            None => once.fragments.clone(),
        };
        let twice = ModuleNameParser::apply(&again_fragments, true).unwrap();
        assert_eq!(once, twice);
    }
}
