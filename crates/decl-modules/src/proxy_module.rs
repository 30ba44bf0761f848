//! `ProxyModule` (§4.6, §4.8.3): synthesizing
//! `declare module "<libMod>/<subpath>" { export * from "<resolved>" }`
//! modules from a library's `package.json#exports` map.
//!
//! This module only builds the tree fragment and expands glob patterns
//! against an already-enumerated candidate file list — it never touches
//! the filesystem itself. `decl-resolver` owns walking the library's
//! directory and flattening `exports` into the `(name, typesPath)` pairs
//! this module consumes, keeping the glob-expansion logic here testable
//! without an `Fs` implementation.

use decl_ident::ModuleName;
use decl_tree::{Comment, CommentMarker, Comments, Container, ExportKind, Exportee, Tree};
use globset::GlobBuilder;
use std::path::Path;

/// Stamped on every synthesized proxy module's container comments, so a
/// later pass (or a human reading the merged tree) can tell a
/// `package.json#exports`-derived module apart from one the library wrote
/// itself.
pub const PROXY_MODULE_MARKER: &str = "synthesized from package.json#exports";

/// Builds `declare module "<lib_mod>/<subpath>" { export * from "<resolved>" }`.
pub fn synthesize_entry(lib_mod: &str, subpath: &str, resolved: &ModuleName) -> Tree {
    let name = ModuleName::new(None, vec![format!("{lib_mod}/{subpath}")]);
    let export = Tree::Export {
        type_only: false,
        kind: ExportKind::Named,
        exported: Exportee::Star { from: resolved.clone() },
        comments: Comments::empty(),
    };
    Tree::Module {
        name,
        container: Container::new(vec![export]).with_comments(Comments(vec![Comment::Marker(
            CommentMarker::NameHint(PROXY_MODULE_MARKER.to_string()),
        )])),
    }
}

/// One concrete match of a glob-expanded `exports` entry: the candidate
/// file path it matched, and the subpath fragment substituted for `*`
/// (used to name the resulting proxy module).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct GlobMatch {
    pub file: String,
    pub captured: String,
}

/// Expands a single-`*` glob pattern (e.g. `"./features/*.js"`) against
/// `candidates` (library-root-relative file paths, in the order given),
/// returning every match with the fragment `*` captured.
///
/// `*` matches across path separators (directories), matching the spec's
/// "scan under `pre`'s directory for files whose relative path starts
/// with `pre` and ends with `post`" wording rather than a single-segment
/// shell glob. `Err` when the pattern contains more than one `*` — the
/// spec marks that case fatal rather than leaving it ambiguous which
/// capture binds where.
pub fn expand_glob(pattern: &str, candidates: &[String]) -> Result<Vec<GlobMatch>, String> {
    let star_count = pattern.matches('*').count();
    if star_count > 1 {
        return Err(format!(
            "proxy module pattern \"{pattern}\" contains more than one '*', which is unsupported"
        ));
    }
    if star_count == 0 {
        return Ok(candidates
            .iter()
            .filter(|c| c.as_str() == pattern)
            .map(|c| GlobMatch { file: c.clone(), captured: String::new() })
            .collect());
    }

    let (pre, post) = pattern.split_once('*').expect("star_count == 1");
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(false)
        .build()
        .map_err(|e| e.to_string())?
        .compile_matcher();

    Ok(candidates
        .iter()
        .filter(|c| matcher.is_match(Path::new(c.as_str())))
        .filter_map(|c| {
            let captured = c.strip_prefix(pre)?.strip_suffix(post)?;
            Some(GlobMatch { file: c.clone(), captured: captured.to_string() })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_ident::LibraryName;

    #[test]
    fn synthesize_entry_builds_a_star_export() {
        let resolved = ModuleName::identity(&LibraryName::unscoped("lodash"));
        let tree = synthesize_entry("mylib", "features/foo", &resolved);
        match tree {
            Tree::Module { name, container } => {
                assert_eq!(name.value(), "mylib/features/foo");
                assert_eq!(container.members.len(), 1);
                assert!(matches!(
                    &container.members[0],
                    Tree::Export { exported: Exportee::Star { from }, .. } if *from == resolved
                ));
            }
            other => panic!("expected a Module, got {other:?}"),
        }
    }

    #[test]
    fn single_star_pattern_expands_and_captures() {
        let candidates = vec![
            "features/foo.d.ts".to_string(),
            "features/bar.d.ts".to_string(),
            "index.d.ts".to_string(),
        ];
        let matches = expand_glob("features/*.d.ts", &candidates).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].captured, "foo");
        assert_eq!(matches[1].captured, "bar");
    }

    #[test]
    fn star_crosses_directory_boundaries() {
        let candidates = vec!["features/nested/foo.d.ts".to_string()];
        let matches = expand_glob("features/*.d.ts", &candidates).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].captured, "nested/foo");
    }

    #[test]
    fn multiple_stars_are_rejected() {
        let err = expand_glob("a/*/b/*.ts", &["a/x/b/y.ts".to_string()]).unwrap_err();
        assert!(err.contains("more than one"));
    }

    #[test]
    fn no_star_requires_exact_match() {
        let candidates = vec!["index.d.ts".to_string(), "other.d.ts".to_string()];
        let matches = expand_glob("index.d.ts", &candidates).unwrap();
        assert_eq!(matches, vec![GlobMatch { file: "index.d.ts".to_string(), captured: String::new() }]);
    }
}
