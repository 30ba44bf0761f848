//! `package.json` subset consumed by the resolver (§6.3), plus the
//! `typesVersions` supplement noted in `SPEC_FULL.md` §4.
//!
//! Every field is optional: real `package.json` files carry dozens of
//! fields this phase never looks at, so the struct is `serde(default)`
//! end to end and unknown fields are silently ignored by `serde_json`'s
//! default behavior (no `deny_unknown_fields`).

use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::Value;

/// `typings`/`types`/`files` may be spelled as a single string or an
/// array of strings in the wild; this collapses both into a `Vec`.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// `module` may be a single string (a bundler's module entry point) or a
/// map from condition name to path; only the string form is used by this
/// phase, but both are parsed so a package with the map form doesn't fail
/// to deserialize.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ModuleField {
    Path(String),
    Conditional(FxHashMap<String, String>),
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DistField {
    pub tarball: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PackageJson {
    pub version: Option<String>,
    #[serde(default)]
    pub dependencies: FxHashMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: FxHashMap<String, String>,
    #[serde(default, rename = "peerDependencies")]
    pub peer_dependencies: FxHashMap<String, String>,
    pub typings: Option<OneOrMany>,
    pub types: Option<OneOrMany>,
    pub module: Option<ModuleField>,
    #[serde(default)]
    pub files: Vec<String>,
    pub dist: Option<DistField>,
    /// Kept as raw JSON; `exports.rs`-equivalent flattening lives in
    /// `flatten_exports` below since the shape is recursive and its
    /// leaves are either a bare string or a `{ "types": "..." }` object.
    pub exports: Option<Value>,
    /// **[SUPPLEMENT]**: `typesVersions`, a map from a semver range string
    /// to a sub-map of path redirects, consulted when resolving a
    /// library's declaration entry point (see `select_types_entry`).
    #[serde(rename = "typesVersions")]
    pub types_versions: Option<FxHashMap<String, FxHashMap<String, OneOrMany>>>,
}

impl PackageJson {
    pub fn parse(text: &str) -> Result<PackageJson, String> {
        serde_json::from_str(text).map_err(|e| e.to_string())
    }

    /// The declared types entry point: `typings`, falling back to `types`.
    pub fn declared_types_entry(&self) -> Option<String> {
        self.typings
            .clone()
            .or_else(|| self.types.clone())
            .and_then(|v| v.into_vec().into_iter().next())
    }

    /// Resolves the types entry point honoring `typesVersions`: the first
    /// range containing `ts_version` wins over the `typings`/`types`
    /// fallback, matching real `@types` packages that ship a different
    /// root declaration file per supported TypeScript version.
    pub fn select_types_entry(&self, ts_version: &str) -> Option<String> {
        if let Some(versions) = &self.types_versions {
            for (range, redirects) in versions {
                if version_range_contains(range, ts_version) {
                    if let Some(path) = redirects.get("*").cloned() {
                        return path.into_vec().into_iter().next();
                    }
                }
            }
        }
        self.declared_types_entry()
    }

    /// Flattens `exports` into `(subpath, typesPath)` pairs. Only entries
    /// whose leaf is a bare string or carries a `"types"` key are kept —
    /// other condition keys (`"import"`, `"require"`, `"default"`, ...)
    /// aren't relevant to a types-only resolution phase.
    pub fn flatten_exports(&self) -> Vec<(String, String)> {
        let Some(exports) = &self.exports else { return Vec::new() };
        let mut out = Vec::new();
        flatten_exports_value(".", exports, &mut out);
        out
    }
}

fn flatten_exports_value(key: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::String(path) => out.push((key.to_string(), path.clone())),
        Value::Object(map) => {
            if let Some(Value::String(types_path)) = map.get("types") {
                out.push((key.to_string(), types_path.clone()));
                return;
            }
            for (subkey, sub) in map {
                // Condition keys (`import`, `require`, `default`, ...) sit
                // at the same nesting level as subpath keys (`"./foo"`);
                // only subpath-shaped keys (those starting with `.`) recurse
                // as a new export entry, others are skipped since no
                // `"types"` leaf was found for them above.
                if subkey.starts_with('.') {
                    flatten_exports_value(subkey, sub, out);
                }
            }
        }
        _ => {}
    }
}

/// A minimal `typesVersions` range check: supports the two shapes that
/// actually appear in `@types` packages, `"*"` (always matches) and
/// `">=X.Y"` (a simple lower bound compared component-wise). Anything
/// else is treated as non-matching rather than guessed at.
fn version_range_contains(range: &str, version: &str) -> bool {
    let range = range.trim();
    if range == "*" {
        return true;
    }
    if let Some(bound) = range.strip_prefix(">=") {
        return compare_versions(version, bound.trim()) != std::cmp::Ordering::Less;
    }
    false
}

fn compare_versions(a: &str, b: &str) -> std::cmp::Ordering {
    let parse = |s: &str| -> Vec<u32> { s.split('.').map(|p| p.parse().unwrap_or(0)).collect() };
    parse(a).cmp(&parse(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_representative_types_package() {
        let json = r#"{
            "version": "1.2.3",
            "dependencies": { "tslib": "^2.0.0" },
            "typings": "index.d.ts",
            "exports": {
                "./features/*": { "types": "./features/*.d.ts" },
                "./package.json": "./package.json"
            }
        }"#;
        let pkg = PackageJson::parse(json).unwrap();
        assert_eq!(pkg.version.as_deref(), Some("1.2.3"));
        assert_eq!(pkg.declared_types_entry().as_deref(), Some("index.d.ts"));
        let exports = pkg.flatten_exports();
        assert!(exports.contains(&("./features/*".to_string(), "./features/*.d.ts".to_string())));
    }

    #[test]
    fn types_versions_picks_a_matching_range_over_the_fallback() {
        let json = r#"{
            "types": "index.d.ts",
            "typesVersions": { ">=4.0": { "*": ["index.v4.d.ts"] } }
        }"#;
        let pkg = PackageJson::parse(json).unwrap();
        assert_eq!(pkg.select_types_entry("4.5"), Some("index.v4.d.ts".to_string()));
        assert_eq!(pkg.select_types_entry("3.9"), Some("index.d.ts".to_string()));
    }

    #[test]
    fn one_or_many_accepts_both_shapes() {
        #[derive(Deserialize)]
        struct Wrapper {
            files: OneOrMany,
        }
        let single: Wrapper = serde_json::from_str(r#"{"files":"a.ts"}"#).unwrap();
        assert_eq!(single.files.into_vec(), vec!["a.ts".to_string()]);
        let many: Wrapper = serde_json::from_str(r#"{"files":["a.ts","b.ts"]}"#).unwrap();
        assert_eq!(many.files.into_vec(), vec!["a.ts".to_string(), "b.ts".to_string()]);
    }
}
