//! `tsconfig.json` subset (§6.4), read via `json5` since real-world
//! configs permit comments and trailing commas that plain `serde_json`
//! rejects.

use decl_common::Fs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CompilerOptionsSubset {
    pub module: Option<String>,
    #[serde(default)]
    pub lib: Vec<String>,
    #[serde(rename = "noImplicitAny")]
    pub no_implicit_any: Option<bool>,
    #[serde(rename = "noImplicitThis")]
    pub no_implicit_this: Option<bool>,
    #[serde(rename = "strictNullChecks")]
    pub strict_null_checks: Option<bool>,
    #[serde(rename = "baseUrl")]
    pub base_url: Option<String>,
    #[serde(rename = "typeRoots")]
    pub type_roots: Option<Vec<String>>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(rename = "noEmit")]
    pub no_emit: Option<bool>,
    #[serde(rename = "forceConsistentCasingInFileNames")]
    pub force_consistent_casing_in_file_names: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TsConfig {
    #[serde(rename = "compilerOptions", default)]
    pub compiler_options: CompilerOptionsSubset,
    /// **[SUPPLEMENT]**: a single parent config path. Real `@types`
    /// packages frequently `extends` a base config for `lib`/
    /// `strictNullChecks`; without following it the effective selection
    /// would silently regress to defaults.
    pub extends: Option<String>,
}

impl TsConfig {
    pub fn parse(text: &str) -> Result<TsConfig, String> {
        json5::from_str(text).map_err(|e| e.to_string())
    }
}

/// Reads `path`, following a single-level `extends` chain: the child's
/// own fields always win; a field the child leaves unset is inherited
/// from the parent. Multiple levels of `extends` are followed
/// transitively (each parent may itself `extends` another), bounded by
/// `max_depth` to avoid looping on a malformed cycle.
pub fn read_tsconfig(fs: &dyn Fs, path: &Path) -> Result<TsConfig, String> {
    read_tsconfig_rec(fs, path, 8)
}

fn read_tsconfig_rec(fs: &dyn Fs, path: &Path, max_depth: u32) -> Result<TsConfig, String> {
    let text = fs
        .read_utf8(path)
        .map_err(|e| format!("could not read {}: {e}", path.display()))?;
    let config = TsConfig::parse(&text)?;

    let Some(extends) = &config.extends else {
        return Ok(config);
    };
    if max_depth == 0 {
        return Ok(config);
    }
    let parent_path = resolve_extends_path(path, extends);
    if !fs.exists(&parent_path) {
        return Ok(config);
    }
    let parent = read_tsconfig_rec(fs, &parent_path, max_depth - 1)?;
    Ok(merge_tsconfig(parent, config))
}

fn resolve_extends_path(from: &Path, extends: &str) -> PathBuf {
    let base = from.parent().unwrap_or_else(|| Path::new("."));
    let mut candidate = base.join(extends);
    if candidate.extension().is_none() {
        candidate.set_extension("json");
    }
    candidate
}

/// Child fields win; unset child fields fall back to the parent's.
fn merge_tsconfig(parent: TsConfig, child: TsConfig) -> TsConfig {
    let p = parent.compiler_options;
    let c = child.compiler_options;
    TsConfig {
        compiler_options: CompilerOptionsSubset {
            module: c.module.or(p.module),
            lib: if c.lib.is_empty() { p.lib } else { c.lib },
            no_implicit_any: c.no_implicit_any.or(p.no_implicit_any),
            no_implicit_this: c.no_implicit_this.or(p.no_implicit_this),
            strict_null_checks: c.strict_null_checks.or(p.strict_null_checks),
            base_url: c.base_url.or(p.base_url),
            type_roots: c.type_roots.or(p.type_roots),
            types: if c.types.is_empty() { p.types } else { c.types },
            no_emit: c.no_emit.or(p.no_emit),
            force_consistent_casing_in_file_names: c
                .force_consistent_casing_in_file_names
                .or(p.force_consistent_casing_in_file_names),
        },
        extends: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_common::MemFs;

    #[test]
    fn parses_json5_with_comments_and_trailing_commas() {
        let text = r#"{
            // a comment json doesn't allow
            "compilerOptions": {
                "strictNullChecks": true,
                "lib": ["es2015", "dom",],
            },
        }"#;
        let config = TsConfig::parse(text).unwrap();
        assert_eq!(config.compiler_options.strict_null_checks, Some(true));
        assert_eq!(config.compiler_options.lib, vec!["es2015", "dom"]);
    }

    #[test]
    fn extends_fills_in_fields_the_child_left_unset() {
        let fs = MemFs::new()
            .with_file(
                "/lib/base.json",
                r#"{"compilerOptions":{"strictNullChecks":true,"lib":["es2015"]}}"#,
            )
            .with_file(
                "/lib/tsconfig.json",
                r#"{"extends":"./base","compilerOptions":{"noImplicitAny":true}}"#,
            );
        let config = read_tsconfig(&fs, Path::new("/lib/tsconfig.json")).unwrap();
        assert_eq!(config.compiler_options.strict_null_checks, Some(true));
        assert_eq!(config.compiler_options.no_implicit_any, Some(true));
        assert_eq!(config.compiler_options.lib, vec!["es2015"]);
    }
}
