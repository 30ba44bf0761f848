//! The phase driver (§4.4): turns one library's `LibrarySource` into a
//! fully-converted `Library` by running file preparation, `FlattenTrees`,
//! proxy-module synthesis, dependency resolution, and the rewrite
//! pipeline, in that order. `run_many` drives a whole dependency graph,
//! resolving independent libraries across threads via `rayon` while
//! memoizing and detecting cycles through a shared cache.

use decl_common::{Diagnostic, FailureCause, Fs, Logger, PhaseError, PhaseRes};
use decl_ident::{LibraryName, ModuleName};
use decl_tree::{parsed_file, DeclParser, Directive, Tree};
use decl_resolver::{
    enumerate_declaration_files, infer_default_module, infer_dependency, module_names_for_file,
    owning_library, resolve_external_references, LibrarySource, PackageJson,
};
use decl_transform::PipelineConfig;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// The converted output of one library (§3.4): its source, declared
/// version, and the final merged+rewritten tree.
#[derive(Clone, Debug)]
pub struct Library {
    pub source: LibrarySource,
    pub version: String,
    pub parsed: Tree,
}

/// Driver-wide settings that don't vary per library.
pub struct DriverConfig {
    pub ignored: Vec<LibraryName>,
    /// A module whose name has a fragment starting with any of these
    /// prefixes is dropped entirely (§4.4 step 6).
    pub ignored_prefixes: Vec<String>,
    pub pedantic: bool,
}

/// Runs the phase driver's ten steps (§4.4) for one library.
///
/// `get_deps` is called once, with the full set of this library's direct
/// dependency names (stdlib included, unless `source` itself is stdlib),
/// and must resolve each to its own already-converted `Library`.
pub fn process_library(
    source: &LibrarySource,
    is_circular: bool,
    fs: &dyn Fs,
    parser: &dyn DeclParser,
    config: &DriverConfig,
    get_deps: impl FnOnce(&[LibraryName]) -> PhaseRes<LibraryName, FxHashMap<LibraryName, Library>>,
    logger: &dyn Logger,
) -> PhaseRes<LibraryName, Library> {
    // 1. ignored / circular short-circuit.
    if config.ignored.contains(&source.lib_name) || is_circular {
        return PhaseRes::Ignore;
    }

    // 2. Enumerate declaration files.
    let files = enumerate_declaration_files(fs, source);

    // 3. Per-file preparation.
    let mut prepared = Vec::with_capacity(files.len());
    let mut dep_names: Vec<LibraryName> = Vec::new();

    for file in &files {
        let raw = match parser.parse(file) {
            Ok(tree) => tree,
            Err(message) => {
                let err = PhaseError::Parse { file: file.display().to_string(), message };
                return PhaseRes::Failure(vec![(source.lib_name.clone(), FailureCause::Msg(err.to_string()))]);
            }
        };

        let names = module_names_for_file(&source.lib_name, &source.folder, file);
        let inferred_name = names
            .first()
            .cloned()
            .unwrap_or_else(|| ModuleName::identity(&source.lib_name));
        let wrapped = infer_default_module(raw, &inferred_name);

        if let Tree::ParsedFile { directives, .. } = &wrapped {
            for directive in directives {
                if let Directive::TypesRef(lib) = directive {
                    dep_names.push(LibraryName::parse(lib));
                }
            }
        }

        for candidate in resolve_external_references(&wrapped, &source.lib_name).iter() {
            dep_names.push(resolve_dependency_name(candidate));
        }

        prepared.push(wrapped);
    }

    // 4. FlattenTrees: fold every prepared file into one ParsedFile.
    let mut flattened = prepared
        .into_iter()
        .fold(decl_tree::empty_parsed_file(true), decl_tree::merge::flatten);

    // 5. Proxy modules synthesized from package.json#exports.
    if let Some(proxy_file) = build_proxy_modules(fs, &source.lib_name, &source.folder, &files, logger) {
        flattened = decl_tree::merge::flatten(flattened, proxy_file);
    }

    // 6. Drop modules whose name has a fragment matching an ignored prefix.
    flattened = strip_ignored_modules(flattened, &config.ignored_prefixes);

    // 7. stdlib + declared dependencies (package.json#dependencies).
    if !source.is_stdlib {
        dep_names.push(LibraryName::unscoped("std"));
    }
    if let Some(pkg) = read_package_json(fs, &source.folder) {
        for name in pkg.dependencies.keys() {
            dep_names.push(LibraryName::parse(name));
        }
    }
    dep_names.sort_by(|a, b| library_sort_key(a).cmp(&library_sort_key(b)));
    dep_names.dedup();

    // 8. Resolve the dependency set.
    let deps_map = match get_deps(&dep_names) {
        PhaseRes::Ok(map) => map,
        PhaseRes::Ignore => return PhaseRes::Ignore,
        PhaseRes::Failure(failures) => return PhaseRes::Failure(failures),
    };

    // 9. Build the pipeline config; the root Scope itself is built inside
    // `run_pipeline` once per scoped pass, from the tree as it stands at
    // that point.
    let deps_trees: Vec<Tree> = deps_map.values().map(|lib| lib.parsed.clone()).collect();
    let pipeline_config = PipelineConfig {
        lib_name: source.lib_name.clone(),
        pedantic: config.pedantic,
        identity_module: ModuleName::identity(&source.lib_name),
    };

    // 10. Run the rewrite pipeline.
    let final_tree = decl_transform::run_pipeline(flattened, &pipeline_config, &deps_trees, logger);

    PhaseRes::Ok(Library {
        source: source.clone(),
        version: source.version.clone(),
        parsed: final_tree,
    })
}

/// `InferredDependency` applied to a module's candidate owning library:
/// names that coincide with a Node built-in module (`fs`, `path`, ...)
/// carry no real npm package of their own, so they're retargeted to the
/// dependency that actually declares them (§4.8.2) rather than treated
/// as a literal dependency on a package named `"fs"`.
fn resolve_dependency_name(candidate: &LibraryName) -> LibraryName {
    if candidate.scope.is_none() {
        let as_module = ModuleName::new(None, vec![candidate.name.clone()]);
        if let Some(mapped) = infer_dependency(&as_module) {
            return mapped;
        }
    }
    candidate.clone()
}

fn library_sort_key(lib: &LibraryName) -> String {
    match &lib.scope {
        Some(scope) => format!("@{scope}/{}", lib.name),
        None => lib.name.clone(),
    }
}

fn read_package_json(fs: &dyn Fs, folder: &Path) -> Option<PackageJson> {
    let path = folder.join("package.json");
    if !fs.exists(&path) {
        return None;
    }
    let text = fs.read_utf8(&path).ok()?;
    PackageJson::parse(&text).ok()
}

/// §4.4 step 5 / §4.8.3: flattens `package.json#exports` and synthesizes
/// one `declare module` per entry, wrapped in a single `ParsedFile` ready
/// to merge into the library's flattened tree. Returns `None` when the
/// library has no `package.json` or no `exports` field.
fn build_proxy_modules(
    fs: &dyn Fs,
    lib_name: &LibraryName,
    folder: &Path,
    declaration_files: &[PathBuf],
    logger: &dyn Logger,
) -> Option<Tree> {
    let pkg = read_package_json(fs, folder)?;
    let exports = pkg.flatten_exports();
    if exports.is_empty() {
        return None;
    }

    let candidates: Vec<String> = declaration_files
        .iter()
        .filter_map(|f| f.strip_prefix(folder).ok())
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .collect();

    let lib_mod = ModuleName::identity(lib_name).value();
    let mut modules = Vec::new();

    for (subpath, types_path) in exports {
        let subpath = subpath.trim_start_matches("./").to_string();
        let types_path = types_path.trim_start_matches("./").to_string();

        if types_path.contains('*') {
            match decl_modules::expand_glob(&types_path, &candidates) {
                Ok(matches) => {
                    for m in matches {
                        let Ok(resolved) = ModuleName::from_relative_path(Path::new(&m.file), false) else {
                            continue;
                        };
                        let name = subpath.replacen('*', &m.captured, 1);
                        modules.push(decl_modules::synthesize_entry(&lib_mod, &name, &resolved));
                    }
                }
                Err(reason) => logger.log(Diagnostic::GlobExpansionFailed { pattern: types_path, reason }),
            }
        } else if let Ok(resolved) = ModuleName::from_relative_path(Path::new(&types_path), false) {
            modules.push(decl_modules::synthesize_entry(&lib_mod, &subpath, &resolved));
        }
    }

    if modules.is_empty() {
        None
    } else {
        Some(parsed_file(Vec::new(), true, modules))
    }
}

fn strip_ignored_modules(tree: Tree, prefixes: &[String]) -> Tree {
    if prefixes.is_empty() {
        return tree;
    }
    match tree {
        Tree::ParsedFile { directives, is_module, container } => {
            let members = container
                .members
                .into_iter()
                .filter(|m| !is_ignored_module(m, prefixes))
                .collect();
            Tree::ParsedFile {
                directives,
                is_module,
                container: decl_tree::Container::new(members)
                    .with_comments(container.comments)
                    .with_code_path(container.code_path)
                    .with_js_location(container.js_location),
            }
        }
        other => other,
    }
}

fn is_ignored_module(member: &Tree, prefixes: &[String]) -> bool {
    let name = match member {
        Tree::Module { name, .. } | Tree::AugmentedModule { name, .. } => name,
        _ => return false,
    };
    name.fragments
        .iter()
        .any(|fragment| prefixes.iter().any(|prefix| fragment.starts_with(prefix.as_str())))
}

/// Drives a whole set of libraries to completion, resolving each
/// library's dependencies against the others in `sources` (plus whatever
/// `stdlib` source is present among them) and memoizing results so a
/// shared dependency is only converted once. Independent top-level
/// libraries run across a `rayon` thread pool; within that, dependency
/// recursion is serialized per library name via a shared cache and an
/// in-progress set used for circular-dependency detection (§4.4's
/// `isCircular`).
pub struct Driver<'a> {
    fs: &'a dyn Fs,
    parser: &'a (dyn DeclParser + Sync),
    config: &'a DriverConfig,
    logger: &'a (dyn Logger + 'a),
    sources_by_name: FxHashMap<LibraryName, LibrarySource>,
    cache: Mutex<FxHashMap<LibraryName, PhaseRes<LibraryName, Library>>>,
    in_progress: Mutex<FxHashSet<LibraryName>>,
}

impl<'a> Driver<'a> {
    pub fn new(
        sources: &[LibrarySource],
        fs: &'a dyn Fs,
        parser: &'a (dyn DeclParser + Sync),
        config: &'a DriverConfig,
        logger: &'a (dyn Logger + 'a),
    ) -> Self {
        let mut sources_by_name = FxHashMap::default();
        for source in sources {
            sources_by_name.entry(source.lib_name.clone()).or_insert_with(|| source.clone());
        }
        Driver {
            fs,
            parser,
            config,
            logger,
            sources_by_name,
            cache: Mutex::new(FxHashMap::default()),
            in_progress: Mutex::new(FxHashSet::default()),
        }
    }

    /// Resolves a single library by name, using and populating the shared
    /// cache. Safe to call concurrently for different names.
    pub fn resolve(&self, name: &LibraryName) -> PhaseRes<LibraryName, Library> {
        if let Some(cached) = self.cache.lock().unwrap().get(name) {
            return cached.clone();
        }

        let is_circular = {
            let mut in_progress = self.in_progress.lock().unwrap();
            if in_progress.contains(name) {
                true
            } else {
                in_progress.insert(name.clone());
                false
            }
        };

        let Some(source) = self.sources_by_name.get(name) else {
            return PhaseRes::Failure(vec![(
                name.clone(),
                FailureCause::Msg(format!("no source found for library {name:?}")),
            )]);
        };

        let result = process_library(
            source,
            is_circular,
            self.fs,
            self.parser,
            self.config,
            |deps| self.resolve_many(deps),
            self.logger,
        );

        self.in_progress.lock().unwrap().remove(name);
        self.cache.lock().unwrap().insert(name.clone(), result.clone());
        result
    }

    fn resolve_many(&self, names: &[LibraryName]) -> PhaseRes<LibraryName, FxHashMap<LibraryName, Library>> {
        let mut map = FxHashMap::default();
        let mut failures = Vec::new();
        for name in names {
            match self.resolve(name) {
                PhaseRes::Ok(lib) => {
                    map.insert(name.clone(), lib);
                }
                PhaseRes::Ignore => {}
                PhaseRes::Failure(fs) => failures.extend(fs),
            }
        }
        if failures.is_empty() {
            PhaseRes::Ok(map)
        } else {
            PhaseRes::Failure(failures)
        }
    }
}

/// Converts every library in `sources`, in parallel where independent.
pub fn run_many(
    sources: &[LibrarySource],
    fs: &dyn Fs,
    parser: &(dyn DeclParser + Sync),
    config: &DriverConfig,
    logger: &(dyn Logger + Sync),
) -> FxHashMap<LibraryName, PhaseRes<LibraryName, Library>> {
    let driver = Driver::new(sources, fs, parser, config, logger);
    let names: Vec<LibraryName> = sources.iter().map(|s| s.lib_name.clone()).collect();
    names
        .par_iter()
        .map(|name| (name.clone(), driver.resolve(name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_common::{MemFs, TracingLogger};
    use decl_ident::SimpleIdent;
    use decl_tree::{Comments, Container};

    struct FixtureParser;

    impl DeclParser for FixtureParser {
        fn parse(&self, path: &Path) -> Result<Tree, String> {
            if path.file_name().and_then(|n| n.to_str()) == Some("index.d.ts") {
                let func = Tree::DeclFunction {
                    name: SimpleIdent::new("identity"),
                    comments: Comments::empty(),
                    declared: true,
                    sig: decl_tree::FunctionSig {
                        type_params: Vec::new(),
                        params: Vec::new(),
                        result_type: None,
                    },
                    code_path: decl_ident::CodePath::NoPath,
                    js_location: decl_ident::JsLocation::Zero,
                };
                return Ok(parsed_file(Vec::new(), true, vec![func]));
            }
            Ok(decl_tree::empty_parsed_file(true))
        }
    }

    fn base_config() -> DriverConfig {
        DriverConfig { ignored: Vec::new(), ignored_prefixes: Vec::new(), pedantic: false }
    }

    #[test]
    fn ignored_library_short_circuits_to_ignore() {
        let fs = MemFs::new();
        let source = LibrarySource::new(LibraryName::unscoped("left-pad"), "1.0.0", PathBuf::from("/nm/left-pad"));
        let config = DriverConfig {
            ignored: vec![LibraryName::unscoped("left-pad")],
            ignored_prefixes: Vec::new(),
            pedantic: false,
        };
        let parser = FixtureParser;
        let logger = TracingLogger;
        let result = process_library(&source, false, &fs, &parser, &config, |_| PhaseRes::Ok(FxHashMap::default()), &logger);
        assert!(matches!(result, PhaseRes::Ignore));
    }

    #[test]
    fn circular_dependency_short_circuits_to_ignore() {
        let fs = MemFs::new().with_file("/nm/a/index.d.ts", "");
        let source = LibrarySource::new(LibraryName::unscoped("a"), "1.0.0", PathBuf::from("/nm/a"));
        let config = base_config();
        let parser = FixtureParser;
        let logger = TracingLogger;
        let result = process_library(&source, true, &fs, &parser, &config, |_| PhaseRes::Ok(FxHashMap::default()), &logger);
        assert!(matches!(result, PhaseRes::Ignore));
    }

    #[test]
    fn a_simple_library_converts_to_ok() {
        let fs = MemFs::new().with_file("/nm/lodash/index.d.ts", "");
        let source = LibrarySource::new(LibraryName::unscoped("lodash"), "4.0.0", PathBuf::from("/nm/lodash"));
        let config = base_config();
        let parser = FixtureParser;
        let logger = TracingLogger;
        let result = process_library(&source, false, &fs, &parser, &config, |_| PhaseRes::Ok(FxHashMap::default()), &logger);
        match result {
            PhaseRes::Ok(lib) => assert!(matches!(lib.parsed, Tree::ParsedFile { .. })),
            other => panic!("expected Ok, got {other:?}"),
        }
    }

    #[test]
    fn driver_detects_a_two_library_cycle() {
        let fs = MemFs::new()
            .with_file("/nm/a/index.d.ts", "")
            .with_file("/nm/a/package.json", r#"{"dependencies":{"b":"1.0.0"}}"#)
            .with_file("/nm/b/index.d.ts", "")
            .with_file("/nm/b/package.json", r#"{"dependencies":{"a":"1.0.0"}}"#);
        let sources = vec![
            LibrarySource::new(LibraryName::unscoped("a"), "1.0.0", PathBuf::from("/nm/a")),
            LibrarySource::new(LibraryName::unscoped("b"), "1.0.0", PathBuf::from("/nm/b")),
        ];
        let config = base_config();
        let parser = FixtureParser;
        let logger = TracingLogger;
        let results = run_many(&sources, &fs, &parser, &config, &logger);
        assert_eq!(results.len(), 2);
        for (_, res) in &results {
            assert!(res.is_ok() || matches!(res, PhaseRes::Ignore));
        }
    }

    #[test]
    fn ignored_prefix_drops_matching_modules() {
        let module = Tree::Module {
            name: ModuleName::new(None, vec!["internal-foo".to_string()]),
            container: Container::new(Vec::new()),
        };
        let kept = Tree::Module {
            name: ModuleName::new(None, vec!["public-bar".to_string()]),
            container: Container::new(Vec::new()),
        };
        let file = parsed_file(Vec::new(), true, vec![module, kept.clone()]);
        let stripped = strip_ignored_modules(file, &["internal-".to_string()]);
        assert_eq!(stripped.members(), &[kept]);
    }
}
