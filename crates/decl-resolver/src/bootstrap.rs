//! The `Bootstrap` library resolver (§4.8.4): scans a `node_modules` root
//! (including its `@types/*` subfolder) once, then answers `library`/
//! `module` lookups against that scan. The first source found for a given
//! library name wins — a regular dependency shadows a stale `@types`
//! entry of the same name only if it's discovered first, matching real
//! resolution order (`node_modules/<name>` before `node_modules/@types/<name>`
//! is never the case in practice, so `@types` is always scanned second).

use decl_common::{Fs, Seq};
use decl_ident::{LibraryName, ModuleName};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

use crate::file_prep::module_names_for_file;
use crate::library_source::LibrarySource;
use crate::package_json::PackageJson;

/// The outcome of looking a library name up against the scanned
/// `node_modules` tree.
#[derive(Clone, Debug)]
pub enum LibraryLookup {
    Found(LibrarySource),
    /// The caller's `ignored` set named this library explicitly.
    Ignored,
    NotAvailable,
}

/// A resolved reference to a module, distinguishing a reference that
/// lands inside the library currently being processed (`Local`) from one
/// that lands in some other, already-resolved source (`NotLocal`) — the
/// phase driver only needs to chase the latter across library
/// boundaries.
#[derive(Clone, Debug)]
pub enum ResolvedModule {
    Local(PathBuf, ModuleName),
    NotLocal(LibrarySource, ModuleName),
}

/// `Either<Unresolved, Seq<Source>>` (§4.8.4): the result of an initial
/// `fromNodeModules` resolution pass over the caller's wanted-library
/// list.
#[derive(Clone, Debug)]
pub enum Resolution {
    Unresolved { missing: Vec<LibraryName> },
    Resolved(Seq<LibrarySource>),
}

pub struct Bootstrap<'a> {
    fs: &'a dyn Fs,
    ignored: Vec<LibraryName>,
    sources: FxHashMap<LibraryName, LibrarySource>,
}

impl<'a> Bootstrap<'a> {
    /// `library(name)` (§4.8.4).
    pub fn library(&self, name: &LibraryName) -> LibraryLookup {
        if self.ignored.contains(name) {
            return LibraryLookup::Ignored;
        }
        match self.sources.get(name) {
            Some(source) => LibraryLookup::Found(source.clone()),
            None => LibraryLookup::NotAvailable,
        }
    }

    /// `module(source, folder, str)` (§4.8.4): resolves a raw module
    /// specifier `str`, seen while processing a file under `folder` that
    /// belongs to `source`, to the concrete file (and its canonical
    /// module name) it names. A specifier whose owning library differs
    /// from `source.lib_name` is resolved against that other library's
    /// own source instead, and reported as `NotLocal` so the caller
    /// knows to cross a library boundary.
    pub fn module(&self, source: &LibrarySource, folder: &Path, str: &str) -> Option<ResolvedModule> {
        let name = ModuleName::from_string(str, true).ok()?;
        let owner = crate::file_prep::owning_library(&name);

        let is_local = match &owner {
            None => true,
            Some(lib) => lib == &source.lib_name,
        };

        if is_local {
            let relative = PathBuf::from(name.fragments.join("/"));
            let candidate_base = folder.join(&relative);
            for suffix in [".d.ts", ".d.mts", ".d.cts"] {
                let candidate = append_suffix(&candidate_base, suffix);
                if self.fs.exists(&candidate) {
                    return Some(ResolvedModule::Local(candidate, name));
                }
            }
            return None;
        }

        let other_lib = owner.expect("non-local case always has an owning library");
        let other_source = self.sources.get(&other_lib)?;
        Some(ResolvedModule::NotLocal(other_source.clone(), name))
    }

    /// `moduleNameFor(source, file)` (§4.8.4): every name `file` may be
    /// legitimately referenced by.
    pub fn module_name_for(&self, source: &LibrarySource, file: &Path) -> Seq<ModuleName> {
        Seq::from_vec(module_names_for_file(&source.lib_name, &source.folder, file))
    }

    /// `fromNodeModules(fromFolder, options, wantedLibs)` (§4.8.4):
    /// builds the stdlib source, the `@types` folder's sources, and the
    /// union of `wantedLibs`' own `node_modules` entries, then resolves
    /// every wanted library against that scan.
    pub fn from_node_modules(
        fs: &'a dyn Fs,
        from_folder: &Path,
        stdlib_files: Vec<PathBuf>,
        stdlib_version: &str,
        ignored: Vec<LibraryName>,
        wanted_libs: &[LibraryName],
    ) -> (Bootstrap<'a>, Resolution) {
        let mut sources = FxHashMap::default();

        let ts_lib = from_folder.join("typescript").join("lib");
        if fs.exists(&ts_lib) {
            let stdlib_source = LibrarySource::stdlib(ts_lib, stdlib_files, stdlib_version);
            sources.insert(stdlib_source.lib_name.clone(), stdlib_source);
        }

        for lib_name in wanted_libs {
            if ignored.contains(lib_name) {
                continue;
            }
            if let Some(source) = scan_library_folder(fs, from_folder, lib_name) {
                sources.entry(lib_name.clone()).or_insert(source);
            }
        }

        let types_root = from_folder.join("@types");
        if fs.exists(&types_root) {
            for lib_name in wanted_libs {
                if sources.contains_key(lib_name) || ignored.contains(lib_name) {
                    continue;
                }
                let types_lib_name = LibraryName::scoped("types", lib_name.name.clone());
                if let Some(source) = scan_library_folder(fs, from_folder, &types_lib_name) {
                    sources.entry(lib_name.clone()).or_insert(source);
                }
            }
        }

        let missing: Vec<LibraryName> = wanted_libs
            .iter()
            .filter(|l| !ignored.contains(l) && !sources.contains_key(l))
            .cloned()
            .collect();

        let bootstrap = Bootstrap { fs, ignored, sources: sources.clone() };
        let resolution = if missing.is_empty() {
            Resolution::Resolved(Seq::from_vec(sources.into_values().collect()))
        } else {
            Resolution::Unresolved { missing }
        };
        (bootstrap, resolution)
    }
}

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(suffix);
    PathBuf::from(s)
}

/// Locates a library's folder under `from_folder` (`@scope/name` or
/// `name`) and reads its `package.json` to build a `LibrarySource`, or
/// `None` if no such folder exists.
fn scan_library_folder(fs: &dyn Fs, from_folder: &Path, lib_name: &LibraryName) -> Option<LibrarySource> {
    let folder = match &lib_name.scope {
        Some(scope) => from_folder.join(format!("@{scope}")).join(&lib_name.name),
        None => from_folder.join(&lib_name.name),
    };
    if !fs.exists(&folder) {
        return None;
    }
    let pkg_path = folder.join("package.json");
    let version = if fs.exists(&pkg_path) {
        fs.read_utf8(&pkg_path)
            .ok()
            .and_then(|text| PackageJson::parse(&text).ok())
            .and_then(|pkg| pkg.version)
            .unwrap_or_default()
    } else {
        String::new()
    };
    Some(LibrarySource::new(lib_name.clone(), version, folder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_common::MemFs;

    #[test]
    fn ignored_library_is_reported_as_ignored() {
        let fs = MemFs::new();
        let (bootstrap, _) = Bootstrap::from_node_modules(
            &fs,
            Path::new("/nm"),
            Vec::new(),
            "5.0",
            vec![LibraryName::unscoped("left-pad")],
            &[LibraryName::unscoped("left-pad")],
        );
        assert!(matches!(
            bootstrap.library(&LibraryName::unscoped("left-pad")),
            LibraryLookup::Ignored
        ));
    }

    #[test]
    fn unavailable_library_is_reported_as_missing() {
        let fs = MemFs::new();
        let wanted = vec![LibraryName::unscoped("left-pad")];
        let (bootstrap, resolution) =
            Bootstrap::from_node_modules(&fs, Path::new("/nm"), Vec::new(), "5.0", Vec::new(), &wanted);
        assert!(matches!(
            bootstrap.library(&LibraryName::unscoped("left-pad")),
            LibraryLookup::NotAvailable
        ));
        match resolution {
            Resolution::Unresolved { missing } => assert_eq!(missing, wanted),
            Resolution::Resolved(_) => panic!("expected Unresolved"),
        }
    }

    #[test]
    fn a_present_library_is_found_and_resolved() {
        let fs = MemFs::new()
            .with_file("/nm/lodash/package.json", r#"{"version":"4.17.21","typings":"index.d.ts"}"#)
            .with_file("/nm/lodash/index.d.ts", "export = {}");
        let wanted = vec![LibraryName::unscoped("lodash")];
        let (bootstrap, resolution) =
            Bootstrap::from_node_modules(&fs, Path::new("/nm"), Vec::new(), "5.0", Vec::new(), &wanted);
        match bootstrap.library(&LibraryName::unscoped("lodash")) {
            LibraryLookup::Found(source) => assert_eq!(source.version, "4.17.21"),
            other => panic!("expected Found, got {other:?}"),
        }
        assert!(matches!(resolution, Resolution::Resolved(_)));
    }

    #[test]
    fn falls_back_to_the_types_scope_when_the_plain_folder_is_absent() {
        let fs = MemFs::new()
            .with_file("/nm/@types/left-pad/package.json", r#"{"version":"1.0.0"}"#)
            .with_file("/nm/@types/left-pad/index.d.ts", "export = {}");
        let wanted = vec![LibraryName::unscoped("left-pad")];
        let (bootstrap, resolution) =
            Bootstrap::from_node_modules(&fs, Path::new("/nm"), Vec::new(), "5.0", Vec::new(), &wanted);
        assert!(matches!(
            bootstrap.library(&LibraryName::unscoped("left-pad")),
            LibraryLookup::Found(_)
        ));
        assert!(matches!(resolution, Resolution::Resolved(_)));
    }
}
