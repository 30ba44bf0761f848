//! Everything the phase driver needs before it can start merging a
//! library's files: locating libraries on disk, parsing their
//! `package.json`/`tsconfig.json`, enumerating their declaration files,
//! and the per-file inference steps that run ahead of `FlattenTrees`
//! (§4.4 steps 1-3, §4.8).

pub mod bootstrap;
pub mod file_prep;
pub mod library_source;
pub mod package_json;
pub mod tsconfig;

pub use bootstrap::{Bootstrap, LibraryLookup, ResolvedModule, Resolution};
pub use file_prep::{
    collect_module_references, enumerate_declaration_files, infer_default_module, infer_dependency,
    module_names_for_file, owning_library, resolve_external_references,
};
pub use library_source::{LibrarySource, ShortenedFile};
pub use package_json::{DistField, ModuleField, OneOrMany, PackageJson};
pub use tsconfig::{read_tsconfig, CompilerOptionsSubset, TsConfig};
