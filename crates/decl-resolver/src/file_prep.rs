//! Per-file preparation (§4.4 step 3): everything that runs once per
//! declaration file before the library's files are flattened into one
//! merged tree.
//!
//! `InferredDefaultModule` (§4.8.1) and `InferredDependency` (§4.8.2) are
//! pure tree/name functions; `PathsFromTsLibSource` and
//! `ResolveExternalReferences` need filesystem access and scope-free
//! tree inspection respectively, so they take their inputs explicitly
//! rather than reaching for global state.

use decl_common::{Fs, PartialFn, Seq};
use decl_ident::{LibraryName, ModuleName};
use decl_tree::{Container, Exportee, Importee, Tree};
use std::path::{Path, PathBuf};

use crate::library_source::LibrarySource;

const DECLARATION_SUFFIXES: &[&str] = &[".d.ts", ".d.mts", ".d.cts"];

fn is_declaration_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    DECLARATION_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

fn strip_declaration_suffix(name: &str) -> &str {
    for suffix in DECLARATION_SUFFIXES {
        if let Some(stripped) = name.strip_suffix(suffix) {
            return stripped;
        }
    }
    name
}

/// `PathsFromTsLibSource` (§4.4 step 2): enumerates the `.d.ts`/`.d.mts`/
/// `.d.cts` files that belong to `source`, in sorted order. For the
/// stdlib source this is exactly its declared file list; for any other
/// source it's a filtered recursive walk from `source.walk_root()` (the
/// `Fs::walk` contract already skips `.idea`/`target`/`.git`).
pub fn enumerate_declaration_files(fs: &dyn Fs, source: &LibrarySource) -> Vec<PathBuf> {
    if source.is_stdlib {
        let mut files: Vec<PathBuf> = source.shortened_files.iter().map(|f| f.full_path()).collect();
        files.sort();
        return files;
    }
    let root = source.walk_root();
    let mut files = fs.walk(&root).unwrap_or_default();
    files.retain(|p| is_declaration_file(p));
    files.sort();
    files
}

/// Derives every canonical `ModuleName` a file may be referenced by: one
/// from its path relative to the library's folder, and (for the
/// library's own root file, i.e. `index.d.ts` directly under `folder`)
/// the library's identity module as well — a bare `import "libName"`
/// must resolve to that file too.
pub fn module_names_for_file(lib_name: &LibraryName, folder: &Path, file: &Path) -> Vec<ModuleName> {
    let mut names = Vec::new();
    if let Ok(relative) = file.strip_prefix(folder) {
        if let Ok(from_path) = ModuleName::from_relative_path(relative, false) {
            names.push(from_path);
        }
    }
    if file.parent() == Some(folder) {
        if let Some(stem) = file.file_name().and_then(|n| n.to_str()) {
            if strip_declaration_suffix(stem) == "index" {
                names.push(ModuleName::identity(lib_name));
            }
        }
    }
    names.dedup();
    names
}

/// `InferredDefaultModule` (§4.8.1). A parsed file whose members are all
/// "augment-only" (imports, augmented modules, `declare module` blocks,
/// type aliases, interfaces) never needs a synthetic wrapper — it's
/// purely extending something declared elsewhere. Anything else causes
/// the whole file to be wrapped in `declare module "<inferred_name>" { }`,
/// unless a module of that exact name is already declared at the top
/// level.
pub fn infer_default_module(file: Tree, inferred_name: &ModuleName) -> Tree {
    match file {
        Tree::ParsedFile { directives, is_module, container } if is_module => {
            let has_substantial_member = container.members.iter().any(|m| !is_augment_only_member(m));
            let already_declared = container
                .members
                .iter()
                .any(|m| matches!(m, Tree::Module { name, .. } if name == inferred_name));

            if has_substantial_member && !already_declared {
                let wrapped = Tree::Module {
                    name: inferred_name.clone(),
                    container: Container::new(container.members)
                        .with_comments(container.comments)
                        .with_code_path(container.code_path)
                        .with_js_location(container.js_location),
                };
                Tree::ParsedFile { directives, is_module, container: Container::new(vec![wrapped]) }
            } else {
                Tree::ParsedFile { directives, is_module, container }
            }
        }
        other => other,
    }
}

fn is_augment_only_member(member: &Tree) -> bool {
    matches!(
        member,
        Tree::Import { .. }
            | Tree::AugmentedModule { .. }
            | Tree::Module { .. }
            | Tree::DeclTypeAlias { .. }
            | Tree::DeclInterface { .. }
    )
}

/// The fixed table behind `InferredDependency` (§4.8.2): ambient module
/// names with no `import`/`export` resolution path of their own, whose
/// declarations live in a well-known dependency instead. Node's built-in
/// module names are the dominant case; a couple of other ambient
/// sentinels round out the table.
const NODE_BUILTINS: &[&str] = &[
    "assert", "buffer", "child_process", "cluster", "crypto", "dgram", "dns", "domain", "events",
    "fs", "http", "https", "module", "net", "os", "path", "process", "punycode", "querystring",
    "readline", "repl", "stream", "string_decoder", "timers", "tls", "tty", "url", "util", "vm",
    "zlib",
];

/// Resolves an unresolved module reference to the dependency library that
/// is expected to declare it, if any.
pub fn infer_dependency(unresolved: &ModuleName) -> Option<LibraryName> {
    let head = unresolved.fragments.first()?.as_str();
    if NODE_BUILTINS.contains(&head) {
        return Some(LibraryName::scoped("types", "node"));
    }
    match head {
        "Buffer" => Some(LibraryName::scoped("types", "node")),
        _ => None,
    }
}

/// Every module name a tree's `Import`/`Export` nodes reference,
/// recursively, across every container level (so a reference inside a
/// nested namespace or `declare module` block is still found).
pub fn collect_module_references(tree: &Tree) -> Seq<ModuleName> {
    let mut out = Vec::new();
    collect_rec(tree, &mut out);
    Seq::from_vec(out)
}

fn collect_rec(tree: &Tree, out: &mut Vec<ModuleName>) {
    match tree {
        Tree::Import { from: Importee::Module(name), .. } => out.push(name.clone()),
        Tree::Export { exported, .. } => match exported {
            Exportee::Names { from: Some(name), .. } => out.push(name.clone()),
            Exportee::Star { from } => out.push(from.clone()),
            Exportee::Tree(boxed) => collect_rec(boxed, out),
            Exportee::Names { from: None, .. } => {}
        },
        _ => {}
    }
    for member in tree.members() {
        collect_rec(member, out);
    }
}

/// The library a module name's leading fragment names, or `None` for a
/// relative specifier (`"."`/`".."` lead) which always refers to
/// something inside the current library.
pub fn owning_library(module: &ModuleName) -> Option<LibraryName> {
    let first = module.fragments.first()?;
    if first == "." || first == ".." {
        return None;
    }
    Some(match &module.scope {
        Some(scope) => LibraryName::scoped(scope.clone(), first.clone()),
        None => LibraryName::unscoped(first.clone()),
    })
}

/// `ResolveExternalReferences` (§4.4 step 3): partitions a file's module
/// references into those belonging to the current library or a relative
/// specifier (irrelevant to dependency resolution) and those naming an
/// external library, deduplicated to one `LibraryName` set.
pub fn resolve_external_references(tree: &Tree, current_lib: &LibraryName) -> Seq<LibraryName> {
    let refs = collect_module_references(tree);
    let pf = PartialFn::new(
        |m: &ModuleName| owning_library(m).is_some_and(|lib| &lib != current_lib),
        |m: ModuleName| owning_library(&m).expect("filtered by is_some_and above"),
    );
    let (deps, _local) = refs.partition_collect(&pf);
    deps.distinct()
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_tree::{parsed_file, Comments};
    use std::path::Path;

    #[test]
    fn augment_only_file_is_left_unwrapped() {
        let iface = Tree::DeclInterface {
            name: decl_ident::SimpleIdent::new("Foo"),
            comments: Comments::empty(),
            tparams: Vec::new(),
            inheritance: Vec::new(),
            members: Vec::new(),
            code_path: decl_ident::CodePath::NoPath,
            js_location: decl_ident::JsLocation::Zero,
        };
        let file = parsed_file(Vec::new(), true, vec![iface]);
        let inferred = ModuleName::new(None, vec!["mylib".to_string()]);
        let result = infer_default_module(file.clone(), &inferred);
        assert_eq!(result, file);
    }

    #[test]
    fn file_with_a_real_declaration_gets_wrapped() {
        let func = Tree::DeclFunction {
            name: decl_ident::SimpleIdent::new("doThing"),
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
        let file = parsed_file(Vec::new(), true, vec![func]);
        let inferred = ModuleName::new(None, vec!["mylib".to_string()]);
        let result = infer_default_module(file, &inferred);
        match result {
            Tree::ParsedFile { container, .. } => {
                assert_eq!(container.members.len(), 1);
                assert!(matches!(&container.members[0], Tree::Module { name, .. } if name == &inferred));
            }
            other => panic!("expected ParsedFile, got {other:?}"),
        }
    }

    #[test]
    fn node_builtins_infer_a_node_dependency() {
        let fs_module = ModuleName::new(None, vec!["fs".to_string()]);
        assert_eq!(infer_dependency(&fs_module), Some(LibraryName::scoped("types", "node")));

        let unrelated = ModuleName::new(None, vec!["left-pad".to_string()]);
        assert_eq!(infer_dependency(&unrelated), None);
    }

    #[test]
    fn external_references_exclude_relative_and_self_specifiers() {
        let current = LibraryName::unscoped("mylib");
        let import_external = Tree::Import {
            type_only: false,
            imported: Vec::new(),
            from: Importee::Module(ModuleName::new(None, vec!["lodash".to_string()])),
            comments: Comments::empty(),
        };
        let import_relative = Tree::Import {
            type_only: false,
            imported: Vec::new(),
            from: Importee::Module(ModuleName::new(None, vec![".".to_string(), "helper".to_string()])),
            comments: Comments::empty(),
        };
        let file = parsed_file(Vec::new(), true, vec![import_external, import_relative]);
        let deps = resolve_external_references(&file, &current);
        assert_eq!(deps.as_slice(), &[LibraryName::unscoped("lodash")]);
    }

    #[test]
    fn module_names_for_index_file_includes_the_identity_module() {
        let lib_name = LibraryName::unscoped("lodash");
        let folder = Path::new("/nm/lodash");
        let file = Path::new("/nm/lodash/index.d.ts");
        let names = module_names_for_file(&lib_name, folder, file);
        assert!(names.contains(&ModuleName::identity(&lib_name)));
    }
}
