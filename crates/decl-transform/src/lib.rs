//! The ~20-pass rewrite pipeline (§4.7) that turns one library's merged,
//! module-resolved `ParsedFile` into the simplified shape a downstream
//! code-emission phase expects. Each pass is its own module; this crate
//! root only wires them together in the fixed order the spec prescribes.
//!
//! Passes that need to resolve references build a fresh `Scope` rooted at
//! the tree *as it stood before that pass ran* — the scope borrows the
//! tree, so each step's scope is built and dropped within the statement
//! that produces the next tree, never held across a step boundary.

pub mod combined_early;
pub mod commonjs;
pub mod derive_name;
pub mod expand_type_mappings;
pub mod extract_classes;
pub mod extract_interfaces;
pub mod final_structural;
pub mod hoisting;
pub mod late_combined;
pub mod library_specific;
pub mod module_as_global_namespace;
pub mod move_globals;
pub mod prefer_type_alias;
pub mod qualify_references;
pub mod replace_exports;
pub mod resolve_type_lookups;
pub mod resolve_type_queries;
pub mod set_js_location;
pub mod type_alias_ops;

use decl_common::Logger;
use decl_ident::{LibraryName, ModuleName};
use decl_scope::Scope;
use decl_tree::{apply_single, Tree};

/// The per-library inputs the pipeline needs beyond the tree itself.
pub struct PipelineConfig {
    pub lib_name: LibraryName,
    pub pedantic: bool,
    /// The module a bare `import "libName"` resolves to — needed by
    /// `ModuleAsGlobalNamespace` (step 9) to find the library's top-level
    /// module.
    pub identity_module: ModuleName,
}

/// Whether `ExpandTypeMappings` (steps 13-14) should run for this library.
///
/// The original converter gates this per-library because mapped-type
/// evaluation is the single most expensive and most failure-prone pass
/// (nine distinct `Problem` sub-kinds exist precisely because it's asked
/// to evaluate keys over types it can't always fully resolve); a few
/// libraries with exceptionally large or deeply-generic mapped-type usage
/// are excluded rather than let the pass churn through cycles, repeatedly
/// back off, and log without making progress. `react-native` builds much
/// of its props/ref API out of chained `Pick`/`Omit` over enormous prop
/// union types, which is the shape this exclusion targets.
pub fn expand_type_mappings_applies(lib_name: &LibraryName) -> bool {
    !matches!(lib_name.name.as_str(), "react-native")
}

/// Runs the fixed pipeline (§4.7, steps 1-20) over `tree` and returns the
/// rewritten tree. `deps` are the root trees of the library's transitive
/// dependencies' exported surfaces, used to build every scoped pass's
/// `Scope`.
pub fn run_pipeline(tree: Tree, config: &PipelineConfig, deps: &[Tree], logger: &dyn Logger) -> Tree {
    // 1. LibrarySpecific
    let mut tree = library_specific::apply(tree, &config.lib_name);

    // 2. SetJsLocation
    tree = set_js_location::run(tree);

    // 3. SimplifyParents ⋙ RemoveStubs ⋙ InferTypeFromExpr ⋙ InferEnumTypes
    //    ⋙ NormalizeFunctions ⋙ MoveStatics
    tree = combined_early::run(tree);

    // 4. HandleCommonJsModules ⋙ RewriteExportStarAs
    tree = commonjs::handle_commonjs_modules(tree);
    tree = commonjs::rewrite_export_star_as(tree);

    // 5. QualifyReferences(disableUnqualified=false)
    tree = run_scoped(tree, config, deps, logger, |t, scope| qualify_references::run(t, scope));

    // 6. AugmentModules
    tree = decl_modules::augment_modules(tree);

    // 7. ResolveTypeQueries
    tree = run_scoped(tree, config, deps, logger, |t, scope| resolve_type_queries::run(t, scope));

    // 8. ReplaceExports(LoopDetector.initial)
    tree = run_scoped(tree, config, deps, logger, |t, scope| replace_exports::run(t, scope));

    // 9. ModuleAsGlobalNamespace
    tree = module_as_global_namespace::run(tree, &config.identity_module);

    // 10. MoveGlobals
    tree = move_globals::run(tree);

    // 11. FlattenTrees.applySingle
    tree = apply_single(tree);

    // 12. DefaultedTypeArguments ⋙ TypeAliasIntersection ⋙ RejiggerIntersections
    tree = run_scoped(tree, config, deps, logger, |t, scope| type_alias_ops::run(t, scope));

    // 13-14. ExpandTypeMappings (+ After), gated per-library
    if expand_type_mappings_applies(&config.lib_name) {
        tree = run_scoped(tree, config, deps, logger, |t, scope| expand_type_mappings::run(t, scope));
        tree = run_scoped(tree, config, deps, logger, |t, scope| expand_type_mappings::run_after(t, scope));
    }

    // 15. TypeAliasToConstEnum ⋙ ForwardCtors ⋙ ExpandTypeParams ⋙
    //     UnionTypesFromKeyOf ⋙ DropProperties ⋙ InferReturnTypes ⋙
    //     RewriteTypeThis ⋙ InlineConstEnum ⋙ InlineTrivial
    tree = run_scoped(tree, config, deps, logger, |t, scope| late_combined::run(t, scope));

    // 16. ResolveTypeLookups
    tree = run_scoped(tree, config, deps, logger, |t, scope| resolve_type_lookups::run(t, scope));

    // 17. PreferTypeAlias
    tree = prefer_type_alias::run(tree);

    // 18. ExtractInterfaces(libName, "anon")
    tree = extract_interfaces::run(tree);

    // 19. ExtractClasses (+ ExpandCallables when not react)
    tree = extract_classes::run(tree, &config.lib_name);

    // 20. SplitMethods ⋙ RemoveDifficultInheritance ⋙ VarToNamespace
    tree = run_scoped(tree, config, deps, logger, |t, scope| final_structural::run(t, scope));

    tree
}

/// Builds a fresh root `Scope` over `tree` and runs `step`, then returns
/// the rewritten tree. The scope's borrow of `tree` never outlives this
/// call.
fn run_scoped(
    tree: Tree,
    config: &PipelineConfig,
    deps: &[Tree],
    logger: &dyn Logger,
    step: impl FnOnce(&Tree, &Scope<'_>) -> Tree,
) -> Tree {
    let scope = Scope::root(config.lib_name.clone(), config.pedantic, &tree, deps, logger);
    step(&tree, &scope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_common::TracingLogger;
    use decl_tree::{empty_parsed_file, Container};

    #[test]
    fn empty_library_survives_the_full_pipeline() {
        let tree = empty_parsed_file(true);
        let config = PipelineConfig {
            lib_name: LibraryName::unscoped("left-pad"),
            pedantic: false,
            identity_module: ModuleName::identity(&LibraryName::unscoped("left-pad")),
        };
        let logger = TracingLogger;
        let result = run_pipeline(tree, &config, &[], &logger);
        assert!(matches!(result, Tree::ParsedFile { .. }));
        assert!(result.members().is_empty());
    }

    #[test]
    fn react_is_excluded_from_expand_callables_but_not_type_mappings() {
        assert!(expand_type_mappings_applies(&LibraryName::unscoped("react")));
        assert!(!expand_type_mappings_applies(&LibraryName::unscoped("react-native")));
    }

    #[test]
    fn run_scoped_does_not_leak_the_borrow_past_the_step() {
        let tree = Tree::Global { container: Container::new(Vec::new()) };
        let config = PipelineConfig {
            lib_name: LibraryName::unscoped("lib"),
            pedantic: false,
            identity_module: ModuleName::identity(&LibraryName::unscoped("lib")),
        };
        let logger = TracingLogger;
        let next = run_scoped(tree, &config, &[], &logger, |t, _scope| t.clone());
        assert!(matches!(next, Tree::Global { .. }));
    }
}
