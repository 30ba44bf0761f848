//! `Scope`: a nested, cached, loop-detecting lookup environment over one
//! library's merged tree plus its transitive dependencies (§4.3).

use crate::loop_detector::LoopDetector;
use crate::picker::{AnyDecl, Picker, PickerKind, Types};
use decl_common::{Diagnostic, Logger};
use decl_ident::{LibraryName, ModuleName, QIdent, SimpleIdent};
use decl_tree::{Tree, TypeParam, TypeTree};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

type LookupCache<'a> = FxHashMap<(PickerKind, QIdent), Vec<&'a Tree>>;
type ModuleScopeCache<'a> = FxHashMap<ModuleName, Scope<'a>>;

/// A read-only lookup environment. Cheap to clone: the stack is a
/// `Vec` of borrows, and the lookup/module-scope caches are `Rc`-shared
/// with the root scope they were built from — per §5, a scope's cache is
/// only safe for concurrent reads if the host doesn't parallelize below
/// the per-library boundary, which `decl-driver::run_many` never does.
#[derive(Clone)]
pub struct Scope<'a> {
    lib_name: LibraryName,
    pedantic: bool,
    logger: &'a (dyn Logger + 'a),
    /// Root trees of transitive dependencies, outer (exported) surface
    /// only — a dependency's own internals are reached by recursing into
    /// `deps` of that library's own scope, not through this one.
    deps: &'a [Tree],
    /// Outer → inner enclosing containers, root scope has exactly one:
    /// the library's merged `ParsedFile`.
    stack: Vec<&'a Tree>,
    /// Type parameters bound in enclosing generic scopes (class,
    /// interface, alias, function signature) — not modeled via `stack`
    /// since `MemberTree`/`FunctionSig` aren't `Tree` containers.
    type_params: Vec<SimpleIdent>,
    unqualified_lookup: bool,
    lookup_cache: Option<Rc<RefCell<LookupCache<'a>>>>,
    module_scope_cache: Rc<RefCell<ModuleScopeCache<'a>>>,
}

impl<'a> Scope<'a> {
    pub fn root(
        lib_name: LibraryName,
        pedantic: bool,
        root: &'a Tree,
        deps: &'a [Tree],
        logger: &'a (dyn Logger + 'a),
    ) -> Self {
        Scope {
            lib_name,
            pedantic,
            logger,
            deps,
            stack: vec![root],
            type_params: Vec::new(),
            unqualified_lookup: false,
            lookup_cache: None,
            module_scope_cache: Rc::new(RefCell::new(FxHashMap::default())),
        }
    }

    /// A child scope for descending into `tree` (a container member being
    /// visited).
    pub fn nested(&self, tree: &'a Tree) -> Self {
        let mut stack = self.stack.clone();
        stack.push(tree);
        Scope { stack, ..self.clone() }
    }

    pub fn with_type_params(&self, params: &[TypeParam]) -> Self {
        let mut type_params = self.type_params.clone();
        type_params.extend(params.iter().map(|p| p.name.clone()));
        Scope { type_params, ..self.clone() }
    }

    pub fn enable_unqualified_lookup(&self) -> Self {
        Scope { unqualified_lookup: true, ..self.clone() }
    }

    /// Wraps the lookup path in a per-root memoization cache, keyed by
    /// `(picker kind, qident)`. The loop detector deliberately isn't part
    /// of the key: two calls for the same `(picker, qident)` from
    /// different recursion depths resolve to the same answer regardless
    /// of the path taken to reach them, and caching the first one found
    /// is always safe — a would-be cycle that the first caller already
    /// walked through still gets reported on that first call.
    pub fn caching(&self) -> Self {
        Scope {
            lookup_cache: Some(Rc::new(RefCell::new(FxHashMap::default()))),
            ..self.clone()
        }
    }

    pub fn lib_name(&self) -> &LibraryName {
        &self.lib_name
    }

    pub fn pedantic(&self) -> bool {
        self.pedantic
    }

    pub fn stack(&self) -> &[&'a Tree] {
        &self.stack
    }

    pub fn logger(&self) -> &'a (dyn Logger + 'a) {
        self.logger
    }

    /// True iff `ident` is bound by a type parameter somewhere in the
    /// enclosing generic scopes.
    pub fn is_abstract(&self, ident: &SimpleIdent) -> bool {
        self.type_params.contains(ident)
    }

    pub fn lookup(&self, qident: &QIdent) -> Vec<&'a Tree> {
        self.lookup_with(qident, &AnyDecl)
    }

    pub fn lookup_type(&self, qident: &QIdent) -> Vec<&'a Tree> {
        self.lookup_with(qident, &Types)
    }

    pub fn lookup_with(&self, qident: &QIdent, picker: &dyn Picker) -> Vec<&'a Tree> {
        if let Some(cache) = &self.lookup_cache {
            let key = (picker.kind(), qident.clone());
            if let Some(hit) = cache.borrow().get(&key) {
                return hit.clone();
            }
            let result = self.lookup_internal(picker, qident.parts(), &LoopDetector::initial());
            cache.borrow_mut().insert(key, result.clone());
            return result;
        }
        self.lookup_internal(picker, qident.parts(), &LoopDetector::initial())
    }

    /// Like `lookup_with`, but also returns the scope each hit was found
    /// in (so a caller can keep resolving further qualified references
    /// relative to where the declaration actually lives).
    pub fn lookup_include_scope(&self, qident: &QIdent) -> Vec<(&'a Tree, Scope<'a>)> {
        self.lookup(qident)
            .into_iter()
            .map(|t| (t, self.nested(t)))
            .collect()
    }

    /// The primitive lookup algorithm: resolves `parts` one qualifier at
    /// a time, walking outward through `stack`, then (if enabled) the
    /// whole library unqualified, then transitive dependencies' exported
    /// surface.
    pub fn lookup_internal(
        &self,
        picker: &dyn Picker,
        parts: &[SimpleIdent],
        loop_detector: &LoopDetector,
    ) -> Vec<&'a Tree> {
        let Some((head, rest)) = parts.split_first() else {
            return Vec::new();
        };
        let head_picker: &dyn Picker = if rest.is_empty() { picker } else { &AnyDecl };

        for tree in self.stack.iter().rev() {
            let found = find_named(tree.members(), head, head_picker);
            if !found.is_empty() {
                return self.resolve_rest(found, rest, picker, loop_detector);
            }
        }

        if self.unqualified_lookup {
            if let Some(&root) = self.stack.first() {
                let found = find_named_recursive(root, head, head_picker);
                if !found.is_empty() {
                    return self.resolve_rest(found, rest, picker, loop_detector);
                }
            }
        }

        for dep in self.deps {
            let found = find_named(dep.members(), head, head_picker);
            if !found.is_empty() {
                return self.resolve_rest(found, rest, picker, loop_detector);
            }
        }

        Vec::new()
    }

    fn resolve_rest(
        &self,
        containers: Vec<&'a Tree>,
        rest: &[SimpleIdent],
        picker: &dyn Picker,
        loop_detector: &LoopDetector,
    ) -> Vec<&'a Tree> {
        if rest.is_empty() {
            return containers;
        }
        let (head, tail) = rest.split_first().unwrap();
        let next_picker: &dyn Picker = if tail.is_empty() { picker } else { &AnyDecl };
        let mut out = Vec::new();
        for container in containers {
            let extended = match container.code_path() {
                Some(path) => match loop_detector.including(path) {
                    Ok(d) => d,
                    Err(cycle) => {
                        self.logger.log(Diagnostic::CycleDetected {
                            site: format!("{:?}", cycle.0),
                        });
                        continue;
                    }
                },
                None => loop_detector.clone(),
            };
            let found = find_named(container.members(), head, next_picker);
            out.extend(self.resolve_rest(found, tail, picker, &extended));
        }
        out
    }

    /// The scope for a declared module's body, for resolving references
    /// qualified relative to that module rather than the current one.
    /// Lazily computed and cached on the root scope (`moduleScopes`).
    pub fn module_scope(&self, name: &ModuleName) -> Option<Scope<'a>> {
        if let Some(hit) = self.module_scope_cache.borrow().get(name) {
            return Some(hit.clone());
        }
        let root = *self.stack.first()?;
        let module_tree = find_module_recursive(root, name)?;
        let scope = self.nested(module_tree);
        self.module_scope_cache
            .borrow_mut()
            .insert(name.clone(), scope.clone());
        Some(scope)
    }
}

/// Resolves a bare (no type-argument) reference through zero or more
/// `DeclTypeAlias` hops to whatever underlying shape it ultimately names
/// (an object type, a union, another `Ref` to a class/interface, ...).
/// Stops and returns the reference as-is on a miss, an ambiguous hit, a
/// reference carrying type arguments, or a cycle.
pub fn follow_alias(tpe: &TypeTree, scope: &Scope<'_>) -> TypeTree {
    follow_alias_with(tpe, scope, &LoopDetector::initial())
}

fn follow_alias_with(tpe: &TypeTree, scope: &Scope<'_>, detector: &LoopDetector) -> TypeTree {
    match tpe {
        TypeTree::Ref(qident, args) if args.is_empty() => {
            let hits = scope.enable_unqualified_lookup().lookup_type(qident);
            match hits.as_slice() {
                [Tree::DeclTypeAlias { alias, code_path, .. }] => match detector.including(code_path) {
                    Ok(next) => follow_alias_with(alias, scope, &next),
                    Err(_) => tpe.clone(),
                },
                _ => tpe.clone(),
            }
        }
        _ => tpe.clone(),
    }
}

fn find_named<'a>(members: &'a [Tree], name: &SimpleIdent, picker: &dyn Picker) -> Vec<&'a Tree> {
    members
        .iter()
        .filter(|t| t.name() == Some(name) && picker.accepts(t))
        .collect()
}

fn find_named_recursive<'a>(
    tree: &'a Tree,
    name: &SimpleIdent,
    picker: &dyn Picker,
) -> Vec<&'a Tree> {
    let mut out = find_named(tree.members(), name, picker);
    for member in tree.members() {
        if member.is_container() {
            out.extend(find_named_recursive(member, name, picker));
        }
    }
    out
}

fn find_module_recursive<'a>(tree: &'a Tree, name: &ModuleName) -> Option<&'a Tree> {
    for member in tree.members() {
        if member.module_name() == Some(name) {
            return Some(member);
        }
        if member.is_container() {
            if let Some(found) = find_module_recursive(member, name) {
                return Some(found);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_common::TracingLogger;
    use decl_ident::{CodePath, JsLocation};
    use decl_tree::{Comments, Container};

    fn var(name: &str) -> Tree {
        Tree::DeclVar {
            name: SimpleIdent::new(name),
            comments: Comments::empty(),
            declared: true,
            readonly: false,
            tpe: None,
            code_path: CodePath::has_path(
                LibraryName::unscoped("left-pad"),
                QIdent::single(SimpleIdent::new(name)),
            ),
            js_location: JsLocation::Zero,
        }
    }

    #[test]
    fn lookup_finds_a_direct_member() {
        let root = Tree::ParsedFile {
            directives: Vec::new(),
            is_module: true,
            container: Container::new(vec![var("padStart")]),
        };
        let logger = TracingLogger;
        let scope = Scope::root(LibraryName::unscoped("left-pad"), false, &root, &[], &logger);

        let found = scope.lookup(&QIdent::single(SimpleIdent::new("padStart")));
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn lookup_qualified_descends_into_a_namespace() {
        let inner = var("value");
        let ns = Tree::Namespace {
            name: SimpleIdent::new("NS"),
            container: Container::new(vec![inner]),
        };
        let root = Tree::ParsedFile {
            directives: Vec::new(),
            is_module: false,
            container: Container::new(vec![ns]),
        };
        let logger = TracingLogger;
        let scope = Scope::root(LibraryName::unscoped("lib"), false, &root, &[], &logger);

        let qident = QIdent::new(vec![SimpleIdent::new("NS"), SimpleIdent::new("value")]);
        let found = scope.lookup(&qident);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn follow_alias_resolves_through_one_hop() {
        let alias = Tree::DeclTypeAlias {
            name: SimpleIdent::new("Id"),
            comments: Comments::empty(),
            tparams: Vec::new(),
            alias: TypeTree::ref_simple(SimpleIdent::new("string")),
            code_path: CodePath::has_path(LibraryName::unscoped("lib"), QIdent::single(SimpleIdent::new("Id"))),
            js_location: JsLocation::Zero,
        };
        let root = Tree::ParsedFile {
            directives: Vec::new(),
            is_module: false,
            container: Container::new(vec![alias]),
        };
        let logger = TracingLogger;
        let scope = Scope::root(LibraryName::unscoped("lib"), false, &root, &[], &logger);

        let resolved = follow_alias(&TypeTree::ref_simple(SimpleIdent::new("Id")), &scope);
        assert_eq!(resolved, TypeTree::ref_simple(SimpleIdent::new("string")));
    }

    #[test]
    fn caching_returns_identical_results_on_repeat_lookup() {
        let root = Tree::ParsedFile {
            directives: Vec::new(),
            is_module: true,
            container: Container::new(vec![var("x")]),
        };
        let logger = TracingLogger;
        let scope =
            Scope::root(LibraryName::unscoped("lib"), false, &root, &[], &logger).caching();

        let q = QIdent::single(SimpleIdent::new("x"));
        let first = scope.lookup(&q);
        let second = scope.lookup(&q);
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn is_abstract_detects_bound_type_params() {
        let root = Tree::ParsedFile {
            directives: Vec::new(),
            is_module: true,
            container: Container::new(Vec::new()),
        };
        let logger = TracingLogger;
        let scope = Scope::root(LibraryName::unscoped("lib"), false, &root, &[], &logger);
        let scoped = scope.with_type_params(&[TypeParam::new(SimpleIdent::new("T"))]);
        assert!(scoped.is_abstract(&SimpleIdent::new("T")));
        assert!(!scoped.is_abstract(&SimpleIdent::new("U")));
    }
}
