//! The sealed `Tree` sum type (§3.2) and its container payload.

use crate::comments::Comments;
use crate::member::MemberTree;
use crate::types::{FunctionSig, TypeParam, TypeTree};
use decl_ident::{CodePath, JsLocation, ModuleName, QIdent, SimpleIdent};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Shared payload for every container variant (`ParsedFile`, `Namespace`,
/// `Module`, `AugmentedModule`, `Global`): comments, a declared-flag,
/// ordered members, a code path, and a JS location. Factored into one
/// struct so container variants stay thin tuple-like wrappers instead of
/// repeating five fields five times.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Container {
    pub comments: Comments,
    pub declared: bool,
    pub members: Vec<Tree>,
    pub code_path: CodePath,
    pub js_location: JsLocation,
}

impl Container {
    pub fn new(members: Vec<Tree>) -> Self {
        Container {
            comments: Comments::empty(),
            declared: false,
            members,
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        }
    }

    pub fn with_members(mut self, members: Vec<Tree>) -> Self {
        self.members = members;
        self
    }

    pub fn with_code_path(mut self, code_path: CodePath) -> Self {
        self.code_path = code_path;
        self
    }

    pub fn with_js_location(mut self, js_location: JsLocation) -> Self {
        self.js_location = js_location;
        self
    }

    pub fn with_comments(mut self, comments: Comments) -> Self {
        self.comments = comments;
        self
    }

    /// Groups named members by simple ident, preserving first-seen order
    /// within each group (invariant 2). Always computed fresh from
    /// `members` — never cached on the struct — so it can never go stale
    /// across a rewrite.
    pub fn members_by_name(&self) -> FxHashMap<SimpleIdent, SmallVec<[usize; 2]>> {
        let mut map: FxHashMap<SimpleIdent, SmallVec<[usize; 2]>> = FxHashMap::default();
        for (i, member) in self.members.iter().enumerate() {
            if let Some(name) = member.name() {
                map.entry(name.clone()).or_default().push(i);
            }
        }
        map
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct EnumMember {
    pub name: SimpleIdent,
    /// Stringified initializer expression, if the member has a known
    /// literal value (`InlineConstEnum` only fires when this is `Some`).
    pub literal_value: Option<crate::types::LiteralValue>,
    pub comments: Comments,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Imported {
    /// `import { name [as alias] }`.
    Ident(SimpleIdent, Option<SimpleIdent>),
    /// `import * as alias` — a whole-module namespace import.
    Star(SimpleIdent),
}

impl Imported {
    pub fn name(&self) -> Option<&SimpleIdent> {
        match self {
            Imported::Ident(name, _) => Some(name),
            Imported::Star(_) => None,
        }
    }

    pub fn local_name(&self) -> &SimpleIdent {
        match self {
            Imported::Ident(name, alias) => alias.as_ref().unwrap_or(name),
            Imported::Star(alias) => alias,
        }
    }
}

/// Where an `Import`/`Export`'s `from` points.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Importee {
    Module(ModuleName),
    /// `import X = A.B.C` — a local qualified reference, not a module
    /// specifier.
    Local(QIdent),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ExportKind {
    Named,
    Defaulted,
    Namespaced,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Exportee {
    /// A direct export of a declaration (including, when that declaration
    /// is itself an `Import`, the "export of an import" case in §4.6).
    Tree(Box<Tree>),
    /// `export { a, b as c } from "m"` (or without `from`, from local
    /// scope).
    Names {
        from: Option<ModuleName>,
        idents: Vec<(QIdent, Option<SimpleIdent>)>,
    },
    /// `export * from "m"`.
    Star { from: ModuleName },
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Tree {
    ParsedFile {
        directives: Vec<crate::directive::Directive>,
        is_module: bool,
        container: Container,
    },
    Namespace {
        name: SimpleIdent,
        container: Container,
    },
    Module {
        name: ModuleName,
        container: Container,
    },
    AugmentedModule {
        name: ModuleName,
        container: Container,
    },
    Global {
        container: Container,
    },

    DeclFunction {
        name: SimpleIdent,
        comments: Comments,
        declared: bool,
        sig: FunctionSig,
        code_path: CodePath,
        js_location: JsLocation,
    },
    DeclVar {
        name: SimpleIdent,
        comments: Comments,
        declared: bool,
        readonly: bool,
        tpe: Option<TypeTree>,
        code_path: CodePath,
        js_location: JsLocation,
    },
    DeclEnum {
        name: SimpleIdent,
        comments: Comments,
        declared: bool,
        is_const: bool,
        is_value: bool,
        members: Vec<EnumMember>,
        exported_from: Option<QIdent>,
        code_path: CodePath,
        js_location: JsLocation,
    },

    DeclClass {
        name: SimpleIdent,
        comments: Comments,
        declared: bool,
        is_abstract: bool,
        tparams: Vec<TypeParam>,
        parent: Option<TypeTree>,
        implements: Vec<TypeTree>,
        members: Vec<MemberTree>,
        code_path: CodePath,
        js_location: JsLocation,
    },
    DeclInterface {
        name: SimpleIdent,
        comments: Comments,
        tparams: Vec<TypeParam>,
        inheritance: Vec<TypeTree>,
        members: Vec<MemberTree>,
        code_path: CodePath,
        js_location: JsLocation,
    },
    DeclTypeAlias {
        name: SimpleIdent,
        comments: Comments,
        tparams: Vec<TypeParam>,
        alias: TypeTree,
        code_path: CodePath,
        js_location: JsLocation,
    },

    Import {
        type_only: bool,
        imported: Vec<Imported>,
        from: Importee,
        comments: Comments,
    },
    Export {
        type_only: bool,
        kind: ExportKind,
        exported: Exportee,
        comments: Comments,
    },
    ExportAsNamespace(SimpleIdent),
}

impl Tree {
    /// The simple ident of a named declaration, or `None` for nodes keyed
    /// by something other than a `SimpleIdent` (`Module`/`AugmentedModule`
    /// are keyed by `ModuleName`, see `module_name()`) or unnamed nodes
    /// (`Global`, `Import`, `Export`, `ExportAsNamespace`).
    pub fn name(&self) -> Option<&SimpleIdent> {
        match self {
            Tree::Namespace { name, .. }
            | Tree::DeclFunction { name, .. }
            | Tree::DeclVar { name, .. }
            | Tree::DeclEnum { name, .. }
            | Tree::DeclClass { name, .. }
            | Tree::DeclInterface { name, .. }
            | Tree::DeclTypeAlias { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn code_path(&self) -> Option<&CodePath> {
        match self {
            Tree::ParsedFile { container, .. }
            | Tree::Namespace { container, .. }
            | Tree::Module { container, .. }
            | Tree::AugmentedModule { container, .. }
            | Tree::Global { container, .. } => Some(&container.code_path),
            Tree::DeclFunction { code_path, .. }
            | Tree::DeclVar { code_path, .. }
            | Tree::DeclEnum { code_path, .. }
            | Tree::DeclClass { code_path, .. }
            | Tree::DeclInterface { code_path, .. }
            | Tree::DeclTypeAlias { code_path, .. } => Some(code_path),
            Tree::Import { .. } | Tree::Export { .. } | Tree::ExportAsNamespace(_) => None,
        }
    }

    pub fn set_code_path(&mut self, new_path: CodePath) {
        match self {
            Tree::ParsedFile { container, .. }
            | Tree::Namespace { container, .. }
            | Tree::Module { container, .. }
            | Tree::AugmentedModule { container, .. }
            | Tree::Global { container, .. } => container.code_path = new_path,
            Tree::DeclFunction { code_path, .. }
            | Tree::DeclVar { code_path, .. }
            | Tree::DeclEnum { code_path, .. }
            | Tree::DeclClass { code_path, .. }
            | Tree::DeclInterface { code_path, .. }
            | Tree::DeclTypeAlias { code_path, .. } => *code_path = new_path,
            Tree::Import { .. } | Tree::Export { .. } | Tree::ExportAsNamespace(_) => {}
        }
    }

    pub fn js_location(&self) -> Option<&JsLocation> {
        match self {
            Tree::ParsedFile { container, .. }
            | Tree::Namespace { container, .. }
            | Tree::Module { container, .. }
            | Tree::AugmentedModule { container, .. }
            | Tree::Global { container, .. } => Some(&container.js_location),
            Tree::DeclFunction { js_location, .. }
            | Tree::DeclVar { js_location, .. }
            | Tree::DeclEnum { js_location, .. }
            | Tree::DeclClass { js_location, .. }
            | Tree::DeclInterface { js_location, .. }
            | Tree::DeclTypeAlias { js_location, .. } => Some(js_location),
            Tree::Import { .. } | Tree::Export { .. } | Tree::ExportAsNamespace(_) => None,
        }
    }

    pub fn set_js_location(&mut self, new_loc: JsLocation) {
        match self {
            Tree::ParsedFile { container, .. }
            | Tree::Namespace { container, .. }
            | Tree::Module { container, .. }
            | Tree::AugmentedModule { container, .. }
            | Tree::Global { container, .. } => container.js_location = new_loc,
            Tree::DeclFunction { js_location, .. }
            | Tree::DeclVar { js_location, .. }
            | Tree::DeclEnum { js_location, .. }
            | Tree::DeclClass { js_location, .. }
            | Tree::DeclInterface { js_location, .. }
            | Tree::DeclTypeAlias { js_location, .. } => *js_location = new_loc,
            Tree::Import { .. } | Tree::Export { .. } | Tree::ExportAsNamespace(_) => {}
        }
    }

    pub fn members(&self) -> &[Tree] {
        match self {
            Tree::ParsedFile { container, .. }
            | Tree::Namespace { container, .. }
            | Tree::Module { container, .. }
            | Tree::AugmentedModule { container, .. }
            | Tree::Global { container, .. } => &container.members,
            _ => &[],
        }
    }

    pub fn members_mut(&mut self) -> Option<&mut Vec<Tree>> {
        match self {
            Tree::ParsedFile { container, .. }
            | Tree::Namespace { container, .. }
            | Tree::Module { container, .. }
            | Tree::AugmentedModule { container, .. }
            | Tree::Global { container, .. } => Some(&mut container.members),
            _ => None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Tree::ParsedFile { .. }
                | Tree::Namespace { .. }
                | Tree::Module { .. }
                | Tree::AugmentedModule { .. }
                | Tree::Global { .. }
        )
    }

    pub fn is_type_decl(&self) -> bool {
        matches!(
            self,
            Tree::DeclClass { .. } | Tree::DeclInterface { .. } | Tree::DeclTypeAlias { .. }
        )
    }
}

impl Tree {
    pub fn module_name(&self) -> Option<&ModuleName> {
        match self {
            Tree::Module { name, .. } | Tree::AugmentedModule { name, .. } => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_ident::LibraryName;

    fn class(name: &str) -> Tree {
        Tree::DeclClass {
            name: SimpleIdent::new(name),
            comments: Comments::empty(),
            declared: true,
            is_abstract: false,
            tparams: Vec::new(),
            parent: None,
            implements: Vec::new(),
            members: Vec::new(),
            code_path: CodePath::NoPath,
            js_location: JsLocation::Zero,
        }
    }

    #[test]
    fn members_by_name_groups_overloaded_names_in_order() {
        let container = Container::new(vec![class("Foo"), class("Bar"), class("Foo")]);
        let grouped = container.members_by_name();
        assert_eq!(grouped[&SimpleIdent::new("Foo")].as_slice(), &[0, 2]);
        assert_eq!(grouped[&SimpleIdent::new("Bar")].as_slice(), &[1]);
    }

    #[test]
    fn parsed_file_reports_container_accessors() {
        let lib = LibraryName::unscoped("left-pad");
        let path = CodePath::has_path(lib, QIdent::single(SimpleIdent::new("index")));
        let mut file = Tree::ParsedFile {
            directives: Vec::new(),
            is_module: true,
            container: Container::new(vec![class("Padder")]).with_code_path(path.clone()),
        };

        assert!(file.is_container());
        assert_eq!(file.code_path(), Some(&path));
        assert_eq!(file.members().len(), 1);

        file.set_js_location(JsLocation::Global(QIdent::single(SimpleIdent::new("Padder"))));
        assert!(matches!(file.js_location(), Some(JsLocation::Global(_))));

        file.members_mut().unwrap().push(class("Other"));
        assert_eq!(file.members().len(), 2);
    }

    #[test]
    fn module_name_accessor_is_only_populated_for_module_variants() {
        let name = ModuleName::new(None, vec!["left-pad".to_string()]);
        let module = Tree::Module {
            name: name.clone(),
            container: Container::new(Vec::new()),
        };
        assert_eq!(module.module_name(), Some(&name));
        assert_eq!(module.name(), None);

        let ns = Tree::Namespace {
            name: SimpleIdent::new("NS"),
            container: Container::new(Vec::new()),
        };
        assert_eq!(ns.module_name(), None);
        assert_eq!(ns.name(), Some(&SimpleIdent::new("NS")));
    }
}
