//! Identifiers, library/module names, code paths, and JS locations (§3.1,
//! §4.2).

pub mod code_path;
pub mod js_location;
pub mod library_name;
pub mod module_name;
pub mod qident;
pub mod simple_ident;

pub use code_path::CodePath;
pub use js_location::{ContainerEntry, JsLocation, ModuleSpec};
pub use library_name::LibraryName;
pub use module_name::{ModuleName, ModuleNameParser};
pub use qident::QIdent;
pub use simple_ident::SimpleIdent;
