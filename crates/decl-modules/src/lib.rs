//! The module engine (§4.6): expanding imports and exports into the
//! concrete declarations they introduce, rebasing re-exported
//! declarations to their new site (`derive_copy`), and folding
//! `declare module "m" { ... }` augmentations into their target module.

pub mod augment;
pub mod derive_copy;
pub mod exports;
pub mod imports;
pub mod proxy_module;

pub use augment::augment_modules;
pub use derive_copy::derive_copy;
pub use exports::expand_export;
pub use imports::{expand_import, ExpandedMod};
pub use proxy_module::{expand_glob, synthesize_entry, GlobMatch, PROXY_MODULE_MARKER};
