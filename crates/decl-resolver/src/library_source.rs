//! `LibrarySource`: everything the phase driver needs to know about one
//! library before it starts preparing files (§4.4's `source` input).

use decl_ident::LibraryName;
use std::path::PathBuf;

/// A single declaration file belonging to a source, already "shortened"
/// (made relative to the library's folder) — the phase driver follows
/// `§4.4` step 2's "walk from `source.shortenedFiles[0].folder`"
/// starting point using this.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ShortenedFile {
    pub folder: PathBuf,
    pub relative_path: PathBuf,
}

impl ShortenedFile {
    pub fn full_path(&self) -> PathBuf {
        self.folder.join(&self.relative_path)
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct LibrarySource {
    pub lib_name: LibraryName,
    pub version: String,
    pub folder: PathBuf,
    /// For the stdlib source, the exact file list to read (§4.4 step 2:
    /// "for stdlib, only the files it carries"). For any other source,
    /// the library's declared types entry point(s), used only to seed
    /// the walk's starting folder — the walk itself still enumerates
    /// every declaration file under that folder.
    pub shortened_files: Vec<ShortenedFile>,
    pub is_stdlib: bool,
}

impl LibrarySource {
    pub fn new(lib_name: LibraryName, version: impl Into<String>, folder: PathBuf) -> Self {
        LibrarySource {
            lib_name,
            version: version.into(),
            folder,
            shortened_files: Vec::new(),
            is_stdlib: false,
        }
    }

    pub fn stdlib(folder: PathBuf, files: Vec<PathBuf>, version: impl Into<String>) -> Self {
        let shortened_files = files
            .into_iter()
            .map(|relative_path| ShortenedFile { folder: folder.clone(), relative_path })
            .collect();
        LibrarySource {
            lib_name: LibraryName::unscoped("std"),
            version: version.into(),
            folder,
            shortened_files,
            is_stdlib: true,
        }
    }

    pub fn with_shortened_files(mut self, files: Vec<ShortenedFile>) -> Self {
        self.shortened_files = files;
        self
    }

    /// The starting folder for the declaration-file walk (§4.4 step 2):
    /// the first shortened file's folder if one is known, else the
    /// library's own folder.
    pub fn walk_root(&self) -> PathBuf {
        self.shortened_files
            .first()
            .map(|f| f.folder.clone())
            .unwrap_or_else(|| self.folder.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_root_prefers_the_first_shortened_file_folder() {
        let source = LibrarySource::new(LibraryName::unscoped("lodash"), "4.0.0", PathBuf::from("/nm/lodash"))
            .with_shortened_files(vec![ShortenedFile {
                folder: PathBuf::from("/nm/lodash/types"),
                relative_path: PathBuf::from("index.d.ts"),
            }]);
        assert_eq!(source.walk_root(), PathBuf::from("/nm/lodash/types"));
    }

    #[test]
    fn walk_root_falls_back_to_the_library_folder() {
        let source = LibrarySource::new(LibraryName::unscoped("lodash"), "4.0.0", PathBuf::from("/nm/lodash"));
        assert_eq!(source.walk_root(), PathBuf::from("/nm/lodash"));
    }
}
