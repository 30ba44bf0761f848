//! Filesystem contract (§6.2). A minimal read/write interface; walking a
//! real node_modules tree and parsing TypeScript itself stay external
//! collaborators reached only through this trait and the parser contract
//! in `decl-tree`.

use std::path::{Path, PathBuf};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    New,
    Changed,
    Unchanged,
}

pub trait Fs: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
    fn read_bytes(&self, path: &Path) -> std::io::Result<Vec<u8>>;
    fn read_utf8(&self, path: &Path) -> std::io::Result<String>;
    fn write_bytes_if_changed(&self, path: &Path, bytes: &[u8]) -> std::io::Result<WriteOutcome>;
    fn mkdirs(&self, path: &Path) -> std::io::Result<()>;
    /// Yields regular files only, recursively, skipping common scratch dirs.
    fn walk(&self, dir: &Path) -> std::io::Result<Vec<PathBuf>>;
}

/// Directory names skipped during any filesystem walk.
pub const IGNORED_DIR_NAMES: &[&str] = &[".idea", "target", ".git"];

pub fn is_ignored_dir_name(name: &str) -> bool {
    IGNORED_DIR_NAMES.contains(&name)
}

pub struct RealFs;

impl Fs for RealFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_bytes(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn read_utf8(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_bytes_if_changed(&self, path: &Path, bytes: &[u8]) -> std::io::Result<WriteOutcome> {
        if let Ok(existing) = std::fs::read(path) {
            if existing == bytes {
                return Ok(WriteOutcome::Unchanged);
            }
            std::fs::write(path, bytes)?;
            return Ok(WriteOutcome::Changed);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        Ok(WriteOutcome::New)
    }

    fn mkdirs(&self, path: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn walk(&self, dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        let walker = walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.file_type().is_file()
                    || !entry
                        .file_name()
                        .to_str()
                        .is_some_and(is_ignored_dir_name)
            });
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() {
                out.push(entry.into_path());
            }
        }
        Ok(out)
    }
}

/// An in-memory filesystem for tests, keyed by normalized path string.
#[derive(Default)]
pub struct MemFs {
    files: std::sync::Mutex<std::collections::BTreeMap<String, Vec<u8>>>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(path.into(), contents.into());
        self
    }

    fn key(path: &Path) -> String {
        path.to_string_lossy().replace('\\', "/")
    }
}

impl Fs for MemFs {
    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(&Self::key(path))
    }

    fn read_bytes(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(&Self::key(path))
            .cloned()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "not found"))
    }

    fn read_utf8(&self, path: &Path) -> std::io::Result<String> {
        let bytes = self.read_bytes(path)?;
        String::from_utf8(bytes)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    fn write_bytes_if_changed(&self, path: &Path, bytes: &[u8]) -> std::io::Result<WriteOutcome> {
        let mut files = self.files.lock().unwrap();
        let key = Self::key(path);
        match files.get(&key) {
            Some(existing) if existing == bytes => Ok(WriteOutcome::Unchanged),
            Some(_) => {
                files.insert(key, bytes.to_vec());
                Ok(WriteOutcome::Changed)
            }
            None => {
                files.insert(key, bytes.to_vec());
                Ok(WriteOutcome::New)
            }
        }
    }

    fn mkdirs(&self, _path: &Path) -> std::io::Result<()> {
        Ok(())
    }

    fn walk(&self, dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        let prefix = Self::key(dir);
        let files = self.files.lock().unwrap();
        let mut out: Vec<PathBuf> = files
            .keys()
            .filter(|k| k.starts_with(&prefix))
            .map(PathBuf::from)
            .collect();
        out.sort();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_fs_round_trips_writes() {
        let fs = MemFs::new();
        let path = Path::new("/lib/a.d.ts");
        assert_eq!(
            fs.write_bytes_if_changed(path, b"hello").unwrap(),
            WriteOutcome::New
        );
        assert_eq!(
            fs.write_bytes_if_changed(path, b"hello").unwrap(),
            WriteOutcome::Unchanged
        );
        assert_eq!(
            fs.write_bytes_if_changed(path, b"world").unwrap(),
            WriteOutcome::Changed
        );
    }

    #[test]
    fn ignored_dir_names_are_recognized() {
        assert!(is_ignored_dir_name("target"));
        assert!(!is_ignored_dir_name("src"));
    }
}
