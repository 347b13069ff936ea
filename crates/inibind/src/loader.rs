//! Where included files come from.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Reads include targets.
pub trait Loader {
    /// Canonical identity of `path`, used to detect include cycles.
    fn identify(&self, path: &Path) -> io::Result<PathBuf>;

    fn load(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl Loader for FsLoader {
    fn identify(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }

    fn load(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// In-memory files keyed by normalized path.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        self.files.insert(normalize(path.as_ref()), contents.into());
    }
}

impl Loader for MemoryLoader {
    fn identify(&self, path: &Path) -> io::Result<PathBuf> {
        let path = normalize(path);
        if self.files.contains_key(&path) {
            Ok(path)
        } else {
            Err(not_found(&path))
        }
    }

    fn load(&self, path: &Path) -> io::Result<Vec<u8>> {
        let path = normalize(path);
        self.files.get(&path).cloned().ok_or_else(|| not_found(&path))
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file: {}", path.display()),
    )
}

/// Resolve `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_loader_normalizes() {
        let loader = MemoryLoader::new().with_file("/etc/app/main.ini", "a = 1");
        let id = loader.identify(Path::new("/etc/app/conf.d/../main.ini")).unwrap();
        assert_eq!(id, Path::new("/etc/app/main.ini"));
        assert_eq!(loader.load(Path::new("/etc/./app/main.ini")).unwrap(), b"a = 1");
    }

    #[test]
    fn test_memory_loader_missing() {
        let loader = MemoryLoader::new();
        let err = loader.identify(Path::new("/nope.ini")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("/nope.ini"));
    }
}
