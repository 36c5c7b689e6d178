//! Module source loading.
//!
//! The linker only needs "path to source text"; where the text comes from is
//! up to the [`ModuleLoader`].

use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};

use rustc_hash::FxHashMap;

pub trait ModuleLoader {
    fn load(&self, path: &Path) -> io::Result<String>;
}

/// Reads modules from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileLoader;

impl ModuleLoader for FileLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// Serves modules from memory, keyed by normalised path.
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    files: FxHashMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        MemoryLoader::default()
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, source: impl Into<String>) {
        self.files.insert(normalize(path.as_ref()), source.into());
    }

    pub fn with_module(mut self, path: impl AsRef<Path>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }
}

impl ModuleLoader for MemoryLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        self.files.get(&normalize(path)).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no module at {}", path.display()),
            )
        })
    }
}

/// Joins `path` against the directory of `importer`.
pub fn resolve_path(importer: &Path, path: &str) -> PathBuf {
    let base = importer.parent().unwrap_or_else(|| Path::new(""));
    normalize(&base.join(path))
}

/// Removes `.` and folds `..` lexically without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last_is_normal = matches!(result.components().next_back(), Some(Component::Normal(_)));
                if last_is_normal {
                    result.pop();
                } else {
                    result.push("..");
                }
            }
            other => result.push(other.as_os_str()),
        }
    }

    result
}
