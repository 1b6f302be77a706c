use anyhow::{Context, Result};
#[cfg(test)]
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::RwLock;

/// Trait for filesystem operations to enable testing with mocks
///
/// State files are opaque blobs, so writes deal in bytes.
pub trait FileSystem: Send + Sync {
    /// Write bytes to a file, replacing any previous content
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;

    /// Create directory and all parent directories
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    fn is_dir(&self, path: &Path) -> bool;

    /// Direct children of a directory
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// Real filesystem implementation using std::fs
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        std::fs::write(path, contents).with_context(|| format!("Failed to write file: {:?}", path))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {:?}", path))
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)
            .with_context(|| format!("Failed to read directory: {:?}", path))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            paths.push(entry.path());
        }

        Ok(paths)
    }
}

/// Mock filesystem implementation for testing (in-memory)
#[cfg(test)]
pub struct MockFileSystem {
    files: RwLock<HashMap<PathBuf, Vec<u8>>>,
    directories: RwLock<HashSet<PathBuf>>,
}

#[cfg(test)]
impl MockFileSystem {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            directories: RwLock::new(HashSet::new()),
        }
    }

    /// Register a directory (and its ancestors) without going through the trait
    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        let mut directories = self.directories.write().unwrap();
        for ancestor in path.ancestors() {
            directories.insert(ancestor.to_path_buf());
        }
    }

    /// Seed a file, creating its parent directories
    pub fn add_file(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.files.write().unwrap().insert(path, contents.into());
    }

    pub fn get_file_contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.read().unwrap().get(path).cloned()
    }

    pub fn has_file(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
    }
}

#[cfg(test)]
impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl FileSystem for MockFileSystem {
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let parent_exists = path
            .parent()
            .map(|parent| self.is_dir(parent))
            .unwrap_or(true);
        if !parent_exists {
            anyhow::bail!("Parent directory missing in mock filesystem: {:?}", path);
        }

        self.files
            .write()
            .unwrap()
            .insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.add_dir(path);
        Ok(())
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.directories.read().unwrap().contains(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if !self.is_dir(path) {
            anyhow::bail!("Directory not found in mock filesystem: {:?}", path);
        }

        let files = self.files.read().unwrap();
        let directories = self.directories.read().unwrap();

        let entries = files
            .keys()
            .chain(directories.iter())
            .filter(|entry| entry.parent() == Some(path))
            .cloned()
            .collect();

        Ok(entries)
    }
}
