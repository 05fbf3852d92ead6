//! Durable key-value storage for layout snapshots

use nest_core::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key-value storage a snapshot is written to
pub trait LayoutStore {
    /// Stored content for `key`, if any
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the content stored under `key`
    fn write(&mut self, key: &str, content: &str) -> Result<()>;
}

/// One `<key>.toml` file per key under a root directory
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a file store rooted at the given directory
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.toml", key))
    }
}

impl LayoutStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&mut self, key: &str, content: &str) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.path_for(key), content)?;
        Ok(())
    }
}

/// In-memory store, counting writes
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `write` calls that reached the store
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl LayoutStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, content: &str) -> Result<()> {
        self.entries.insert(key.to_string(), content.to_string());
        self.writes += 1;
        Ok(())
    }
}
