//! Resource access
//!
//! The provider only ever lists folders and reads whole files. Keeping that
//! behind a trait lets tests run against an in-memory tree.

use crate::error::{LinkError, LinkResult};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Read-only access to folders and files
pub trait ResourceProvider {
    /// List the files directly inside `folder`
    fn list_children(&self, folder: &Path) -> LinkResult<Vec<PathBuf>>;

    /// Read the full contents of `path`
    fn read_bytes(&self, path: &Path) -> LinkResult<Vec<u8>>;
}

/// Resource provider backed by the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct PhysicalResourceProvider;

impl ResourceProvider for PhysicalResourceProvider {
    fn list_children(&self, folder: &Path) -> LinkResult<Vec<PathBuf>> {
        let entries = fs::read_dir(folder)
            .map_err(|e| LinkError::io(format!("listing {}", folder.display()), e))?;

        let mut children = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| LinkError::io(format!("listing {}", folder.display()), e))?;
            children.push(entry.path());
        }
        children.sort();
        Ok(children)
    }

    fn read_bytes(&self, path: &Path) -> LinkResult<Vec<u8>> {
        fs::read(path).map_err(|e| LinkError::io(format!("reading {}", path.display()), e))
    }
}

/// In-memory file tree
///
/// Folders exist implicitly as ancestors of the files added to the tree.
#[derive(Debug, Clone, Default)]
pub struct MemoryResourceProvider {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemoryResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace the file at `path`
    pub fn write_file(&mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }

    pub fn remove_file(&mut self, path: &Path) -> bool {
        self.files.remove(path).is_some()
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(io::ErrorKind::NotFound, path.display().to_string())
    }
}

impl ResourceProvider for MemoryResourceProvider {
    fn list_children(&self, folder: &Path) -> LinkResult<Vec<PathBuf>> {
        let mut exists = false;
        let mut children = Vec::new();

        for path in self.files.keys() {
            if path.starts_with(folder) {
                exists = true;
                if path.parent() == Some(folder) {
                    children.push(path.clone());
                }
            }
        }

        if !exists {
            return Err(LinkError::io(
                format!("listing {}", folder.display()),
                Self::not_found(folder),
            ));
        }
        Ok(children)
    }

    fn read_bytes(&self, path: &Path) -> LinkResult<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            LinkError::io(format!("reading {}", path.display()), Self::not_found(path))
        })
    }
}
