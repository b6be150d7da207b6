//! Directory catalog: the ordered list of tracks for one playout pass.
//!
//! The directory is re-read on every pass so files added or removed between
//! passes are picked up. Entries are sorted by file name, which keeps the
//! order stable within a pass and predictable across passes.

use std::path::PathBuf;

use crate::common::PlayoutError;

/// One directory entry as seen at enumeration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub path: PathBuf,
    pub is_file: bool,
}

impl CatalogEntry {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_file: true,
        }
    }

    /// Only regular files are streamed; directories and other entries are skipped.
    pub fn is_regular_file(&self) -> bool {
        self.is_file
    }
}

pub trait Catalog: Send + Sync {
    /// Lists the current catalog in playout order.
    fn entries(&self) -> Result<Vec<CatalogEntry>, PlayoutError>;

    /// Regular files only, in playout order.
    fn tracks(&self) -> Result<Vec<PathBuf>, PlayoutError> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(CatalogEntry::is_regular_file)
            .map(|e| e.path)
            .collect())
    }
}

/// Catalog backed by a directory on the local filesystem.
pub struct DirCatalog {
    root: PathBuf,
}

impl DirCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn catalog_error(&self, source: std::io::Error) -> PlayoutError {
        PlayoutError::Catalog {
            path: self.root.clone(),
            source,
        }
    }
}

impl Catalog for DirCatalog {
    fn entries(&self) -> Result<Vec<CatalogEntry>, PlayoutError> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&self.root).map_err(|e| self.catalog_error(e))? {
            let entry = entry.map_err(|e| self.catalog_error(e))?;
            // Follows symlinks, so a link to a file counts as a file.
            let is_file = std::fs::metadata(entry.path())
                .map(|m| m.is_file())
                .unwrap_or(false);
            entries.push(CatalogEntry {
                path: entry.path(),
                is_file,
            });
        }
        entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        Ok(entries)
    }
}
