//! Patch set loading
//!
//! Walks a game's patch source directory into an ordered set of
//! (relative path, content, checksum) entries. The set only lives for the
//! duration of an apply and is never persisted.

use patcher_fs::compute_checksum;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path};
use walkdir::WalkDir;

use crate::{Error, Result};

/// One file shipped by a patch set.
#[derive(Debug, Clone)]
pub struct PatchFile {
    pub content: Vec<u8>,
    pub checksum: String,
}

impl PatchFile {
    pub fn new(content: Vec<u8>) -> Self {
        let checksum = compute_checksum(&content);
        Self { content, checksum }
    }
}

/// The files to overlay for one game, keyed by `/`-separated relative path.
#[derive(Debug, Clone, Default)]
pub struct PatchSet {
    files: BTreeMap<String, PatchFile>,
}

impl PatchSet {
    /// Load every file under `source` as a patch entry.
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be walked, a file cannot be read, or
    /// an entry's relative path would escape the target directory.
    pub fn load(source: &Path) -> Result<Self> {
        let mut files = BTreeMap::new();

        for entry in WalkDir::new(source).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(source).to_path_buf();
                Error::io(path, e.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(source)
                .map_err(|_| Error::UnsafePath {
                    path: entry.path().display().to_string(),
                })?;
            let relative = normalize_relative(relative)?;

            let content =
                fs::read(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
            tracing::debug!(path = %relative, bytes = content.len(), "loaded patch entry");
            files.insert(relative, PatchFile::new(content));
        }

        Ok(Self { files })
    }

    /// Build a patch set from in-memory entries.
    pub fn from_entries<I, P, C>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<Vec<u8>>,
    {
        let files = entries
            .into_iter()
            .map(|(path, content)| (path.into(), PatchFile::new(content.into())))
            .collect();
        Self { files }
    }

    /// Entries in sorted relative-path order.
    pub fn files(&self) -> &BTreeMap<String, PatchFile> {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

/// Convert a relative path to the canonical `/`-separated form, rejecting
/// anything that could step outside the target directory.
fn normalize_relative(relative: &Path) -> Result<String> {
    let mut parts: Vec<&str> = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| Error::UnsafePath {
                    path: relative.display().to_string(),
                })?;
                parts.push(part);
            }
            _ => {
                return Err(Error::UnsafePath {
                    path: relative.display().to_string(),
                });
            }
        }
    }
    if parts.is_empty() {
        return Err(Error::UnsafePath {
            path: relative.display().to_string(),
        });
    }
    Ok(parts.join("/"))
}
