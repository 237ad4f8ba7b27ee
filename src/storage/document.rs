use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    domain::{Entry, title_from_text},
    storage::relative_link,
};

/// A markdown document found under the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Location of the file, rooted where the source directory is.
    path: PathBuf,

    /// Path below the source directory, joined with `/`.
    relative: String,
}

impl Document {
    /// Creates a document from its path and its `/`-joined path relative to
    /// the source directory.
    #[must_use]
    pub const fn new(path: PathBuf, relative: String) -> Self {
        Self { path, relative }
    }

    /// The document's location on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The document's path relative to the source directory.
    #[must_use]
    pub fn relative_path(&self) -> &str {
        &self.relative
    }

    /// Directory segments between the source directory and the file.
    #[must_use]
    pub fn directories(&self) -> Vec<String> {
        let mut segments: Vec<String> = self.relative.split('/').map(str::to_string).collect();
        segments.pop();
        segments
    }

    /// The file name without its last extension.
    #[must_use]
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Derives the document's display title.
    ///
    /// Invalid UTF-8 is replaced rather than rejected. Falls back to the
    /// file stem when the file cannot be read or has no visible content.
    #[must_use]
    pub fn title(&self) -> String {
        match fs::read(&self.path) {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                title_from_text(&text).map_or_else(|| self.stem(), str::to_string)
            }
            Err(e) => {
                tracing::debug!("Failed to read {}: {e}", self.path.display());
                self.stem()
            }
        }
    }

    /// Builds the index entry for this document, linking from `target_dir`.
    #[must_use]
    pub fn entry(&self, target_dir: &Path) -> Entry {
        Entry::new(
            self.title(),
            relative_link(target_dir, &self.path),
            self.directories(),
        )
    }
}
