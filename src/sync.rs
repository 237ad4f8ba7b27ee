//! Regenerates the index in the target file.
//!
//! [`run`] wires discovery, rendering and marker substitution together for a
//! single invocation, reporting the result as an [`Outcome`].

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::instrument;

use crate::{
    domain::{Config, ConfigError, MarkersNotFound, render_list, replace_between_markers},
    storage::{discover, sort_documents},
};

/// What a successful run did to the target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The target file already held the current index.
    Unchanged,

    /// The target file was rewritten.
    Updated(PathBuf),

    /// The target file is stale, but was left untouched (check mode).
    OutOfDate(PathBuf),
}

impl Outcome {
    /// The process exit status for this outcome.
    ///
    /// A rewritten file exits with `1` unless `fail_on_change` is `false`. A
    /// stale file in check mode always exits with `1`.
    #[must_use]
    pub fn exit_code(&self, fail_on_change: bool) -> u8 {
        match self {
            Self::Unchanged => 0,
            Self::Updated(_) => u8::from(fail_on_change),
            Self::OutOfDate(_) => 1,
        }
    }
}

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The source directory does not exist.
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The target file does not exist.
    #[error("Target file not found: {}", .0.display())]
    TargetNotFound(PathBuf),

    /// The target file lacks the start or end marker.
    #[error(transparent)]
    Markers(#[from] MarkersNotFound),

    /// The configuration file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reading or writing the target file failed.
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
}

impl SyncError {
    /// The process exit status for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::SourceNotFound(_) | Self::TargetNotFound(_) | Self::Config(_) => 2,
            Self::Markers(_) => 3,
            Self::Io { .. } => 1,
        }
    }
}

/// Regenerates the index between the markers of the configured target file.
///
/// Relative paths in `config` are resolved against `root`, normally the
/// current working directory. In check mode the target file is never
/// written.
///
/// # Errors
///
/// - [`SyncError::SourceNotFound`] or [`SyncError::TargetNotFound`] if either
///   path does not exist
/// - [`SyncError::Markers`] if the target file lacks the markers
/// - [`SyncError::Io`] if the target file cannot be read or written
#[instrument(level = "debug", skip(config))]
pub fn run(root: &Path, config: &Config) -> Result<Outcome, SyncError> {
    let src_dir = resolve(root, config.src_dir()).map_err(SyncError::SourceNotFound)?;
    let target_file = resolve(root, config.target_file()).map_err(SyncError::TargetNotFound)?;

    let fragment = render_index(&src_dir, &target_file, config);

    let bytes = fs::read(&target_file).map_err(|source| SyncError::Io {
        path: target_file.clone(),
        source,
    })?;
    let original = String::from_utf8_lossy(&bytes);

    let replacement = replace_between_markers(
        &original,
        config.marker_start(),
        config.marker_end(),
        &fragment,
    )?;

    if !replacement.changed {
        tracing::debug!("{} is up to date", target_file.display());
        return Ok(Outcome::Unchanged);
    }

    if config.check() {
        return Ok(Outcome::OutOfDate(target_file));
    }

    fs::write(&target_file, replacement.content).map_err(|source| SyncError::Io {
        path: target_file.clone(),
        source,
    })?;
    tracing::info!("Rewrote index in {}", target_file.display());

    Ok(Outcome::Updated(target_file))
}

/// Renders the index of `src_dir` with links relative to `target_file`.
///
/// Both paths should be absolute and canonical, so that links are computed
/// between real locations.
#[must_use]
pub fn render_index(src_dir: &Path, target_file: &Path, config: &Config) -> String {
    let mut documents = discover(src_dir, config.exclude(), config.extensions());
    sort_documents(&mut documents, config.sort());
    tracing::info!(
        "Found {} documents in {}",
        documents.len(),
        src_dir.display()
    );

    let target_dir = target_file.parent().unwrap_or(target_file);
    let entries: Vec<_> = documents
        .iter()
        .map(|document| document.entry(target_dir))
        .collect();

    render_list(&entries, config)
}

/// Joins `path` onto `root` and canonicalizes it, returning the joined path
/// as the error if it does not exist.
fn resolve(root: &Path, path: &Path) -> Result<PathBuf, PathBuf> {
    let joined = root.join(path);
    joined.canonicalize().map_err(|e| {
        tracing::debug!("Cannot resolve {}: {e}", joined.display());
        joined
    })
}
