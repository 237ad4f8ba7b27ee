//! Markdown index generation for decision records
//!
//! Documents are markdown files stored in a directory. Their titles are
//! rendered as a link list and spliced into a target file between two
//! sentinel markers.

pub mod domain;
pub use domain::{
    Config, ConfigError, ExcludePattern, GroupBy, MarkersNotFound, Overrides, Replacement,
    SortOrder, TitleCase,
};

/// Filesystem discovery and document loading.
pub mod storage;
pub use storage::{Document, discover};

pub mod sync;
pub use sync::{Outcome, SyncError};
