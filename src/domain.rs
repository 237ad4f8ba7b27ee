//! Domain models for index generation.
//!
//! Everything in this module is free of I/O apart from loading the
//! configuration file. Title extraction, rendering and marker substitution
//! operate on strings only.

/// Resolved configuration and the option enums it is built from.
pub mod config;
pub use config::{Config, ConfigError, ExcludePattern, GroupBy, Overrides, SortOrder, TitleCase};

/// Substitution of generated content between sentinel markers.
pub mod markers;
pub use markers::{MarkersNotFound, Replacement, replace_between_markers};

/// Markdown rendering of link lists and groups.
pub mod render;
pub use render::{Entry, group_key, render_list};

/// Title extraction from document text.
pub mod title;
pub use title::{first_heading, title_from_text};
