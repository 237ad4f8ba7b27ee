use std::{collections::HashMap, num::NonZeroUsize};

use crate::domain::{Config, GroupBy, TitleCase};

/// Heading shown for documents placed directly in the source directory.
const UNGROUPED_LABEL: &str = "Misc";

/// A document as it appears in the generated index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    title: String,
    link: String,
    directories: Vec<String>,
}

impl Entry {
    /// Creates an entry.
    ///
    /// `directories` are the directory segments between the source directory
    /// and the document, outermost first. They determine the entry's group.
    #[must_use]
    pub const fn new(title: String, link: String, directories: Vec<String>) -> Self {
        Self {
            title,
            link,
            directories,
        }
    }

    /// The document's display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The link to the document, relative to the target file's directory.
    #[must_use]
    pub fn link(&self) -> &str {
        &self.link
    }

    /// Renders the entry as a markdown list item.
    ///
    /// Square brackets in the title are escaped so they cannot terminate the
    /// link text.
    #[must_use]
    pub fn list_item(&self) -> String {
        let title = self.title.replace('[', "\\[").replace(']', "\\]");
        format!("- [{title}]({})", self.link)
    }
}

/// Computes the group key of a document from its directory segments.
///
/// The key is the first `depth` segments joined with `/`, or the empty string
/// for documents with no directory segments.
#[must_use]
pub fn group_key(directories: &[String], depth: NonZeroUsize) -> String {
    directories
        .iter()
        .take(depth.get())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("/")
}

/// Renders the markdown fragment inserted between the markers.
///
/// `entries` must already be in the configured sort order; that order is
/// kept in the flat list and within each group.
#[must_use]
pub fn render_list(entries: &[Entry], config: &Config) -> String {
    match config.group_by() {
        GroupBy::None => render_flat(entries),
        GroupBy::Subdir => render_grouped(
            entries,
            config.group_depth(),
            config.group_heading_level(),
            config.group_title_case(),
        ),
    }
}

fn render_flat(entries: &[Entry]) -> String {
    entries
        .iter()
        .map(|entry| entry.list_item() + "\n")
        .collect()
}

fn render_grouped(
    entries: &[Entry],
    depth: NonZeroUsize,
    heading_level: NonZeroUsize,
    case: TitleCase,
) -> String {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&Entry>)> = Vec::new();
    for entry in entries {
        let key = group_key(&entry.directories, depth);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(entry);
    }

    // Ungrouped documents come last. The sort is stable, so keys differing
    // only in case keep their first-seen order.
    groups.sort_by_cached_key(|(key, _)| (key.is_empty(), key.to_lowercase()));

    let hashes = "#".repeat(heading_level.get());
    let mut lines = Vec::new();
    for (key, members) in &groups {
        let label = if key.is_empty() {
            UNGROUPED_LABEL.to_string()
        } else {
            case.apply(key)
        };
        lines.push(format!("{hashes} {label}"));
        lines.extend(members.iter().map(|entry| entry.list_item()));
        lines.push(String::new());
    }

    let rendered = lines.join("\n");
    let trimmed = rendered.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}
