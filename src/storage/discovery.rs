//! Recursive discovery of documents under the source directory.

use std::{path::Path, time::SystemTime};

use tracing::instrument;
use walkdir::WalkDir;

use crate::{
    domain::{ExcludePattern, SortOrder},
    storage::Document,
};

/// Finds every document under `src_dir`.
///
/// A file qualifies when its extension, without the leading dot, is one of
/// `extensions` and its forward-slash path relative to `src_dir` matches
/// none of the `exclude` patterns. Entries that cannot be traversed are
/// skipped. The walk visits directory entries in file-name order; callers
/// impose the final order with [`sort_documents`].
#[must_use]
#[instrument(level = "debug", skip(exclude, extensions))]
pub fn discover(src_dir: &Path, exclude: &[ExcludePattern], extensions: &[String]) -> Vec<Document> {
    WalkDir::new(src_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| {
            entry
                .map_err(|e| tracing::debug!("Skipping unreadable entry: {e}"))
                .ok()
        })
        .filter(|entry| entry.depth() > 0 && entry.path().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| has_extension(path, extensions))
        .filter_map(|path| {
            let relative = relative_to(&path, src_dir)?;
            if let Some(pattern) = exclude.iter().find(|p| p.is_match(&relative)) {
                tracing::debug!("Excluding {relative} (matches {pattern})");
                return None;
            }
            Some(Document::new(path, relative))
        })
        .collect()
}

/// Sorts documents in place.
///
/// The sort is stable. Name and path comparisons ignore case. Modification
/// time ties, and files whose metadata cannot be read (treated as the epoch),
/// are ordered by name.
pub fn sort_documents(documents: &mut [Document], order: SortOrder) {
    match order {
        SortOrder::Name => documents.sort_by_cached_key(name_key),
        SortOrder::Path => {
            documents.sort_by_cached_key(|d| d.path().to_string_lossy().to_lowercase());
        }
        SortOrder::Mtime => documents.sort_by_cached_key(|d| (modified(d.path()), name_key(d))),
    }
}

fn name_key(document: &Document) -> String {
    document
        .path()
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn modified(path: &Path) -> SystemTime {
    path.metadata()
        .and_then(|metadata| metadata.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|accepted| accepted == ext))
}

/// The path of `path` below `root`, joined with `/`.
fn relative_to(path: &Path, root: &Path) -> Option<String> {
    let segments: Vec<String> = path
        .strip_prefix(root)
        .ok()?
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeSet, fs, time::Duration};

    use tempfile::TempDir;

    use super::*;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn md() -> Vec<String> {
        vec!["md".to_string(), "MD".to_string()]
    }

    fn relative_paths(documents: &[Document]) -> Vec<&str> {
        documents.iter().map(Document::relative_path).collect()
    }

    #[test]
    fn excludes_matching_patterns() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "keep.md", "# Keep");
        write(tmp.path(), "archive/old.md", "# Old");

        let exclude = vec!["archive/**".parse().unwrap()];
        let documents = discover(tmp.path(), &exclude, &md());

        let names: BTreeSet<_> = documents
            .iter()
            .map(|d| d.path().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert!(names.contains("keep.md"));
        assert!(!names.contains("old.md"));
    }

    #[test]
    fn dot_slash_patterns_match_relative_paths() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "keep.md", "");
        write(tmp.path(), "drafts/wip.md", "");

        let exclude = vec!["./drafts/*".parse().unwrap()];
        let documents = discover(tmp.path(), &exclude, &md());

        assert_eq!(relative_paths(&documents), ["keep.md"]);
    }

    #[test]
    fn filters_by_exact_extension() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.md", "");
        write(tmp.path(), "b.MD", "");
        write(tmp.path(), "c.Md", "");
        write(tmp.path(), "d.txt", "");
        write(tmp.path(), "README", "");

        let documents = discover(tmp.path(), &[], &["md".to_string()]);
        assert_eq!(relative_paths(&documents), ["a.md"]);

        let documents = discover(tmp.path(), &[], &md());
        assert_eq!(relative_paths(&documents), ["a.md", "b.MD"]);
    }

    #[test]
    fn walks_nested_directories_with_forward_slashes() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "db/legacy/001.md", "");
        write(tmp.path(), "api/002.md", "");

        let documents = discover(tmp.path(), &[], &md());

        assert_eq!(
            relative_paths(&documents),
            ["api/002.md", "db/legacy/001.md"]
        );
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        assert!(discover(tmp.path(), &[], &md()).is_empty());
    }

    #[test]
    fn missing_directory_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        assert!(discover(&tmp.path().join("missing"), &[], &md()).is_empty());
    }

    #[test]
    fn sorts_by_name_ignoring_case_and_directories() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "z/a.md", "");
        write(tmp.path(), "B.md", "");
        write(tmp.path(), "c.md", "");

        let mut documents = discover(tmp.path(), &[], &md());
        sort_documents(&mut documents, SortOrder::Name);

        assert_eq!(relative_paths(&documents), ["z/a.md", "B.md", "c.md"]);
    }

    #[test]
    fn sorts_by_full_path() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "z/a.md", "");
        write(tmp.path(), "B.md", "");
        write(tmp.path(), "c.md", "");

        let mut documents = discover(tmp.path(), &[], &md());
        sort_documents(&mut documents, SortOrder::Path);

        assert_eq!(relative_paths(&documents), ["B.md", "c.md", "z/a.md"]);
    }

    #[test]
    fn sorts_by_modification_time() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.md", "");
        write(tmp.path(), "b.md", "");
        write(tmp.path(), "c.md", "");

        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        for (name, offset) in [("a.md", 30), ("b.md", 10), ("c.md", 20)] {
            let file = fs::File::options()
                .write(true)
                .open(tmp.path().join(name))
                .unwrap();
            file.set_modified(base + Duration::from_secs(offset)).unwrap();
        }

        let mut documents = discover(tmp.path(), &[], &md());
        sort_documents(&mut documents, SortOrder::Mtime);

        assert_eq!(relative_paths(&documents), ["b.md", "c.md", "a.md"]);
    }
}
