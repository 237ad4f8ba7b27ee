//! Relative links between absolute paths.

use std::path::{Component, Path};

/// Computes the link from directory `from_dir` to `to`, joined with `/`.
///
/// Both paths are expected to be absolute and free of `.`/`..` segments, as
/// produced by [`std::fs::canonicalize`]. Segments of `from_dir` that are not
/// shared with `to` become `..`. If the paths share no root (different
/// drives on Windows), the absolute path of `to` is returned instead.
#[must_use]
pub fn relative_link(from_dir: &Path, to: &Path) -> String {
    let from: Vec<Component<'_>> = from_dir.components().collect();
    let target: Vec<Component<'_>> = to.components().collect();

    let common = from
        .iter()
        .zip(&target)
        .take_while(|(a, b)| a == b)
        .count();

    if common == 0 {
        return to.to_string_lossy().replace('\\', "/");
    }

    let segments: Vec<String> = std::iter::repeat_n("..".to_string(), from.len() - common)
        .chain(
            target[common..]
                .iter()
                .map(|component| component.as_os_str().to_string_lossy().into_owned()),
        )
        .collect();

    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}
