/// The result of splicing generated content between two markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// The full content after substitution.
    pub content: String,

    /// Whether `content` differs from the original input.
    pub changed: bool,
}

/// The start marker, or an end marker following it, is missing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Markers not found. Ensure both markers exist in target file: {start} … {end}")]
pub struct MarkersNotFound {
    /// The start marker searched for.
    pub start: String,
    /// The end marker searched for.
    pub end: String,
}

/// Replaces everything between `start` and the next `end` with `replacement`.
///
/// The first occurrence of `start` is used, together with the first
/// occurrence of `end` after it. The start marker is followed by a newline
/// and then `replacement`. Content outside the markers is preserved
/// verbatim.
///
/// # Errors
///
/// Returns [`MarkersNotFound`] if `content` has no `start` marker, or no `end`
/// marker after it.
pub fn replace_between_markers(
    content: &str,
    start: &str,
    end: &str,
    replacement: &str,
) -> Result<Replacement, MarkersNotFound> {
    let not_found = || MarkersNotFound {
        start: start.to_string(),
        end: end.to_string(),
    };

    let start_at = content.find(start).ok_or_else(not_found)?;
    let inner_at = start_at + start.len();
    let end_at = content[inner_at..]
        .find(end)
        .map(|offset| inner_at + offset)
        .ok_or_else(not_found)?;
    let after = &content[end_at + end.len()..];

    let mut updated = String::with_capacity(
        start_at + start.len() + 1 + replacement.len() + end.len() + after.len(),
    );
    updated.push_str(&content[..start_at]);
    updated.push_str(start);
    updated.push('\n');
    updated.push_str(replacement);
    updated.push_str(end);
    updated.push_str(after);

    let changed = updated != content;
    Ok(Replacement {
        content: updated,
        changed,
    })
}
