use std::sync::LazyLock;

use regex::Regex;

/// A line holding a single `#`, whitespace and some text.
static FIRST_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*#[ \t]+(.+?)\s*$").expect("heading pattern is valid")
});

/// Finds the text of the first top-level heading anywhere in `text`.
///
/// Deeper headings (`##`, `###`, ...) are ignored. Returns `None` if there is
/// no such heading or its text is blank.
#[must_use]
pub fn first_heading(text: &str) -> Option<&str> {
    FIRST_HEADING
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|heading| heading.as_str().trim())
        .filter(|heading| !heading.is_empty())
}

/// Derives a display title from document text.
///
/// The first top-level heading wins, then the first non-blank line. Returns
/// `None` for documents with no visible content, in which case callers fall
/// back to the file name.
#[must_use]
pub fn title_from_text(text: &str) -> Option<&str> {
    first_heading(text).or_else(|| text.lines().map(str::trim).find(|line| !line.is_empty()))
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("# Title A\nBody", Some("Title A"); "heading on first line")]
    #[test_case("intro\n\n# Later Heading  \nbody", Some("Later Heading"); "heading after prose")]
    #[test_case("   #\tIndented\n", Some("Indented"); "indented heading with tab")]
    #[test_case("## Second level\n# First level", Some("First level"); "skips deeper headings")]
    #[test_case("#NoSpace\n", None; "requires whitespace after hash")]
    #[test_case("# Windows\r\nbody", Some("Windows"); "crlf line endings")]
    #[test_case("", None; "empty text")]
    fn heading_extraction(text: &str, expected: Option<&str>) {
        assert_eq!(first_heading(text), expected);
    }

    #[test_case("# Title A\nBody", Some("Title A"); "uses heading")]
    #[test_case("No h1 here\nBut first non-empty line", Some("No h1 here"); "first line fallback")]
    #[test_case("\n   \n  Indented prose  \nmore", Some("Indented prose"); "skips blank lines")]
    #[test_case("## Only a subheading\n", Some("## Only a subheading"); "subheading is a plain line")]
    #[test_case(" \n\t\n", None; "blank document")]
    fn title_derivation(text: &str, expected: Option<&str>) {
        assert_eq!(title_from_text(text), expected);
    }
}
