use std::{
    fmt, io,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    str::FromStr,
};

use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Serialize};

/// Resolved configuration for a single run.
///
/// A `Config` is assembled once, from built-in defaults, an optional TOML
/// file and command-line overrides, and is not modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Versions")]
pub struct Config {
    /// Directory scanned recursively for documents.
    src_dir: PathBuf,

    /// File whose content is regenerated between the markers.
    target_file: PathBuf,

    marker_start: String,
    marker_end: String,

    /// Glob patterns, relative to `src_dir`, of documents to leave out.
    exclude: Vec<ExcludePattern>,

    /// Accepted file extensions, without the leading dot.
    ///
    /// Matching is exact and case-sensitive.
    extensions: Vec<String>,

    sort: SortOrder,
    group_by: GroupBy,

    /// Number of leading directory segments forming a group key.
    group_depth: NonZeroUsize,

    /// Number of `#` characters in a group heading.
    group_heading_level: NonZeroUsize,

    group_title_case: TitleCase,

    /// Whether regenerating the target file yields a non-zero exit status.
    fail_on_change: bool,

    /// Report drift without writing the target file.
    check: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            target_file: default_target_file(),
            marker_start: default_marker_start(),
            marker_end: default_marker_end(),
            exclude: Vec::new(),
            extensions: default_extensions(),
            sort: SortOrder::default(),
            group_by: GroupBy::default(),
            group_depth: default_depth(),
            group_heading_level: default_heading_level(),
            group_title_case: TitleCase::default(),
            fail_on_change: true,
            check: false,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// Keys missing from the file take their default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source: Box::new(source),
        })
    }

    /// Applies command-line overrides on top of this configuration.
    #[must_use]
    pub fn with_overrides(self, overrides: Overrides) -> Self {
        Self {
            src_dir: overrides.src_dir.unwrap_or(self.src_dir),
            target_file: overrides.target_file.unwrap_or(self.target_file),
            marker_start: overrides.marker_start.unwrap_or(self.marker_start),
            marker_end: overrides.marker_end.unwrap_or(self.marker_end),
            exclude: if overrides.exclude.is_empty() {
                self.exclude
            } else {
                overrides.exclude
            },
            extensions: overrides
                .extensions
                .map_or(self.extensions, normalize_extensions),
            sort: overrides.sort.unwrap_or(self.sort),
            group_by: overrides.group_by.unwrap_or(self.group_by),
            group_depth: overrides.group_depth.unwrap_or(self.group_depth),
            group_heading_level: overrides
                .group_heading_level
                .unwrap_or(self.group_heading_level),
            group_title_case: overrides.group_title_case.unwrap_or(self.group_title_case),
            fail_on_change: self.fail_on_change && !overrides.no_fail_on_change,
            check: overrides.check,
        }
    }

    /// Directory scanned for documents.
    #[must_use]
    pub fn src_dir(&self) -> &Path {
        &self.src_dir
    }

    /// File regenerated between the markers.
    #[must_use]
    pub fn target_file(&self) -> &Path {
        &self.target_file
    }

    /// Literal string opening the generated region.
    #[must_use]
    pub fn marker_start(&self) -> &str {
        &self.marker_start
    }

    /// Literal string closing the generated region.
    #[must_use]
    pub fn marker_end(&self) -> &str {
        &self.marker_end
    }

    /// Exclusion patterns, matched against paths relative to the source
    /// directory.
    #[must_use]
    pub fn exclude(&self) -> &[ExcludePattern] {
        &self.exclude
    }

    /// Accepted file extensions.
    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Order in which documents are listed.
    #[must_use]
    pub const fn sort(&self) -> SortOrder {
        self.sort
    }

    /// How documents are clustered under headings.
    #[must_use]
    pub const fn group_by(&self) -> GroupBy {
        self.group_by
    }

    /// Number of leading directory segments forming a group key.
    #[must_use]
    pub const fn group_depth(&self) -> NonZeroUsize {
        self.group_depth
    }

    /// Markdown heading level of group headings.
    #[must_use]
    pub const fn group_heading_level(&self) -> NonZeroUsize {
        self.group_heading_level
    }

    /// Case transform applied to group headings.
    #[must_use]
    pub const fn group_title_case(&self) -> TitleCase {
        self.group_title_case
    }

    /// Whether a regenerated target file should be reported as a failure.
    #[must_use]
    pub const fn fail_on_change(&self) -> bool {
        self.fail_on_change
    }

    /// Whether the run only checks for drift, leaving the target untouched.
    #[must_use]
    pub const fn check(&self) -> bool {
        self.check
    }
}

/// Values supplied on the command line.
///
/// Every `None` (or empty list) falls back to the value already present in
/// the [`Config`] being overridden.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    /// Source directory.
    pub src_dir: Option<PathBuf>,
    /// Target file.
    pub target_file: Option<PathBuf>,
    /// Start marker.
    pub marker_start: Option<String>,
    /// End marker.
    pub marker_end: Option<String>,
    /// Exclusion patterns. An empty list keeps the configured patterns.
    pub exclude: Vec<ExcludePattern>,
    /// Raw extension list, normalized on application.
    pub extensions: Option<Vec<String>>,
    /// Sort order.
    pub sort: Option<SortOrder>,
    /// Grouping mode.
    pub group_by: Option<GroupBy>,
    /// Group key depth.
    pub group_depth: Option<NonZeroUsize>,
    /// Group heading level.
    pub group_heading_level: Option<NonZeroUsize>,
    /// Group heading case transform.
    pub group_title_case: Option<TitleCase>,
    /// Exit successfully even when the target file was rewritten.
    pub no_fail_on_change: bool,
    /// Only report drift.
    pub check: bool,
}

/// Errors raised while loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        /// Location of the configuration file.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// The file is not valid configuration TOML.
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        /// Location of the configuration file.
        path: PathBuf,
        /// Underlying TOML failure.
        source: Box<toml::de::Error>,
    },
}

/// Order in which documents are listed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Lowercased file name.
    #[default]
    Name,
    /// Lowercased full path.
    Path,
    /// Modification time, then lowercased file name.
    Mtime,
}

/// How documents are clustered under headings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// A single flat list.
    #[default]
    None,
    /// One group per leading subdirectory path.
    Subdir,
}

/// Case transform applied to group headings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TitleCase {
    /// Leave the heading unchanged.
    None,
    /// Replace `-` and `_` with spaces and capitalise every word.
    #[default]
    Title,
    /// Uppercase the whole heading.
    Upper,
    /// Lowercase the whole heading.
    Lower,
}

impl TitleCase {
    /// Transforms `s` according to this case style.
    #[must_use]
    pub fn apply(self, s: &str) -> String {
        match self {
            Self::None => s.to_string(),
            Self::Title => title_case(&s.replace(['-', '_'], " ")),
            Self::Upper => s.to_uppercase(),
            Self::Lower => s.to_lowercase(),
        }
    }
}

/// Uppercases the first letter of every run of letters and lowercases the
/// rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// A glob pattern excluding documents from the index.
///
/// Patterns are normalized to forward slashes with any leading `./` or `/`
/// removed, and matched against forward-slash relative paths. `*` and `?`
/// also match `/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExcludePattern {
    pattern: String,
    matcher: GlobMatcher,
}

impl ExcludePattern {
    /// The normalized pattern text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Checks whether a forward-slash relative path matches this pattern.
    #[must_use]
    pub fn is_match(&self, relative_path: &str) -> bool {
        self.matcher.is_match(relative_path)
    }
}

impl FromStr for ExcludePattern {
    type Err = globset::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pattern = normalize_glob(s);
        let matcher = Glob::new(&pattern)?.compile_matcher();
        Ok(Self { pattern, matcher })
    }
}

impl TryFrom<String> for ExcludePattern {
    type Error = globset::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExcludePattern> for String {
    fn from(pattern: ExcludePattern) -> Self {
        pattern.pattern
    }
}

impl PartialEq for ExcludePattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for ExcludePattern {}

impl fmt::Display for ExcludePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

fn normalize_glob(pattern: &str) -> String {
    let pattern = pattern.replace('\\', "/");
    let mut rest = pattern.as_str();
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix('/') {
            rest = stripped;
        } else {
            break;
        }
    }
    rest.to_string()
}

fn normalize_extensions(extensions: Vec<String>) -> Vec<String> {
    extensions
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

fn default_src_dir() -> PathBuf {
    PathBuf::from("docs/adr")
}

fn default_target_file() -> PathBuf {
    PathBuf::from("README.md")
}

fn default_marker_start() -> String {
    "<!--adrlist-->".to_string()
}

fn default_marker_end() -> String {
    "<!--adrliststop-->".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string(), "MD".to_string()]
}

const fn default_heading_level() -> NonZeroUsize {
    NonZeroUsize::new(2).unwrap()
}

const fn default_depth() -> NonZeroUsize {
    NonZeroUsize::MIN
}

const fn default_true() -> bool {
    true
}

/// The serialized versions of the configuration.
///
/// The `_version` tag allows the file format to evolve independently of the
/// domain type.
#[derive(Debug, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_src_dir")]
        src_dir: PathBuf,

        #[serde(default = "default_target_file")]
        target_file: PathBuf,

        #[serde(default = "default_marker_start")]
        marker_start: String,

        #[serde(default = "default_marker_end")]
        marker_end: String,

        #[serde(default)]
        exclude: Vec<ExcludePattern>,

        #[serde(default = "default_extensions")]
        extensions: Vec<String>,

        #[serde(default)]
        sort: SortOrder,

        #[serde(default)]
        group_by: GroupBy,

        #[serde(default = "default_depth")]
        group_depth: NonZeroUsize,

        #[serde(default = "default_heading_level")]
        group_heading_level: NonZeroUsize,

        #[serde(default)]
        group_title_case: TitleCase,

        #[serde(default = "default_true")]
        fail_on_change: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                src_dir,
                target_file,
                marker_start,
                marker_end,
                exclude,
                extensions,
                sort,
                group_by,
                group_depth,
                group_heading_level,
                group_title_case,
                fail_on_change,
            } => Self {
                src_dir,
                target_file,
                marker_start,
                marker_end,
                exclude,
                extensions: normalize_extensions(extensions),
                sort,
                group_by,
                group_depth,
                group_heading_level,
                group_title_case,
                fail_on_change,
                check: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use test_case::test_case;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nsrc_dir = \"adr\"\nexclude = [\"archive/**\"]\nextensions = [\"md\", \" \"]\nsort = \"mtime\"\ngroup_by = \"subdir\"\ngroup_depth = 2\ngroup_title_case = \"upper\"\nfail_on_change = false\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.src_dir(), Path::new("adr"));
        assert_eq!(config.target_file(), Path::new("README.md"));
        assert_eq!(config.exclude()[0].as_str(), "archive/**");
        assert_eq!(config.extensions(), &["md".to_string()]);
        assert_eq!(config.sort(), SortOrder::Mtime);
        assert_eq!(config.group_by(), GroupBy::Subdir);
        assert_eq!(config.group_depth().get(), 2);
        assert_eq!(config.group_heading_level().get(), 2);
        assert_eq!(config.group_title_case(), TitleCase::Upper);
        assert!(!config.fail_on_change());
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(matches!(error, ConfigError::Read { .. }));
        assert!(error.to_string().starts_with("failed to read config file"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\ngroup_depth = 0\n").unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn overrides_replace_configured_values() {
        let overrides = Overrides {
            src_dir: Some(PathBuf::from("decisions")),
            exclude: vec!["drafts/*".parse().unwrap()],
            extensions: Some(vec!["md".to_string(), String::new(), " txt ".to_string()]),
            group_by: Some(GroupBy::Subdir),
            no_fail_on_change: true,
            check: true,
            ..Overrides::default()
        };

        let config = Config::default().with_overrides(overrides);

        assert_eq!(config.src_dir(), Path::new("decisions"));
        assert_eq!(config.marker_start(), "<!--adrlist-->");
        assert_eq!(config.marker_end(), "<!--adrliststop-->");
        assert_eq!(config.exclude()[0].as_str(), "drafts/*");
        assert_eq!(config.extensions(), &["md".to_string(), "txt".to_string()]);
        assert_eq!(config.group_by(), GroupBy::Subdir);
        assert!(!config.fail_on_change());
        assert!(config.check());
    }

    #[test]
    fn empty_overrides_keep_configuration() {
        let config = Config::default().with_overrides(Overrides::default());
        assert_eq!(config, Config::default());
    }

    #[test_case(TitleCase::None, "data-store_v2", "data-store_v2"; "none leaves text")]
    #[test_case(TitleCase::Title, "api", "Api"; "title single word")]
    #[test_case(TitleCase::Title, "data-store_v2", "Data Store V2"; "title separators")]
    #[test_case(TitleCase::Title, "DB/legacy", "Db/Legacy"; "title nested key")]
    #[test_case(TitleCase::Upper, "db/legacy", "DB/LEGACY"; "upper")]
    #[test_case(TitleCase::Lower, "DB/Legacy", "db/legacy"; "lower")]
    fn title_case_transforms(case: TitleCase, input: &str, expected: &str) {
        assert_eq!(case.apply(input), expected);
    }

    #[test_case("archive/**", "archive/**"; "already normalized")]
    #[test_case("./archive/**", "archive/**"; "leading dot slash")]
    #[test_case("/archive/*.md", "archive/*.md"; "leading slash")]
    #[test_case(r"archive\old\*.md", "archive/old/*.md"; "backslashes")]
    fn exclude_patterns_are_normalized(raw: &str, expected: &str) {
        let pattern: ExcludePattern = raw.parse().unwrap();
        assert_eq!(pattern.as_str(), expected);
    }

    #[test_case("archive/**", "archive/old.md", true; "double star matches nested file")]
    #[test_case("archive/**", "archive/2020/old.md", true; "double star matches deep file")]
    #[test_case("archive/**", "keep.md", false; "double star leaves other files")]
    #[test_case("*.draft.md", "team/x.draft.md", true; "star crosses separators")]
    #[test_case("00?.md", "001.md", true; "question mark")]
    #[test_case("[0-4]*.md", "5-old.md", false; "character class")]
    fn exclude_pattern_matching(pattern: &str, path: &str, expected: bool) {
        let pattern: ExcludePattern = pattern.parse().unwrap();
        assert_eq!(pattern.is_match(path), expected);
    }

    #[test]
    fn invalid_glob_is_rejected() {
        assert!("archive/[".parse::<ExcludePattern>().is_err());
    }
}
