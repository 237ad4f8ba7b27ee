use std::{
    env,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    process::ExitCode,
};

mod terminal;

use adrlist::{
    Config, ExcludePattern, GroupBy, Outcome, Overrides, SortOrder, SyncError, TitleCase, sync,
};
use anyhow::Context;
use clap::ArgAction;
use terminal::Colorize;
use tracing::instrument;

/// Configuration file picked up from the working directory when present.
const DEFAULT_CONFIG_FILE: &str = ".adrlist.toml";

/// Generate a markdown list of links from the first H1 of each file.
///
/// The list is written into the target file between the start and end
/// markers. Options left unset fall back to the configuration file, then to
/// built-in defaults.
#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// TOML configuration file [default: .adrlist.toml, if present]
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory to scan for markdown files (recursive) [default: docs/adr]
    #[arg(long, value_name = "DIR")]
    src_dir: Option<PathBuf>,

    /// File whose content will be updated between markers [default: README.md]
    #[arg(long, value_name = "FILE")]
    target_file: Option<PathBuf>,

    /// Start marker to locate the insertion area [default: <!--adrlist-->]
    #[arg(long, value_name = "MARKER")]
    marker_start: Option<String>,

    /// End marker to locate the insertion area [default: <!--adrliststop-->]
    #[arg(long, value_name = "MARKER")]
    marker_end: Option<String>,

    /// Glob pattern to exclude, relative to the source directory. Repeat for
    /// multiple.
    #[arg(long, value_name = "PATTERN")]
    exclude: Vec<ExcludePattern>,

    /// Comma-separated file extensions to include [default: md,MD]
    #[arg(long, value_delimiter = ',', value_name = "EXTS")]
    extensions: Option<Vec<String>>,

    /// Sort order for entries [default: name]
    #[arg(long, value_enum)]
    sort: Option<SortOrder>,

    /// How to group entries. 'subdir' groups by subfolder(s) under the source
    /// directory [default: none]
    #[arg(long, value_enum)]
    group_by: Option<GroupBy>,

    /// Number of path segments under the source directory that form the
    /// group key [default: 1]
    #[arg(long, value_name = "N")]
    group_depth: Option<NonZeroUsize>,

    /// Markdown heading level for group headers, e.g. 2 => '##' [default: 2]
    #[arg(long, value_name = "N")]
    group_heading_level: Option<NonZeroUsize>,

    /// Transform applied to group titles [default: title]
    #[arg(long, value_enum)]
    group_title_case: Option<TitleCase>,

    /// Exit 0 even if the target file was modified
    #[arg(long)]
    no_fail_on_change: bool,

    /// Check for drift without making changes (exits with code 1 if the index
    /// is out of date)
    #[arg(long)]
    check: bool,
}

impl Cli {
    pub fn run(self) -> ExitCode {
        Self::setup_logging(self.verbose);

        match self.sync() {
            Ok(code) => ExitCode::from(code),
            Err(e) => {
                eprintln!("{}", format!("✖ {e}").failure());
                let code = e.downcast_ref::<SyncError>().map_or(1, SyncError::exit_code);
                ExitCode::from(code)
            }
        }
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }

    #[instrument(level = "debug", skip(self))]
    fn sync(self) -> anyhow::Result<u8> {
        let root = env::current_dir().context("failed to determine the working directory")?;
        let config = self.into_config(&root)?;

        let outcome = sync::run(&root, &config)?;
        match &outcome {
            Outcome::Unchanged => println!("{}", "✔ No changes needed".success()),
            Outcome::Updated(target) => println!(
                "{}",
                format!(
                    "↻ Updated {} between markers {} … {}",
                    target.display(),
                    config.marker_start(),
                    config.marker_end()
                )
                .info()
            ),
            Outcome::OutOfDate(target) => {
                eprintln!(
                    "{}",
                    format!("✖ {} is out of date", target.display()).failure()
                );
            }
        }

        Ok(outcome.exit_code(config.fail_on_change()))
    }

    /// Layers the command-line options over the configuration file.
    fn into_config(self, root: &Path) -> Result<Config, SyncError> {
        let base = match &self.config {
            Some(path) => Config::load(&root.join(path))?,
            None => {
                let implicit = root.join(DEFAULT_CONFIG_FILE);
                if implicit.is_file() {
                    tracing::debug!("Loading configuration from {}", implicit.display());
                    Config::load(&implicit)?
                } else {
                    Config::default()
                }
            }
        };

        Ok(base.with_overrides(Overrides {
            src_dir: self.src_dir,
            target_file: self.target_file,
            marker_start: self.marker_start,
            marker_end: self.marker_end,
            exclude: self.exclude,
            extensions: self.extensions,
            sort: self.sort,
            group_by: self.group_by,
            group_depth: self.group_depth,
            group_heading_level: self.group_heading_level,
            group_title_case: self.group_title_case,
            no_fail_on_change: self.no_fail_on_change,
            check: self.check,
        }))
    }
}
