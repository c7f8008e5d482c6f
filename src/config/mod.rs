//! Configuration management

use crate::types::TidemarkError;
use clap::Parser;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

/// Default configuration file, resolved against the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "tidemark", version, about)]
pub struct Cli {
    /// Path to the configuration file (JSON, or TOML when it ends in .toml)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Show what would be copied without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// On-disk configuration layout
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ConfigFile {
    #[serde(rename = "SRC_DIR")]
    pub src_dir: String,

    #[serde(rename = "DIST_DIR")]
    pub dist_dir: String,

    #[serde(rename = "EXCLUDED_EXT", default)]
    pub excluded_ext: Vec<String>,
}

/// Case-insensitive set of excluded file extensions.
///
/// Entries are compared as opaque tokens against the extension of a file name,
/// which includes the leading dot (`.log`). An entry without a dot therefore
/// never matches a dotted extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionSet {
    folded: BTreeSet<String>,
}

impl ExtensionSet {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            folded: extensions
                .into_iter()
                .map(|ext| ext.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Whether the extension of `file_name` is excluded
    ///
    /// Bytes that are not valid UTF-8 never match a configured token.
    pub fn excludes(&self, file_name: impl AsRef<OsStr>) -> bool {
        if self.folded.is_empty() {
            return false;
        }
        let name = file_name.as_ref().to_string_lossy();
        self.folded.contains(&extension_of(&name).to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.folded.is_empty()
    }

    pub fn len(&self) -> usize {
        self.folded.len()
    }
}

/// Extension of a file name: the suffix from the last `.` on, dot included.
///
/// Returns an empty string when the name has no dot.
pub fn extension_of(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) => &file_name[idx..],
        None => "",
    }
}

/// Immutable configuration for one sync run
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Source root; only its subdirectories are mirrored
    pub source: PathBuf,

    /// Destination root
    pub destination: PathBuf,

    /// Extensions never copied
    pub excluded: ExtensionSet,

    /// Dry run (report selection, don't write)
    pub dry_run: bool,
}

impl Config {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            ..Self::default()
        }
    }

    /// Builder-style setter for the excluded extensions
    pub fn with_excluded<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excluded = ExtensionSet::new(extensions);
        self
    }

    /// Validate configuration
    ///
    /// The overlap checks run on resolved paths, so a relative spelling, a
    /// `..` detour or a symlinked ancestor does not hide a destination that
    /// lives inside the source.
    pub fn validate(&self) -> Result<(), TidemarkError> {
        if self.source.as_os_str().is_empty() {
            return Err(TidemarkError::Config("SRC_DIR must not be empty".to_string()));
        }

        if self.destination.as_os_str().is_empty() {
            return Err(TidemarkError::Config("DIST_DIR must not be empty".to_string()));
        }

        let source = resolve_for_comparison(&self.source)?;
        let destination = resolve_for_comparison(&self.destination)?;

        if source == destination {
            return Err(TidemarkError::Config(
                "Source and destination cannot be the same".to_string(),
            ));
        }

        // The walker would otherwise descend into its own output.
        if destination.starts_with(&source) {
            return Err(TidemarkError::Config(format!(
                "Destination {:?} must not be inside source {:?}",
                self.destination, self.source
            )));
        }

        Ok(())
    }
}

impl TryFrom<ConfigFile> for Config {
    type Error = TidemarkError;

    fn try_from(file: ConfigFile) -> Result<Self, Self::Error> {
        let config = Config {
            source: trim_trailing_separators(&file.src_dir),
            destination: trim_trailing_separators(&file.dist_dir),
            excluded: ExtensionSet::new(&file.excluded_ext),
            dry_run: false,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Load and validate configuration from `path`.
///
/// Files ending in `.toml` are parsed as TOML; everything else as JSON.
pub fn load_config(path: &Path) -> Result<Config, TidemarkError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        TidemarkError::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let file: ConfigFile = if is_toml {
        toml::from_str(&raw).map_err(|e| {
            TidemarkError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?
    } else {
        serde_json::from_str(&raw).map_err(|e| {
            TidemarkError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?
    };

    Config::try_from(file)
}

/// Absolute form of `path` with symlinks resolved as far as it exists.
///
/// The longest existing prefix is canonicalized; the missing remainder is
/// appended lexically, dropping `.` and popping on `..`.
fn resolve_for_comparison(path: &Path) -> Result<PathBuf, TidemarkError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = env::current_dir().map_err(|e| {
            TidemarkError::Config(format!("Failed to resolve {}: {}", path.display(), e))
        })?;
        cwd.join(path)
    };

    let components: Vec<Component<'_>> = absolute.components().collect();
    for split in (1..=components.len()).rev() {
        let prefix: PathBuf = components[..split].iter().collect();
        let Ok(mut resolved) = prefix.canonicalize() else {
            continue;
        };
        for component in &components[split..] {
            match component {
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::Normal(part) => resolved.push(part),
                _ => {}
            }
        }
        return Ok(resolved);
    }

    Ok(absolute)
}

fn trim_trailing_separators(raw: &str) -> PathBuf {
    let trimmed = raw.trim_end_matches(|c: char| c == MAIN_SEPARATOR || c == '/');
    if trimmed.is_empty() && !raw.is_empty() {
        // A bare root like "/" keeps its separator.
        return PathBuf::from(&raw[..1]);
    }
    PathBuf::from(trimmed)
}
