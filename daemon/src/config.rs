use std::collections::HashMap;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const DEFAULT_CONFIG_SUFFIX: &str = ".config";

/// Action table for one game executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetConfig {
    /// Executable identifier, taken verbatim from the first line of the file.
    pub name: String,
    /// Tip amount → raw action spec. Parsed lazily at dispatch time.
    pub actions: HashMap<i32, String>,
    /// File this target was loaded from.
    pub source: PathBuf,
}

impl TargetConfig {
    pub fn action_for(&self, amount: i32) -> Option<&str> {
        self.actions.get(&amount).map(String::as_str)
    }
}

/// Target name → its action table. Immutable once loaded.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigTable {
    targets: HashMap<String, TargetConfig>,
}

impl ConfigTable {
    pub fn get(&self, target: &str) -> Option<&TargetConfig> {
        self.targets.get(target)
    }

    pub fn contains(&self, target: &str) -> bool {
        self.targets.contains_key(target)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn target_names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    /// Inserts `config`, returning the entry it replaced (if any).
    fn insert(&mut self, config: TargetConfig) -> Option<TargetConfig> {
        self.targets.insert(config.name.clone(), config)
    }
}

/// The only fatal loader error: the config directory itself is unreadable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config directory {}: {source}", path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Recoverable problems found while loading. Each one skipped a single entry, file or line.
#[derive(Debug, Error)]
pub enum ConfigDiagnostic {
    #[error("failed to read an entry of {}: {source}", dir.display())]
    EntryRead {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read config file {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}:{line_no}: skipping line {line:?}: {reason}", path.display())]
    LineParse {
        path: PathBuf,
        line_no: usize,
        line: String,
        reason: LineError,
    },
    #[error("{}:{line_no}: amount {amount} already mapped, later line wins", path.display())]
    DuplicateAmount {
        path: PathBuf,
        line_no: usize,
        amount: i32,
    },
    #[error(
        "target {target:?} in {} replaces the one loaded from {}",
        path.display(),
        previous.display()
    )]
    DuplicateTarget {
        target: String,
        path: PathBuf,
        previous: PathBuf,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineError {
    #[error("missing ':' separator")]
    MissingSeparator,
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] ParseIntError),
}

/// Everything produced by [`load_all`].
#[derive(Debug, Default)]
pub struct LoadReport {
    pub table: ConfigTable,
    /// Number of matching files that were read and parsed.
    pub files_loaded: usize,
    pub diagnostics: Vec<ConfigDiagnostic>,
}

/// Loads every file in `dir` whose name ends with `suffix`.
///
/// Files are processed in name order, so when two files declare the same
/// target the one sorting last wins (reported as [`ConfigDiagnostic::DuplicateTarget`]).
/// Unreadable entries and files, and unparsable lines, are skipped and reported; only an
/// unreadable directory fails the load.
pub fn load_all(dir: &Path, suffix: &str) -> Result<LoadReport, ConfigError> {
    let entries = std::fs::read_dir(dir).map_err(|source| ConfigError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut report = LoadReport::default();
    let paths = matching_paths(
        dir,
        entries.map(|entry| entry.map(|e| e.path())),
        suffix,
        &mut report.diagnostics,
    );
    for path in paths {
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(source) => {
                report.diagnostics.push(ConfigDiagnostic::FileRead { path, source });
                continue;
            }
        };

        let target = parse_target(&content, &path, &mut report.diagnostics);
        report.files_loaded += 1;
        if let Some(previous) = report.table.insert(target) {
            report.diagnostics.push(ConfigDiagnostic::DuplicateTarget {
                target: previous.name,
                path,
                previous: previous.source,
            });
        }
    }
    Ok(report)
}

/// Sorted paths of the entries whose file name ends with `suffix`. An entry
/// that cannot be read is reported and skipped.
fn matching_paths(
    dir: &Path,
    entries: impl Iterator<Item = std::io::Result<PathBuf>>,
    suffix: &str,
    diagnostics: &mut Vec<ConfigDiagnostic>,
) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => {
                let matches = path
                    .file_name()
                    .is_some_and(|name| name.to_string_lossy().ends_with(suffix));
                if matches {
                    paths.push(path);
                }
            }
            Err(source) => diagnostics.push(ConfigDiagnostic::EntryRead {
                dir: dir.to_path_buf(),
                source,
            }),
        }
    }
    paths.sort();
    paths
}

/// Parses the contents of one config file. Line 0 is the target name; every
/// following non-blank line is `<amount>:<action spec>`.
fn parse_target(
    content: &str,
    path: &Path,
    diagnostics: &mut Vec<ConfigDiagnostic>,
) -> TargetConfig {
    let mut lines = content.split('\n');
    let name = lines.next().unwrap_or_default().to_string();
    let mut actions = HashMap::new();

    for (idx, line) in lines.enumerate() {
        // Line numbers are 1-based and the name occupies line 1.
        let line_no = idx + 2;
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Ok((amount, spec)) => {
                if actions.insert(amount, spec.to_string()).is_some() {
                    diagnostics.push(ConfigDiagnostic::DuplicateAmount {
                        path: path.to_path_buf(),
                        line_no,
                        amount,
                    });
                }
            }
            Err(reason) => diagnostics.push(ConfigDiagnostic::LineParse {
                path: path.to_path_buf(),
                line_no,
                line: line.to_string(),
                reason,
            }),
        }
    }

    TargetConfig {
        name,
        actions,
        source: path.to_path_buf(),
    }
}

fn parse_line(line: &str) -> Result<(i32, &str), LineError> {
    let (amount, spec) = line.split_once(':').ok_or(LineError::MissingSeparator)?;
    Ok((amount.parse::<i32>()?, spec))
}
