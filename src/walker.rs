//! Input resolution, directory walking and output routing.

use crate::error::{Result, TemplaterError};
use crate::filter::{FilterSpec, Rejection};
use crate::fs_utils::{ensure_output_dir, output_path_for, read_file_contents};
use crate::keys::KeyValueMap;
use crate::template::{Placeholder, fill_template, find_placeholders, unresolved_placeholders};
use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Default line written between files concatenated to standard output
pub const DEFAULT_SEPARATOR: &str = "---";

/// What the run reads from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputTarget {
    File(PathBuf),
    Directory(PathBuf),
}

impl InputTarget {
    /// Decides whether `path` is a single file or a directory tree
    ///
    /// # Errors
    ///
    /// Returns `TemplaterError::Config` if the path is neither.
    pub fn resolve(path: &Path) -> Result<Self> {
        if path.is_file() {
            Ok(Self::File(path.to_path_buf()))
        } else if path.is_dir() {
            Ok(Self::Directory(path.to_path_buf()))
        } else {
            Err(TemplaterError::config(format!(
                "invalid file {}",
                path.display()
            )))
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::File(path) | Self::Directory(path) => path,
        }
    }
}

/// Where filled files go in directory mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// One output file per input file, named after the input's file name
    Directory(PathBuf),
    /// All files concatenated to the writer, each followed by a separator line
    Stdout { separator: String },
}

impl Default for OutputTarget {
    fn default() -> Self {
        Self::Stdout {
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl OutputTarget {
    #[must_use]
    pub fn new(output_dir: Option<PathBuf>, separator: &str) -> Self {
        match output_dir {
            Some(dir) => Self::Directory(dir),
            None => Self::Stdout {
                separator: separator.to_string(),
            },
        }
    }
}

/// Everything a run needs besides the input
#[derive(Debug, Clone, Default)]
pub struct WalkConfig {
    pub keys: KeyValueMap,
    pub filter: FilterSpec,
    pub output: OutputTarget,
}

/// Placeholders found in one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePlaceholders {
    pub path: PathBuf,
    pub placeholders: Vec<Placeholder>,
}

/// Calls `f` for every file of `input` that passes `filter`, in walk order.
///
/// A single-file input is passed through without filtering.
///
/// # Errors
///
/// Returns `TemplaterError::WalkDir` if traversal fails, or whatever `f` returns.
pub fn for_each_file<F>(input: &InputTarget, filter: &FilterSpec, mut f: F) -> Result<()>
where
    F: FnMut(&Path) -> Result<()>,
{
    let root = match input {
        InputTarget::File(path) => return f(path.as_path()),
        InputTarget::Directory(root) => root,
    };

    // files of a directory come before its subdirectories, each group by name
    let walker = WalkDir::new(root).sort_by(|a, b| {
        a.file_type()
            .is_dir()
            .cmp(&b.file_type().is_dir())
            .then_with(|| a.file_name().cmp(b.file_name()))
    });

    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        match filter.check(path) {
            Ok(()) => f(path)?,
            Err(Rejection::Excluded) => debug!("Skipping {} (excluded)", path.display()),
            Err(Rejection::NotIncluded) => debug!("Skipping {} (not included)", path.display()),
        }
    }

    Ok(())
}

fn fill_file(path: &Path, keys: &KeyValueMap) -> Result<String> {
    debug!("Filling {}", path.display());
    let contents = read_file_contents(path)?;
    for placeholder in unresolved_placeholders(&contents, keys)? {
        info!(
            "{}: no value for placeholder ${{{}}}",
            path.display(),
            placeholder.key
        );
    }
    fill_template(&contents, keys)
}

/// Fills `input` and routes the results.
///
/// A single file is written to `out` exactly as filled. A directory is
/// walked and each filled file either written into the output directory or
/// appended to `out` followed by the separator line. Files already written
/// stay in place if a later file fails.
///
/// # Errors
///
/// - `TemplaterError::Config` if the output directory collides with a file.
/// - `TemplaterError::Io` or `TemplaterError::WalkDir` for filesystem failures.
pub fn run<W: Write>(input: &InputTarget, config: &WalkConfig, out: &mut W) -> Result<()> {
    if let InputTarget::File(path) = input {
        let filled = fill_file(path, &config.keys)?;
        out.write_all(filled.as_bytes())?;
        out.flush()?;
        return Ok(());
    }

    let mut processed = 0usize;
    for_each_file(input, &config.filter, |path| {
        let mut filled = fill_file(path, &config.keys)?;
        match &config.output {
            OutputTarget::Directory(output_dir) => {
                ensure_output_dir(output_dir)?;
                let target = output_path_for(output_dir, path);
                debug!("Writing {}", target.display());
                fs::write(&target, filled)?;
            }
            OutputTarget::Stdout { separator } => {
                if !filled.ends_with('\n') {
                    filled.push('\n');
                }
                out.write_all(filled.as_bytes())?;
                if !separator.is_empty() {
                    writeln!(out, "{separator}")?;
                }
            }
        }
        processed += 1;
        Ok(())
    })?;

    out.flush()?;
    info!("Processed {processed} files from {}", input.path().display());
    Ok(())
}

/// Collects the placeholders of every file `run` would process
///
/// # Errors
///
/// Returns `TemplaterError::Io` or `TemplaterError::WalkDir` for filesystem failures.
pub fn collect_placeholders(
    input: &InputTarget,
    filter: &FilterSpec,
) -> Result<Vec<FilePlaceholders>> {
    let mut files = Vec::new();
    for_each_file(input, filter, |path| {
        let contents = read_file_contents(path)?;
        files.push(FilePlaceholders {
            path: path.to_path_buf(),
            placeholders: find_placeholders(&contents)?,
        });
        Ok(())
    })?;
    Ok(files)
}
