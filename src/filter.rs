//! Include/exclude filtering of walked file paths.
//!
//! Patterns are shell-style globs: `*` matches any sequence (including `/`),
//! `?` matches a single character, `[...]` a character class. A backslash is
//! an ordinary character and an unclosed `[` matches itself. `{a,b}` is
//! parsed as an alternation. Patterns are matched against the whole path as
//! produced by the directory walk, not just the file name.

use crate::error::{Result, TemplaterError};
use globset::{GlobBuilder, GlobMatcher};
use std::path::Path;

/// Optional include and exclude patterns for directory mode
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    include: Option<GlobMatcher>,
    exclude: Option<GlobMatcher>,
}

/// Why a path was rejected by a [`FilterSpec`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Excluded,
    NotIncluded,
}

fn compile(pattern: &str, kind: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(pattern)
        .literal_separator(false)
        .backslash_escape(false)
        .allow_unclosed_class(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| TemplaterError::config(format!("invalid {kind} pattern '{pattern}': {e}")))
}

impl FilterSpec {
    /// Compiles the given patterns
    ///
    /// # Errors
    ///
    /// Returns `TemplaterError::Config` if either pattern isn't a valid glob.
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Result<Self> {
        Ok(Self {
            include: include.map(|p| compile(p, "include")).transpose()?,
            exclude: exclude.map(|p| compile(p, "exclude")).transpose()?,
        })
    }

    /// Checks a path against the patterns. Exclude is checked first, so a
    /// path matching both patterns is rejected.
    pub fn check(&self, path: &Path) -> std::result::Result<(), Rejection> {
        if let Some(exclude) = &self.exclude
            && exclude.is_match(path)
        {
            return Err(Rejection::Excluded);
        }
        if let Some(include) = &self.include
            && !include.is_match(path)
        {
            return Err(Rejection::NotIncluded);
        }
        Ok(())
    }

    /// Returns true if the file at `path` should be processed
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        self.check(path).is_ok()
    }
}

/// One-shot form of [`FilterSpec::matches`]
///
/// # Errors
///
/// Returns `TemplaterError::Config` if either pattern isn't a valid glob.
pub fn matches(path: &Path, include: Option<&str>, exclude: Option<&str>) -> Result<bool> {
    Ok(FilterSpec::new(include, exclude)?.matches(path))
}
