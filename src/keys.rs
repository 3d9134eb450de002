//! Template key collection: command-line `key=value` tokens and key-files.
//!
//! Key-files are flat `key=value` documents in INI style without section
//! headers. Keys given on the command line always win over keys from a file.

use crate::error::{Result, TemplaterError};
use log::{debug, warn};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Mapping from placeholder key to replacement value.
///
/// Ordered so that key listings and overlapping tokens resolve the same way on every run.
pub type KeyValueMap = BTreeMap<String, String>;

/// One `--template-keys` token as given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateKeyArg {
    /// A token of the form `key=value`
    Valid { key: String, value: String },
    /// A token that could not be split into a key and a value
    Malformed(String),
}

impl TemplateKeyArg {
    /// Splits a token on its first `=`. A token without `=` or with an empty
    /// key is kept as [`TemplateKeyArg::Malformed`].
    #[must_use]
    pub fn parse(token: &str) -> Self {
        match token.split_once('=') {
            Some((key, value)) if !key.is_empty() => Self::Valid {
                key: key.to_string(),
                value: value.to_string(),
            },
            _ => Self::Malformed(token.to_string()),
        }
    }
}

/// Collects command-line key tokens into a map. Later tokens override
/// earlier ones with the same key.
///
/// # Errors
///
/// Returns `TemplaterError::Config` listing every malformed token.
pub fn keys_from_args(args: &[TemplateKeyArg]) -> Result<KeyValueMap> {
    let mut keys = KeyValueMap::new();
    let mut malformed = Vec::new();

    for arg in args {
        match arg {
            TemplateKeyArg::Valid { key, value } => {
                keys.insert(key.clone(), value.clone());
            }
            TemplateKeyArg::Malformed(raw) => malformed.push(raw.as_str()),
        }
    }

    if malformed.is_empty() {
        Ok(keys)
    } else {
        Err(TemplaterError::config(format!(
            "invalid template keys, expected key=value: {}",
            malformed.join(", ")
        )))
    }
}

/// Parses key-file contents. `source` is only used in error messages.
///
/// # Errors
///
/// Returns `TemplaterError::Config` for a line without a delimiter, an empty
/// key, or a key defined twice.
pub fn parse_key_file(contents: &str, source: &Path) -> Result<KeyValueMap> {
    let section_pattern = Regex::new(r"^\[(?P<name>[^\]]+)\]$")?;
    let option_pattern = Regex::new(r"^(?P<key>.*?)\s*[=:]\s*(?P<value>.*)$")?;

    let parse_error = |lineno: usize, line: &str| {
        TemplaterError::config(format!(
            "error parsing template keys file {}: line {lineno}: {line:?}",
            source.display()
        ))
    };

    let mut keys = KeyValueMap::new();
    let mut in_default_section = true;
    // key and indentation of the entry that continuation lines extend
    let mut current: Option<(String, usize)> = None;

    for (index, line) in contents.lines().enumerate() {
        let lineno = index + 1;
        let stripped = line.trim();

        if stripped.is_empty() {
            // blank lines stay part of a value if a continuation line follows
            if in_default_section
                && let Some((key, _)) = &current
                && let Some(value) = keys.get_mut(key)
            {
                value.push('\n');
            }
            continue;
        }
        if stripped.starts_with('#') || stripped.starts_with(';') {
            continue;
        }

        let indent = line.len() - line.trim_start().len();
        if let Some((key, key_indent)) = &current
            && indent > *key_indent
        {
            if in_default_section && let Some(value) = keys.get_mut(key) {
                value.push('\n');
                value.push_str(stripped);
            }
            continue;
        }

        if let Some(captures) = section_pattern.captures(stripped) {
            let name = &captures["name"];
            in_default_section = name == "default" || name == "DEFAULT";
            if !in_default_section {
                warn!(
                    "{}: ignoring keys in section [{name}]",
                    source.display()
                );
            }
            current = None;
            continue;
        }

        let Some(captures) = option_pattern.captures(stripped) else {
            return Err(parse_error(lineno, line));
        };
        let key = &captures["key"];
        if key.is_empty() {
            return Err(parse_error(lineno, line));
        }
        current = Some((key.to_string(), indent));

        if !in_default_section {
            continue;
        }
        if keys.contains_key(key) {
            return Err(TemplaterError::config(format!(
                "error parsing template keys file {}: line {lineno}: duplicate key {key:?}",
                source.display()
            )));
        }
        keys.insert(key.to_string(), captures["value"].to_string());
    }

    for value in keys.values_mut() {
        let len = value.trim_end_matches('\n').len();
        value.truncate(len);
    }

    Ok(keys)
}

/// Reads and parses a key-file.
///
/// # Errors
///
/// Returns `TemplaterError::Config` if the file can't be read or parsed.
pub fn read_key_file(path: &Path) -> Result<KeyValueMap> {
    let contents = fs::read_to_string(path).map_err(|e| {
        TemplaterError::config(format!(
            "error parsing template keys file {}: {e}",
            path.display()
        ))
    })?;
    let keys = parse_key_file(&contents, path)?;
    debug!("Read {} template keys from {}", keys.len(), path.display());
    Ok(keys)
}

/// Builds the final key map. Keys from `key_file` fill in only what the
/// command line did not already set.
///
/// # Errors
///
/// Returns `TemplaterError::Config` if the key-file can't be read or parsed.
pub fn build_template_keys(
    cli_keys: Option<KeyValueMap>,
    key_file: Option<&Path>,
) -> Result<KeyValueMap> {
    let mut keys = cli_keys.unwrap_or_default();

    if let Some(path) = key_file {
        for (key, value) in read_key_file(path)? {
            keys.entry(key).or_insert(value);
        }
    }

    Ok(keys)
}
