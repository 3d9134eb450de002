use crate::error::{Result, TemplaterError};
use std::fs;
use std::path::{Path, PathBuf};

/// Reads the contents of a file at the given path
///
/// # Errors
///
/// Returns `TemplaterError::Io` if the file can't be read or isn't valid UTF-8.
pub fn read_file_contents(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(Into::into)
}

/// Makes sure `output_dir` exists as a directory, creating it if missing.
///
/// Only the directory itself is created, never its parents.
///
/// # Errors
///
/// - `TemplaterError::Config` if a non-directory already exists at the path.
/// - `TemplaterError::Io` if the directory can't be created.
pub fn ensure_output_dir(output_dir: &Path) -> Result<()> {
    if output_dir.is_file() {
        return Err(TemplaterError::config(format!(
            "{} already exists and is a file",
            output_dir.display()
        )));
    }
    if !output_dir.is_dir() {
        fs::create_dir(output_dir)?;
    }
    Ok(())
}

/// Path inside `output_dir` that a walked file is written to. Directory
/// structure is flattened to the file name.
#[must_use]
pub fn output_path_for(output_dir: &Path, source: &Path) -> PathBuf {
    match source.file_name() {
        Some(name) => output_dir.join(name),
        None => output_dir.join(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_file_contents() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");

        fs::write(&file_path, "test content").unwrap();
        assert_eq!(read_file_contents(&file_path).unwrap(), "test content");

        let non_existent = temp_dir.path().join("nonexistent.txt");
        let result = read_file_contents(&non_existent);
        assert!(matches!(result, Err(TemplaterError::Io(_))));
    }

    #[test]
    fn test_read_file_contents_unicode() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("unicode.txt");

        let content = "Hello 世界 🌍 Здравствуй";
        fs::write(&file_path, content).unwrap();
        assert_eq!(read_file_contents(&file_path).unwrap(), content);
    }

    #[test]
    fn test_ensure_output_dir_creates() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");

        ensure_output_dir(&out).unwrap();
        assert!(out.is_dir());

        // existing directory is fine
        ensure_output_dir(&out).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn test_ensure_output_dir_file_collision() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        fs::write(&out, "not a dir").unwrap();

        let err = ensure_output_dir(&out).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().ends_with("already exists and is a file"));
    }

    #[test]
    fn test_ensure_output_dir_not_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("missing").join("out");

        let result = ensure_output_dir(&out);
        assert!(matches!(result, Err(TemplaterError::Io(_))));
        assert!(!out.exists());
    }

    #[test]
    fn test_output_path_for_flattens() {
        let out = Path::new("out");
        assert_eq!(
            output_path_for(out, Path::new("input/sub/deep/a.yml")),
            PathBuf::from("out/a.yml")
        );
        assert_eq!(output_path_for(out, Path::new("b.txt")), PathBuf::from("out/b.txt"));
    }
}
