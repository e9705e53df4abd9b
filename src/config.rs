//! Path and parameter validation shared by the CLI subcommands.

use std::{fs, path::Path};

use colored::Colorize;

/// Checks that `path` exists on disk, unless it's the stdin/stdout marker
/// `-`. Returns a colored, user-facing message on failure.
///
/// # Errors
///
/// Returns an error if `path` is not `-` and no file exists at it.
pub fn validate_input_path(path: &Path) -> Result<(), String> {
    if path.as_os_str() == "-" {
        return Ok(());
    }
    fs::metadata(path)
        .map(|_| ())
        .map_err(|e| format!("Issue with file path {}: {}", path.display().to_string().bold(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn accepts_stdin_marker() {
        assert!(validate_input_path(Path::new("-")).is_ok());
    }

    #[test]
    fn accepts_existing_file() {
        let file = NamedTempFile::new().unwrap();
        assert!(validate_input_path(file.path()).is_ok());
    }

    #[test]
    fn rejects_missing_file() {
        let result = validate_input_path(Path::new("/nonexistent/path/to/file.fa"));
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Issue with file path"));
    }
}
