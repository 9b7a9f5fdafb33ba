//! File pattern resolution using glob

use crate::error::CliError;
use anyhow::{Context, Result};
use glob::glob;
use std::path::PathBuf;

/// Resolve file patterns to existing files, sorted and deduplicated
///
/// A pattern without glob metacharacters must name an existing file.
pub fn resolve_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            let path = PathBuf::from(pattern);
            if !path.is_file() {
                return Err(CliError::FileNotFound(pattern.clone()).into());
            }
            files.push(path);
            continue;
        }

        let paths = glob(pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))?;
        let before = files.len();
        for path_result in paths {
            let path = path_result.with_context(|| format!("Error resolving pattern: {pattern}"))?;
            if path.is_file() {
                files.push(path);
            }
        }
        if files.len() == before {
            log::warn!("pattern '{}' matched no files", pattern);
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_glob_and_literal_paths() {
        let dir = TempDir::new().unwrap();
        for name in ["a_resolved.csv", "b_resolved.csv", "notes.txt"] {
            fs::write(dir.path().join(name), "symbol,accession\n").unwrap();
        }
        let pattern = format!("{}/*_resolved.csv", dir.path().display());
        let literal = dir.path().join("a_resolved.csv").display().to_string();

        let files = resolve_patterns(&[pattern, literal]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a_resolved.csv"));
        assert!(files[1].ends_with("b_resolved.csv"));
    }

    #[test]
    fn test_missing_literal_path() {
        let err = resolve_patterns(&["/nonexistent/records.csv".to_string()]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(resolve_patterns(&["[".to_string()]).is_err());
    }
}
