//! Test file discovery
//!
//! Walks the test directory recursively and lists candidate test files in
//! a deterministic order. Explicit file arguments bypass discovery.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::Options;

/// List every file under the test directory carrying the configured
/// extension, sorted by file name at each level
pub fn list_test_files(options: &Options) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(&options.test_dir).sort_by_file_name() {
        let entry = entry.with_context(|| {
            format!(
                "Failed to walk test directory {}",
                options.test_dir.display()
            )
        })?;
        if entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .map_or(false, |ext| ext == options.extension.as_str())
        {
            files.push(entry.into_path());
        }
    }
    debug!("discovered {} test file(s)", files.len());
    Ok(files)
}

/// Anchor explicitly given files at the project root
pub fn resolve_files(files: Vec<PathBuf>, options: &Options) -> Vec<PathBuf> {
    files
        .into_iter()
        .map(|file| {
            if file.is_absolute() {
                file
            } else {
                options.root.join(file)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options_rooted(dir: &std::path::Path) -> Options {
        Options::default().with_dirs(dir.join("test"), dir.join("src"))
    }

    #[test]
    fn lists_files_recursively_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        let test_dir = dir.path().join("test");
        std::fs::create_dir_all(test_dir.join("util")).unwrap();
        std::fs::write(test_dir.join("zeta.rs"), "").unwrap();
        std::fs::write(test_dir.join("alpha.rs"), "").unwrap();
        std::fs::write(test_dir.join("util/math.rs"), "").unwrap();

        let files = list_test_files(&options_rooted(dir.path())).unwrap();
        assert_eq!(
            files,
            [
                test_dir.join("alpha.rs"),
                test_dir.join("util/math.rs"),
                test_dir.join("zeta.rs"),
            ]
        );
    }

    #[test]
    fn filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let test_dir = dir.path().join("test");
        std::fs::create_dir_all(&test_dir).unwrap();
        std::fs::write(test_dir.join("math.rs"), "").unwrap();
        std::fs::write(test_dir.join("notes.md"), "").unwrap();
        std::fs::write(test_dir.join("fixture"), "").unwrap();

        let files = list_test_files(&options_rooted(dir.path())).unwrap();
        assert_eq!(files, [test_dir.join("math.rs")]);
    }

    #[test]
    fn missing_test_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_test_files(&options_rooted(dir.path())).is_err());
    }

    #[test]
    fn anchors_relative_files_at_the_root() {
        let mut options = Options::default();
        options.root = PathBuf::from("/project");
        let files = resolve_files(
            vec![PathBuf::from("test/math.rs"), PathBuf::from("/abs/other.rs")],
            &options,
        );
        assert_eq!(
            files,
            [
                PathBuf::from("/project/test/math.rs"),
                PathBuf::from("/abs/other.rs"),
            ]
        );
    }
}
