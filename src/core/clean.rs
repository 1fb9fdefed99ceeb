//! Auxiliary file cleanup
//!
//! Removes the intermediate files LaTeX leaves next to the document. Only
//! the extensions in [`AUX_EXTENSIONS`] are touched, so the artifact and the
//! log always survive.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::defaults::AUX_EXTENSIONS;
use crate::error::CleanError;

/// Result of a cleanup
#[derive(Debug, Default)]
pub struct CleanResult {
    /// Files that were removed
    pub removed: Vec<PathBuf>,
}

/// Whether `path` carries one of the auxiliary extensions
///
/// Compound extensions such as `synctex.gz` are matched on the file name
/// suffix.
pub fn is_aux_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| {
            AUX_EXTENSIONS.iter().any(|ext| {
                name.strip_suffix(ext)
                    .is_some_and(|stem| stem.len() > 1 && stem.ends_with('.'))
            })
        })
}

/// Auxiliary files directly inside `dir`, sorted by name
pub fn find_aux_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| is_aux_file(path))
        .collect();
    files.sort();
    files
}

/// Remove auxiliary files from a variant directory
///
/// Nothing to remove, or no directory at all, is not an error.
pub fn clean_aux_files(dir: &Path) -> Result<CleanResult, CleanError> {
    let mut result = CleanResult::default();

    for path in find_aux_files(dir) {
        std::fs::remove_file(&path).map_err(|e| CleanError::RemoveFile {
            path: path.clone(),
            error: e.to_string(),
        })?;
        result.removed.push(path);
    }

    tracing::debug!("Removed {} auxiliary files from {}", result.removed.len(), dir.display());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), "x").unwrap();
    }

    #[test]
    fn test_removes_only_aux_files() {
        let dir = TempDir::new().unwrap();
        for name in [
            "resume.aux",
            "resume.out",
            "resume.fdb_latexmk",
            "resume.synctex.gz",
            "resume.pdf",
            "resume.log",
            "resume.tex",
        ] {
            touch(dir.path(), name);
        }

        let result = clean_aux_files(dir.path()).unwrap();

        assert_eq!(result.removed.len(), 4);
        assert!(dir.path().join("resume.pdf").exists());
        assert!(dir.path().join("resume.log").exists());
        assert!(dir.path().join("resume.tex").exists());
        assert!(!dir.path().join("resume.aux").exists());
        assert!(!dir.path().join("resume.synctex.gz").exists());
    }

    #[test]
    fn test_no_aux_files_is_noop() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "resume.pdf");

        let result = clean_aux_files(dir.path()).unwrap();
        assert!(result.removed.is_empty());
    }

    #[test]
    fn test_missing_directory_is_noop() {
        let dir = TempDir::new().unwrap();
        let result = clean_aux_files(&dir.path().join("cv-xx")).unwrap();
        assert!(result.removed.is_empty());
    }

    #[test]
    fn test_subdirectories_are_untouched() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("chapters")).unwrap();
        touch(&dir.path().join("chapters"), "intro.aux");

        clean_aux_files(dir.path()).unwrap();
        assert!(dir.path().join("chapters/intro.aux").exists());
    }

    #[test]
    fn test_is_aux_file() {
        assert!(is_aux_file(Path::new("a/resume.toc")));
        assert!(is_aux_file(Path::new("resume.bbl")));
        assert!(!is_aux_file(Path::new("resume.log")));
        assert!(!is_aux_file(Path::new("layout")));
        assert!(!is_aux_file(Path::new(".aux")));
    }
}
