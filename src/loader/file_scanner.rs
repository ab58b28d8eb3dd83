//! File scanning utilities for discovering artifact files

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::LoadError;

pub struct FileScanner;

impl FileScanner {
    /// Check if a file has an artifact extension
    pub fn is_artifact_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| matches!(ext, "yml" | "yaml" | "json"))
            .unwrap_or(false)
    }

    /// Expand the given paths into artifact files.
    ///
    /// Files are kept as given, whatever their extension. Directories are
    /// walked recursively and contribute their artifact files in sorted order.
    pub fn collect(paths: &[PathBuf]) -> Result<Vec<PathBuf>, LoadError> {
        let mut files = Vec::new();

        for path in paths {
            if !path.is_dir() {
                files.push(path.clone());
                continue;
            }

            let mut found = Vec::new();
            for entry in WalkDir::new(path).follow_links(true) {
                let entry = entry.map_err(|e| LoadError::Io {
                    path: e.path().map_or_else(|| path.clone(), Path::to_path_buf),
                    source: e.into(),
                })?;
                if entry.file_type().is_file() && Self::is_artifact_file(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            found.sort();
            files.extend(found);
        }

        Ok(files)
    }
}
