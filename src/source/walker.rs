use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::Result;

/// Lists the Rust files directly inside one directory
pub struct FileWalker;

impl FileWalker {
    pub fn new() -> Self {
        Self
    }

    /// Non-recursive; hidden and ignored files are skipped. Paths are sorted.
    pub fn walk(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !std::fs::metadata(dir)?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", dir.display()),
            )
            .into());
        }

        let walker = WalkBuilder::new(dir)
            .max_depth(Some(1))
            .hidden(true)
            .git_ignore(true)
            .git_exclude(true)
            .ignore(true)
            .parents(false)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(walk_error)?;
            let path = entry.path();
            if path.is_file() && self.is_supported(path) {
                files.push(path.to_path_buf());
            }
        }
        files.sort();

        Ok(files)
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension().and_then(|ext| ext.to_str()) == Some("rs")
    }
}

fn walk_error(err: ignore::Error) -> io::Error {
    let message = err.to_string();
    err.into_io_error()
        .unwrap_or_else(|| io::Error::other(message))
}

impl Default for FileWalker {
    fn default() -> Self {
        Self::new()
    }
}
