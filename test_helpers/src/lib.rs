//! Test helpers for the cluster dashboard workspace
//!
//! Provides the test artifact directory (rendered charts land in
//! `test_output/` at the workspace root) and builders for fixture catalog
//! files, see [`fixtures`].

pub mod fixtures;

use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum TestHelperError {
    #[error("workspace root not found above {0}")]
    WorkspaceRootNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Walk up from the current directory to the `Cargo.toml` holding `[workspace]`
pub fn find_workspace_root() -> Result<PathBuf, TestHelperError> {
    let start = std::env::current_dir()?;
    for dir in start.ancestors() {
        let manifest = dir.join("Cargo.toml");
        if manifest.is_file() && std::fs::read_to_string(&manifest)?.contains("[workspace]") {
            return Ok(dir.to_path_buf());
        }
    }
    Err(TestHelperError::WorkspaceRootNotFound(start))
}

static WORKSPACE_ROOT: Lazy<PathBuf> =
    Lazy::new(|| find_workspace_root().expect("tests must run inside the workspace"));

/// Directory for test artifacts, created on first use
pub fn get_output_dir() -> PathBuf {
    let dir = WORKSPACE_ROOT.join("test_output");
    std::fs::create_dir_all(&dir).expect("Failed to create test output directory");
    dir
}

/// Path of an artifact inside [`get_output_dir`]
pub fn output_path<P: AsRef<Path>>(path: P) -> PathBuf {
    get_output_dir().join(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_has_manifest() {
        let root = find_workspace_root().unwrap();
        assert!(root.join("Cargo.toml").is_file());
    }

    #[test]
    fn test_output_path_is_inside_output_dir() {
        let path = output_path("cmd.svg");
        assert_eq!(path, get_output_dir().join("cmd.svg"));
        assert!(get_output_dir().is_dir());
    }
}
