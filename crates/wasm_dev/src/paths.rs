//! Project paths: repository root and the wasm crate served from it

use std::path::{Path, PathBuf};

pub const DEFAULT_CRATE_DIR: &str = "apps/wasm";
pub const CONFIG_FILE_NAME: &str = "wasm-dev.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    root: PathBuf,
    crate_dir: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>, crate_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            crate_dir: crate_dir.into(),
        }
    }

    /// Root derived from where this tool lives: `crates/wasm_dev` sits two
    /// levels below the repository root.
    pub fn default_root() -> PathBuf {
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        manifest_dir
            .ancestors()
            .nth(2)
            .unwrap_or(manifest_dir)
            .to_path_buf()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Crate directory relative to the root, as passed to the build tool.
    pub fn crate_dir(&self) -> &Path {
        &self.crate_dir
    }

    /// Directory the server exposes.
    pub fn serve_dir(&self) -> PathBuf {
        self.root.join(&self.crate_dir)
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }
}

impl Default for ProjectPaths {
    fn default() -> Self {
        Self::new(Self::default_root(), DEFAULT_CRATE_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_root_contains_this_crate() {
        let root = ProjectPaths::default_root();
        assert!(root.join("crates").join("wasm_dev").join("Cargo.toml").is_file());
    }

    #[test]
    fn serve_dir_joins_crate_dir_onto_root() {
        let paths = ProjectPaths::new("/work/choreo", "apps/wasm");
        assert_eq!(paths.serve_dir(), PathBuf::from("/work/choreo/apps/wasm"));
        assert_eq!(paths.crate_dir(), Path::new("apps/wasm"));
        assert_eq!(
            paths.config_file(),
            PathBuf::from("/work/choreo/wasm-dev.json")
        );
    }
}
