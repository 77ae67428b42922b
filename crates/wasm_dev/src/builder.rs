use std::future::Future;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::info;

use crate::config::DevConfig;
use crate::error::DevError;

/// One invocation of the external build tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStep {
    program: String,
    args: Vec<String>,
    cwd: PathBuf,
}

impl BuildStep {
    pub fn new(program: impl Into<String>, args: Vec<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: cwd.into(),
        }
    }

    /// `wasm-pack build --release --target web <crate_dir>`, run from the root.
    pub fn wasm_pack(cfg: &DevConfig) -> Self {
        let args = vec![
            "build".to_string(),
            "--release".to_string(),
            "--target".to_string(),
            "web".to_string(),
            cfg.paths.crate_dir().to_string_lossy().into_owned(),
        ];
        Self::new(cfg.build_tool.clone(), args, cfg.paths.root())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion. Any non-zero status is fatal.
    ///
    /// If `interrupt` resolves first the child is killed and
    /// [`DevError::Interrupted`] is returned.
    pub async fn run<I>(&self, interrupt: I) -> Result<(), DevError>
    where
        I: Future<Output = ()>,
    {
        info!("Building: {} (in {})", self.command_line(), self.cwd.display());

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.cwd)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| DevError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let status = tokio::select! {
            status = child.wait() => status.map_err(|source| DevError::Spawn {
                program: self.program.clone(),
                source,
            })?,
            _ = interrupt => {
                // kill_on_drop covers the early-return paths; reap explicitly here.
                let _ = child.kill().await;
                return Err(DevError::Interrupted);
            }
        };

        if !status.success() {
            return Err(DevError::BuildFailed {
                program: self.program.clone(),
                status,
            });
        }

        info!("Build finished");
        Ok(())
    }
}
