use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DevError {
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {status}")]
    BuildFailed { program: String, status: ExitStatus },

    #[error("interrupted while building")]
    Interrupted,

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: warp::Error,
    },

    #[error("serve directory {} does not exist", .0.display())]
    MissingServeDir(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {key}: {value:?}")]
    InvalidSetting { key: &'static str, value: String },

    #[error("{0}")]
    Usage(String),
}

impl DevError {
    /// Process exit code for this error.
    ///
    /// A failed build forwards the tool's own code when it fits in a byte.
    pub fn exit_code(&self) -> u8 {
        match self {
            DevError::BuildFailed { status, .. } => status
                .code()
                .and_then(|c| u8::try_from(c).ok())
                .filter(|&c| c != 0)
                .unwrap_or(1),
            DevError::Interrupted => 130,
            DevError::Usage(_) => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn status_with_code(code: i32) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        // Wait status layout: exit code lives in the second byte.
        ExitStatus::from_raw(code << 8)
    }

    #[cfg(unix)]
    #[test]
    fn build_failure_forwards_tool_exit_code() {
        let err = DevError::BuildFailed {
            program: "wasm-pack".to_string(),
            status: status_with_code(3),
        };
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("wasm-pack"));
    }

    #[cfg(unix)]
    #[test]
    fn build_killed_by_signal_exits_one() {
        use std::os::unix::process::ExitStatusExt;
        let err = DevError::BuildFailed {
            program: "wasm-pack".to_string(),
            status: ExitStatus::from_raw(9),
        };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn interrupt_uses_sigint_convention() {
        assert_eq!(DevError::Interrupted.exit_code(), 130);
    }

    #[test]
    fn other_errors_exit_one() {
        let err = DevError::MissingServeDir(PathBuf::from("/nope"));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "serve directory /nope does not exist");
    }
}
