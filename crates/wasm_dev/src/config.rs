//! Runtime configuration.
//!
//! Layers, later ones winning: built-in defaults, `<root>/wasm-dev.json`,
//! `WASM_DEV_*` environment variables, command-line flags.

use std::fs;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::DevError;
use crate::paths::{ProjectPaths, DEFAULT_CRATE_DIR};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_PAGE: &str = "index.html";
pub const DEFAULT_BUILD_TOOL: &str = "wasm-pack";

pub const USAGE: &str = "\
wasm-dev: build the wasm app and serve it on 127.0.0.1:8000

Usage: wasm-dev [options]

Options:
  --addr <host:port>    Listen address (default 127.0.0.1:8000)
  --root <dir>          Project root (default: repository containing this tool)
  --crate-dir <dir>     Wasm crate relative to the root (default apps/wasm)
  --skip-build          Serve the existing output without building
  --no-open             Do not open a browser
  -h, --help            Show this help";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevConfig {
    pub paths: ProjectPaths,
    pub addr: SocketAddr,
    pub page: String,
    pub build: bool,
    pub open_browser: bool,
    pub build_tool: String,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            paths: ProjectPaths::default(),
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            page: DEFAULT_PAGE.to_string(),
            build: true,
            open_browser: true,
            build_tool: DEFAULT_BUILD_TOOL.to_string(),
        }
    }
}

/// Optional settings read from `wasm-dev.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub crate_dir: Option<PathBuf>,
    #[serde(default)]
    pub addr: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub build: Option<bool>,
    #[serde(default)]
    pub open_browser: Option<bool>,
    #[serde(default)]
    pub build_tool: Option<String>,
}

/// Flags given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub addr: Option<String>,
    pub root: Option<PathBuf>,
    pub crate_dir: Option<PathBuf>,
    pub skip_build: bool,
    pub no_open: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(CliArgs),
    Help,
}

pub fn parse_args<I>(args: I) -> Result<Command, DevError>
where
    I: IntoIterator<Item = String>,
{
    let mut cli = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let mut value_for = |flag: &str| {
            args.next()
                .ok_or_else(|| DevError::Usage(format!("{flag} needs a value")))
        };
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--addr" => cli.addr = Some(value_for("--addr")?),
            "--root" => cli.root = Some(PathBuf::from(value_for("--root")?)),
            "--crate-dir" => cli.crate_dir = Some(PathBuf::from(value_for("--crate-dir")?)),
            "--skip-build" => cli.skip_build = true,
            "--no-open" => cli.no_open = true,
            other => return Err(DevError::Usage(format!("unknown argument: {other}"))),
        }
    }

    Ok(Command::Run(cli))
}

impl DevConfig {
    /// Resolve the full configuration from the process environment.
    pub fn load(cli: &CliArgs) -> Result<Self, DevError> {
        Self::load_with(cli, |key| std::env::var(key).ok())
    }

    pub fn load_with<F>(cli: &CliArgs, env: F) -> Result<Self, DevError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        // The config file lives in the root, so the root is settled first.
        let root = cli
            .root
            .clone()
            .or_else(|| env("WASM_DEV_ROOT").map(PathBuf::from))
            .unwrap_or_else(ProjectPaths::default_root);
        cfg.paths = ProjectPaths::new(root, DEFAULT_CRATE_DIR);

        if let Some(file) = FileConfig::read(&cfg.paths.config_file())? {
            cfg.apply_file(file)?;
        }
        cfg.apply_env(env)?;
        cfg.apply_cli(cli)?;

        Ok(cfg)
    }

    pub fn apply_file(&mut self, file: FileConfig) -> Result<(), DevError> {
        if let Some(dir) = file.crate_dir {
            self.set_crate_dir(dir);
        }
        if let Some(addr) = file.addr {
            self.addr = parse_addr("addr", &addr)?;
        }
        if let Some(page) = file.page {
            self.page = page.trim_start_matches('/').to_string();
        }
        if let Some(build) = file.build {
            self.build = build;
        }
        if let Some(open) = file.open_browser {
            self.open_browser = open;
        }
        if let Some(tool) = file.build_tool {
            self.build_tool = tool;
        }
        Ok(())
    }

    pub fn apply_env<F>(&mut self, env: F) -> Result<(), DevError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // WASM_DEV_CRATE_DIR=apps/wasm
        if let Some(v) = env("WASM_DEV_CRATE_DIR") {
            self.set_crate_dir(PathBuf::from(v.trim()));
        }

        // WASM_DEV_ADDR=127.0.0.1:8000
        if let Some(v) = env("WASM_DEV_ADDR") {
            self.addr = parse_addr("WASM_DEV_ADDR", &v)?;
        }

        // WASM_DEV_SKIP_BUILD=1
        if let Some(v) = env("WASM_DEV_SKIP_BUILD") {
            self.build = !parse_flag("WASM_DEV_SKIP_BUILD", &v)?;
        }

        // WASM_DEV_NO_OPEN=1
        if let Some(v) = env("WASM_DEV_NO_OPEN") {
            self.open_browser = !parse_flag("WASM_DEV_NO_OPEN", &v)?;
        }

        Ok(())
    }

    pub fn apply_cli(&mut self, cli: &CliArgs) -> Result<(), DevError> {
        if let Some(dir) = &cli.crate_dir {
            self.set_crate_dir(dir.clone());
        }
        if let Some(addr) = &cli.addr {
            self.addr = parse_addr("--addr", addr)?;
        }
        if cli.skip_build {
            self.build = false;
        }
        if cli.no_open {
            self.open_browser = false;
        }
        Ok(())
    }

    fn set_crate_dir(&mut self, dir: PathBuf) {
        self.paths = ProjectPaths::new(self.paths.root().to_path_buf(), dir);
    }
}

impl FileConfig {
    /// Read the config file; a missing file is not an error.
    pub fn read(path: &std::path::Path) -> Result<Option<Self>, DevError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(DevError::ReadConfig {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| DevError::ParseConfig {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Listen addresses must stay on loopback; the serve dir holds sources too.
fn parse_addr(key: &'static str, value: &str) -> Result<SocketAddr, DevError> {
    match value.trim().parse::<SocketAddr>() {
        Ok(addr) if addr.ip().is_loopback() => Ok(addr),
        _ => Err(DevError::InvalidSetting {
            key,
            value: value.to_string(),
        }),
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, DevError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(DevError::InvalidSetting {
            key,
            value: value.to_string(),
        }),
    }
}
