//! # wasm_dev
//!
//! Local development loop for the web-assembly app: build it with
//! `wasm-pack`, serve the crate directory on `127.0.0.1:8000` and open the
//! default browser at `index.html`.
//!
//! ## Modules
//!
//! - [`config`]: defaults, `wasm-dev.json`, `WASM_DEV_*` env vars, CLI flags
//! - [`builder`]: the build subprocess
//! - [`server`]: static file server
//! - [`browser`]: detached browser launch
//! - [`dev_server`]: the three steps wired together

pub mod browser;
pub mod builder;
pub mod config;
pub mod dev_server;
pub mod error;
pub mod paths;
pub mod server;

pub use config::DevConfig;
pub use dev_server::DevServer;
pub use error::DevError;
