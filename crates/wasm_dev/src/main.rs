//! wasm-dev - build the wasm app and serve it locally
//!
//! Runs `wasm-pack build --release --target web apps/wasm` from the
//! repository root, serves `apps/wasm` on 127.0.0.1:8000 and opens
//! `index.html` in the default browser. Stop with Ctrl-C.

use std::process::ExitCode;

use tracing::{error, info};
use wasm_dev::config::{self, Command};
use wasm_dev::{DevConfig, DevError, DevServer};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if matches!(e, DevError::Usage(_)) {
                eprintln!("{e}\n\n{}", config::USAGE);
            } else {
                error!("{}", e);
            }
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), DevError> {
    let cli = match config::parse_args(std::env::args().skip(1))? {
        Command::Run(cli) => cli,
        Command::Help => {
            println!("{}", config::USAGE);
            return Ok(());
        }
    };

    let cfg = DevConfig::load(&cli)?;
    info!("Project root: {}", cfg.paths.root().display());

    DevServer::new(cfg)
        .run(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received");
            } else {
                // No signal handler available: serve until killed.
                std::future::pending::<()>().await;
            }
        })
        .await
}
