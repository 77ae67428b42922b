//! Build, serve, open: the whole dev loop.

use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};

use crate::browser::{self, Browser, SystemBrowser};
use crate::builder::BuildStep;
use crate::config::DevConfig;
use crate::error::DevError;
use crate::server;

pub struct DevServer {
    cfg: DevConfig,
    browser: Arc<dyn Browser>,
}

impl DevServer {
    pub fn new(cfg: DevConfig) -> Self {
        Self::with_browser(cfg, Arc::new(SystemBrowser))
    }

    pub fn with_browser(cfg: DevConfig, browser: Arc<dyn Browser>) -> Self {
        Self { cfg, browser }
    }

    /// Build, bind, launch the browser and serve until `shutdown` resolves.
    ///
    /// Nothing is bound unless the build succeeded. The browser is asked to
    /// open exactly once, after the socket is bound.
    pub async fn run<S>(self, shutdown: S) -> Result<(), DevError>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        if self.cfg.build {
            BuildStep::wasm_pack(&self.cfg)
                .run(shutdown.as_mut())
                .await?;
        } else {
            info!("Skipping build");
        }

        let serve_dir = self.cfg.paths.serve_dir();
        if !serve_dir.is_dir() {
            return Err(DevError::MissingServeDir(serve_dir));
        }
        if !serve_dir.join(&self.cfg.page).is_file() {
            warn!("{} has no {}", serve_dir.display(), self.cfg.page);
        }

        let server = server::bind(&serve_dir, self.cfg.addr)?;
        let url = server.url(&self.cfg.page);
        info!("Serving {} on {}", serve_dir.display(), url);

        if self.cfg.open_browser {
            // Detached: the handle is dropped on purpose.
            if let Err(e) = browser::spawn_open(Arc::clone(&self.browser), url) {
                warn!("Could not start browser thread: {}", e);
            }
        }

        server.serve_until(shutdown).await;
        Ok(())
    }
}
