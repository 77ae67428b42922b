use std::io;
use std::sync::Arc;
use std::thread;

use tracing::{info, warn};

/// Something that can show a URL to the developer.
pub trait Browser: Send + Sync + 'static {
    fn open(&self, url: &str) -> io::Result<()>;
}

/// The OS default browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

impl Browser for SystemBrowser {
    fn open(&self, url: &str) -> io::Result<()> {
        webbrowser::open(url)
    }
}

/// Open `url` on a detached thread; failures only log.
///
/// The handle is returned for tests; callers normally drop it, which detaches
/// the thread so it never holds up process exit.
pub fn spawn_open(browser: Arc<dyn Browser>, url: String) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("open-browser".to_string())
        .spawn(move || match browser.open(&url) {
            Ok(()) => info!("Opened browser at {}", url),
            Err(e) => warn!("Could not open browser ({}); visit {} manually", e, url),
        })
}
