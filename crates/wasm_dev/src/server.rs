//! Static file server for the build output.
//!
//! Plain `warp::fs::dir` semantics: MIME type from the extension, `index.html`
//! for directory paths, 404 for anything missing or outside the root.

use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tracing::info;
use warp::Filter;

use crate::error::DevError;

pub fn routes(
    serve_dir: PathBuf,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::get()
        .or(warp::head())
        .unify()
        .and(warp::fs::dir(serve_dir))
        .with(warp::log::custom(|req: warp::log::Info| {
            info!(
                "{} {} {} ({:?})",
                req.method(),
                req.path(),
                req.status().as_u16(),
                req.elapsed()
            );
        }))
}

/// A listening socket that has not started accepting yet.
pub struct BoundServer {
    addr: SocketAddr,
    serve: Pin<Box<dyn Future<Output = ()> + Send>>,
}

impl std::fmt::Debug for BoundServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundServer").field("addr", &self.addr).finish()
    }
}

/// Bind `addr` and prepare to serve `serve_dir`. Must run inside a tokio runtime.
pub fn bind(serve_dir: &Path, addr: SocketAddr) -> Result<BoundServer, DevError> {
    let (bound, serve) = warp::serve(routes(serve_dir.to_path_buf()))
        .try_bind_ephemeral(addr)
        .map_err(|source| DevError::Bind { addr, source })?;

    Ok(BoundServer {
        addr: bound,
        serve: Box::pin(serve),
    })
}

impl BoundServer {
    /// Actual bound address (differs from the request when port 0 was asked for).
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self, page: &str) -> String {
        format!("http://{}/{}", self.addr, page.trim_start_matches('/'))
    }

    /// Serve until `shutdown` resolves. Open connections are dropped, not drained.
    pub async fn serve_until<S>(self, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        tokio::select! {
            _ = self.serve => {}
            _ = shutdown => info!("Shutting down server on {}", self.addr),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use std::future;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    pub(crate) struct HttpResponse {
        pub status: u16,
        pub head: String,
        pub body: Vec<u8>,
    }

    impl HttpResponse {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.head.lines().skip(1).find_map(|line| {
                let (k, v) = line.split_once(':')?;
                k.trim().eq_ignore_ascii_case(name).then(|| v.trim())
            })
        }
    }

    pub(crate) async fn get(addr: SocketAddr, path: &str) -> HttpResponse {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let req = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
        stream.write_all(req.as_bytes()).await.unwrap();

        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();

        let split = raw
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("response has no header terminator");
        let head = String::from_utf8_lossy(&raw[..split]).into_owned();
        let body = raw[split + 4..].to_vec();
        let status = head
            .split_whitespace()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .expect("status line");

        HttpResponse { status, head, body }
    }

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("www");
        fs::create_dir_all(root.join("pkg")).unwrap();
        fs::write(root.join("index.html"), "<html>choreo</html>").unwrap();
        fs::write(root.join("pkg").join("wasm_app_bg.wasm"), b"\0asm\x01\0\0\0").unwrap();
        fs::write(dir.path().join("secret.txt"), "outside").unwrap();
        dir
    }

    async fn start(root: &Path) -> SocketAddr {
        let server = bind(root, "127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = server.local_addr();
        tokio::spawn(server.serve_until(future::pending()));
        addr
    }

    #[tokio::test]
    async fn serves_files_with_mime_types() {
        let dir = site();
        let addr = start(&dir.path().join("www")).await;

        let resp = get(addr, "/index.html").await;
        assert_eq!(resp.status, 200);
        assert!(resp.header("content-type").unwrap().starts_with("text/html"));
        assert_eq!(resp.body, b"<html>choreo</html>");

        let resp = get(addr, "/pkg/wasm_app_bg.wasm").await;
        assert_eq!(resp.status, 200);
        assert_eq!(resp.header("content-type"), Some("application/wasm"));
        assert_eq!(resp.body, b"\0asm\x01\0\0\0");
    }

    #[tokio::test]
    async fn directory_path_serves_index() {
        let dir = site();
        let addr = start(&dir.path().join("www")).await;

        let resp = get(addr, "/").await;
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, b"<html>choreo</html>");
    }

    #[tokio::test]
    async fn missing_and_escaping_paths_are_not_found() {
        let dir = site();
        let addr = start(&dir.path().join("www")).await;

        assert_eq!(get(addr, "/nope.js").await.status, 404);
        assert_eq!(get(addr, "/pkg/missing.wasm").await.status, 404);
        assert_eq!(get(addr, "/../secret.txt").await.status, 404);
    }

    #[tokio::test]
    async fn port_in_use_is_a_bind_error() {
        let holder = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let taken = holder.local_addr().unwrap();

        let dir = site();
        let err = bind(dir.path(), taken).unwrap_err();
        match err {
            DevError::Bind { addr, .. } => assert_eq!(addr, taken),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn url_uses_bound_address() {
        let dir = site();
        let server = bind(dir.path(), "127.0.0.1:0".parse().unwrap()).unwrap();
        let port = server.local_addr().port();
        assert_ne!(port, 0);
        assert_eq!(
            server.url("/index.html"),
            format!("http://127.0.0.1:{port}/index.html")
        );
    }
}
