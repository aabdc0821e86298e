use std::sync::Arc;
use std::time::Duration;

use super::fetch::ImageFetcher;
use crate::error::ImageLoadError;

/// Largest remote image body accepted
pub const MAX_REMOTE_IMAGE_BYTES: u64 = 32 * 1024 * 1024;

pub fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://")
}

/// Downloads `http://` and `https://` sources with a blocking client.
///
/// Runs on the cache's spawner thread, never on the UI thread.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    max_bytes: u64,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mockup_editor/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            max_bytes: MAX_REMOTE_IMAGE_BYTES,
        })
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch(&self, src: &str) -> Result<Vec<u8>, ImageLoadError> {
        let fail = |reason: String| ImageLoadError::Fetch {
            src: src.to_owned(),
            reason,
        };
        let response = self
            .client
            .get(src)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|e| fail(e.to_string()))?;

        let too_large = |len: u64| fail(format!("{} bytes exceeds the {} byte limit", len, self.max_bytes));
        if let Some(len) = response.content_length() {
            if len > self.max_bytes {
                return Err(too_large(len));
            }
        }
        let bytes = response.bytes().map_err(|e| fail(e.to_string()))?;
        if bytes.len() as u64 > self.max_bytes {
            return Err(too_large(bytes.len() as u64));
        }
        log::debug!("downloaded {} ({} bytes)", src, bytes.len());
        Ok(bytes.to_vec())
    }
}

/// Sends remote URLs to one fetcher and everything else to another
#[derive(Clone)]
pub struct SchemeFetcher {
    local: Arc<dyn ImageFetcher>,
    remote: Arc<dyn ImageFetcher>,
}

impl SchemeFetcher {
    pub fn new(local: Arc<dyn ImageFetcher>, remote: Arc<dyn ImageFetcher>) -> Self {
        Self { local, remote }
    }
}

impl std::fmt::Debug for SchemeFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemeFetcher").finish_non_exhaustive()
    }
}

impl ImageFetcher for SchemeFetcher {
    fn fetch(&self, src: &str) -> Result<Vec<u8>, ImageLoadError> {
        if is_remote(src) {
            self.remote.fetch(src)
        } else {
            self.local.fetch(src)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_cache::MemoryFetcher;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Answer one HTTP request on a local port with `status` and `body`
    fn serve_once(status: &'static str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {}\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            )
            .unwrap();
            stream.write_all(&body).unwrap();
            stream.flush().unwrap();
        });
        format!("http://{}/logo.png", addr)
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn downloads_the_body() {
        let url = serve_once("200 OK", vec![1, 2, 3, 4]);
        assert_eq!(fetcher().fetch(&url).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn error_status_is_a_fetch_error() {
        let url = serve_once("404 Not Found", Vec::new());
        let err = fetcher().fetch(&url).unwrap_err();
        assert!(matches!(err, ImageLoadError::Fetch { ref src, .. } if *src == url));
    }

    #[test]
    fn oversized_bodies_are_refused() {
        let url = serve_once("200 OK", vec![0; 64]);
        let err = fetcher().with_max_bytes(16).fetch(&url).unwrap_err();
        assert!(err.to_string().contains("byte limit"));
    }

    #[test]
    fn urls_go_to_the_remote_fetcher() {
        let local = MemoryFetcher::new();
        local.insert("tee.png", vec![1]);
        let remote = MemoryFetcher::new();
        remote.insert("https://cdn.example.com/art.png", vec![2]);
        let router = SchemeFetcher::new(Arc::new(local), Arc::new(remote));

        assert_eq!(router.fetch("tee.png").unwrap(), vec![1]);
        assert_eq!(router.fetch("https://cdn.example.com/art.png").unwrap(), vec![2]);
        assert!(router.fetch("https://cdn.example.com/missing.png").is_err());
        assert!(router.fetch("http://cdn.example.com/art.png").is_err());
    }
}
