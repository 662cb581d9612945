//! HTTP retrieval of bridge bundles

use crate::codes::{self, ErrorCode};
use crate::proxy::{resolve_proxy, EnvVars, ProxyDescriptor};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::io::Write;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Failed to configure HTTP client: {0}")]
    Client(String),

    #[error("Download from {url} failed with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Download from {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("Failed to write downloaded bundle: {0}")]
    Write(String),
}

impl DownloadError {
    /// Client errors will not go away on their own; everything else might
    pub fn exit_code(&self) -> ErrorCode {
        match self {
            DownloadError::Status { status, .. } if (400..500).contains(status) => {
                codes::BRIDGE_CLI_DOWNLOAD_FAILED_AND_WONT_RETRY
            }
            _ => codes::BRIDGE_CLI_DOWNLOAD_FAILED,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait ArtifactDownloader: Send + Sync {
    /// Stream `url` into `sink`, returning the number of bytes written
    fn download(&self, url: &str, sink: Box<dyn Write + Send>) -> Result<u64, DownloadError>;

    /// Body of a small text resource such as `versions.txt`
    fn fetch_text(&self, url: &str) -> Result<String, DownloadError>;
}

/// Blocking reqwest client honouring the job's proxy settings.
///
/// `timeout` bounds connection setup only; a slow body transfer is never cut
/// off.
pub struct HttpDownloader {
    env: EnvVars,
    timeout: Duration,
}

impl HttpDownloader {
    pub fn new(env: EnvVars, timeout: Duration) -> Self {
        Self { env, timeout }
    }

    /// Proxy route for `url`, from the job env first and the process env second
    pub fn proxy_for(&self, url: &str) -> ProxyDescriptor {
        resolve_proxy(url, &self.env)
    }

    fn client_for(&self, url: &str) -> Result<Client, DownloadError> {
        let mut builder = Client::builder()
            .connect_timeout(self.timeout)
            .timeout(None::<Duration>)
            .user_agent(concat!("scanbridge/", env!("CARGO_PKG_VERSION")));

        match self.proxy_for(url)
            .to_reqwest()
            .map_err(|e| DownloadError::Client(e.to_string()))?
        {
            Some(proxy) => builder = builder.proxy(proxy),
            None => builder = builder.no_proxy(),
        }

        builder
            .build()
            .map_err(|e| DownloadError::Client(e.to_string()))
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, DownloadError> {
        let client = self.client_for(url)?;
        let response = client.get(url).send().map_err(|e| DownloadError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

impl ArtifactDownloader for HttpDownloader {
    fn download(&self, url: &str, mut sink: Box<dyn Write + Send>) -> Result<u64, DownloadError> {
        info!("Downloading Bridge CLI from: {}", url);
        let mut response = self.get(url)?;
        let bytes = response
            .copy_to(&mut sink)
            .map_err(|e| DownloadError::Write(e.to_string()))?;
        sink.flush().map_err(|e| DownloadError::Write(e.to_string()))?;
        debug!("Downloaded {} bytes", bytes);
        Ok(bytes)
    }

    fn fetch_text(&self, url: &str) -> Result<String, DownloadError> {
        self.get(url)?.text().map_err(|e| DownloadError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Read};
    use std::net::TcpListener;
    use std::thread;
    use yare::parameterized;

    #[parameterized(
        not_found = { 404, codes::BRIDGE_CLI_DOWNLOAD_FAILED_AND_WONT_RETRY },
        forbidden = { 403, codes::BRIDGE_CLI_DOWNLOAD_FAILED_AND_WONT_RETRY },
        server_error = { 503, codes::BRIDGE_CLI_DOWNLOAD_FAILED },
        redirect = { 302, codes::BRIDGE_CLI_DOWNLOAD_FAILED },
    )]
    fn test_status_exit_codes(status: u16, expected: ErrorCode) {
        let err = DownloadError::Status {
            url: "https://repo.example/bridge.zip".to_string(),
            status,
        };
        assert_eq!(err.exit_code(), expected);
    }

    #[test]
    fn test_transport_error_is_retryable() {
        let err = DownloadError::Transport {
            url: "https://repo.example/bridge.zip".to_string(),
            reason: "connection refused".to_string(),
        };
        assert_eq!(err.exit_code(), codes::BRIDGE_CLI_DOWNLOAD_FAILED);
    }

    /// Serves a six byte body in two halves with `pause` between them
    fn slow_server(pause: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 6\r\nConnection: close\r\n\r\nabc")
                .unwrap();
            stream.flush().unwrap();
            thread::sleep(pause);
            stream.write_all(b"def").unwrap();
        });
        format!("http://{}/bridge-cli-bundle.zip", addr)
    }

    #[test]
    fn test_slow_body_outlives_connect_timeout() {
        let url = slow_server(Duration::from_millis(1500));
        let env: EnvVars = [("NO_PROXY".to_string(), url.clone())].into_iter().collect();
        let downloader = HttpDownloader::new(env, Duration::from_secs(1));

        let bytes = downloader.download(&url, Box::new(io::sink())).unwrap();

        assert_eq!(bytes, 6);
    }

    #[test]
    fn test_client_builds_with_malformed_proxy() {
        let env: EnvVars = [("HTTPS_PROXY".to_string(), "::not a proxy::".to_string())]
            .into_iter()
            .collect();
        let downloader = HttpDownloader::new(env, Duration::from_secs(5));

        assert!(downloader.client_for("https://repo.example/bridge.zip").is_ok());
    }
}
