//! Remote file retrieval
//!
//! A fetch opens the remote resource and hands back its body as a blocking
//! byte stream; the writer drains it chunk by chunk, so memory use does not
//! depend on file size. Any non-2xx status is an error. No retries: one
//! failed attempt is final for that row.

use std::io::Read;
use std::time::Duration;
use thiserror::Error;

/// Body of a successful fetch
pub type FetchStream = Box<dyn Read + Send>;

/// Fetch errors. Always row-level, never fatal to the batch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),

    /// Connection, DNS, TLS or redirect failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} for url: {url}")]
    Status { status: reqwest::StatusCode, url: String },
}

/// Something that can turn a URL into a byte stream
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<FetchStream, FetchError>;
}

/// Transport settings
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    /// None leaves the request unbounded
    pub timeout: Option<Duration>,
}

/// Blocking HTTP fetcher.
///
/// Must be created and dropped outside the async runtime; the batch runs on
/// a blocking thread for exactly that reason.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchStream, FetchError> {
        tracing::debug!(url = %url, "Fetching");

        let response = self.client.get(url).send()?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        tracing::debug!(
            url = %url,
            status = status.as_u16(),
            content_length = ?response.content_length(),
            "Fetch accepted"
        );

        Ok(Box::new(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&FetchConfig {
            user_agent: "trackfetch-test".to_string(),
            timeout: Some(Duration::from_secs(10)),
        })
        .unwrap()
    }

    #[test]
    fn test_fetch_streams_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/song.flac");
            then.status(200).body("fLaC-bytes");
        });

        let mut stream = fetcher().fetch(&server.url("/song.flac")).unwrap();
        let mut body = Vec::new();
        stream.read_to_end(&mut body).unwrap();

        assert_eq!(body, b"fLaC-bytes");
        mock.assert();
    }

    #[test]
    fn test_non_success_status_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing.flac");
            then.status(404);
        });

        let url = server.url("/missing.flac");
        let err = fetcher().fetch(&url).err().unwrap();
        match err {
            FetchError::Status { status, url: reported } => {
                assert_eq!(status.as_u16(), 404);
                assert_eq!(reported, url);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unreachable_host_is_network_error() {
        // Port 9 on localhost is almost never listening
        let err = fetcher().fetch("http://127.0.0.1:9/x.flac").err().unwrap();
        assert!(matches!(err, FetchError::Network(_)));
    }

    #[test]
    fn test_invalid_url_is_error() {
        assert!(fetcher().fetch("not a url").is_err());
    }
}
