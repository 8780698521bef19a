//! Thin GET helper shared by every discovery strategy.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::debug;

use sitepages_shared::{FetchConfig, Result, SitePagesError};

/// HTTP client used for robots.txt, sitemap, and homepage requests.
///
/// Redirects are followed up to the configured limit. Each request carries its
/// own timeout, so one client serves every strategy.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_response_bytes: u64,
}

impl Fetcher {
    /// Build a fetcher from the `[fetch]` config section.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| SitePagesError::Upstream(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_response_bytes: config.max_response_bytes,
        })
    }

    /// GET `url` and return the body as text. Anything but a 200 is an error.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub async fn get_text(&self, url: &str, timeout: Duration) -> Result<String> {
        let body = self.get_bytes(url, timeout).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// GET `url` and return the raw body bytes. Anything but a 200 is an error.
    ///
    /// The body is read chunk by chunk and abandoned as soon as it grows past
    /// `max_response_bytes`, whether or not the server sent a length.
    pub async fn get_bytes(&self, url: &str, timeout: Duration) -> Result<Vec<u8>> {
        let mut response = self.send(url, timeout).await?;

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| SitePagesError::Upstream(format!("{url}: failed to read body: {e}")))?
        {
            if (body.len() + chunk.len()) as u64 > self.max_response_bytes {
                return Err(self.too_large(url, body.len() + chunk.len()));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    /// Largest body, in bytes, this fetcher accepts.
    pub fn max_response_bytes(&self) -> u64 {
        self.max_response_bytes
    }

    async fn send(&self, url: &str, timeout: Duration) -> Result<reqwest::Response> {
        debug!(%url, timeout_ms = timeout.as_millis(), "GET");

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| SitePagesError::Upstream(format!("{url}: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(SitePagesError::Upstream(format!("{url}: HTTP {status}")));
        }

        if let Some(len) = response.content_length() {
            if len > self.max_response_bytes {
                return Err(self.too_large(url, len));
            }
        }

        Ok(response)
    }

    fn too_large(&self, url: &str, len: impl std::fmt::Display) -> SitePagesError {
        SitePagesError::Upstream(format!(
            "{url}: response too large ({len} bytes, max {})",
            self.max_response_bytes
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> Fetcher {
        Fetcher::new(&FetchConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn returns_body_on_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *"))
            .mount(&server)
            .await;

        let body = fetcher()
            .get_text(&format!("{}/robots.txt", server.uri()), Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(body, "User-agent: *");
    }

    #[tokio::test]
    async fn non_200_success_is_still_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let err = fetcher()
            .get_text(&server.uri(), Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, SitePagesError::Upstream(_)));
        assert!(err.to_string().contains("204"));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let result = fetcher()
            .get_text(&server.uri(), Duration::from_millis(50))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
            .mount(&server)
            .await;

        let config = FetchConfig {
            max_response_bytes: 16,
            ..FetchConfig::default()
        };
        let err = Fetcher::new(&config)
            .unwrap()
            .get_bytes(&server.uri(), Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    /// Serve one chunked response with no `Content-Length`, `chunks` chunks of
    /// `chunk_len` bytes each.
    async fn chunked_server(chunks: usize, chunk_len: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;

            let mut response =
                b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n"
                    .to_vec();
            for _ in 0..chunks {
                response.extend_from_slice(format!("{chunk_len:x}\r\n").as_bytes());
                response.extend(std::iter::repeat_n(b'x', chunk_len));
                response.extend_from_slice(b"\r\n");
            }
            response.extend_from_slice(b"0\r\n\r\n");
            let _ = socket.write_all(&response).await;
            let _ = socket.shutdown().await;
        });

        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn chunked_body_over_limit_is_rejected() {
        let url = chunked_server(16, 256).await;
        let config = FetchConfig {
            max_response_bytes: 16,
            ..FetchConfig::default()
        };

        let err = Fetcher::new(&config)
            .unwrap()
            .get_bytes(&url, Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, SitePagesError::Upstream(_)));
        assert!(err.to_string().contains("too large"));
    }

    #[tokio::test]
    async fn chunked_body_within_limit_is_read() {
        let url = chunked_server(4, 8).await;

        let body = fetcher().get_text(&url, Duration::from_secs(2)).await.unwrap();
        assert_eq!(body, "x".repeat(32));
    }
}
