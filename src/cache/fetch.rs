//! Network seam for the cache controller.

use async_trait::async_trait;

use super::{Request, Response};
use crate::error::{Error, Result};

/// Abstraction over the network for testability.
///
/// A transport failure is an `Err`; any HTTP status, including errors, is
/// an `Ok` response.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response>;
}

/// Default fetcher backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses an existing client (shared connection pool, custom timeouts).
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        let network = |e: reqwest::Error| Error::Network {
            url: request.url.to_string(),
            reason: e.to_string(),
        };
        let response = self
            .client
            .request(request.method.clone(), request.url.clone())
            .send()
            .await
            .map_err(network)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(network)?;

        log::debug!("Fetched {} -> {status} ({} bytes)", request.url, body.len());
        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refused_connection_is_a_network_error() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let url = format!("http://{addr}/");
        let request = Request::parse(&url).unwrap();

        let err = HttpFetcher::new().fetch(&request).await.unwrap_err();
        assert!(matches!(err, Error::Network { url: failed, .. } if failed == url));
    }
}
