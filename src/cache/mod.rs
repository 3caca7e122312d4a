//! Offline cache controller.
//!
//! Mirrors the site's service worker: every intercepted request is
//! classified into a [`ResourceKind`], which picks a [`Strategy`] and the
//! [`PartitionKind`] its responses are stored in. Partitions with a ceiling
//! are trimmed oldest-inserted first after each write.

mod controller;
mod fetch;
mod store;

pub use controller::{CacheController, InstallReport};
pub use fetch::{Fetcher, HttpFetcher};
pub use store::{CachePartition, CacheStorage};

use bytes::Bytes;
use reqwest::{Method, Url};

use crate::error::{Error, Result};

/// What the page intends to do with a response (`Request.destination`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Destination {
    Document,
    Image,
    Font,
    Script,
    Style,
    Manifest,
    #[default]
    Other,
}

/// How the request was issued (`Request.mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// Top-level navigation.
    Navigate,
    SameOrigin,
    NoCors,
    #[default]
    Cors,
}

/// An intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub destination: Destination,
    pub mode: RequestMode,
}

impl Request {
    /// A plain `GET` subresource request.
    #[must_use]
    pub const fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            destination: Destination::Other,
            mode: RequestMode::Cors,
        }
    }

    /// A top-level document navigation.
    #[must_use]
    pub const fn navigate(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            destination: Destination::Document,
            mode: RequestMode::Navigate,
        }
    }

    /// Parses `url` into a `GET` request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `url` is not an absolute URL.
    pub fn parse(url: &str) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::get(parsed))
    }

    #[must_use]
    pub const fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Cache key: the full request URL.
    #[must_use]
    pub fn key(&self) -> &str {
        self.url.as_str()
    }

    #[must_use]
    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }
}

/// A stored or fetched response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// A `200` response.
    #[must_use]
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(200, body)
    }

    /// An empty `404` response.
    #[must_use]
    pub fn not_found() -> Self {
        Self::new(404, Bytes::new())
    }

    /// A `200` HTML document.
    #[must_use]
    pub fn html(body: impl Into<Bytes>) -> Self {
        Self::ok(body).with_header("content-type", "text/html; charset=utf-8")
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First header value named `name`, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Only `200` responses are cacheable.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Resource class of a handled request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Page,
    Image,
    Font,
    Api,
}

impl ResourceKind {
    #[must_use]
    pub const fn strategy(self) -> Strategy {
        match self {
            Self::Page | Self::Image => Strategy::CacheFirst,
            Self::Font => Strategy::CacheFirstLongLived,
            Self::Api => Strategy::NetworkFirst,
        }
    }

    /// Partition network responses are written to.
    #[must_use]
    pub const fn partition(self) -> PartitionKind {
        match self {
            Self::Page => PartitionKind::Dynamic,
            Self::Image => PartitionKind::Images,
            Self::Font => PartitionKind::Fonts,
            Self::Api => PartitionKind::Api,
        }
    }
}

/// Caching policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Serve from cache when present, otherwise fetch and store.
    CacheFirst,
    /// Fetch first, fall back to the cache on network failure.
    NetworkFirst,
    /// Same as [`Strategy::CacheFirst`]; entries are expected to live long.
    CacheFirstLongLived,
}

/// Named cache partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitionKind {
    Static,
    Dynamic,
    Images,
    Api,
    Fonts,
}

impl PartitionKind {
    /// Lookup order: static first.
    pub const ALL: [Self; 5] = [
        Self::Static,
        Self::Dynamic,
        Self::Images,
        Self::Api,
        Self::Fonts,
    ];
}

/// Cache state of a request when its response was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Nothing cached; the network response was not stored.
    Uncached,
    /// Served from or freshly written to the cache.
    CachedFresh,
    /// Network failed and an older cached entry was served.
    CachedStale,
    /// Network failed and a fallback was served.
    NetworkFailed,
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    Cache,
    Network,
    Fallback,
}

/// Result of handling one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not intercepted; the caller should go to the network directly.
    Passthrough,
    Served {
        response: Response,
        source: ServedFrom,
        state: CacheState,
    },
}

impl Outcome {
    #[must_use]
    pub const fn response(&self) -> Option<&Response> {
        match self {
            Self::Passthrough => None,
            Self::Served { response, .. } => Some(response),
        }
    }

    #[must_use]
    pub const fn source(&self) -> Option<ServedFrom> {
        match self {
            Self::Passthrough => None,
            Self::Served { source, .. } => Some(*source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_table() {
        assert_eq!(ResourceKind::Page.strategy(), Strategy::CacheFirst);
        assert_eq!(ResourceKind::Image.strategy(), Strategy::CacheFirst);
        assert_eq!(ResourceKind::Font.strategy(), Strategy::CacheFirstLongLived);
        assert_eq!(ResourceKind::Api.strategy(), Strategy::NetworkFirst);
        assert_eq!(ResourceKind::Page.partition(), PartitionKind::Dynamic);
        assert_eq!(ResourceKind::Api.partition(), PartitionKind::Api);
    }

    #[test]
    fn only_200_is_cacheable() {
        assert!(Response::ok("x").is_ok());
        assert!(!Response::new(204, "").is_ok());
        assert!(!Response::not_found().is_ok());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = Response::html("<p>hi</p>");
        assert_eq!(response.header("Content-Type"), Some("text/html; charset=utf-8"));
        assert_eq!(response.header("etag"), None);
    }

    #[test]
    fn parse_rejects_relative_urls() {
        assert!(Request::parse("https://dh-doom.com/en/").is_ok());
        assert!(matches!(Request::parse("/en/"), Err(Error::InvalidUrl { .. })));
    }
}
