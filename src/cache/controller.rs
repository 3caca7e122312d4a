//! Request interception and cache lifecycle.

use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::{StreamExt, stream};
use reqwest::{Method, Url};

use super::{
    CacheState, CacheStorage, Destination, Fetcher, HttpFetcher, Outcome, PartitionKind, Request,
    ResourceKind, Response, ServedFrom, Strategy,
};
use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::progress::InstallProgress;

/// Number of precache fetches in flight during [`CacheController::install`].
const PRECACHE_CONCURRENCY: usize = 6;

const BUILTIN_OFFLINE_HTML: &str = "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Offline</title></head><body><main><h1>Offline</h1><p>Check your internet connection and try again.</p></main></body></html>\n";

/// Outcome of [`CacheController::install`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Paths stored in the static partition.
    pub cached: Vec<String>,
    /// Paths that failed, with the reason.
    pub failed: Vec<(String, String)>,
    /// Total body bytes stored.
    pub bytes: u64,
}

impl InstallReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Offline cache controller for one origin.
///
/// The partition map sits behind a mutex that is only held for synchronous
/// map operations, never across a network await.
pub struct CacheController<F: Fetcher = HttpFetcher> {
    origin: Url,
    config: CacheConfig,
    fetcher: F,
    storage: Mutex<CacheStorage>,
    offline_fallback: Response,
}

impl CacheController<HttpFetcher> {
    /// Creates a controller that fetches over HTTP.
    #[must_use]
    pub fn new(origin: Url, config: CacheConfig) -> Self {
        Self::with_fetcher(origin, config, HttpFetcher::new())
    }
}

impl<F: Fetcher> CacheController<F> {
    /// Creates a controller with a custom fetcher and empty storage.
    #[must_use]
    pub fn with_fetcher(origin: Url, config: CacheConfig, fetcher: F) -> Self {
        Self {
            origin,
            config,
            fetcher,
            storage: Mutex::new(CacheStorage::new()),
            offline_fallback: Response::html(BUILTIN_OFFLINE_HTML),
        }
    }

    /// Replaces the document served when a navigation fails and the offline
    /// page is not cached.
    #[must_use]
    pub fn with_offline_fallback(mut self, response: Response) -> Self {
        self.offline_fallback = response;
        self
    }

    /// Starts from existing storage, e.g. partitions left by an older version.
    #[must_use]
    pub fn with_storage(self, storage: CacheStorage) -> Self {
        Self {
            storage: Mutex::new(storage),
            ..self
        }
    }

    #[must_use]
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    #[must_use]
    pub const fn origin(&self) -> &Url {
        &self.origin
    }

    fn storage(&self) -> MutexGuard<'_, CacheStorage> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of the current storage.
    #[must_use]
    pub fn snapshot(&self) -> CacheStorage {
        self.storage().clone()
    }

    /// Entry count of each existing partition, in lookup order.
    #[must_use]
    pub fn partition_sizes(&self) -> Vec<(String, usize)> {
        let storage = self.storage();
        storage
            .names()
            .into_iter()
            .map(|name| {
                let len = storage.get(&name).map_or(0, super::CachePartition::len);
                (name, len)
            })
            .collect()
    }

    fn is_font_host(&self, url: &Url) -> bool {
        url.host_str().is_some_and(|host| {
            self.config
                .font_hosts
                .iter()
                .any(|allowed| host == allowed || host.ends_with(&format!(".{allowed}")))
        })
    }

    /// Decides how a request is handled; `None` means pass through.
    #[must_use]
    pub fn classify(&self, request: &Request) -> Option<ResourceKind> {
        if request.method != Method::GET {
            return None;
        }
        if request.url.origin() != self.origin.origin() && !self.is_font_host(&request.url) {
            return None;
        }
        let kind = if request.destination == Destination::Image {
            ResourceKind::Image
        } else if request.url.path().starts_with("/api/") {
            ResourceKind::Api
        } else if request.destination == Destination::Font {
            ResourceKind::Font
        } else {
            ResourceKind::Page
        };
        Some(kind)
    }

    /// Looks `key` up across all partitions, static first.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<Response> {
        self.storage().match_any(key).cloned()
    }

    /// Writes to a partition and trims it to its ceiling.
    fn store(&self, kind: PartitionKind, key: &str, response: Response) {
        let name = self.config.partition_name(kind);
        let max = self.config.max_entries(kind);
        let mut storage = self.storage();
        let partition = storage.open(&name);
        partition.put(key, response);
        if let Some(max) = max {
            let evicted = partition.trim(max);
            if !evicted.is_empty() {
                log::debug!("Trimmed {} entries from {name}", evicted.len());
            }
        }
    }

    fn absolute(&self, path: &str) -> Result<Url> {
        self.origin.join(path).map_err(|e| Error::InvalidUrl {
            url: path.to_string(),
            reason: e.to_string(),
        })
    }

    fn lookup_path(&self, path: &str) -> Option<Response> {
        self.absolute(path).ok().and_then(|url| self.lookup(url.as_str()))
    }

    /// Handles one intercepted request.
    ///
    /// # Errors
    ///
    /// Returns the network error when the fetch fails and the resource kind
    /// has no cached entry or fallback (fonts, API, non-navigation pages).
    pub async fn handle(&self, request: &Request) -> Result<Outcome> {
        let Some(kind) = self.classify(request) else {
            log::debug!("Passing through {} {}", request.method, request.url);
            return Ok(Outcome::Passthrough);
        };
        match kind.strategy() {
            Strategy::CacheFirst | Strategy::CacheFirstLongLived => {
                self.cache_first(request, kind).await
            }
            Strategy::NetworkFirst => self.network_first(request, kind).await,
        }
    }

    async fn cache_first(&self, request: &Request, kind: ResourceKind) -> Result<Outcome> {
        if let Some(response) = self.lookup(request.key()) {
            log::debug!("Cache hit for {}", request.url);
            return Ok(served(response, ServedFrom::Cache, CacheState::CachedFresh));
        }
        match self.fetcher.fetch(request).await {
            Ok(response) => Ok(self.from_network(request, kind, response)),
            Err(e) => self.fallback(request, kind, e),
        }
    }

    async fn network_first(&self, request: &Request, kind: ResourceKind) -> Result<Outcome> {
        match self.fetcher.fetch(request).await {
            Ok(response) => Ok(self.from_network(request, kind, response)),
            Err(e) => match self.lookup(request.key()) {
                Some(cached) => {
                    log::warn!("Network failed for {}, serving cached copy", request.url);
                    Ok(served(cached, ServedFrom::Cache, CacheState::CachedStale))
                }
                None => self.fallback(request, kind, e),
            },
        }
    }

    fn from_network(&self, request: &Request, kind: ResourceKind, response: Response) -> Outcome {
        if response.is_ok() {
            self.store(kind.partition(), request.key(), response.clone());
            served(response, ServedFrom::Network, CacheState::CachedFresh)
        } else {
            served(response, ServedFrom::Network, CacheState::Uncached)
        }
    }

    fn fallback(&self, request: &Request, kind: ResourceKind, error: Error) -> Result<Outcome> {
        let response = match kind {
            ResourceKind::Page if request.is_navigation() => {
                log::warn!("Network failed for {}, serving offline page", request.url);
                self.lookup_path(&self.config.offline_path)
                    .unwrap_or_else(|| self.offline_fallback.clone())
            }
            ResourceKind::Image => self
                .lookup_path(&self.config.placeholder_path)
                .unwrap_or_else(Response::not_found),
            _ => return Err(error),
        };
        Ok(served(response, ServedFrom::Fallback, CacheState::NetworkFailed))
    }

    /// Precaches `paths` into the static partition.
    ///
    /// Fetches run concurrently. A failed path is logged and reported; the
    /// rest still install and nothing is rolled back.
    pub async fn install(&self, paths: &[String], progress: &dyn InstallProgress) -> InstallReport {
        let static_kind = PartitionKind::Static;
        log::info!(
            "Installing {} paths into {}",
            paths.len(),
            self.config.partition_name(static_kind)
        );
        progress.on_install_start(paths.len());

        let results: Vec<(String, Result<(Url, Response)>)> = stream::iter(paths)
            .map(|path| async move {
                let result = self.precache_one(path).await;
                (path.clone(), result)
            })
            .buffer_unordered(PRECACHE_CONCURRENCY)
            .collect()
            .await;

        let mut report = InstallReport::default();
        for (path, result) in results {
            match result {
                Ok((url, response)) => {
                    let bytes = response.body.len() as u64;
                    self.store(static_kind, url.as_str(), response);
                    progress.on_cached(&path, bytes);
                    report.bytes += bytes;
                    report.cached.push(path);
                }
                Err(e) => {
                    log::warn!("Failed to precache {path}: {e}");
                    progress.on_failed(&path, &e.to_string());
                    report.failed.push((path, e.to_string()));
                }
            }
        }
        log::info!(
            "Install finished: {} cached, {} failed",
            report.cached.len(),
            report.failed.len()
        );
        report
    }

    async fn precache_one(&self, path: &str) -> Result<(Url, Response)> {
        let url = self.absolute(path)?;
        let response = self.fetcher.fetch(&Request::get(url.clone())).await?;
        if !response.is_ok() {
            return Err(Error::Network {
                url: url.to_string(),
                reason: format!("status {}", response.status),
            });
        }
        Ok((url, response))
    }

    /// Deletes every partition whose name is not current.
    ///
    /// Returns the deleted names.
    pub fn activate(&self) -> Vec<String> {
        let keep = self.config.current_names();
        let mut storage = self.storage();
        let stale: Vec<String> = storage
            .names()
            .into_iter()
            .filter(|name| !keep.contains(name))
            .collect();
        for name in &stale {
            log::info!("Deleting old cache {name}");
            storage.delete(name);
        }
        stale
    }
}

const fn served(response: Response, source: ServedFrom, state: CacheState) -> Outcome {
    Outcome::Served {
        response,
        source,
        state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    const ORIGIN: &str = "https://dh-doom.com";

    /// Serves canned responses; everything else, or everything while
    /// offline, is a network error.
    #[derive(Default)]
    struct MockFetcher {
        responses: Mutex<HashMap<String, Response>>,
        offline: AtomicBool,
        calls: AtomicUsize,
    }

    impl MockFetcher {
        fn with(self, url: &str, response: Response) -> Self {
            self.responses.lock().unwrap().insert(url.to_string(), response);
            self
        }

        fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetcher for MockFetcher {
        async fn fetch(&self, request: &Request) -> Result<Response> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let unreachable = || Error::Network {
                url: request.url.to_string(),
                reason: "unreachable".to_string(),
            };
            if self.offline.load(Ordering::SeqCst) {
                return Err(unreachable());
            }
            self.responses
                .lock()
                .unwrap()
                .get(request.key())
                .cloned()
                .ok_or_else(unreachable)
        }
    }

    fn url(path: &str) -> Url {
        Url::parse(ORIGIN).unwrap().join(path).unwrap()
    }

    fn controller(fetcher: MockFetcher) -> CacheController<MockFetcher> {
        CacheController::with_fetcher(Url::parse(ORIGIN).unwrap(), CacheConfig::default(), fetcher)
    }

    fn image(path: &str) -> Request {
        Request::get(url(path)).with_destination(Destination::Image)
    }

    #[test]
    fn classification_order() {
        let c = controller(MockFetcher::default());
        let post = Request::get(url("/en/")).with_method(Method::POST);
        assert_eq!(c.classify(&post), None);

        let foreign = Request::get(Url::parse("https://cdn.tailwindcss.com/x.js").unwrap());
        assert_eq!(c.classify(&foreign), None);

        let font_css = Request::get(Url::parse("https://fonts.googleapis.com/css2?family=Inter").unwrap());
        assert_eq!(c.classify(&font_css), Some(ResourceKind::Page));
        let font = Request::get(Url::parse("https://fonts.gstatic.com/s/inter.woff2").unwrap())
            .with_destination(Destination::Font);
        assert_eq!(c.classify(&font), Some(ResourceKind::Font));

        // Image destination wins over the /api/ prefix.
        assert_eq!(c.classify(&image("/api/avatar.png")), Some(ResourceKind::Image));
        let api = Request::get(url("/api/plans")).with_destination(Destination::Font);
        assert_eq!(c.classify(&api), Some(ResourceKind::Api));
        assert_eq!(c.classify(&Request::navigate(url("/ar/faq"))), Some(ResourceKind::Page));
    }

    #[tokio::test]
    async fn passthrough_is_not_fetched() {
        let c = controller(MockFetcher::default());
        let post = Request::get(url("/en/")).with_method(Method::POST);
        assert_eq!(c.handle(&post).await.unwrap(), Outcome::Passthrough);
        assert_eq!(c.fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn cache_first_skips_network_on_hit() {
        let page = url("/en/pricing");
        let c = controller(MockFetcher::default().with(page.as_str(), Response::html("pricing")));
        let request = Request::navigate(page);

        let first = c.handle(&request).await.unwrap();
        assert_eq!(first.source(), Some(ServedFrom::Network));
        let second = c.handle(&request).await.unwrap();
        assert_eq!(second.source(), Some(ServedFrom::Cache));
        assert_eq!(c.fetcher.calls(), 1);
        assert!(c.snapshot().get("dynamic-v1").unwrap().contains(request.key()));
    }

    #[tokio::test]
    async fn non_200_is_returned_but_not_stored() {
        let page = url("/en/missing");
        let c = controller(MockFetcher::default().with(page.as_str(), Response::not_found()));
        let outcome = c.handle(&Request::navigate(page)).await.unwrap();
        assert!(matches!(
            outcome,
            Outcome::Served { ref response, state: CacheState::Uncached, .. } if response.status == 404
        ));
        assert!(c.snapshot().get("dynamic-v1").is_none());
    }

    #[tokio::test]
    async fn api_navigation_failure_propagates() {
        let c = controller(MockFetcher::default());
        let request = Request::navigate(url("/api/plans"));
        assert_eq!(c.classify(&request), Some(ResourceKind::Api));
        assert!(matches!(c.handle(&request).await, Err(Error::Network { .. })));
    }

    #[tokio::test]
    async fn navigation_failure_without_cache_serves_builtin_offline() {
        let c = controller(MockFetcher::default());
        let outcome = c.handle(&Request::navigate(url("/en/faq"))).await.unwrap();
        match outcome {
            Outcome::Served { response, source, state } => {
                assert_eq!(source, ServedFrom::Fallback);
                assert_eq!(state, CacheState::NetworkFailed);
                assert!(String::from_utf8_lossy(&response.body).contains("Offline"));
            }
            Outcome::Passthrough => panic!("navigation should be handled"),
        }
    }

    #[tokio::test]
    async fn navigation_failure_prefers_cached_offline_page() {
        let offline = url("/offline.html");
        let fetcher = MockFetcher::default().with(offline.as_str(), Response::html("cached offline"));
        let c = controller(fetcher)
            .with_offline_fallback(Response::html("builtin"));
        let report = c.install(&["/offline.html".to_string()], &NoProgress).await;
        assert!(report.is_complete());

        c.fetcher.set_offline(true);
        let outcome = c.handle(&Request::navigate(url("/ar/"))).await.unwrap();
        assert_eq!(outcome.response().unwrap().body, "cached offline");
    }

    #[tokio::test]
    async fn non_navigation_page_failure_propagates() {
        let c = controller(MockFetcher::default());
        let script = Request::get(url("/app.js"));
        assert!(matches!(c.handle(&script).await, Err(Error::Network { .. })));
    }

    #[tokio::test]
    async fn image_failure_serves_placeholder_or_404() {
        let c = controller(MockFetcher::default());
        let outcome = c.handle(&image("/images/missing.png")).await.unwrap();
        assert_eq!(outcome.response().unwrap().status, 404);
        assert!(outcome.response().unwrap().body.is_empty());

        let placeholder = url("/images/placeholder.png");
        let c = controller(MockFetcher::default().with(placeholder.as_str(), Response::ok("png")));
        c.install(&["/images/placeholder.png".to_string()], &NoProgress).await;
        c.fetcher.set_offline(true);
        let outcome = c.handle(&image("/images/missing.png")).await.unwrap();
        assert_eq!(outcome.response().unwrap().body, "png");
    }

    #[tokio::test]
    async fn sixty_images_keep_newest_fifty() {
        let mut fetcher = MockFetcher::default();
        for i in 0..60 {
            fetcher = fetcher.with(url(&format!("/images/{i}.png")).as_str(), Response::ok(format!("{i}")));
        }
        let c = controller(fetcher);
        for i in 0..60 {
            c.handle(&image(&format!("/images/{i}.png"))).await.unwrap();
        }
        let storage = c.snapshot();
        let images = storage.get("images-cache").unwrap();
        assert_eq!(images.len(), 50);
        for i in 0..10 {
            assert!(!images.contains(url(&format!("/images/{i}.png")).as_str()));
        }
        assert!(images.contains(url("/images/59.png").as_str()));
    }

    #[tokio::test]
    async fn network_first_refreshes_then_falls_back() {
        let api = url("/api/plans");
        let c = controller(MockFetcher::default().with(api.as_str(), Response::ok("v1")));
        let request = Request::get(api.clone());

        let fresh = c.handle(&request).await.unwrap();
        assert_eq!(fresh.source(), Some(ServedFrom::Network));

        c.fetcher.responses.lock().unwrap().insert(api.to_string(), Response::ok("v2"));
        let refreshed = c.handle(&request).await.unwrap();
        assert_eq!(refreshed.response().unwrap().body, "v2");
        assert_eq!(c.fetcher.calls(), 2);

        c.fetcher.set_offline(true);
        let stale = c.handle(&request).await.unwrap();
        assert!(matches!(
            stale,
            Outcome::Served { source: ServedFrom::Cache, state: CacheState::CachedStale, .. }
        ));
        assert_eq!(stale.response().unwrap().body, "v2");
    }

    #[tokio::test]
    async fn network_first_without_cache_propagates() {
        let c = controller(MockFetcher::default());
        assert!(c.handle(&Request::get(url("/api/health"))).await.is_err());
    }

    #[tokio::test]
    async fn font_failure_propagates() {
        let c = controller(MockFetcher::default());
        let font = Request::get(Url::parse("https://fonts.gstatic.com/s/a.woff2").unwrap())
            .with_destination(Destination::Font);
        assert!(c.handle(&font).await.is_err());
    }

    #[tokio::test]
    async fn install_continues_past_failures() {
        let c = controller(
            MockFetcher::default()
                .with(url("/").as_str(), Response::html("root"))
                .with(url("/gone").as_str(), Response::not_found()),
        );
        let paths = vec!["/".to_string(), "/missing".to_string(), "/gone".to_string()];
        let report = c.install(&paths, &NoProgress).await;
        assert_eq!(report.cached, vec!["/"]);
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.bytes, 4);
        assert!(!report.is_complete());
        assert_eq!(c.lookup(url("/").as_str()).unwrap().body, "root");
    }

    #[tokio::test]
    async fn static_partition_is_searched_first() {
        let page = url("/en/");
        let c = controller(MockFetcher::default().with(page.as_str(), Response::html("precached")));
        c.install(&["/en/".to_string()], &NoProgress).await;
        let outcome = c.handle(&Request::navigate(page)).await.unwrap();
        assert_eq!(outcome.source(), Some(ServedFrom::Cache));
        assert_eq!(c.fetcher.calls(), 1);
    }

    #[test]
    fn activate_deletes_old_partitions() {
        let mut storage = CacheStorage::new();
        storage.open("static-v0").put("k", Response::ok("old"));
        storage.open("doom-vip-iptv-v1");
        storage.open("static-v1");
        storage.open("images-cache");

        let c = controller(MockFetcher::default()).with_storage(storage);
        let mut deleted = c.activate();
        deleted.sort();
        assert_eq!(deleted, vec!["doom-vip-iptv-v1", "static-v0"]);
        assert_eq!(c.snapshot().names(), vec!["static-v1", "images-cache"]);
        assert!(c.activate().is_empty());
    }
}
