//! Command implementations for the `dh-doom` binary.

mod progress;

use std::path::Path;
use std::time::Instant;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::cache::CacheController;
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::export::Exporter;
use crate::site::precache_paths;
use crate::storage::LocalStore;

use progress::{BarProgress, print_currency_table, print_export_summary, print_install_summary};

/// Offline-data key under which the last `warm` run is recorded.
pub const WARM_REPORT_KEY: &str = "warm-report";

/// What the last `warm` run achieved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarmReport {
    pub origin: String,
    pub cached: usize,
    pub failed: Vec<String>,
    pub bytes: u64,
    pub partitions: Vec<(String, usize)>,
}

/// Uses the stored preferred currency when the config sets no default.
///
/// A store that cannot be read is logged and ignored.
#[must_use]
pub fn with_stored_currency(config: AppConfig, data_dir: &Path) -> AppConfig {
    if config.site.default_currency.is_some() {
        return config;
    }
    match LocalStore::open(data_dir) {
        Ok(store) => match store.preferred_currency() {
            Some(code) => {
                log::debug!("Using stored preferred currency {code}");
                config.with_default_currency(code)
            }
            None => config,
        },
        Err(e) => {
            log::warn!("Could not read local store: {e}");
            config
        }
    }
}

/// Exports the static site into `out`.
///
/// # Errors
///
/// Returns an error if the config is invalid or a file cannot be written.
pub async fn run_build(config: AppConfig, out: &Path) -> Result<()> {
    let started = Instant::now();
    let exporter = Exporter::new(config)?;
    let progress = BarProgress::new("build");
    let result = exporter.export(out, &progress).await;
    progress.finish();
    let report = result?;
    print_export_summary(out, &report, started.elapsed());
    Ok(())
}

/// Parses an `http`/`https` origin that precache paths can be joined onto.
fn parse_origin(origin: &str) -> Result<Url> {
    let invalid = |reason: String| Error::InvalidUrl {
        url: origin.to_string(),
        reason,
    };
    let url = Url::parse(origin).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "expected an http or https origin, got scheme {}",
            url.scheme()
        )));
    }
    Ok(url)
}

/// Precaches the site from a running `origin` and records the outcome.
///
/// # Errors
///
/// Returns an error if `origin` is not an http(s) URL or the report cannot
/// be saved.
pub async fn run_warm(config: AppConfig, origin: &str, data_dir: &Path) -> Result<()> {
    let url = parse_origin(origin)?;
    let started = Instant::now();
    let controller = CacheController::new(url, config.cache);

    let progress = BarProgress::new("warm");
    let report = controller.install(&precache_paths(), &progress).await;
    progress.finish();
    let deleted = controller.activate();
    if !deleted.is_empty() {
        log::info!("Removed {} outdated partitions", deleted.len());
    }

    let partitions = controller.partition_sizes();
    print_install_summary(origin, &report, &partitions, started.elapsed());

    let mut store = LocalStore::open(data_dir)?;
    store.put_offline_data(
        WARM_REPORT_KEY,
        &WarmReport {
            origin: origin.to_string(),
            cached: report.cached.len(),
            failed: report.failed.into_iter().map(|(path, _)| path).collect(),
            bytes: report.bytes,
            partitions,
        },
    )?;
    log::debug!("Saved warm report to {}", store.path().display());
    Ok(())
}

/// Lists currencies, or stores `code` as the preferred display currency.
///
/// # Errors
///
/// Returns [`Error::UnknownCurrency`] for an unknown code, or an error if
/// the store cannot be read or written.
pub fn run_currency(config: &AppConfig, code: Option<&str>, data_dir: &Path) -> Result<()> {
    let table = config.currency_table()?;
    let mut store = LocalStore::open(data_dir)?;

    if let Some(code) = code {
        let currency = table
            .get(&code.to_ascii_uppercase())
            .ok_or_else(|| Error::UnknownCurrency(code.to_string()))?;
        store.set_preferred_currency(currency.code)?;
        println!("Preferred currency set to {}", currency.display_name());
        return Ok(());
    }

    print_currency_table(table.all(), store.preferred_currency());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn currency_command_persists_preference() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::default();
        run_currency(&config, Some("eur"), dir.path()).unwrap();

        let store = LocalStore::open(dir.path()).unwrap();
        assert_eq!(store.preferred_currency(), Some("EUR"));
        assert!(matches!(
            run_currency(&config, Some("XYZ"), dir.path()),
            Err(Error::UnknownCurrency(_))
        ));
        run_currency(&config, None, dir.path()).unwrap();
    }

    #[test]
    fn stored_currency_fills_missing_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = with_stored_currency(AppConfig::default(), dir.path());
        assert_eq!(config.site.default_currency, None);

        LocalStore::open(dir.path())
            .unwrap()
            .set_preferred_currency("AED")
            .unwrap();
        let config = with_stored_currency(AppConfig::default(), dir.path());
        assert_eq!(config.site.default_currency.as_deref(), Some("AED"));

        let explicit = AppConfig::default().with_default_currency("GBP");
        let config = with_stored_currency(explicit, dir.path());
        assert_eq!(config.site.default_currency.as_deref(), Some("GBP"));
    }

    #[tokio::test]
    async fn build_writes_site() {
        let dir = tempfile::TempDir::new().unwrap();
        run_build(AppConfig::default(), dir.path()).await.unwrap();
        assert!(dir.path().join("en/pricing/index.html").exists());
        assert!(dir.path().join("sw.js").exists());
    }

    #[tokio::test]
    async fn warm_rejects_relative_origin() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = run_warm(AppConfig::default(), "localhost:8080/", dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
        assert!(LocalStore::open(dir.path()).unwrap().offline_keys().next().is_none());
    }

    #[test]
    fn origin_must_be_http() {
        for origin in ["localhost:8080/", "ftp://example.com/", "mailto:a@example.com", "/en/"] {
            assert!(
                matches!(parse_origin(origin), Err(Error::InvalidUrl { .. })),
                "{origin} was accepted"
            );
        }
        assert_eq!(
            parse_origin("http://127.0.0.1:8080").unwrap().as_str(),
            "http://127.0.0.1:8080/"
        );
        assert!(parse_origin("https://dh-doom.com/").is_ok());
    }

    #[cfg(feature = "server")]
    #[tokio::test]
    async fn warm_against_local_server_records_report() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let origin = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(crate::server::serve(listener, AppConfig::default(), async {
            let _ = rx.await;
        }));

        let dir = tempfile::TempDir::new().unwrap();
        run_warm(AppConfig::default(), &origin, dir.path()).await.unwrap();
        let _ = tx.send(());

        let store = LocalStore::open(dir.path()).unwrap();
        let saved = store
            .offline_data::<WarmReport>(WARM_REPORT_KEY, Duration::hours(1))
            .unwrap();
        assert!(!saved.stale);
        assert_eq!(saved.data.origin, origin);
        // Pages and PWA assets are served; images are not without an asset dir.
        assert_eq!(saved.data.cached, 14);
        assert_eq!(saved.data.failed.len(), 10);
        assert!(saved.data.partitions.iter().any(|(name, len)| name == "static-v1" && *len == 14));
    }
}
