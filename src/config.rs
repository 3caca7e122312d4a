//! Site, server, cache and currency configuration.
//!
//! Loaded from a TOML file; every section and field is optional and falls
//! back to the defaults below.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cache::PartitionKind;
use crate::currency::CurrencyTable;
use crate::error::{Error, Result};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "DH_DOOM_CONFIG";

/// Public-facing site settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Brand name used in titles and the manifest.
    pub name: String,
    /// Canonical base URL without a trailing slash.
    pub url: String,
    /// WhatsApp number in any notation; non-digits are stripped when linking.
    pub whatsapp_number: String,
    /// Display currency used when no cookie is present.
    pub default_currency: Option<String>,
    /// Directory served under `/images/` and copied by `build`.
    pub asset_dir: Option<PathBuf>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Doom VIP & DH PLUS VIP IPTV".to_string(),
            url: "https://dh-doom.com".to_string(),
            whatsapp_number: "+13322662387".to_string(),
            default_currency: None,
            asset_dir: None,
        }
    }
}

impl SiteConfig {
    /// Base URL with any trailing slash removed.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Offline cache naming and ceilings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Suffix of the versioned partitions (`static-v1`, `dynamic-v1`).
    pub version: String,
    pub images_max_entries: usize,
    pub api_max_entries: usize,
    pub fonts_max_entries: usize,
    /// Cross-origin hosts whose requests are still cached as fonts.
    pub font_hosts: Vec<String>,
    /// Path of the offline document in the static partition.
    pub offline_path: String,
    /// Path of the image served when an image fetch fails.
    pub placeholder_path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            version: "v1".to_string(),
            images_max_entries: 50,
            api_max_entries: 20,
            fonts_max_entries: 10,
            font_hosts: vec![
                "fonts.googleapis.com".to_string(),
                "fonts.gstatic.com".to_string(),
            ],
            offline_path: "/offline.html".to_string(),
            placeholder_path: "/images/placeholder.png".to_string(),
        }
    }
}

impl CacheConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the partition version suffix.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the images partition ceiling.
    #[must_use]
    pub const fn with_images_max_entries(mut self, max: usize) -> Self {
        self.images_max_entries = max;
        self
    }

    /// Sets the api partition ceiling.
    #[must_use]
    pub const fn with_api_max_entries(mut self, max: usize) -> Self {
        self.api_max_entries = max;
        self
    }

    /// Sets the fonts partition ceiling.
    #[must_use]
    pub const fn with_fonts_max_entries(mut self, max: usize) -> Self {
        self.fonts_max_entries = max;
        self
    }

    /// Storage name of a partition.
    #[must_use]
    pub fn partition_name(&self, kind: PartitionKind) -> String {
        match kind {
            PartitionKind::Static => format!("static-{}", self.version),
            PartitionKind::Dynamic => format!("dynamic-{}", self.version),
            PartitionKind::Images => "images-cache".to_string(),
            PartitionKind::Api => "api-cache".to_string(),
            PartitionKind::Fonts => "fonts-cache".to_string(),
        }
    }

    /// Entry ceiling of a partition, `None` when unbounded.
    #[must_use]
    pub const fn max_entries(&self, kind: PartitionKind) -> Option<usize> {
        match kind {
            PartitionKind::Static | PartitionKind::Dynamic => None,
            PartitionKind::Images => Some(self.images_max_entries),
            PartitionKind::Api => Some(self.api_max_entries),
            PartitionKind::Fonts => Some(self.fonts_max_entries),
        }
    }

    /// Names that survive activation, in lookup order.
    #[must_use]
    pub fn current_names(&self) -> Vec<String> {
        PartitionKind::ALL
            .into_iter()
            .map(|kind| self.partition_name(kind))
            .collect()
    }
}

/// Per-code overrides of the built-in exchange rates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyConfig {
    pub rates: BTreeMap<String, f64>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub currency: CurrencyConfig,
}

impl AppConfig {
    /// Creates a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the site section.
    #[must_use]
    pub fn with_site(mut self, site: SiteConfig) -> Self {
        self.site = site;
        self
    }

    /// Sets the listener address.
    #[must_use]
    pub fn with_server(mut self, host: impl Into<String>, port: u16) -> Self {
        self.server = ServerConfig {
            host: host.into(),
            port,
        };
        self
    }

    /// Sets the cache section.
    #[must_use]
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Sets the default display currency.
    #[must_use]
    pub fn with_default_currency(mut self, code: impl Into<String>) -> Self {
        self.site.default_currency = Some(code.into());
        self
    }

    /// Default config file location.
    ///
    /// Uses `DH_DOOM_CONFIG` when set, falling back to
    /// `$XDG_CONFIG_HOME/dh-doom/config.toml`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            PathBuf::from(path)
        } else {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("dh-doom")
                .join("config.toml")
        }
    }

    /// Default directory of the local store.
    #[must_use]
    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dh-doom")
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or fails validation.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the config at `path`, writing the defaults there first if the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, written or parsed.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            let config = Self::from_toml(&raw)?;
            log::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save(path)?;
            log::info!("Wrote default config to {}", path.display());
            Ok(config)
        }
    }

    /// Saves the config atomically (write tmp + rename).
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)?;
        }
        let tmp_path = path.with_extension("toml.tmp");
        std::fs::write(&tmp_path, toml::to_string_pretty(self)?)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Checks values that would otherwise fail late.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty site URL or cache version, and
    /// [`Error::UnknownCurrency`] for an unknown default or overridden code.
    pub fn validate(&self) -> Result<()> {
        if self.site.url.trim().is_empty() {
            return Err(Error::Config("site.url must not be empty".to_string()));
        }
        if self.cache.version.trim().is_empty() {
            return Err(Error::Config("cache.version must not be empty".to_string()));
        }
        if let Some(code) = &self.site.default_currency
            && crate::currency::get_currency(code).is_none()
        {
            return Err(Error::UnknownCurrency(code.clone()));
        }
        self.currency_table().map(|_| ())
    }

    /// Built-in currencies with the configured rate overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error if an override names an unknown code or a
    /// non-positive rate.
    pub fn currency_table(&self) -> Result<CurrencyTable> {
        CurrencyTable::with_rates(&self.currency.rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_app_config() {
        let config = AppConfig::default();
        assert_eq!(config.site.url, "https://dh-doom.com");
        assert_eq!(config.site.whatsapp_number, "+13322662387");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cache.images_max_entries, 50);
        assert_eq!(config.cache.api_max_entries, 20);
        assert_eq!(config.cache.fonts_max_entries, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_pattern() {
        let config = AppConfig::new()
            .with_server("0.0.0.0", 3000)
            .with_default_currency("SAR")
            .with_cache(CacheConfig::new().with_version("v2").with_images_max_entries(5));

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.site.default_currency.as_deref(), Some("SAR"));
        assert_eq!(config.cache.version, "v2");
        assert_eq!(config.cache.images_max_entries, 5);
    }

    #[test]
    fn partition_names_follow_version() {
        let cache = CacheConfig::new().with_version("v7");
        assert_eq!(cache.partition_name(PartitionKind::Static), "static-v7");
        assert_eq!(cache.partition_name(PartitionKind::Dynamic), "dynamic-v7");
        assert_eq!(cache.partition_name(PartitionKind::Images), "images-cache");
        assert_eq!(cache.max_entries(PartitionKind::Dynamic), None);
        assert_eq!(cache.max_entries(PartitionKind::Api), Some(20));
        assert_eq!(cache.current_names()[0], "static-v7");
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            port = 9000

            [currency.rates]
            EUR = 0.9
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.site.name, "Doom VIP & DH PLUS VIP IPTV");
        assert!((config.currency_table().unwrap().convert(10.0, "EUR") - 9.0).abs() < 1e-9);
    }

    #[test]
    fn validate_rejects_unknown_currency() {
        let config = AppConfig::new().with_default_currency("XYZ");
        assert!(matches!(config.validate(), Err(Error::UnknownCurrency(c)) if c == "XYZ"));

        let mut config = AppConfig::new();
        config.currency.rates.insert("JPY".to_string(), 150.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_url() {
        let mut config = AppConfig::new();
        config.site.url = "  ".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn load_or_create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = AppConfig::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created, AppConfig::default());

        let reloaded = AppConfig::load_or_create(&path).unwrap();
        assert_eq!(reloaded, created);
    }

    #[test]
    fn load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        assert!(matches!(
            AppConfig::load_or_create(&path),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn base_url_trims_slash() {
        let site = SiteConfig {
            url: "https://example.com/".to_string(),
            ..SiteConfig::default()
        };
        assert_eq!(site.base_url(), "https://example.com");
    }
}
