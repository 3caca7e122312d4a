//! Static export of the whole site into a directory tree.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};

use crate::cache::PartitionKind;
use crate::config::AppConfig;
use crate::currency::{CurrencyTable, default_currency};
use crate::error::Result;
use crate::fs::{FileSystem, TokioFileSystem};
use crate::locale::Locale;
use crate::progress::ExportProgress;
use crate::pwa;
use crate::render::{self, RenderContext};
use crate::site::{Page, precache_paths};

/// A generated file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteFile {
    pub path: PathBuf,
    pub contents: String,
}

impl SiteFile {
    fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// Summary of a finished export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Paths written, relative to the output directory.
    pub files: Vec<PathBuf>,
    pub bytes: u64,
}

/// Writes rendered pages and PWA assets to disk.
pub struct Exporter<F: FileSystem = TokioFileSystem> {
    config: AppConfig,
    currencies: CurrencyTable,
    fs: F,
}

impl Exporter<TokioFileSystem> {
    /// Creates an exporter that writes with `tokio::fs`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured currency overrides are invalid.
    pub fn new(config: AppConfig) -> Result<Self> {
        Self::with_fs(config, TokioFileSystem)
    }
}

impl<F: FileSystem> Exporter<F> {
    /// Creates an exporter with a custom file system implementation.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured currency overrides are invalid.
    pub fn with_fs(config: AppConfig, fs: F) -> Result<Self> {
        let currencies = config.currency_table()?;
        Ok(Self {
            config,
            currencies,
            fs,
        })
    }

    /// Currency shown on the exported pricing page of `locale`.
    ///
    /// A static tree cannot see the visitor's cookie, so the configured
    /// default wins, then the locale default.
    fn export_currency(&self, locale: Locale) -> &'static str {
        self.currencies.pick(&[
            self.config.site.default_currency.as_deref(),
            Some(default_currency(locale.code())),
        ])
    }

    /// Every generated file, in write order.
    #[must_use]
    pub fn files(&self, today: NaiveDate) -> Vec<SiteFile> {
        let site = &self.config.site;
        let mut files = vec![SiteFile::new("index.html", redirect_document(Locale::default()))];

        for locale in Locale::ALL {
            let ctx = RenderContext::new(site, &self.currencies)
                .with_currency(self.export_currency(locale));
            for page in Page::ALL {
                let path = match page {
                    Page::Home => PathBuf::from(locale.code()).join("index.html"),
                    _ => PathBuf::from(locale.code()).join(page.slug()).join("index.html"),
                };
                files.push(SiteFile::new(path, render::render_page(locale, page, &ctx)));
            }
        }

        let ctx = RenderContext::new(site, &self.currencies);
        files.extend([
            SiteFile::new("404.html", render::render_not_found(Locale::default(), &ctx)),
            SiteFile::new("offline.html", render::render_offline(Locale::default(), site)),
            SiteFile::new("sw.js", pwa::service_worker_js(&self.config.cache, &precache_paths())),
            SiteFile::new("manifest.json", pwa::manifest_json(site)),
            SiteFile::new("icon.svg", pwa::icon_svg()),
            SiteFile::new("sitemap.xml", render::sitemap_xml(site.base_url(), today)),
            SiteFile::new("robots.txt", render::robots_txt(site.base_url())),
        ]);
        files
    }

    async fn asset_files(&self) -> Vec<PathBuf> {
        let Some(dir) = &self.config.site.asset_dir else {
            return Vec::new();
        };
        match self.fs.list_files(dir).await {
            Ok(files) => files,
            Err(e) => {
                log::warn!("Skipping assets in {}: {e}", dir.display());
                Vec::new()
            }
        }
    }

    /// Writes the site under `out`, copying assets into `out/images`.
    ///
    /// # Errors
    ///
    /// Returns an error on the first file that cannot be written.
    pub async fn export(&self, out: &Path, progress: &dyn ExportProgress) -> Result<ExportReport> {
        let files = self.files(Utc::now().date_naive());
        let assets = self.asset_files().await;
        log::info!(
            "Exporting {} pages and {} assets to {}",
            files.len(),
            assets.len(),
            out.display()
        );
        progress.on_export_start(files.len() + assets.len());

        let mut report = ExportReport::default();
        for file in files {
            let target = out.join(&file.path);
            if let Some(parent) = target.parent() {
                self.fs.create_dir_all(parent).await?;
            }
            self.fs.write_file(&target, file.contents.as_bytes()).await?;
            let bytes = file.contents.len() as u64;
            progress.on_file_written(&file.path, bytes);
            report.bytes += bytes;
            report.files.push(file.path);
        }

        if !assets.is_empty() {
            self.fs.create_dir_all(&out.join("images")).await?;
        }
        for asset in assets {
            let Some(name) = asset.file_name() else {
                continue;
            };
            let relative = Path::new("images").join(name);
            let bytes = self.fs.copy_file(&asset, &out.join(&relative)).await?;
            progress.on_file_written(&relative, bytes);
            report.bytes += bytes;
            report.files.push(relative);
        }

        log::info!(
            "Export finished: {} files, cache {}",
            report.files.len(),
            self.config.cache.partition_name(PartitionKind::Static)
        );
        Ok(report)
    }
}

/// Root document that forwards to the default locale.
fn redirect_document(locale: Locale) -> String {
    let target = Page::Home.path(locale);
    format!(
        "<!DOCTYPE html>\n<html lang=\"{code}\">\n<head>\n<meta charset=\"utf-8\">\n<meta http-equiv=\"refresh\" content=\"0; url={target}\">\n<link rel=\"canonical\" href=\"{target}\">\n<title>Redirecting</title>\n</head>\n<body><a href=\"{target}\">{target}</a></body>\n</html>\n",
        code = locale.code(),
    )
}
