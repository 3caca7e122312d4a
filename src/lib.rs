//! dh-doom - the bilingual DOOM VIP / DH PLUS VIP IPTV reseller site.
//!
//! The library renders every page of the site for a [`Locale`], converts
//! USD plan prices into display currencies, builds WhatsApp deep links and
//! implements the offline cache controller behind the site's service worker.
//!
//! # Example
//!
//! ```
//! use dh_doom::{CurrencyTable, Locale, RenderContext, SiteConfig, render};
//!
//! let site = SiteConfig::default();
//! let ctx = RenderContext::new(&site, CurrencyTable::standard()).with_currency("SAR");
//! let html = render(Locale::Ar, "pricing", &ctx);
//! assert!(html.contains("dir=\"rtl\""));
//! assert!(html.contains("56.25 ر.س"));
//! ```

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod cache;
pub mod config;
pub mod currency;
pub mod error;
pub mod export;
pub mod format;
pub mod fs;
pub mod i18n;
pub mod locale;
pub mod progress;
pub mod pwa;
pub mod render;
pub mod site;
pub mod storage;
pub mod whatsapp;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "server")]
pub mod server;

// Re-export main types for convenience
pub use cache::{CacheController, Fetcher, HttpFetcher, InstallReport, Outcome, Request, Response};
pub use config::{AppConfig, CacheConfig, SiteConfig};
pub use currency::{Currency, CurrencyTable, convert_price, format_price};
pub use error::{Error, Result};
pub use export::{ExportReport, Exporter};
pub use format::{format_bytes, format_elapsed};
pub use fs::{FileSystem, TokioFileSystem};
pub use i18n::Dictionary;
pub use locale::{Direction, Locale};
pub use progress::{ExportProgress, InstallProgress, NoProgress};
pub use render::{RenderContext, render, render_page};
pub use site::{Page, Plan, Service};
pub use storage::LocalStore;
pub use whatsapp::format_whatsapp_url;
