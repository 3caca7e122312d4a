//! Site map and content records.
//!
//! [`Page`] enumerates every routable page. The content types ([`Plan`],
//! [`Feature`], [`Stat`], [`Review`], [`FaqItem`], [`DownloadApp`]) are
//! deserialized from the translation dictionaries, so each locale carries
//! its own copy.

use serde::{Deserialize, Serialize};

use crate::locale::Locale;

/// A routable page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    Pricing,
    Downloads,
    Faq,
    Contact,
    RefundPolicy,
    PrivacyPolicy,
    Terms,
}

impl Page {
    /// Every page in sitemap order.
    pub const ALL: [Self; 8] = [
        Self::Home,
        Self::Pricing,
        Self::Downloads,
        Self::Faq,
        Self::Contact,
        Self::RefundPolicy,
        Self::PrivacyPolicy,
        Self::Terms,
    ];

    /// Pages linked from the navbar.
    pub const MAIN: [Self; 5] = [
        Self::Home,
        Self::Pricing,
        Self::Downloads,
        Self::Faq,
        Self::Contact,
    ];

    /// Pages linked from the footer's legal column.
    pub const LEGAL: [Self; 3] = [Self::RefundPolicy, Self::PrivacyPolicy, Self::Terms];

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Pricing => "pricing",
            Self::Downloads => "downloads",
            Self::Faq => "faq",
            Self::Contact => "contact",
            Self::RefundPolicy => "refund-policy",
            Self::PrivacyPolicy => "privacy-policy",
            Self::Terms => "terms",
        }
    }

    /// Path segment after the locale; empty for the home page.
    #[must_use]
    pub const fn route(self) -> &'static str {
        match self {
            Self::Home => "",
            other => other.slug(),
        }
    }

    /// Parses a page name as it appears in a URL.
    ///
    /// Accepts `""`, `home` and `index` for the home page and tolerates
    /// surrounding slashes and a `.html` suffix.
    #[must_use]
    pub fn from_slug(name: &str) -> Option<Self> {
        let name = name.trim_matches('/');
        let name = name.strip_suffix(".html").unwrap_or(name);
        match name {
            "" | "home" | "index" => Some(Self::Home),
            other => Self::ALL.into_iter().find(|page| page.slug() == other),
        }
    }

    /// Dictionary key of the page title.
    #[must_use]
    pub fn title_key(self) -> String {
        format!("seo.pages.{}", self.slug())
    }

    /// Dictionary key of the navbar label, for pages that have one.
    #[must_use]
    pub const fn nav_key(self) -> Option<&'static str> {
        match self {
            Self::Home => Some("navigation.home"),
            Self::Pricing => Some("navigation.pricing"),
            Self::Downloads => Some("navigation.downloads"),
            Self::Faq => Some("navigation.faq"),
            Self::Contact => Some("navigation.contact"),
            Self::RefundPolicy | Self::PrivacyPolicy | Self::Terms => None,
        }
    }

    /// Dictionary section of a legal page.
    #[must_use]
    pub const fn legal_key(self) -> Option<&'static str> {
        match self {
            Self::RefundPolicy => Some("legal.refund"),
            Self::PrivacyPolicy => Some("legal.privacy"),
            Self::Terms => Some("legal.terms"),
            _ => None,
        }
    }

    /// Absolute path of the page in `locale`, e.g. `/ar/pricing`.
    #[must_use]
    pub fn path(self, locale: Locale) -> String {
        format!("/{}/{}", locale.code(), self.route())
    }
}

/// One of the two resold services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Service {
    DoomVip,
    DhPlusVip,
}

impl Service {
    pub const ALL: [Self; 2] = [Self::DoomVip, Self::DhPlusVip];

    /// Brand name used in WhatsApp messages.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::DoomVip => "DOOM VIP",
            Self::DhPlusVip => "DH PLUS VIP",
        }
    }

    /// Dictionary section under `services`.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::DoomVip => "doomVip",
            Self::DhPlusVip => "dhPlusVip",
        }
    }

    /// Dictionary section under `whatsapp` for the floating button.
    #[must_use]
    pub const fn button_key(self) -> &'static str {
        match self {
            Self::DoomVip => "doom",
            Self::DhPlusVip => "dh",
        }
    }
}

/// A subscription plan, priced in USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub duration: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus: Option<String>,
    #[serde(default)]
    pub popular: bool,
    #[serde(default)]
    pub special_offer: bool,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub icon: String,
    pub title: String,
    pub description: String,
}

/// A headline figure on the home page, e.g. `15,000+ Live Channels`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Stat {
    #[serde(default)]
    pub icon: String,
    pub value: String,
    pub label: String,
}

/// A customer review shown on the home page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Review {
    pub name: String,
    /// Stars out of five.
    pub rating: u8,
    pub title: String,
    pub content: String,
    pub date: String,
    #[serde(default)]
    pub verified: bool,
    pub service: Service,
    #[serde(default)]
    pub location: Option<String>,
}

/// Mean rating of `reviews`, `None` when there are none.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let total: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    Some(f64::from(total) / reviews.len() as f64)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidLink {
    pub url: String,
    #[serde(default)]
    pub downloader_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IosApp {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub server: Option<String>,
}

/// Download links for one service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DownloadApp {
    pub service: Service,
    pub name: String,
    pub android: AndroidLink,
    #[serde(default)]
    pub ios: Vec<IosApp>,
}

/// Images precached alongside the pages.
const PRECACHE_IMAGES: [&str; 10] = [
    "/images/favicon.ico",
    "/images/favicon-16x16.png",
    "/images/favicon-32x32.png",
    "/images/apple-touch-icon.png",
    "/images/android-chrome-192x192.png",
    "/images/android-chrome-512x512.png",
    "/images/DH-Plus-vip-logo.webp",
    "/images/doom_smarter_vip-logo.avif",
    "/images/doom-vip-back.webp",
    "/images/DH-Plus-vip-back.jpg",
];

/// Paths the offline cache stores at install time.
#[must_use]
pub fn precache_paths() -> Vec<String> {
    let mut paths = vec!["/".to_string()];
    for locale in Locale::ALL {
        paths.extend(Page::MAIN.into_iter().map(|page| page.path(locale)));
    }
    paths.extend(
        ["/manifest.json", "/offline.html", "/icon.svg"]
            .into_iter()
            .chain(PRECACHE_IMAGES)
            .map(ToString::to_string),
    );
    paths
}
