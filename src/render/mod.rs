//! Static page rendering.
//!
//! Every page is a pure function of a [`Locale`], a [`Page`] and a
//! [`RenderContext`]. Dictionary strings are HTML-escaped before they are
//! interpolated; missing keys render as the key itself.

mod html;
mod layout;
mod pages;
mod sitemap;

pub use html::escape;
pub use sitemap::{robots_txt, sitemap_xml};

use crate::config::SiteConfig;
use crate::currency::{CurrencyTable, FALLBACK_CURRENCY};
use crate::i18n::Dictionary;
use crate::locale::Locale;
use crate::site::Page;

/// Values a page needs beyond its locale.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub site: &'a SiteConfig,
    pub currencies: &'a CurrencyTable,
    /// Display currency code for prices.
    pub currency: &'a str,
}

impl<'a> RenderContext<'a> {
    /// Creates a context that shows prices in USD.
    #[must_use]
    pub const fn new(site: &'a SiteConfig, currencies: &'a CurrencyTable) -> Self {
        Self {
            site,
            currencies,
            currency: FALLBACK_CURRENCY,
        }
    }

    /// Sets the display currency.
    #[must_use]
    pub const fn with_currency(mut self, code: &'a str) -> Self {
        self.currency = code;
        self
    }
}

/// Renders a page by name; unknown names yield the not-found document.
#[must_use]
pub fn render(locale: Locale, page: &str, ctx: &RenderContext<'_>) -> String {
    Page::from_slug(page).map_or_else(
        || {
            log::debug!("No page named {page:?}, rendering not-found");
            render_not_found(locale, ctx)
        },
        |page| render_page(locale, page, ctx),
    )
}

/// Renders a known page inside the document shell.
#[must_use]
pub fn render_page(locale: Locale, page: Page, ctx: &RenderContext<'_>) -> String {
    let dict = Dictionary::for_locale(locale);
    let body = match page {
        Page::Home => pages::home(dict, ctx),
        Page::Pricing => pages::pricing(dict, ctx),
        Page::Downloads => pages::downloads(dict),
        Page::Faq => pages::faq(dict),
        Page::Contact => pages::contact(dict, ctx),
        Page::RefundPolicy | Page::PrivacyPolicy | Page::Terms => pages::legal(dict, page),
    };
    let shell = layout::Shell {
        title: dict.t(&page.title_key()),
        current: Some(page),
        body,
    };
    layout::document(dict, ctx, &shell)
}

/// Renders the localized not-found document.
#[must_use]
pub fn render_not_found(locale: Locale, ctx: &RenderContext<'_>) -> String {
    let dict = Dictionary::for_locale(locale);
    let shell = layout::Shell {
        title: dict.t("notFound.title"),
        current: None,
        body: pages::not_found(dict, locale),
    };
    layout::document(dict, ctx, &shell)
}

/// Renders the standalone offline document.
///
/// It references no external resources so it displays without a network.
#[must_use]
pub fn render_offline(locale: Locale, site: &SiteConfig) -> String {
    layout::offline_document(Dictionary::for_locale(locale), site)
}

fn text(dict: &Dictionary, key: &str) -> String {
    escape(&dict.t(key))
}
