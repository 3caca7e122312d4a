//! Document shell: head, navbar, footer and floating WhatsApp buttons.

use crate::config::SiteConfig;
use crate::i18n::Dictionary;
use crate::locale::Locale;
use crate::pwa;
use crate::site::{Page, Service};
use crate::whatsapp::{format_whatsapp_url, inquiry_message};

use super::{RenderContext, escape, text};

pub(super) struct Shell {
    /// Unescaped page title.
    pub title: String,
    /// Page being rendered; `None` for the not-found document.
    pub current: Option<Page>,
    /// Pre-rendered `<main>` element.
    pub body: String,
}

pub(super) fn document(dict: &Dictionary, ctx: &RenderContext<'_>, shell: &Shell) -> String {
    let locale = dict.locale();
    let site = ctx.site;
    let base = site.base_url();
    let page = shell.current.unwrap_or(Page::Home);
    let alternates: String = Locale::ALL
        .into_iter()
        .map(|alt| {
            format!(
                "  <link rel=\"alternate\" hreflang=\"{code}\" href=\"{base}{path}\">\n",
                code = alt.code(),
                path = page.path(alt)
            )
        })
        .collect();

    format!(
        r##"<!DOCTYPE html>
<html lang="{lang}" dir="{dir}">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title} - {name}</title>
  <meta name="description" content="{description}">
  <meta name="theme-color" content="#059669">
  <meta property="og:title" content="{title} - {name}">
  <meta property="og:description" content="{description}">
  <meta property="og:locale" content="{og_locale}">
  <meta property="og:url" content="{base}{canonical}">
  <link rel="canonical" href="{base}{canonical}">
{alternates}  <link rel="alternate" hreflang="x-default" href="{base}{default_path}">
  <link rel="manifest" href="/manifest.json">
  <link rel="icon" href="/icon.svg" type="image/svg+xml">
  <link rel="preconnect" href="https://fonts.googleapis.com">
  <link rel="preconnect" href="https://fonts.gstatic.com" crossorigin>
  <link href="https://fonts.googleapis.com/css2?family=Inter:wght@400;600;700;800&display=swap" rel="stylesheet">
  <script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="bg-slate-50 text-slate-900 font-sans">
{navbar}
{body}
{footer}
{floating}
<script>
{registration}
</script>
</body>
</html>
"##,
        lang = locale.code(),
        dir = locale.direction().as_str(),
        title = escape(&shell.title),
        name = escape(&site.name),
        description = text(dict, "seo.description"),
        og_locale = locale.og_locale(),
        canonical = page.path(locale),
        default_path = page.path(Locale::default()),
        navbar = navbar(dict, site, shell.current),
        body = shell.body,
        footer = footer(dict, site),
        floating = floating_buttons(dict, site),
        registration = pwa::registration_snippet(),
    )
}

fn navbar(dict: &Dictionary, site: &SiteConfig, current: Option<Page>) -> String {
    let locale = dict.locale();
    let links: String = Page::MAIN
        .into_iter()
        .filter_map(|page| page.nav_key().map(|key| (page, key)))
        .map(|(page, key)| {
            let class = if current == Some(page) {
                "text-emerald-600 font-semibold"
            } else {
                "text-slate-600 hover:text-emerald-600"
            };
            format!(
                "        <a href=\"{href}\" class=\"{class}\">{label}</a>\n",
                href = page.path(locale),
                label = text(dict, key)
            )
        })
        .collect();
    let other = locale.other();
    let switch_href = current.unwrap_or(Page::Home).path(other);

    format!(
        r#"<nav class="bg-white shadow-sm sticky top-0 z-40">
  <div class="max-w-7xl mx-auto px-4 flex items-center justify-between h-16">
    <a href="{home}" class="text-xl font-extrabold text-emerald-600">{name}</a>
    <div class="hidden md:flex items-center gap-6">
{links}    </div>
    <a href="{switch_href}" hreflang="{other_code}" lang="{other_code}" aria-label="{language}" class="px-3 py-1 rounded-lg border border-slate-300 text-sm">{switch_label}</a>
  </div>
</nav>"#,
        home = Page::Home.path(locale),
        name = escape(&site.name),
        other_code = other.code(),
        language = text(dict, "navigation.language"),
        switch_label = other.switch_label(),
    )
}

fn footer(dict: &Dictionary, site: &SiteConfig) -> String {
    let locale = dict.locale();
    let list = |pages: &[Page]| -> String {
        pages
            .iter()
            .map(|page| {
                format!(
                    "        <li><a href=\"{}\" class=\"hover:text-white\">{}</a></li>\n",
                    page.path(locale),
                    escape(&dict.t(&page.title_key()))
                )
            })
            .collect()
    };

    format!(
        r#"<footer class="bg-slate-900 text-slate-400 py-12">
  <div class="max-w-7xl mx-auto px-4 grid grid-cols-1 md:grid-cols-4 gap-8">
    <div class="md:col-span-2">
      <p class="text-white font-bold text-lg mb-2">{name}</p>
      <p>{description}</p>
    </div>
    <div>
      <h3 class="text-white font-semibold mb-3">{quick_links}</h3>
      <ul class="space-y-2">
{main}      </ul>
    </div>
    <div>
      <h3 class="text-white font-semibold mb-3">{legal}</h3>
      <ul class="space-y-2">
{legal_links}      </ul>
      <h3 class="text-white font-semibold mt-6 mb-3">{contact}</h3>
      <a href="{whatsapp}" target="_blank" rel="noopener" class="text-green-400 hover:text-green-300" dir="ltr">{number}</a>
    </div>
  </div>
  <p class="text-center text-sm mt-10">&copy; {name}. {rights}</p>
</footer>"#,
        name = escape(&site.name),
        description = text(dict, "footer.description"),
        quick_links = text(dict, "footer.quickLinks"),
        main = list(&Page::MAIN),
        legal = text(dict, "footer.legal"),
        legal_links = list(&Page::LEGAL),
        contact = text(dict, "footer.contact"),
        whatsapp = escape(&format_whatsapp_url(&site.whatsapp_number, None)),
        number = escape(&site.whatsapp_number),
        rights = text(dict, "footer.rights"),
    )
}

fn floating_buttons(dict: &Dictionary, site: &SiteConfig) -> String {
    let dir = dict.locale().direction();
    let buttons: String = Service::ALL
        .into_iter()
        .rev()
        .map(|service| {
            let key = service.button_key();
            let url = format_whatsapp_url(&site.whatsapp_number, Some(&inquiry_message(dict, service)));
            let color = match service {
                Service::DhPlusVip => "bg-emerald-500 hover:bg-emerald-600",
                Service::DoomVip => "bg-red-600 hover:bg-red-700",
            };
            format!(
                "  <a href=\"{url}\" target=\"_blank\" rel=\"noopener\" aria-label=\"{label}\" title=\"{caption}\" class=\"{color} text-white px-4 py-3 rounded-full shadow-lg text-sm font-semibold\">{caption}</a>\n",
                url = escape(&url),
                label = text(dict, &format!("whatsapp.{key}.label")),
                caption = text(dict, &format!("whatsapp.{key}.text")),
            )
        })
        .collect();

    format!(
        "<div id=\"floating-buttons\" class=\"fixed bottom-6 {side} z-50 flex flex-col gap-3\">\n{buttons}</div>",
        side = dir.pick("right-6", "left-6"),
    )
}

pub(super) fn offline_document(dict: &Dictionary, site: &SiteConfig) -> String {
    let locale = dict.locale();
    format!(
        r##"<!DOCTYPE html>
<html lang="{lang}" dir="{dir}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} - {name}</title>
<style>
body {{ margin: 0; min-height: 100vh; display: flex; align-items: center; justify-content: center;
  font-family: system-ui, -apple-system, 'Segoe UI', sans-serif; background: #0f172a; color: #e2e8f0; text-align: center; }}
main {{ max-width: 28rem; padding: 2rem; }}
h1 {{ font-size: 1.75rem; margin-bottom: 1rem; }}
p {{ color: #94a3b8; line-height: 1.6; }}
button {{ margin-top: 1.5rem; padding: 0.75rem 1.5rem; border: 0; border-radius: 0.75rem;
  background: #059669; color: #fff; font-size: 1rem; cursor: pointer; }}
</style>
</head>
<body>
<main>
  <h1>{title}</h1>
  <p>{message}</p>
  <button type="button" onclick="location.reload()">{retry}</button>
</main>
</body>
</html>
"##,
        lang = locale.code(),
        dir = locale.direction().as_str(),
        title = text(dict, "offline.title"),
        name = escape(&site.name),
        message = text(dict, "offline.message"),
        retry = text(dict, "offline.retry"),
    )
}
