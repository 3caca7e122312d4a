//! `sitemap.xml` and `robots.txt`.

use chrono::NaiveDate;

use crate::locale::Locale;
use crate::site::Page;

/// Escapes XML text content; URLs keep their slashes.
fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

/// Lists every page in every locale with `lastmod` set to `date`.
#[must_use]
pub fn sitemap_xml(base_url: &str, date: NaiveDate) -> String {
    let base = base_url.trim_end_matches('/');
    let lastmod = date.format("%Y-%m-%d").to_string();
    let urls: String = Locale::ALL
        .into_iter()
        .flat_map(|locale| Page::ALL.into_iter().map(move |page| (locale, page)))
        .map(|(locale, page)| {
            let (changefreq, priority) = if page == Page::Home {
                ("daily", "1.0")
            } else {
                ("weekly", "0.8")
            };
            format!(
                "  <url>\n    <loc>{loc}</loc>\n    <lastmod>{lastmod}</lastmod>\n    <changefreq>{changefreq}</changefreq>\n    <priority>{priority}</priority>\n  </url>\n",
                loc = xml_escape(&format!("{base}{}", page.path(locale))),
            )
        })
        .collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{urls}</urlset>\n"
    )
}

#[must_use]
pub fn robots_txt(base_url: &str) -> String {
    format!(
        "User-agent: *\nAllow: /\nDisallow: /api/\n\nSitemap: {}/sitemap.xml\n",
        base_url.trim_end_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn lists_every_locale_and_page() {
        let xml = sitemap_xml("https://dh-doom.com/", date());
        assert_eq!(xml.matches("<url>").count(), Locale::ALL.len() * Page::ALL.len());
        assert!(xml.contains("<loc>https://dh-doom.com/ar/terms</loc>"));
        assert!(xml.contains("<lastmod>2025-01-15</lastmod>"));
    }

    #[test]
    fn home_is_daily_with_top_priority() {
        let xml = sitemap_xml("https://dh-doom.com", date());
        let home = xml.split("<url>").find(|u| u.contains("/en/</loc>")).unwrap();
        assert!(home.contains("<changefreq>daily</changefreq>"));
        assert!(home.contains("<priority>1.0</priority>"));
        let faq = xml.split("<url>").find(|u| u.contains("/en/faq</loc>")).unwrap();
        assert!(faq.contains("<changefreq>weekly</changefreq>"));
        assert!(faq.contains("<priority>0.8</priority>"));
    }

    #[test]
    fn base_url_is_xml_escaped() {
        let xml = sitemap_xml("https://example.com/?a=1&b=<2>", date());
        assert!(xml.contains("<loc>https://example.com/?a=1&amp;b=&lt;2&gt;/en/</loc>"));
    }

    #[test]
    fn robots_points_at_sitemap() {
        assert!(robots_txt("https://dh-doom.com/").ends_with("Sitemap: https://dh-doom.com/sitemap.xml\n"));
    }
}
