//! Page bodies. Each function returns a complete `<main>` element.

use crate::i18n::Dictionary;
use crate::locale::Locale;
use crate::site::{
    DownloadApp, FaqItem, Feature, Page, Plan, Review, Service, Stat, average_rating,
};
use crate::whatsapp::{format_whatsapp_url, inquiry_message, order_message};

use super::{RenderContext, escape, text};

const CHECK_ICON: &str = r#"<svg class="w-5 h-5 text-emerald-500 flex-shrink-0" fill="currentColor" viewBox="0 0 20 20"><path fill-rule="evenodd" d="M16.707 5.293a1 1 0 010 1.414l-8 8a1 1 0 01-1.414 0l-4-4a1 1 0 011.414-1.414L8 12.586l7.293-7.293a1 1 0 011.414 0z" clip-rule="evenodd"/></svg>"#;

fn check_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| {
            format!(
                "          <li class=\"flex items-center gap-2 text-slate-600\">{CHECK_ICON}<span>{}</span></li>\n",
                escape(item)
            )
        })
        .collect()
}

fn page_header(dict: &Dictionary, section: &str) -> String {
    format!(
        r#"    <div class="text-center mb-16">
      <h1 class="text-4xl md:text-5xl font-bold mb-6">{title}</h1>
      <p class="text-xl text-slate-600 max-w-3xl mx-auto">{subtitle}</p>
    </div>"#,
        title = text(dict, &format!("{section}.title")),
        subtitle = text(dict, &format!("{section}.subtitle")),
    )
}

fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

fn stats_section(dict: &Dictionary) -> String {
    let cards: String = dict
        .items::<Stat>("stats.list")
        .iter()
        .map(|stat| {
            format!(
                r#"      <div class="bg-white rounded-2xl p-8 shadow-lg border border-slate-200 text-center">
        <div class="text-4xl mb-4">{icon}</div>
        <div class="text-4xl md:text-5xl font-bold mb-2" dir="ltr">{value}</div>
        <p class="text-lg font-medium text-slate-600">{label}</p>
      </div>
"#,
                icon = escape(&stat.icon),
                value = escape(&stat.value),
                label = escape(&stat.label),
            )
        })
        .collect();

    format!(
        r#"  <section id="stats" class="py-16 bg-gradient-to-br from-slate-50 to-slate-100">
    <div class="max-w-7xl mx-auto px-4">
      <div class="text-center mb-12">
        <h2 class="text-3xl md:text-4xl font-bold mb-4">{title}</h2>
        <p class="text-xl text-slate-600 max-w-3xl mx-auto">{subtitle}</p>
      </div>
      <div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-8">
{cards}      </div>
    </div>
  </section>
"#,
        title = text(dict, "stats.title"),
        subtitle = text(dict, "stats.subtitle"),
    )
}

fn review_card(dict: &Dictionary, review: &Review) -> String {
    let verified = if review.verified {
        format!(
            "          <span class=\"text-xs text-emerald-600 font-semibold\">{}</span>\n",
            text(dict, "reviews.verified")
        )
    } else {
        String::new()
    };
    let byline = review.location.as_deref().map_or_else(
        || escape(&review.name),
        |location| format!("{}, {}", escape(&review.name), escape(location)),
    );
    format!(
        r#"      <article class="bg-white rounded-2xl shadow-md p-6" data-service="{service}">
        <div class="flex items-center justify-between mb-3">
          <span class="text-yellow-400" aria-label="{rating}/5">{stars}</span>
{verified}        </div>
        <h3 class="font-semibold text-lg mb-2">{title}</h3>
        <p class="text-slate-600 mb-4">{content}</p>
        <p class="text-sm text-slate-500">{byline} &middot; {date} &middot; {service_name}</p>
      </article>
"#,
        service = review.service.key(),
        rating = review.rating,
        stars = stars(review.rating),
        title = escape(&review.title),
        content = escape(&review.content),
        date = escape(&review.date),
        service_name = review.service.display_name(),
    )
}

fn reviews_section(dict: &Dictionary) -> String {
    let reviews: Vec<Review> = dict.items("reviews.list");
    let Some(average) = average_rating(&reviews) else {
        return String::new();
    };
    let cards: String = reviews.iter().map(|review| review_card(dict, review)).collect();
    let count = reviews.len().to_string();

    format!(
        r#"  <section id="reviews" class="py-16 bg-gray-50">
    <div class="max-w-7xl mx-auto px-4">
      <div class="text-center mb-12">
        <h2 class="text-3xl font-bold mb-4">{title}</h2>
        <p class="text-xl text-slate-600 max-w-3xl mx-auto">{subtitle}</p>
        <div class="mt-6 text-5xl font-bold">{average:.1}</div>
        <p class="text-slate-600">{based_on}</p>
      </div>
      <div class="grid md:grid-cols-2 lg:grid-cols-3 gap-6">
{cards}      </div>
    </div>
  </section>
"#,
        title = text(dict, "reviews.title"),
        subtitle = text(dict, "reviews.subtitle"),
        based_on = escape(&dict.fmt("reviews.basedOn", &[("count", &count)])),
    )
}

pub(super) fn home(dict: &Dictionary, ctx: &RenderContext<'_>) -> String {
    let locale = dict.locale();
    let dir = locale.direction();
    let pricing = Page::Pricing.path(locale);
    let contact_url = escape(&format_whatsapp_url(&ctx.site.whatsapp_number, None));

    let services: String = Service::ALL
        .into_iter()
        .map(|service| {
            let key = service.key();
            let badge = if service == Service::DhPlusVip {
                format!(
                    "        <span class=\"absolute top-4 {side} bg-gradient-to-r from-emerald-500 to-cyan-500 text-white px-3 py-1 rounded-full text-sm font-semibold\">{popular}</span>\n",
                    side = dir.pick("right-4", "left-4"),
                    popular = text(dict, "services.popular"),
                )
            } else {
                String::new()
            };
            format!(
                r#"      <div class="relative bg-slate-50 rounded-2xl p-8 border border-slate-200">
{badge}        <h3 class="text-2xl font-bold mb-4">{name}</h3>
        <p class="text-slate-600 mb-6">{description}</p>
        <ul class="space-y-2 mb-6">
{features}        </ul>
        <a href="{pricing}" class="w-full inline-flex justify-center px-6 py-3 bg-emerald-600 hover:bg-emerald-700 text-white font-semibold rounded-xl">{view}</a>
      </div>
"#,
                name = text(dict, &format!("services.{key}.name")),
                description = text(dict, &format!("services.{key}.description")),
                features = check_list(&dict.list(&format!("services.{key}.features"))),
                view = text(dict, "services.viewPlans"),
            )
        })
        .collect();

    let features: String = dict
        .items::<Feature>("features.list")
        .iter()
        .map(|feature| {
            format!(
                r#"      <div class="bg-white rounded-2xl p-6 shadow-sm">
        <div class="text-3xl mb-4">{icon}</div>
        <h3 class="text-lg font-semibold mb-2">{title}</h3>
        <p class="text-slate-600">{description}</p>
      </div>
"#,
                icon = escape(&feature.icon),
                title = escape(&feature.title),
                description = escape(&feature.description),
            )
        })
        .collect();

    format!(
        r#"<main>
  <section class="bg-gradient-to-br from-slate-900 via-slate-800 to-emerald-900 text-white py-20">
    <div class="max-w-7xl mx-auto px-4 text-center">
      <h1 class="text-4xl md:text-6xl font-bold mb-6">{hero_title}</h1>
      <p class="text-xl md:text-2xl text-slate-300 mb-8 max-w-3xl mx-auto">{hero_subtitle}</p>
      <div class="flex flex-col sm:flex-row gap-4 justify-center">
        <a href="{pricing}" class="bg-emerald-600 hover:bg-emerald-700 px-8 py-4 rounded-xl font-semibold text-lg">{hero_cta}</a>
        <a href="{contact_url}" target="_blank" rel="noopener" class="bg-green-600 hover:bg-green-700 px-8 py-4 rounded-xl font-semibold text-lg">{hero_whatsapp}</a>
      </div>
    </div>
  </section>
{stats}  <section class="py-20 bg-white">
    <div class="max-w-7xl mx-auto px-4">
      <div class="text-center mb-16">
        <h2 class="text-3xl md:text-4xl font-bold mb-6">{services_title}</h2>
        <p class="text-xl text-slate-600 max-w-3xl mx-auto">{services_subtitle}</p>
      </div>
      <div class="grid grid-cols-1 lg:grid-cols-2 gap-12">
{services}      </div>
    </div>
  </section>
  <section class="py-20">
    <div class="max-w-7xl mx-auto px-4">
      <div class="text-center mb-16">
        <h2 class="text-3xl md:text-4xl font-bold mb-6">{features_title}</h2>
        <p class="text-xl text-slate-600 max-w-3xl mx-auto">{features_subtitle}</p>
      </div>
      <div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-8">
{features}      </div>
    </div>
  </section>
{reviews}  <section class="py-16 bg-emerald-600 text-white text-center">
    <h2 class="text-3xl font-bold mb-4">{cta_title}</h2>
    <p class="text-lg mb-8">{cta_subtitle}</p>
    <a href="{contact_url}" target="_blank" rel="noopener" class="bg-white text-emerald-700 px-8 py-4 rounded-xl font-semibold">{cta_button}</a>
  </section>
</main>"#,
        hero_title = text(dict, "hero.title"),
        hero_subtitle = text(dict, "hero.subtitle"),
        hero_cta = text(dict, "hero.cta"),
        hero_whatsapp = text(dict, "hero.whatsapp"),
        stats = stats_section(dict),
        reviews = reviews_section(dict),
        services_title = text(dict, "services.title"),
        services_subtitle = text(dict, "services.subtitle"),
        features_title = text(dict, "features.title"),
        features_subtitle = text(dict, "features.subtitle"),
        cta_title = text(dict, "cta.title"),
        cta_subtitle = text(dict, "cta.subtitle"),
        cta_button = text(dict, "cta.button"),
    )
}

fn plan_card(dict: &Dictionary, ctx: &RenderContext<'_>, plan: &Plan) -> String {
    let dir = dict.locale().direction();
    let show = |usd: f64| escape(&ctx.currencies.format_price(usd, ctx.currency));
    let order_url = format_whatsapp_url(
        &ctx.site.whatsapp_number,
        Some(&order_message(dict, &plan.name)),
    );

    let mut badges = String::new();
    if plan.special_offer {
        badges.push_str(&format!(
            "      <span class=\"absolute top-4 {} px-3 py-1 rounded-full text-sm font-semibold text-white bg-gradient-to-r from-red-500 to-pink-500\">{}</span>\n",
            dir.pick("left-4", "right-4"),
            text(dict, "pricing.specialOffer")
        ));
    }
    if plan.popular {
        badges.push_str(&format!(
            "      <span class=\"absolute top-4 {} px-3 py-1 rounded-full text-sm font-semibold text-white bg-gradient-to-r from-emerald-500 to-cyan-500\">{}</span>\n",
            dir.pick("right-4", "left-4"),
            text(dict, "pricing.popular")
        ));
    }
    let original = plan
        .original_price
        .map(|usd| format!("        <div class=\"text-lg text-slate-500 line-through\">{}</div>\n", show(usd)))
        .unwrap_or_default();
    let bonus = plan
        .bonus
        .as_deref()
        .map(|bonus| format!("        <div class=\"mt-2 text-emerald-600 font-semibold text-lg\">+ {}</div>\n", escape(bonus)))
        .unwrap_or_default();
    let savings = plan
        .savings
        .map(|usd| {
            let amount = ctx.currencies.format_price(usd, ctx.currency);
            format!(
                "        <div class=\"mt-2 text-red-600 font-semibold\">{}</div>\n",
                escape(&dict.fmt("pricing.save", &[("amount", &amount)]))
            )
        })
        .unwrap_or_default();
    let (ring, button) = if plan.popular {
        ("ring-2 ring-emerald-500", "bg-emerald-600 hover:bg-emerald-700")
    } else {
        ("", "bg-slate-600 hover:bg-slate-700")
    };

    format!(
        r#"    <div class="relative bg-white rounded-2xl shadow-xl border border-slate-200 overflow-hidden {ring}" data-plan="{id}">
{badges}      <div class="p-8">
        <h3 class="text-2xl font-bold mb-4">{name}</h3>
{original}        <div class="text-4xl font-bold">{price}</div>
        <p class="text-slate-600">{duration}</p>
{bonus}{savings}        <ul class="space-y-3 my-8">
{features}        </ul>
        <a href="{order_url}" target="_blank" rel="noopener" class="w-full inline-flex justify-center px-6 py-3 {button} text-white font-semibold rounded-xl">{cta}</a>
      </div>
    </div>
"#,
        id = escape(&plan.id),
        name = escape(&plan.name),
        price = show(plan.price),
        duration = escape(&plan.duration),
        features = check_list(&plan.features),
        order_url = escape(&order_url),
        cta = text(dict, "pricing.cta"),
    )
}

fn currency_picker(dict: &Dictionary, ctx: &RenderContext<'_>) -> String {
    let options: String = ctx
        .currencies
        .all()
        .iter()
        .map(|currency| {
            let selected = if currency.code == ctx.currency { " selected" } else { "" };
            format!(
                "        <option value=\"{code}\"{selected}>{label}</option>\n",
                code = currency.code,
                label = escape(&currency.display_name()),
            )
        })
        .collect();
    format!(
        r#"    <div class="flex justify-center items-center gap-3 mb-10">
      <label for="currency" class="text-slate-600">{label}</label>
      <select id="currency" class="border border-slate-300 rounded-lg px-3 py-2" onchange="localStorage.setItem('preferred-currency', this.value); document.cookie = 'preferred-currency=' + this.value + '; path=/; max-age=31536000'; location.reload();">
{options}      </select>
    </div>"#,
        label = text(dict, "pricing.currency"),
    )
}

pub(super) fn pricing(dict: &Dictionary, ctx: &RenderContext<'_>) -> String {
    let dir = dict.locale().direction();
    let cards: String = dict
        .items::<Plan>("pricing.plans")
        .iter()
        .map(|plan| plan_card(dict, ctx, plan))
        .collect();

    format!(
        r#"<main class="min-h-screen py-12">
  <div class="max-w-7xl mx-auto px-4">
{header}
{picker}
    <div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-8">
{cards}    </div>
    <div class="mt-12 bg-amber-50 border border-amber-200 rounded-2xl p-6 flex items-start">
      <span class="text-2xl">⚠️</span>
      <div class="{spacing}">
        <h3 class="text-lg font-semibold text-amber-900 mb-2">{notice_title}</h3>
        <p class="text-amber-800">{notice_content}</p>
      </div>
    </div>
  </div>
</main>"#,
        header = page_header(dict, "pricing"),
        picker = currency_picker(dict, ctx),
        spacing = dir.pick("ml-3", "mr-3"),
        notice_title = text(dict, "pricing.notice.title"),
        notice_content = text(dict, "pricing.notice.content"),
    )
}

fn download_card(dict: &Dictionary, app: &DownloadApp) -> String {
    let code = app
        .android
        .downloader_code
        .as_deref()
        .map(|code| {
            format!(
                "          <p class=\"mt-3 bg-blue-50 p-3 rounded-lg text-sm text-blue-800\"><strong>{}</strong> <code>{}</code></p>\n",
                text(dict, "downloads.downloaderCode"),
                escape(code)
            )
        })
        .unwrap_or_default();
    let ios: String = app
        .ios
        .iter()
        .map(|ios| {
            let server = ios
                .server
                .as_deref()
                .map(|server| {
                    format!(
                        "<span class=\"text-sm bg-blue-600 px-2 py-1 rounded\">{} {}</span>",
                        text(dict, "downloads.server"),
                        escape(server)
                    )
                })
                .unwrap_or_default();
            format!(
                "            <a href=\"{url}\" target=\"_blank\" rel=\"noopener\" class=\"w-full inline-flex items-center justify-between px-4 py-3 bg-gray-800 hover:bg-gray-900 text-white rounded-lg\"><span>{name}</span>{server}</a>\n",
                url = escape(&ios.url),
                name = escape(&ios.name),
            )
        })
        .collect();
    let button = match app.service {
        Service::DhPlusVip => "bg-green-600 hover:bg-green-700",
        Service::DoomVip => "bg-red-600 hover:bg-red-700",
    };

    format!(
        r#"    <section class="bg-white rounded-2xl p-8 lg:p-12 border border-slate-200">
      <h2 class="text-3xl font-bold mb-8 text-center">{name}</h2>
      <div class="grid grid-cols-1 md:grid-cols-2 gap-8">
        <div class="bg-slate-50 rounded-xl p-6">
          <h3 class="text-xl font-semibold mb-4">{android}</h3>
          <a href="{apk}" target="_blank" rel="noopener" class="w-full inline-flex justify-center px-6 py-3 {button} text-white font-semibold rounded-xl">{download}</a>
{code}        </div>
        <div class="bg-slate-50 rounded-xl p-6">
          <h3 class="text-xl font-semibold mb-4">{ios_label}</h3>
          <div class="space-y-3">
{ios}          </div>
        </div>
      </div>
    </section>
"#,
        name = escape(&app.name),
        android = text(dict, "downloads.android"),
        apk = escape(&app.android.url),
        download = text(dict, "downloads.downloadApk"),
        ios_label = text(dict, "downloads.ios"),
    )
}

pub(super) fn downloads(dict: &Dictionary) -> String {
    let sections: String = dict
        .items::<DownloadApp>("downloads.apps")
        .iter()
        .map(|app| download_card(dict, app))
        .collect();
    format!(
        r#"<main class="min-h-screen py-12">
  <div class="max-w-7xl mx-auto px-4">
{header}
    <div class="space-y-16">
{sections}    </div>
  </div>
</main>"#,
        header = page_header(dict, "downloads"),
    )
}

pub(super) fn faq(dict: &Dictionary) -> String {
    let items: String = dict
        .items::<FaqItem>("faq.items")
        .iter()
        .map(|item| {
            format!(
                r#"      <details class="bg-white rounded-xl border border-slate-200 p-6">
        <summary class="text-lg font-semibold cursor-pointer">{question}</summary>
        <p class="mt-4 text-slate-600">{answer}</p>
      </details>
"#,
                question = escape(&item.question),
                answer = escape(&item.answer),
            )
        })
        .collect();
    format!(
        r#"<main class="min-h-screen py-12">
  <div class="max-w-3xl mx-auto px-4">
{header}
    <div class="space-y-4">
{items}    </div>
  </div>
</main>"#,
        header = page_header(dict, "faq"),
    )
}

pub(super) fn contact(dict: &Dictionary, ctx: &RenderContext<'_>) -> String {
    let number = &ctx.site.whatsapp_number;
    let chat = format_whatsapp_url(number, Some(&inquiry_message(dict, Service::DhPlusVip)));
    format!(
        r#"<main class="min-h-screen py-12">
  <div class="max-w-3xl mx-auto px-4">
{header}
    <div class="bg-white rounded-2xl shadow-xl border border-slate-200 p-8 text-center">
      <h2 class="text-2xl font-bold mb-2">{whatsapp}</h2>
      <p class="text-2xl text-green-600 font-semibold mb-2" dir="ltr">{number}</p>
      <p class="text-slate-600 mb-6">{hours}</p>
      <a href="{chat}" target="_blank" rel="noopener" class="inline-flex px-8 py-4 bg-green-600 hover:bg-green-700 text-white font-semibold rounded-xl">{button}</a>
    </div>
  </div>
</main>"#,
        header = page_header(dict, "contact"),
        whatsapp = text(dict, "contact.whatsapp"),
        number = escape(number),
        hours = text(dict, "contact.hours"),
        chat = escape(&chat),
        button = text(dict, "contact.button"),
    )
}

pub(super) fn legal(dict: &Dictionary, page: Page) -> String {
    let section = page.legal_key().unwrap_or("legal.terms");
    let paragraphs: String = dict
        .list(&format!("{section}.paragraphs"))
        .iter()
        .map(|p| format!("    <p class=\"mb-4 text-slate-700 leading-relaxed\">{}</p>\n", escape(p)))
        .collect();
    format!(
        r#"<main class="min-h-screen py-12">
  <article class="max-w-3xl mx-auto px-4">
    <h1 class="text-4xl font-bold mb-4">{title}</h1>
    <p class="text-sm text-slate-500 mb-8">{updated}</p>
{paragraphs}  </article>
</main>"#,
        title = text(dict, &format!("{section}.title")),
        updated = text(dict, "legal.lastUpdated"),
    )
}

pub(super) fn not_found(dict: &Dictionary, locale: Locale) -> String {
    format!(
        r#"<main class="min-h-screen flex flex-col items-center justify-center py-24 text-center"><h1 class="text-4xl font-bold mb-4">{title}</h1><p class="text-slate-600 mb-8">{message}</p><a href="{home}" class="px-6 py-3 bg-emerald-600 text-white rounded-xl">{back}</a></main>"#,
        title = text(dict, "notFound.title"),
        message = text(dict, "notFound.message"),
        home = Page::Home.path(locale),
        back = text(dict, "notFound.back"),
    )
}
