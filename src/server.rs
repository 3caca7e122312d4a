//! HTTP server for the rendered site, PWA assets and the JSON API.

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::config::AppConfig;
use crate::currency::{Currency, CurrencyTable, FALLBACK_CURRENCY, default_currency};
use crate::error::{Error, Result};
use crate::i18n::Dictionary;
use crate::locale::Locale;
use crate::pwa;
use crate::render::{self, RenderContext};
use crate::site::{Page, Plan, precache_paths};
use crate::storage::PREFERRED_CURRENCY_KEY;

const HTML: &str = "text/html; charset=utf-8";

#[derive(Clone)]
struct AppState {
    config: Arc<AppConfig>,
    currencies: Arc<CurrencyTable>,
    service_worker: Arc<str>,
}

impl AppState {
    fn new(config: AppConfig) -> Result<Self> {
        config.validate()?;
        let currencies = config.currency_table()?;
        let service_worker = pwa::service_worker_js(&config.cache, &precache_paths());
        Ok(Self {
            config: Arc::new(config),
            currencies: Arc::new(currencies),
            service_worker: service_worker.into(),
        })
    }

    /// Display currency: cookie, then configured default, then locale default.
    fn display_currency(&self, locale: Locale, headers: &HeaderMap) -> &'static str {
        let cookie = cookie_value(headers, PREFERRED_CURRENCY_KEY);
        self.currencies.pick(&[
            cookie.as_deref(),
            self.config.site.default_currency.as_deref(),
            Some(default_currency(locale.code())),
        ])
    }
}

/// Value of cookie `name` from the `Cookie` header.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}

/// Strong validator for a rendered body.
fn etag(body: &str) -> String {
    let digest = Sha256::digest(body.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("\"{hex}\"")
}

fn matches_etag(headers: &HeaderMap, tag: &str) -> bool {
    headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .split(',')
                .map(str::trim)
                .any(|candidate| candidate == tag || candidate == "*")
        })
}

/// HTML response with an `ETag`, or `304` when the client already has it.
fn html_page(status: StatusCode, body: String, headers: &HeaderMap) -> Response {
    let tag = etag(&body);
    let etag_header = HeaderValue::from_str(&tag).unwrap_or(HeaderValue::from_static("\"\""));
    if status == StatusCode::OK && matches_etag(headers, &tag) {
        return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag_header)]).into_response();
    }
    (
        status,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(HTML)),
            (header::ETAG, etag_header),
        ],
        body,
    )
        .into_response()
}

fn not_found(state: &AppState, locale: Locale, headers: &HeaderMap) -> Response {
    let ctx = RenderContext::new(&state.config.site, &state.currencies);
    html_page(
        StatusCode::NOT_FOUND,
        render::render_not_found(locale, &ctx),
        headers,
    )
}

fn render_route(state: &AppState, locale: &str, page: &str, headers: &HeaderMap) -> Response {
    let Ok(locale) = Locale::from_str(locale) else {
        log::debug!("Unknown locale {locale:?}");
        return not_found(state, Locale::default(), headers);
    };
    let Some(page) = Page::from_slug(page) else {
        return not_found(state, locale, headers);
    };
    let currency = state.display_currency(locale, headers);
    let ctx = RenderContext::new(&state.config.site, &state.currencies).with_currency(currency);
    html_page(StatusCode::OK, render::render_page(locale, page, &ctx), headers)
}

async fn root_redirect() -> Redirect {
    Redirect::temporary(&Page::Home.path(Locale::default()))
}

async fn locale_home(
    State(state): State<AppState>,
    Path(locale): Path<String>,
    headers: HeaderMap,
) -> Response {
    render_route(&state, &locale, "", &headers)
}

async fn locale_page(
    State(state): State<AppState>,
    Path((locale, page)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    render_route(&state, &locale, &page, &headers)
}

async fn fallback(State(state): State<AppState>, headers: HeaderMap) -> Response {
    not_found(&state, Locale::default(), &headers)
}

async fn service_worker(State(state): State<AppState>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        state.service_worker.to_string(),
    )
}

async fn manifest(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/manifest+json")],
        pwa::manifest_json(&state.config.site),
    )
}

async fn icon() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/svg+xml")], pwa::icon_svg())
}

async fn offline(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let locale = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .and_then(Locale::from_accept_language)
        .unwrap_or_default();
    html_page(
        StatusCode::OK,
        render::render_offline(locale, &state.config.site),
        &headers,
    )
}

async fn sitemap(State(state): State<AppState>) -> impl IntoResponse {
    let today = chrono::Utc::now().date_naive();
    (
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        render::sitemap_xml(state.config.site.base_url(), today),
    )
}

async fn robots(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        render::robots_txt(state.config.site.base_url()),
    )
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    cache_version: String,
}

async fn api_health(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        cache_version: state.config.cache.version.clone(),
    })
}

#[derive(Serialize)]
struct CurrencyEntry {
    #[serde(flatten)]
    currency: Currency,
    display_name: String,
}

async fn api_currencies(State(state): State<AppState>) -> impl IntoResponse {
    let entries: Vec<CurrencyEntry> = state
        .currencies
        .all()
        .iter()
        .map(|currency| CurrencyEntry {
            currency: *currency,
            display_name: currency.display_name(),
        })
        .collect();
    axum::Json(entries)
}

#[derive(Deserialize)]
struct PlansQuery {
    currency: Option<String>,
    locale: Option<String>,
}

#[derive(Serialize)]
struct PricedPlan {
    #[serde(flatten)]
    plan: Plan,
    display_price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_original_price: Option<String>,
    whatsapp_url: String,
}

#[derive(Serialize)]
struct PlansResponse {
    currency: &'static str,
    locale: Locale,
    plans: Vec<PricedPlan>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn bad_request(error: &Error) -> Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

async fn api_plans(State(state): State<AppState>, Query(query): Query<PlansQuery>) -> Response {
    let locale = match query.locale.as_deref().map(Locale::from_str).transpose() {
        Ok(locale) => locale.unwrap_or_default(),
        Err(e) => return bad_request(&e),
    };
    let requested = query.currency.as_deref().unwrap_or(FALLBACK_CURRENCY);
    let Some(currency) = state.currencies.get(&requested.to_ascii_uppercase()).copied() else {
        return bad_request(&Error::UnknownCurrency(requested.to_string()));
    };

    let dict = Dictionary::for_locale(locale);
    let number = &state.config.site.whatsapp_number;
    let plans = dict
        .items::<Plan>("pricing.plans")
        .into_iter()
        .map(|plan| PricedPlan {
            display_price: currency.format(currency.convert(plan.price)),
            display_original_price: plan
                .original_price
                .map(|usd| currency.format(currency.convert(usd))),
            whatsapp_url: crate::whatsapp::format_whatsapp_url(
                number,
                Some(&crate::whatsapp::order_message(dict, &plan.name)),
            ),
            plan,
        })
        .collect();

    axum::Json(PlansResponse {
        currency: currency.code,
        locale,
        plans,
    })
    .into_response()
}

/// Builds the application router.
///
/// # Errors
///
/// Returns an error if the configuration fails validation.
pub fn router(config: AppConfig) -> Result<Router> {
    let state = AppState::new(config)?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/health", get(api_health))
        .route("/currencies", get(api_currencies))
        .route("/plans", get(api_plans))
        .layer(cors);

    let mut app = Router::new()
        .route("/", get(root_redirect))
        .route("/sw.js", get(service_worker))
        .route("/manifest.json", get(manifest))
        .route("/icon.svg", get(icon))
        .route("/offline.html", get(offline))
        .route("/sitemap.xml", get(sitemap))
        .route("/robots.txt", get(robots))
        .nest("/api", api)
        .route("/{locale}", get(locale_home))
        .route("/{locale}/", get(locale_home))
        .route("/{locale}/{page}", get(locale_page))
        .route("/{locale}/{page}/", get(locale_page));

    if let Some(dir) = &state.config.site.asset_dir {
        log::info!("Serving /images from {}", dir.display());
        app = app.nest_service("/images", ServeDir::new(dir));
    }

    Ok(app.fallback(fallback).with_state(state))
}

/// Serves the site on an already-bound listener until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the server fails.
pub async fn serve(
    listener: tokio::net::TcpListener,
    config: AppConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = router(config)?;
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Binds the configured address and serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address is invalid, cannot be bound, or the
/// server fails.
pub async fn run(config: AppConfig) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| Error::Config(format!("invalid listen address: {e}")))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve(listener, config, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {e}");
        }
        log::info!("Shutting down");
    })
    .await
}
