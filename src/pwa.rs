//! Progressive web app assets generated as strings.
//!
//! The service worker script is rendered from the same [`CacheConfig`] the
//! Rust [`CacheController`](crate::cache::CacheController) uses, so partition
//! names, ceilings and the precache list cannot drift apart.

use serde_json::json;

use crate::cache::PartitionKind;
use crate::config::{CacheConfig, SiteConfig};

/// Returns the PWA manifest JSON.
#[must_use]
pub fn manifest_json(site: &SiteConfig) -> String {
    let manifest = json!({
        "name": site.name,
        "short_name": "DH DOOM",
        "description": "Premium IPTV subscriptions: DOOM VIP and DH PLUS VIP",
        "start_url": "/en/",
        "display": "standalone",
        "background_color": "#0f172a",
        "theme_color": "#059669",
        "orientation": "portrait-primary",
        "lang": "en",
        "icons": [
            {
                "src": "/icon.svg",
                "sizes": "any",
                "type": "image/svg+xml",
                "purpose": "any maskable"
            },
            {
                "src": "/images/android-chrome-192x192.png",
                "sizes": "192x192",
                "type": "image/png"
            },
            {
                "src": "/images/android-chrome-512x512.png",
                "sizes": "512x512",
                "type": "image/png"
            }
        ]
    });
    serde_json::to_string_pretty(&manifest).unwrap_or_else(|_| manifest.to_string())
}

/// Inline script that registers `/sw.js` once the page has loaded.
#[must_use]
pub const fn registration_snippet() -> &'static str {
    r"if ('serviceWorker' in navigator) {
  window.addEventListener('load', function () {
    navigator.serviceWorker.register('/sw.js').catch(function (err) {
      console.warn('Service worker registration failed', err);
    });
  });
}"
}

fn js_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

fn js_string_array<S: AsRef<str>>(items: &[S]) -> String {
    let items: Vec<String> = items.iter().map(|s| js_string(s.as_ref())).collect();
    format!("[{}]", items.join(", "))
}

fn ceiling(config: &CacheConfig, kind: PartitionKind) -> String {
    config
        .max_entries(kind)
        .map_or_else(|| "Infinity".to_string(), |n| n.to_string())
}

/// Returns the service worker JavaScript.
#[must_use]
pub fn service_worker_js(config: &CacheConfig, precache: &[String]) -> String {
    let name = |kind| js_string(&config.partition_name(kind));
    format!(
        r##"// Generated by dh-doom. Cache version {version}.
const STATIC_CACHE = {static_name};
const DYNAMIC_CACHE = {dynamic_name};
const IMAGES_CACHE = {images_name};
const API_CACHE = {api_name};
const FONTS_CACHE = {fonts_name};
const CURRENT_CACHES = [STATIC_CACHE, DYNAMIC_CACHE, IMAGES_CACHE, API_CACHE, FONTS_CACHE];
const MAX_ENTRIES = {{
  [IMAGES_CACHE]: {images_max},
  [API_CACHE]: {api_max},
  [FONTS_CACHE]: {fonts_max}
}};
const FONT_HOSTS = {font_hosts};
const OFFLINE_PAGE = {offline};
const PLACEHOLDER_IMAGE = {placeholder};
const PRECACHE = {precache};

self.addEventListener('install', (event) => {{
  event.waitUntil(
    caches.open(STATIC_CACHE).then((cache) =>
      Promise.all(PRECACHE.map((path) =>
        fetch(path).then((response) => {{
          if (response.status === 200) {{
            return cache.put(path, response);
          }}
          console.warn('Precache skipped', path, response.status);
        }}).catch((err) => console.warn('Precache failed', path, err))
      ))
    ).then(() => self.skipWaiting())
  );
}});

self.addEventListener('activate', (event) => {{
  event.waitUntil(
    caches.keys().then((names) => Promise.all(
      names.filter((name) => !CURRENT_CACHES.includes(name))
           .map((name) => caches.delete(name))
    )).then(() => self.clients.claim())
  );
}});

function isFontHost(hostname) {{
  return FONT_HOSTS.some((host) => hostname === host || hostname.endsWith('.' + host));
}}

async function trim(cacheName) {{
  const max = MAX_ENTRIES[cacheName];
  if (max === undefined) {{
    return;
  }}
  const cache = await caches.open(cacheName);
  const keys = await cache.keys();
  const excess = keys.slice(0, Math.max(0, keys.length - max));
  await Promise.all(excess.map((key) => cache.delete(key)));
}}

async function store(cacheName, request, response) {{
  if (response.status !== 200) {{
    return;
  }}
  const cache = await caches.open(cacheName);
  await cache.delete(request);
  await cache.put(request, response);
  await trim(cacheName);
}}

async function fallback(request, cacheName, error) {{
  if (cacheName === DYNAMIC_CACHE && request.mode === 'navigate') {{
    const offline = await caches.match(OFFLINE_PAGE);
    return offline || new Response('<h1>Offline</h1>', {{
      headers: {{ 'Content-Type': 'text/html; charset=utf-8' }}
    }});
  }}
  if (cacheName === IMAGES_CACHE) {{
    const placeholder = await caches.match(PLACEHOLDER_IMAGE);
    return placeholder || new Response('', {{ status: 404 }});
  }}
  throw error;
}}

async function cacheFirst(request, cacheName) {{
  const cached = await caches.match(request);
  if (cached) {{
    return cached;
  }}
  try {{
    const response = await fetch(request);
    await store(cacheName, request, response.clone());
    return response;
  }} catch (error) {{
    return fallback(request, cacheName, error);
  }}
}}

async function networkFirst(request, cacheName) {{
  try {{
    const response = await fetch(request);
    await store(cacheName, request, response.clone());
    return response;
  }} catch (error) {{
    const cached = await caches.match(request);
    if (cached) {{
      return cached;
    }}
    return fallback(request, cacheName, error);
  }}
}}

self.addEventListener('fetch', (event) => {{
  const request = event.request;
  if (request.method !== 'GET') {{
    return;
  }}
  const url = new URL(request.url);
  if (url.origin !== self.location.origin && !isFontHost(url.hostname)) {{
    return;
  }}
  if (request.destination === 'image') {{
    event.respondWith(cacheFirst(request, IMAGES_CACHE));
  }} else if (url.pathname.startsWith('/api/')) {{
    event.respondWith(networkFirst(request, API_CACHE));
  }} else if (request.destination === 'font') {{
    event.respondWith(cacheFirst(request, FONTS_CACHE));
  }} else {{
    event.respondWith(cacheFirst(request, DYNAMIC_CACHE));
  }}
}});
"##,
        version = config.version,
        static_name = name(PartitionKind::Static),
        dynamic_name = name(PartitionKind::Dynamic),
        images_name = name(PartitionKind::Images),
        api_name = name(PartitionKind::Api),
        fonts_name = name(PartitionKind::Fonts),
        images_max = ceiling(config, PartitionKind::Images),
        api_max = ceiling(config, PartitionKind::Api),
        fonts_max = ceiling(config, PartitionKind::Fonts),
        font_hosts = js_string_array(&config.font_hosts),
        offline = js_string(&config.offline_path),
        placeholder = js_string(&config.placeholder_path),
        precache = js_string_array(precache),
    )
}

/// Returns an SVG icon for the PWA.
#[must_use]
pub const fn icon_svg() -> &'static str {
    r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 192 192">
  <defs>
    <linearGradient id="g" x1="0" y1="0" x2="1" y2="1">
      <stop offset="0" stop-color="#059669"/>
      <stop offset="1" stop-color="#0f766e"/>
    </linearGradient>
  </defs>
  <rect width="192" height="192" rx="36" fill="url(#g)"/>
  <rect x="40" y="56" width="112" height="72" rx="10" fill="none" stroke="#fff" stroke-width="8"/>
  <path d="M84 76 L112 92 L84 108 Z" fill="#fff"/>
  <line x1="72" y1="144" x2="120" y2="144" stroke="#fff" stroke-width="8" stroke-linecap="round"/>
</svg>"##
}
