//! JSON-backed translation dictionaries, one per locale.
//!
//! Dictionaries are embedded at compile time from `i18n/{code}.json` and
//! looked up by dotted key paths (`hero.title`). A missing key never fails:
//! [`Dictionary::t`] returns the key itself so the gap is visible on the page.

use std::sync::LazyLock;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;
use crate::locale::Locale;

/// Parsed translation tree for one locale.
#[derive(Debug, Clone)]
pub struct Dictionary {
    locale: Locale,
    tree: Value,
}

static EN: LazyLock<Dictionary> = LazyLock::new(|| Dictionary::new(Locale::En));
static AR: LazyLock<Dictionary> = LazyLock::new(|| Dictionary::new(Locale::Ar));

const fn raw_locale(locale: Locale) -> &'static str {
    match locale {
        Locale::En => include_str!("../i18n/en.json"),
        Locale::Ar => include_str!("../i18n/ar.json"),
    }
}

impl Dictionary {
    /// Parses the embedded dictionary for `locale`.
    ///
    /// A malformed embedded file degrades to an empty tree (every lookup
    /// then returns its key) rather than failing the caller.
    #[must_use]
    pub fn new(locale: Locale) -> Self {
        Self::from_json(locale, raw_locale(locale)).unwrap_or_else(|e| {
            log::error!("Embedded {locale} dictionary is malformed: {e}");
            Self {
                locale,
                tree: Value::Null,
            }
        })
    }

    /// Builds a dictionary from raw JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not valid JSON.
    pub fn from_json(locale: Locale, raw: &str) -> Result<Self> {
        let tree = serde_json::from_str(raw)?;
        Ok(Self { locale, tree })
    }

    /// Shared, lazily parsed dictionary for `locale`.
    #[must_use]
    pub fn for_locale(locale: Locale) -> &'static Self {
        match locale {
            Locale::En => &EN,
            Locale::Ar => &AR,
        }
    }

    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Resolves a dotted path to the raw JSON node.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut node = &self.tree;
        for segment in path.split('.') {
            node = match node {
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => node.get(segment)?,
            };
        }
        Some(node)
    }

    /// Translates `path`, returning the key itself when it is missing or not a string.
    #[must_use]
    pub fn t(&self, path: &str) -> String {
        self.lookup(path)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map_or_else(|| path.to_string(), ToString::to_string)
    }

    /// Translates `path` and substitutes `{name}` placeholders.
    #[must_use]
    pub fn fmt(&self, path: &str, args: &[(&str, &str)]) -> String {
        args.iter()
            .fold(self.t(path), |acc, (name, value)| {
                acc.replace(&format!("{{{name}}}"), value)
            })
    }

    /// String array at `path`; missing or mistyped entries yield an empty list.
    #[must_use]
    pub fn list(&self, path: &str) -> Vec<String> {
        self.lookup(path)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Deserializes the array at `path` into typed records.
    ///
    /// Entries that do not match `T` are skipped with a warning.
    #[must_use]
    pub fn items<T: DeserializeOwned>(&self, path: &str) -> Vec<T> {
        let Some(items) = self.lookup(path).and_then(Value::as_array) else {
            return Vec::new();
        };
        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                serde_json::from_value(item.clone())
                    .map_err(|e| log::warn!("{}: {path}[{i}] skipped: {e}", self.locale))
                    .ok()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn embedded_dictionaries_parse() {
        for locale in Locale::ALL {
            let dict = Dictionary::for_locale(locale);
            assert_eq!(dict.locale(), locale);
            assert_ne!(dict.t("hero.title"), "hero.title");
        }
    }

    #[test]
    fn missing_key_returns_key() {
        let dict = Dictionary::for_locale(Locale::En);
        assert_eq!(dict.t("nonexistent.key"), "nonexistent.key");
    }

    #[test]
    fn malformed_paths_degrade_to_key() {
        let dict = Dictionary::for_locale(Locale::Ar);
        assert_eq!(dict.t(""), "");
        assert_eq!(dict.t("hero..title"), "hero..title");
        assert_eq!(dict.t("hero.title.deeper"), "hero.title.deeper");
    }

    #[test]
    fn non_string_node_returns_key() {
        let dict = Dictionary::for_locale(Locale::En);
        assert_eq!(dict.t("hero"), "hero");
    }

    #[test]
    fn fmt_substitutes_placeholders() {
        let dict = Dictionary::from_json(Locale::En, r#"{"a":{"b":"I want {plan} now"}}"#).unwrap();
        assert_eq!(dict.fmt("a.b", &[("plan", "12 Months")]), "I want 12 Months now");
    }

    #[test]
    fn list_and_index_paths() {
        let dict =
            Dictionary::from_json(Locale::En, r#"{"x":{"items":["one","two"]}}"#).unwrap();
        assert_eq!(dict.list("x.items"), vec!["one", "two"]);
        assert_eq!(dict.t("x.items.1"), "two");
        assert!(dict.list("x.missing").is_empty());
    }

    #[test]
    fn items_skip_mismatched_entries() {
        #[derive(Deserialize)]
        struct Item {
            name: String,
        }
        let dict = Dictionary::from_json(
            Locale::En,
            r#"{"rows":[{"name":"a"},{"other":1},{"name":"c"}]}"#,
        )
        .unwrap();
        let rows: Vec<Item> = dict.items("rows");
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(Dictionary::from_json(Locale::En, "{not json").is_err());
    }

    #[test]
    fn locales_define_the_same_keys() {
        fn keys(value: &Value, prefix: &str, out: &mut Vec<String>) {
            if let Value::Object(map) = value {
                for (k, v) in map {
                    let path = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    keys(v, &path, out);
                    out.push(path);
                }
            }
        }
        let mut en = Vec::new();
        let mut ar = Vec::new();
        keys(&Dictionary::for_locale(Locale::En).tree, "", &mut en);
        keys(&Dictionary::for_locale(Locale::Ar).tree, "", &mut ar);
        en.sort();
        ar.sort();
        assert_eq!(en, ar);
    }
}
