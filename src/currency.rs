//! Display currencies and USD price conversion.
//!
//! Prices are authored in USD. Rates are static constants; the config file
//! may override them at start-up, but nothing is fetched live.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::Serialize;

use crate::error::{Error, Result};

/// Where the symbol goes relative to the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    /// `$15.00`
    Before,
    /// `56.25 ر.س`
    After,
}

/// A display currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Currency {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
    pub flag: &'static str,
    /// Units of this currency per US dollar.
    pub rate: f64,
    pub position: SymbolPosition,
}

impl Currency {
    /// Label used in currency pickers, e.g. `🇪🇺 EUR - Euro`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {} - {}", self.flag, self.code, self.name)
    }

    /// Converts a USD amount, rounded to cents.
    #[must_use]
    pub fn convert(&self, usd: f64) -> f64 {
        (usd * self.rate * 100.0).round() / 100.0
    }

    /// Formats an amount already expressed in this currency.
    #[must_use]
    pub fn format(&self, amount: f64) -> String {
        match self.position {
            SymbolPosition::Before => format!("{}{amount:.2}", self.symbol),
            SymbolPosition::After => format!("{amount:.2} {}", self.symbol),
        }
    }
}

/// The built-in currency list.
pub const CURRENCIES: [Currency; 6] = [
    Currency {
        code: "USD",
        name: "US Dollar",
        symbol: "$",
        flag: "🇺🇸",
        rate: 1.0,
        position: SymbolPosition::Before,
    },
    Currency {
        code: "EUR",
        name: "Euro",
        symbol: "€",
        flag: "🇪🇺",
        rate: 0.85,
        position: SymbolPosition::Before,
    },
    Currency {
        code: "SAR",
        name: "Saudi Riyal",
        symbol: "ر.س",
        flag: "🇸🇦",
        rate: 3.75,
        position: SymbolPosition::After,
    },
    Currency {
        code: "AED",
        name: "UAE Dirham",
        symbol: "د.إ",
        flag: "🇦🇪",
        rate: 3.67,
        position: SymbolPosition::After,
    },
    Currency {
        code: "GBP",
        name: "British Pound",
        symbol: "£",
        flag: "🇬🇧",
        rate: 0.73,
        position: SymbolPosition::Before,
    },
    Currency {
        code: "CAD",
        name: "Canadian Dollar",
        symbol: "C$",
        flag: "🇨🇦",
        rate: 1.35,
        position: SymbolPosition::Before,
    },
];

/// Code used when nothing else applies.
pub const FALLBACK_CURRENCY: &str = "USD";

static STANDARD: LazyLock<CurrencyTable> = LazyLock::new(|| CurrencyTable {
    currencies: CURRENCIES.to_vec(),
});

/// A set of currencies with possibly overridden rates.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyTable {
    currencies: Vec<Currency>,
}

impl Default for CurrencyTable {
    fn default() -> Self {
        Self::standard().clone()
    }
}

impl CurrencyTable {
    /// The built-in table.
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    /// Built-in table with `overrides` (code → rate) applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCurrency`] for a code outside the built-in list
    /// and [`Error::Config`] for a rate that is not a positive finite number.
    pub fn with_rates(overrides: &BTreeMap<String, f64>) -> Result<Self> {
        let mut table = Self::standard().clone();
        for (code, &rate) in overrides {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(Error::Config(format!("rate for {code} must be positive, got {rate}")));
            }
            let currency = table
                .currencies
                .iter_mut()
                .find(|c| c.code.eq_ignore_ascii_case(code))
                .ok_or_else(|| Error::UnknownCurrency(code.clone()))?;
            log::debug!("Overriding {} rate {} -> {rate}", currency.code, currency.rate);
            currency.rate = rate;
        }
        Ok(table)
    }

    #[must_use]
    pub fn all(&self) -> &[Currency] {
        &self.currencies
    }

    /// Looks up a currency by its exact code.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&Currency> {
        self.currencies.iter().find(|c| c.code == code)
    }

    /// Converts `usd` into `code`; an unknown code returns the amount unchanged.
    #[must_use]
    pub fn convert(&self, usd: f64, code: &str) -> f64 {
        self.get(code).map_or(usd, |c| c.convert(usd))
    }

    /// Formats an already-converted amount; an unknown code gets a `$` prefix.
    #[must_use]
    pub fn format_amount(&self, amount: f64, code: &str) -> String {
        self.get(code)
            .map_or_else(|| format!("${amount:.2}"), |c| c.format(amount))
    }

    /// Converts and formats a USD price in one step.
    #[must_use]
    pub fn format_price(&self, usd: f64, code: &str) -> String {
        self.format_amount(self.convert(usd, code), code)
    }

    /// First candidate the table knows, ignoring case; USD when none match.
    ///
    /// Callers pass candidates in priority order, e.g. the user's stored
    /// preference, then the configured default, then the locale default.
    #[must_use]
    pub fn pick(&self, candidates: &[Option<&str>]) -> &'static str {
        candidates
            .iter()
            .flatten()
            .find_map(|code| {
                self.currencies
                    .iter()
                    .find(|c| c.code.eq_ignore_ascii_case(code.trim()))
            })
            .map_or(FALLBACK_CURRENCY, |c| c.code)
    }
}

/// Looks up a built-in currency.
#[must_use]
pub fn get_currency(code: &str) -> Option<&'static Currency> {
    CURRENCIES.iter().find(|c| c.code == code)
}

/// Converts a USD price with the built-in rates.
#[must_use]
pub fn convert_price(usd: f64, code: &str) -> f64 {
    CurrencyTable::standard().convert(usd, code)
}

/// Formats an amount already expressed in `code`.
#[must_use]
pub fn format_amount(amount: f64, code: &str) -> String {
    CurrencyTable::standard().format_amount(amount, code)
}

/// Converts and formats a USD price with the built-in rates.
#[must_use]
pub fn format_price(usd: f64, code: &str) -> String {
    CurrencyTable::standard().format_price(usd, code)
}

/// Default currency for a locale tag (`en`, `ar-AE`, `fr`).
#[must_use]
pub fn default_currency(locale: &str) -> &'static str {
    match locale {
        "ar" | "ar-SA" => "SAR",
        "ar-AE" => "AED",
        "en-GB" => "GBP",
        "en-CA" => "CAD",
        "fr" | "de" | "es" | "it" => "EUR",
        _ => FALLBACK_CURRENCY,
    }
}

/// Guesses a currency from a browser language tag.
///
/// Tries the full tag first, then the language part alone, then USD.
#[must_use]
pub fn detect_currency(tag: &str) -> &'static str {
    let tag = tag.trim();
    let exact = match tag {
        "en-US" => Some("USD"),
        "en-CA" => Some("CAD"),
        "en-GB" => Some("GBP"),
        "ar-SA" => Some("SAR"),
        "ar-AE" => Some("AED"),
        "de" | "de-DE" | "fr" | "fr-FR" | "es" | "es-ES" | "it" | "it-IT" | "nl" | "nl-NL" => {
            Some("EUR")
        }
        _ => None,
    };
    exact.unwrap_or_else(|| {
        match tag.split(['-', '_']).next().unwrap_or_default() {
            "ar" => "SAR",
            "de" | "fr" | "es" | "it" | "nl" => "EUR",
            _ => FALLBACK_CURRENCY,
        }
    })
}

/// Picker label for a built-in code.
#[must_use]
pub fn display_name(code: &str) -> Option<String> {
    get_currency(code).map(Currency::display_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse_display(text: &str, currency: &Currency) -> f64 {
        text.replace(currency.symbol, "").trim().parse().unwrap()
    }

    #[test]
    fn pick_takes_first_known_candidate() {
        let table = CurrencyTable::standard();
        assert_eq!(table.pick(&[Some("gbp"), Some("SAR")]), "GBP");
        assert_eq!(table.pick(&[None, Some("XYZ"), Some("AED")]), "AED");
        assert_eq!(table.pick(&[None, Some("XYZ")]), "USD");
        assert_eq!(table.pick(&[]), "USD");
    }

    #[test]
    fn convert_known_codes() {
        assert!((convert_price(15.0, "USD") - 15.0).abs() < f64::EPSILON);
        assert!((convert_price(15.0, "SAR") - 56.25).abs() < 1e-9);
        assert!((convert_price(9.0, "EUR") - 7.65).abs() < 1e-9);
        assert!((convert_price(13.0, "AED") - 47.71).abs() < 1e-9);
    }

    #[test]
    fn unknown_code_is_passthrough() {
        assert!((convert_price(12.5, "XYZ") - 12.5).abs() < f64::EPSILON);
        assert_eq!(format_amount(12.5, "XYZ"), "$12.50");
    }

    #[test]
    fn symbol_placement() {
        assert_eq!(format_amount(15.0, "USD"), "$15.00");
        assert_eq!(format_amount(12.75, "EUR"), "€12.75");
        assert_eq!(format_amount(56.25, "SAR"), "56.25 ر.س");
        assert_eq!(format_amount(55.05, "AED"), "55.05 د.إ");
        assert_eq!(format_amount(20.25, "CAD"), "C$20.25");
    }

    #[test]
    fn format_does_not_reconvert() {
        assert_eq!(format_amount(15.0, "SAR"), "15.00 ر.س");
        assert_eq!(format_price(15.0, "SAR"), "56.25 ر.س");
    }

    #[test]
    fn locale_defaults() {
        assert_eq!(default_currency("en"), "USD");
        assert_eq!(default_currency("ar"), "SAR");
        assert_eq!(default_currency("en-GB"), "GBP");
        assert_eq!(default_currency("en-CA"), "CAD");
        assert_eq!(default_currency("ar-AE"), "AED");
        assert_eq!(default_currency("de"), "EUR");
        assert_eq!(default_currency("ja"), "USD");
    }

    #[test]
    fn detection_prefers_exact_then_language() {
        assert_eq!(detect_currency("en-GB"), "GBP");
        assert_eq!(detect_currency("ar-EG"), "SAR");
        assert_eq!(detect_currency("nl-BE"), "EUR");
        assert_eq!(detect_currency("en-AU"), "USD");
        assert_eq!(detect_currency(""), "USD");
    }

    #[test]
    fn display_names() {
        assert_eq!(display_name("EUR").as_deref(), Some("🇪🇺 EUR - Euro"));
        assert_eq!(display_name("XYZ"), None);
    }

    #[test]
    fn rate_overrides() {
        let mut rates = BTreeMap::new();
        rates.insert("sar".to_string(), 4.0);
        let table = CurrencyTable::with_rates(&rates).unwrap();
        assert!((table.convert(10.0, "SAR") - 40.0).abs() < 1e-9);
        assert!((table.convert(10.0, "EUR") - 8.5).abs() < 1e-9);

        rates.insert("EUR".to_string(), -1.0);
        assert!(matches!(CurrencyTable::with_rates(&rates), Err(Error::Config(_))));

        let mut unknown = BTreeMap::new();
        unknown.insert("JPY".to_string(), 150.0);
        assert!(matches!(
            CurrencyTable::with_rates(&unknown),
            Err(Error::UnknownCurrency(_))
        ));
    }

    proptest! {
        #[test]
        fn formatted_conversion_within_a_cent(cents in 0u32..1_000_000, idx in 0usize..CURRENCIES.len()) {
            let usd = f64::from(cents) / 100.0;
            let currency = &CURRENCIES[idx];
            let shown = format_amount(convert_price(usd, currency.code), currency.code);
            let parsed = parse_display(&shown, currency);
            prop_assert!((parsed - usd * currency.rate).abs() <= 0.01 + 1e-9);
        }

        #[test]
        fn conversion_is_never_negative(usd in 0.0f64..100_000.0, idx in 0usize..CURRENCIES.len()) {
            prop_assert!(convert_price(usd, CURRENCIES[idx].code) >= 0.0);
        }
    }
}
