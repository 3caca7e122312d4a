//! WhatsApp deep links.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

use crate::i18n::Dictionary;
use crate::site::Service;

static NON_DIGIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^0-9]").expect("valid regex"));

/// Builds `https://wa.me/{digits}` with an optional prefilled message.
///
/// Every non-digit is stripped from `number`. The `?text=` query is omitted
/// when `message` is `None` or empty.
///
/// # Panics
///
/// Panics if the internal digit regex fails to compile (this is a
/// compile-time constant and will not happen in practice).
#[must_use]
pub fn format_whatsapp_url(number: &str, message: Option<&str>) -> String {
    let digits = NON_DIGIT_RE.replace_all(number, "");
    match message.filter(|m| !m.is_empty()) {
        Some(text) => format!("https://wa.me/{digits}?text={}", encode_uri_component(text)),
        None => format!("https://wa.me/{digits}"),
    }
}

/// Percent-encodes UTF-8 bytes outside `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
#[must_use]
pub fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(char::from(byte)),
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

/// Localized "I would like to inquire about ..." message for a service.
#[must_use]
pub fn inquiry_message(dict: &Dictionary, service: Service) -> String {
    dict.fmt("whatsapp.inquiry", &[("service", service.display_name())])
}

/// Localized "I want {plan} subscription" message.
#[must_use]
pub fn order_message(dict: &Dictionary, plan_name: &str) -> String {
    dict.fmt("pricing.orderMessage", &[("plan", plan_name)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;
    use proptest::prelude::*;

    #[test]
    fn strips_formatting_from_number() {
        assert_eq!(
            format_whatsapp_url("+1 332 266 2387", Some("hi")),
            "https://wa.me/13322662387?text=hi"
        );
        assert_eq!(
            format_whatsapp_url("(332) 266-2387", None),
            "https://wa.me/3322662387"
        );
    }

    #[test]
    fn empty_message_has_no_query() {
        assert_eq!(format_whatsapp_url("+13322662387", Some("")), "https://wa.me/13322662387");
    }

    #[test]
    fn non_ascii_digits_are_stripped() {
        assert_eq!(format_whatsapp_url("+١٢٣ 45", None), "https://wa.me/45");
    }

    #[test]
    fn encodes_like_encode_uri_component() {
        assert_eq!(encode_uri_component("I want 12 Months + 3 Free subscription"),
            "I%20want%2012%20Months%20%2B%203%20Free%20subscription");
        assert_eq!(encode_uri_component("a-b_c.d!e~f*g'h(i)j"), "a-b_c.d!e~f*g'h(i)j");
        assert_eq!(encode_uri_component("?&=/#"), "%3F%26%3D%2F%23");
        assert_eq!(encode_uri_component("أ"), "%D8%A3");
    }

    #[test]
    fn localized_messages() {
        let en = Dictionary::for_locale(Locale::En);
        let ar = Dictionary::for_locale(Locale::Ar);
        assert_eq!(order_message(en, "6 Months"), "I want 6 Months subscription");
        assert_eq!(order_message(ar, "6 أشهر"), "أريد اشتراك 6 أشهر");
        assert_eq!(
            inquiry_message(en, Service::DhPlusVip),
            "Hello! I would like to inquire about DH PLUS VIP IPTV service."
        );
        assert!(inquiry_message(ar, Service::DoomVip).contains("DOOM VIP"));
    }

    proptest! {
        #[test]
        fn url_is_always_ascii_without_spaces(number in ".*", message in ".*") {
            let url = format_whatsapp_url(&number, Some(&message));
            prop_assert!(url.is_ascii());
            prop_assert!(!url.contains(' '));
            prop_assert!(url.starts_with("https://wa.me/"));
        }
    }
}
