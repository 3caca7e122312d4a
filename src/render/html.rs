//! HTML escaping.

/// Escapes text for use in element content and quoted attribute values.
#[must_use]
pub fn escape(input: &str) -> String {
    v_htmlescape::escape(input).to_string()
}
