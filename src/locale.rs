//! Supported locales and text direction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A locale the site is published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English (left-to-right).
    #[default]
    En,
    /// Arabic (right-to-left).
    Ar,
}

/// Text direction of a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Left to right.
    Ltr,
    /// Right to left.
    Rtl,
}

impl Direction {
    /// Value for the HTML `dir` attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }

    /// Picks the left-to-right or right-to-left variant of a class list.
    #[must_use]
    pub const fn pick<'a>(self, ltr: &'a str, rtl: &'a str) -> &'a str {
        match self {
            Self::Ltr => ltr,
            Self::Rtl => rtl,
        }
    }
}

impl Locale {
    /// All locales in publishing order.
    pub const ALL: [Self; 2] = [Self::En, Self::Ar];

    /// Two-letter code used in routes and `lang` attributes.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
        }
    }

    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::En => Direction::Ltr,
            Self::Ar => Direction::Rtl,
        }
    }

    #[must_use]
    pub const fn is_rtl(self) -> bool {
        matches!(self.direction(), Direction::Rtl)
    }

    /// The locale the language switcher points at.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::En => Self::Ar,
            Self::Ar => Self::En,
        }
    }

    /// Open Graph locale tag.
    #[must_use]
    pub const fn og_locale(self) -> &'static str {
        match self {
            Self::En => "en_US",
            Self::Ar => "ar_SA",
        }
    }

    /// Label shown on a button that switches *to* this locale.
    #[must_use]
    pub const fn switch_label(self) -> &'static str {
        match self {
            Self::En => "EN",
            Self::Ar => "عربي",
        }
    }

    /// Maps a browser language tag (`ar-SA`, `en_GB`) to a supported locale.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let lowered = tag.trim().to_ascii_lowercase();
        let base = lowered.split(['-', '_']).next().unwrap_or_default();
        Self::ALL.into_iter().find(|locale| locale.code() == base)
    }

    /// Picks the first supported locale from an `Accept-Language` header value.
    #[must_use]
    pub fn from_accept_language(header: &str) -> Option<Self> {
        header
            .split(',')
            .filter_map(|part| part.split(';').next())
            .find_map(Self::from_tag)
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|locale| locale.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownLocale(s.to_string()))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
