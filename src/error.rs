//! Error types for the dh-doom library.

use thiserror::Error;

/// Errors that can occur while rendering, caching or serving the site.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON (translation dictionary or local store).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be parsed.
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// The configuration parsed but holds an unusable value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A fetch through the network failed before a response arrived.
    #[error("Network request failed for {url}: {reason}")]
    Network {
        /// URL that was requested.
        url: String,
        /// Why the request failed.
        reason: String,
    },

    /// A URL could not be parsed.
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl {
        /// The offending input.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// Locale code is not one of the supported locales.
    #[error("Unsupported locale: {0}")]
    UnknownLocale(String),

    /// Currency code is not in the currency table.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
}

/// A specialized `Result` type for dh-doom operations.
pub type Result<T> = std::result::Result<T, Error>;
