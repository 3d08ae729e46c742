use std::path::PathBuf;

use url::Url;

/// Base URL used when neither `--url` nor the environment supply one.
pub const DEFAULT_URL: &str = "http://localhost:8000";

/// Environment variable overriding the default base URL.
pub const URL_ENV_VAR: &str = "CASUP_URL";

/// Immutable run configuration, assembled once in `main` and passed by
/// reference everywhere else.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    /// Inspect magic bytes for MIME detection (extension-only when false).
    pub sniff_mime: bool,
    pub verbose: bool,
    /// Resolve and print MIME types without touching the network.
    pub dry_run: bool,
    /// Drop repeated paths, first occurrence wins.
    pub dedup: bool,
    /// Generate a fresh publishing key for every file.
    pub unique_key: bool,
    /// Key from `-k FILE` or the environment; None means "generate once".
    pub key: Option<String>,
    /// File to publish at the key's root path after the batch.
    pub index: Option<PathBuf>,
    /// Post to a neutral echo endpoint instead of the service.
    pub debug_post: bool,
}

impl Config {
    /// Resolve the base URL: explicit flag, then `$CASUP_URL`, then the
    /// built-in default.
    pub fn base_url_from(flag: Option<String>) -> Result<Url, url::ParseError> {
        let raw = flag
            .or_else(|| std::env::var(URL_ENV_VAR).ok())
            .unwrap_or_else(|| DEFAULT_URL.to_string());
        Url::parse(&raw)
    }
}
