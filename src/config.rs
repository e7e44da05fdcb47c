// Runtime settings read from SMARTTUBE_* environment variables

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::youtube::extractors::{ExtractorConfig, ExtractorMode};
use crate::youtube::format_selector::{QualityMatch, AUTO_QUALITY};

pub const ENV_EXTRACTOR: &str = "SMARTTUBE_EXTRACTOR";
pub const ENV_PROXY: &str = "SMARTTUBE_PROXY";
pub const ENV_COOKIES: &str = "SMARTTUBE_COOKIES";
pub const ENV_COOKIES_FROM_BROWSER: &str = "SMARTTUBE_COOKIES_FROM_BROWSER";
pub const ENV_TIMEOUT: &str = "SMARTTUBE_TIMEOUT";
pub const ENV_PLAYER_CLIENT: &str = "SMARTTUBE_PLAYER_CLIENT";
pub const ENV_QUALITY: &str = "SMARTTUBE_QUALITY";
pub const ENV_QUALITY_MATCH: &str = "SMARTTUBE_QUALITY_MATCH";

/// Default yt-dlp socket timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u32 = 30;

#[derive(Debug, Clone)]
pub struct Settings {
    pub extractor: ExtractorConfig,
    /// Preferred stream quality ("Auto", "720p", ...)
    pub quality: String,
    pub quality_match: QualityMatch,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            extractor: ExtractorConfig::default(),
            quality: AUTO_QUALITY.to_string(),
            quality_match: QualityMatch::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let mut settings = Self::from_lookup(|key| env::var(key).ok());
        if settings.extractor.cookies_path.is_none() {
            let cookies = default_cookies_path()
                .filter(|p| p.is_file())
                .map(|p| p.to_string_lossy().into_owned());
            if let Some(path) = &cookies {
                log::debug!("[Settings] Using cookies file {}", path);
            }
            settings.extractor.cookies_path = cookies;
        }
        settings
    }

    /// Build settings from any key lookup; unset or blank keys keep defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mode = parsed_or_default::<ExtractorMode>(ENV_EXTRACTOR, get(ENV_EXTRACTOR));
        let timeout = parsed_or(ENV_TIMEOUT, get(ENV_TIMEOUT), DEFAULT_TIMEOUT_SECS);
        let from_browser = get(ENV_COOKIES_FROM_BROWSER)
            .map(|v| match parse_bool(&v) {
                Some(b) => b,
                None => {
                    log::warn!("[Settings] Ignoring {}={:?}: not a boolean", ENV_COOKIES_FROM_BROWSER, v);
                    false
                }
            })
            .unwrap_or(false);

        let extractor = ExtractorConfig::default()
            .with_mode(mode)
            .with_proxy(get(ENV_PROXY))
            .with_cookies_path(get(ENV_COOKIES))
            .with_cookies_from_browser(from_browser)
            .with_timeout(timeout)
            .with_player_client(get(ENV_PLAYER_CLIENT));

        Self {
            extractor,
            quality: get(ENV_QUALITY).unwrap_or_else(|| AUTO_QUALITY.to_string()),
            quality_match: parsed_or_default(ENV_QUALITY_MATCH, get(ENV_QUALITY_MATCH)),
        }
    }
}

/// `<config dir>/smarttube/cookies.txt`
pub fn default_cookies_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("smarttube").join("cookies.txt"))
}

fn parsed_or<T>(key: &str, value: Option<String>, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            log::warn!("[Settings] Ignoring {}={:?}: {}", key, raw, e);
            default
        }),
    }
}

fn parsed_or_default<T>(key: &str, value: Option<String>) -> T
where
    T: FromStr + Default,
    T::Err: std::fmt::Display,
{
    parsed_or(key, value, T::default())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
