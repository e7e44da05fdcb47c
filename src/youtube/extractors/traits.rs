// InfoExtractor trait, its configuration and the raw records it produces

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::youtube::errors::ExtractError;

/// Extraction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractorMode {
    /// Python module yt_dlp (better for YouTube, avoids bot detection)
    Python,
    /// CLI binary yt-dlp (faster, no Python dependency)
    Cli,
    /// Auto-select: Python -> CLI fallback
    #[default]
    Auto,
}

impl fmt::Display for ExtractorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Python => write!(f, "python"),
            Self::Cli => write!(f, "cli"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

impl std::str::FromStr for ExtractorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" => Ok(Self::Python),
            "cli" => Ok(Self::Cli),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown extractor mode: {}", other)),
        }
    }
}

/// Network retries passed to yt-dlp
const RETRIES: u32 = 2;

/// Configuration for info extraction
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub mode: ExtractorMode,
    /// SOCKS5/HTTP proxy URL
    pub proxy: Option<String>,
    /// Path to cookies.txt file
    pub cookies_path: Option<String>,
    /// Use cookies from browser (Chrome)
    pub cookies_from_browser: bool,
    /// Per-call timeout in seconds
    pub timeout_seconds: u32,
    /// YouTube player client (android, web, tv)
    pub player_client: Option<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            mode: ExtractorMode::Auto,
            proxy: None,
            cookies_path: None,
            cookies_from_browser: false,
            timeout_seconds: 30,
            player_client: None,
        }
    }
}

impl ExtractorConfig {
    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_cookies_path(mut self, path: Option<String>) -> Self {
        self.cookies_path = path;
        self
    }

    pub fn with_cookies_from_browser(mut self, enabled: bool) -> Self {
        self.cookies_from_browser = enabled;
        self
    }

    pub fn with_mode(mut self, mode: ExtractorMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_timeout(mut self, seconds: u32) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn with_player_client(mut self, client: Option<String>) -> Self {
        self.player_client = client;
        self
    }

    pub fn has_cookies(&self) -> bool {
        self.cookies_path.is_some() || self.cookies_from_browser
    }

    /// Wall-clock limit for one yt-dlp run: every retry may use a full socket timeout
    pub fn process_timeout_secs(&self) -> u64 {
        u64::from(self.timeout_seconds) * u64::from(RETRIES + 2)
    }

    /// yt-dlp flags shared by every extraction call (everything but the target)
    pub fn common_args(&self) -> Vec<String> {
        let mut args = vec![
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            self.timeout_seconds.to_string(),
            "--retries".to_string(),
            RETRIES.to_string(),
        ];

        if let Some(path) = &self.cookies_path {
            args.push("--cookies".to_string());
            args.push(path.clone());
        } else if self.cookies_from_browser {
            args.push("--cookies-from-browser".to_string());
            args.push("chrome".to_string());
        }

        if let Some(proxy) = &self.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        args
    }
}

/// One thumbnail entry of a raw record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawThumbnail {
    #[serde(deserialize_with = "lenient")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub width: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub height: Option<u32>,
}

/// Candidate stream descriptor as reported by yt-dlp
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFormat {
    /// Format ID (e.g., "18", "137", "140")
    #[serde(deserialize_with = "lenient")]
    pub format_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub url: Option<String>,
    /// Container extension (mp4, webm, m4a)
    #[serde(deserialize_with = "lenient")]
    pub ext: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub width: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub height: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub fps: Option<f64>,
    /// Video codec (avc1, vp9, av01, none)
    #[serde(deserialize_with = "lenient")]
    pub vcodec: Option<String>,
    /// Audio codec (mp4a, opus, none)
    #[serde(deserialize_with = "lenient")]
    pub acodec: Option<String>,
    /// Total bitrate in kbps
    #[serde(deserialize_with = "lenient")]
    pub tbr: Option<f64>,
    /// Audio bitrate in kbps
    #[serde(deserialize_with = "lenient")]
    pub abr: Option<f64>,
    /// Audio sample rate in Hz
    #[serde(deserialize_with = "lenient")]
    pub asr: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub filesize: Option<u64>,
    /// Approximate file size (when exact is unknown)
    #[serde(deserialize_with = "lenient")]
    pub filesize_approx: Option<u64>,
    /// Format note (e.g., "1080p", "medium")
    #[serde(deserialize_with = "lenient")]
    pub format_note: Option<String>,
}

impl RawFormat {
    /// Exact or approximate file size
    pub fn effective_size(&self) -> Option<u64> {
        self.filesize.or(self.filesize_approx)
    }

    pub fn has_video(&self) -> bool {
        match self.vcodec.as_deref() {
            Some(codec) => Self::is_real_codec(codec),
            None => self.height.is_some_and(|h| h > 0),
        }
    }

    pub fn has_audio(&self) -> bool {
        match self.acodec.as_deref() {
            Some(codec) => Self::is_real_codec(codec),
            None => self.abr.is_some_and(|b| b > 0.0) || self.asr.is_some_and(|r| r > 0),
        }
    }

    fn is_real_codec(codec: &str) -> bool {
        !codec.is_empty() && codec != "none"
    }
}

/// One video as described by `yt-dlp --dump-json`
///
/// Everything is optional: the normalizer decides what is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSourceRecord {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub channel: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub uploader: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub channel_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub uploader_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub channel_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub uploader_url: Option<String>,
    /// Play length in seconds
    #[serde(deserialize_with = "lenient")]
    pub duration: Option<f64>,
    /// Free-text duration label (e.g., "12:04")
    #[serde(deserialize_with = "lenient")]
    pub duration_string: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub view_count: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    pub like_count: Option<i64>,
    /// YYYYMMDD
    #[serde(deserialize_with = "lenient")]
    pub upload_date: Option<String>,
    /// Unix timestamp of the upload
    #[serde(deserialize_with = "lenient")]
    pub timestamp: Option<i64>,
    #[serde(deserialize_with = "lenient_list")]
    pub thumbnails: Vec<RawThumbnail>,
    #[serde(deserialize_with = "lenient")]
    pub is_live: Option<bool>,
    /// "is_live", "was_live", "not_live", ...
    #[serde(deserialize_with = "lenient")]
    pub live_status: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub categories: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "lenient")]
    pub webpage_url: Option<String>,
    /// Entry URL in flat playlist / search results
    #[serde(deserialize_with = "lenient")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub formats: Vec<RawFormat>,
}

// yt-dlp output is untrusted: a value of the wrong shape reads as absent
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(decode_lenient(Value::deserialize(deserializer)?))
}

// `null` or a non-array is an empty list; undecodable items are dropped
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items.into_iter().filter_map(decode_lenient).collect()),
        Value::Null => Ok(Vec::new()),
        other => {
            log::debug!("[RawRecord] Ignoring non-list value {}", other);
            Ok(Vec::new())
        }
    }
}

fn decode_lenient<T: DeserializeOwned>(value: Value) -> Option<T> {
    if value.is_null() {
        return None;
    }

    match serde_json::from_value::<T>(value.clone()) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            // Whole floats such as `1080.0` in integer fields
            let whole = value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .and_then(|f| serde_json::from_value::<T>(Value::from(f as i64)).ok());
            if whole.is_none() {
                log::debug!("[RawRecord] Ignoring value {}: {}", value, e);
            }
            whole
        }
    }
}

/// Trait for info extractors
#[async_trait]
pub trait InfoExtractor: Send + Sync {
    /// Name of the extractor (for logging)
    fn name(&self) -> &'static str;

    /// Check if this extractor is available
    fn is_available(&self) -> bool;

    /// Extract one video with its formats
    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<RawSourceRecord, ExtractError>;

    /// Run a search and return the raw result entries (flat, no formats).
    ///
    /// Entries stay undecoded so one bad entry cannot sink the batch.
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        config: &ExtractorConfig,
    ) -> Result<Vec<serde_json::Value>, ExtractError>;
}

/// Decode `yt-dlp --dump-json` output for a single video
pub fn parse_record(stdout: &[u8]) -> Result<RawSourceRecord, ExtractError> {
    serde_json::from_slice(stdout)
        .map_err(|e| ExtractError::ParseError(format!("Invalid JSON: {}", e)))
}

/// Pull the `entries` array out of `yt-dlp -J --flat-playlist` output
pub fn parse_search_entries(stdout: &[u8]) -> Result<Vec<serde_json::Value>, ExtractError> {
    let json: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|e| ExtractError::ParseError(format!("Invalid JSON: {}", e)))?;

    match json.get("entries") {
        Some(serde_json::Value::Array(entries)) => Ok(entries.clone()),
        Some(_) => Err(ExtractError::ParseError("entries is not an array".to_string())),
        None => Err(ExtractError::ParseError("No entries array in JSON".to_string())),
    }
}

/// yt-dlp search target for a query
pub fn search_target(query: &str, max_results: usize) -> String {
    format!("ytsearch{}:{}", max_results, query)
}

pub fn is_youtube_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains("youtube.com") || lower.contains("youtu.be")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_record_tolerates_missing_fields() {
        let stdout = json!({ "id": "abc", "title": "Hello", "view_count": null }).to_string();
        let record = parse_record(stdout.as_bytes()).unwrap();

        assert_eq!(record.id.as_deref(), Some("abc"));
        assert!(record.view_count.is_none());
        assert!(record.formats.is_empty());
    }

    #[test]
    fn test_parse_record_accepts_null_lists() {
        let stdout = json!({ "id": "abc", "tags": null, "thumbnails": null, "formats": null })
            .to_string();
        let record = parse_record(stdout.as_bytes()).unwrap();

        assert!(record.tags.is_empty());
        assert!(record.thumbnails.is_empty());
    }

    #[test]
    fn test_parse_record_tolerates_wrong_types() {
        let stdout = json!({
            "id": "abc",
            "title": "Hello",
            "view_count": "lots",
            "like_count": 12.0,
            "tags": ["music", 7, "live"],
            "categories": "Music",
            "formats": [
                { "url": "https://av1080", "height": 1080.0, "vcodec": "avc1", "acodec": "mp4a" },
                "garbage",
                { "url": "https://av360", "height": "tall", "fps": "fast", "vcodec": "avc1" }
            ]
        })
        .to_string();

        let record = parse_record(stdout.as_bytes()).unwrap();

        assert_eq!(record.title.as_deref(), Some("Hello"));
        assert!(record.view_count.is_none());
        assert_eq!(record.like_count, Some(12));
        assert_eq!(record.tags, ["music", "live"]);
        assert!(record.categories.is_empty());
        assert_eq!(record.formats.len(), 2);
        assert_eq!(record.formats[0].height, Some(1080));
        assert!(record.formats[1].height.is_none());
        assert!(record.formats[1].fps.is_none());
        assert_eq!(record.formats[1].url.as_deref(), Some("https://av360"));
    }

    #[test]
    fn test_fractional_value_in_integer_field() {
        let stdout = json!({ "id": "abc", "title": "Hello", "view_count": 1.5, "timestamp": -3.0 })
            .to_string();
        let record = parse_record(stdout.as_bytes()).unwrap();

        assert!(record.view_count.is_none());
        assert_eq!(record.timestamp, Some(-3));
    }

    #[test]
    fn test_parse_record_rejects_garbage() {
        let err = parse_record(b"not json").unwrap_err();
        assert!(matches!(err, ExtractError::ParseError(_)));
    }

    #[test]
    fn test_parse_search_entries() {
        let stdout = json!({
            "_type": "playlist",
            "entries": [{ "id": "a", "title": "A" }, { "id": "b", "title": "B" }]
        })
        .to_string();

        let entries = parse_search_entries(stdout.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);

        let err = parse_search_entries(b"{}").unwrap_err();
        assert!(matches!(err, ExtractError::ParseError(_)));
    }

    #[test]
    fn test_raw_format_tracks() {
        let muxed = RawFormat {
            vcodec: Some("avc1.42001E".to_string()),
            acodec: Some("mp4a.40.2".to_string()),
            ..RawFormat::default()
        };
        assert!(muxed.has_video() && muxed.has_audio());

        let storyboard = RawFormat {
            vcodec: Some("none".to_string()),
            acodec: Some("none".to_string()),
            height: Some(45),
            ..RawFormat::default()
        };
        assert!(!storyboard.has_video() && !storyboard.has_audio());

        let bare = RawFormat {
            height: Some(720),
            asr: Some(44100),
            ..RawFormat::default()
        };
        assert!(bare.has_video() && bare.has_audio());
    }

    #[test]
    fn test_common_args() {
        let config = ExtractorConfig::default()
            .with_proxy(Some("socks5h://127.0.0.1:1080".to_string()))
            .with_cookies_path(Some("/tmp/cookies.txt".to_string()))
            .with_timeout(10);

        let args = config.common_args();
        assert!(args.windows(2).any(|w| w == ["--socket-timeout", "10"]));
        assert!(args.windows(2).any(|w| w == ["--cookies", "/tmp/cookies.txt"]));
        assert!(args.windows(2).any(|w| w == ["--proxy", "socks5h://127.0.0.1:1080"]));
        assert!(!args.contains(&"--cookies-from-browser".to_string()));
        assert_eq!(config.process_timeout_secs(), 40);
    }

    #[test]
    fn test_search_target() {
        assert_eq!(search_target("rust lang", 5), "ytsearch5:rust lang");
    }
}
