// Error types for extraction, normalization and the service layer

use thiserror::Error;

/// Failure reported by an extractor backend (yt-dlp binary or Python module)
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// Network timeout while connecting to YouTube
    #[error("Network timeout: YouTube is not responding")]
    NetworkTimeout,

    /// YouTube blocked the request (429, bot detection, etc.)
    #[error(
        "YouTube is temporarily throttling requests from your IP address. \
         Wait and try again later, or use a proxy"
    )]
    BlockedByYouTube,

    /// yt-dlp or python not found in system
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Invalid YouTube URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse yt-dlp JSON output
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Command execution failed
    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Classifies raw extractor stderr
impl From<String> for ExtractError {
    fn from(s: String) -> Self {
        let timed_out = s.contains("timeout") || s.contains("timed out");

        if timed_out && s.contains("youtube.com") {
            return Self::BlockedByYouTube;
        }

        if timed_out {
            return Self::NetworkTimeout;
        }

        if s.contains("429") || s.contains("bot") || s.contains("blocked") {
            return Self::BlockedByYouTube;
        }

        if s.contains("not found") || s.contains("No such file") || s.contains("command not found") {
            return Self::ToolNotFound(s);
        }

        if s.contains("parse") || s.contains("JSON") {
            return Self::ParseError(s);
        }

        if s.contains("Invalid URL") || s.contains("Unsupported URL") {
            return Self::InvalidUrl(s);
        }

        Self::Unknown(s)
    }
}

/// A raw record could not be turned into a `Video`.
///
/// Non-retryable: batch callers skip the item and keep going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("record is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("malformed record: {0}")]
    Malformed(String),
}

/// Errors surfaced by `YouTubeService`
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// The video resolved but carries nothing playable
    #[error("No playable format for video {0}")]
    NoPlayableFormat(String),
}
