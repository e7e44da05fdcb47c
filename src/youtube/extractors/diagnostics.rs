// Extraction diagnostics - why did YouTube refuse to give us the video?
//
// Classifies extractor error text so the service can log something
// actionable and decide whether a fallback mode is worth trying.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockingReason {
    /// HTTP 403 Forbidden
    Http403Forbidden,
    /// SABR streaming protection hides the stream URLs
    SabrStreaming,
    /// Proof of Origin token required
    PoTokenRequired,
    AgeRestricted,
    GeoBlocked,
    /// Network timeout (often a soft IP block)
    NetworkTimeout,
    RateLimited,
    BotDetection,
    PrivateVideo,
    VideoUnavailable,
    /// DRM-protected content (Premium, movies); permanent
    DrmProtected,
    MembersOnly,
    Unknown,
}

impl BlockingReason {
    /// Another extractor mode or client might get through
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Http403Forbidden
                | Self::SabrStreaming
                | Self::PoTokenRequired
                | Self::NetworkTimeout
                | Self::RateLimited
                | Self::BotDetection
                | Self::Unknown
        )
    }

    pub fn cookies_might_help(&self) -> bool {
        matches!(
            self,
            Self::Http403Forbidden
                | Self::SabrStreaming
                | Self::PoTokenRequired
                | Self::AgeRestricted
                | Self::BotDetection
                | Self::PrivateVideo
                | Self::MembersOnly
        )
    }

    pub fn proxy_might_help(&self) -> bool {
        matches!(
            self,
            Self::Http403Forbidden
                | Self::GeoBlocked
                | Self::NetworkTimeout
                | Self::RateLimited
                | Self::BotDetection
        )
    }

    /// No setting change will make this video playable
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::DrmProtected | Self::VideoUnavailable)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Http403Forbidden => "Access denied (HTTP 403)",
            Self::SabrStreaming => "SABR streaming protection active",
            Self::PoTokenRequired => "Proof of Origin token required",
            Self::AgeRestricted => "Age-restricted content",
            Self::GeoBlocked => "Geographic restriction",
            Self::NetworkTimeout => "Network timeout (possible IP throttling)",
            Self::RateLimited => "Rate limited by YouTube",
            Self::BotDetection => "Bot detection triggered",
            Self::PrivateVideo => "Private video",
            Self::VideoUnavailable => "Video unavailable",
            Self::DrmProtected => "DRM-protected content",
            Self::MembersOnly => "Members-only content",
            Self::Unknown => "Unknown blocking reason",
        }
    }

    /// What the user can try next
    pub fn suggestion(&self) -> String {
        let mut tips: Vec<&str> = Vec::new();

        match self {
            Self::DrmProtected => {
                return "This video is DRM-protected and cannot be played here.".to_string()
            }
            Self::VideoUnavailable => {
                return "This video has been removed or is no longer available.".to_string()
            }
            Self::SabrStreaming => tips.push("Switch extractor mode (python/cli)"),
            Self::PoTokenRequired => {
                tips.push("See https://github.com/yt-dlp/yt-dlp/wiki/PO-Token-Guide")
            }
            Self::RateLimited => tips.push("Wait 10-15 minutes"),
            Self::NetworkTimeout => tips.push("Check your internet connection"),
            Self::PrivateVideo | Self::MembersOnly => {
                tips.push("Access must be granted to the signed-in account")
            }
            Self::Unknown => tips.push("Check the video URL"),
            _ => {}
        }

        if self.cookies_might_help() {
            tips.push("Set SMARTTUBE_COOKIES to a cookies.txt from a logged-in browser");
        }
        if self.proxy_might_help() {
            tips.push("Set SMARTTUBE_PROXY to a proxy/VPN endpoint");
        }
        if self.is_retryable() {
            tips.push("Try again later");
        }

        let steps: Vec<String> = tips
            .iter()
            .enumerate()
            .map(|(i, tip)| format!("{}) {}", i + 1, tip))
            .collect();

        format!("{}. Try:\n{}", self.description(), steps.join("\n"))
    }
}

/// Classify extractor error text; `None` for empty input
pub fn diagnose_error(error: &str) -> Option<BlockingReason> {
    let lower = error.to_lowercase();

    // Most specific first; DRM and membership texts also mention "premium"/"sign in"
    let reason = if contains_any(&lower, &[
        "drm",
        "widevine",
        "playready",
        "fairplay",
        "encrypted media",
        "content is protected",
        "youtube premium",
        "requires purchase",
        "rental",
        "this video requires payment",
    ]) {
        BlockingReason::DrmProtected
    } else if contains_any(&lower, &[
        "members only",
        "members-only",
        "join this channel",
        "membership required",
        "available to members",
    ]) {
        BlockingReason::MembersOnly
    } else if contains_any(&lower, &["sabr"]) {
        BlockingReason::SabrStreaming
    } else if contains_any(&lower, &["po token", "proof of origin"]) {
        BlockingReason::PoTokenRequired
    } else if contains_any(&lower, &["age-restricted", "sign in to confirm your age", "age_verification"]) {
        BlockingReason::AgeRestricted
    } else if contains_any(&lower, &[
        "private video",
        "video is private",
        "sign in if you've been granted access",
    ]) {
        BlockingReason::PrivateVideo
    } else if contains_any(&lower, &[
        "video unavailable",
        "video has been removed",
        "no longer available",
        "video is unavailable",
    ]) {
        BlockingReason::VideoUnavailable
    } else if contains_any(&lower, &[
        "not available in your country",
        "blocked in your country",
        "geo restrict",
        "geographic restriction",
    ]) {
        BlockingReason::GeoBlocked
    } else if contains_any(&lower, &["429", "rate limit", "too many requests"]) {
        BlockingReason::RateLimited
    } else if contains_any(&lower, &["not a bot", "captcha", "unusual traffic", "automated"]) {
        BlockingReason::BotDetection
    } else if contains_any(&lower, &["403", "forbidden"]) {
        BlockingReason::Http403Forbidden
    } else if contains_any(&lower, &["timeout", "timed out", "connection refused", "network unreachable"]) {
        BlockingReason::NetworkTimeout
    } else if !error.trim().is_empty() {
        BlockingReason::Unknown
    } else {
        return None;
    };

    Some(reason)
}

fn contains_any(haystack: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| haystack.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_403_detection() {
        let error = "ERROR: HTTP Error 403: Forbidden";
        assert_eq!(diagnose_error(error), Some(BlockingReason::Http403Forbidden));
    }

    #[test]
    fn test_sabr_detection() {
        let error = "YouTube is forcing SABR streaming for this client";
        assert_eq!(diagnose_error(error), Some(BlockingReason::SabrStreaming));
    }

    #[test]
    fn test_po_token_detection() {
        let error = "mweb client https formats require a GVS PO Token";
        assert_eq!(diagnose_error(error), Some(BlockingReason::PoTokenRequired));
    }

    #[test]
    fn test_bot_detection() {
        let error = "Sign in to confirm you're not a bot";
        assert_eq!(diagnose_error(error), Some(BlockingReason::BotDetection));
    }

    #[test]
    fn test_timeout_detection() {
        let error = "Execution error: yt-dlp timed out after 30s";
        assert_eq!(diagnose_error(error), Some(BlockingReason::NetworkTimeout));
    }

    #[test]
    fn test_geo_detection() {
        let error = "Video not available in your country";
        assert_eq!(diagnose_error(error), Some(BlockingReason::GeoBlocked));
    }

    #[test]
    fn test_drm_detection() {
        assert_eq!(
            diagnose_error("This video is DRM protected"),
            Some(BlockingReason::DrmProtected)
        );
        assert_eq!(
            diagnose_error("This video requires YouTube Premium"),
            Some(BlockingReason::DrmProtected)
        );
    }

    #[test]
    fn test_members_only_detection() {
        let error = "This video is available to members only";
        assert_eq!(diagnose_error(error), Some(BlockingReason::MembersOnly));
    }

    #[test]
    fn test_empty_and_unknown() {
        assert_eq!(diagnose_error("  "), None);
        assert_eq!(diagnose_error("exit status 1"), Some(BlockingReason::Unknown));
    }

    #[test]
    fn test_permanent_reasons() {
        assert!(BlockingReason::DrmProtected.is_permanent());
        assert!(BlockingReason::VideoUnavailable.is_permanent());
        assert!(!BlockingReason::Http403Forbidden.is_permanent());
        assert!(!BlockingReason::DrmProtected.is_retryable());
    }

    #[test]
    fn test_suggestion_lists_steps() {
        let text = BlockingReason::Http403Forbidden.suggestion();
        assert!(text.starts_with("Access denied (HTTP 403). Try:"));
        assert!(text.contains("1) Set SMARTTUBE_COOKIES"));
        assert!(text.contains("2) Set SMARTTUBE_PROXY"));
        assert!(text.contains("3) Try again later"));

        let text = BlockingReason::DrmProtected.suggestion();
        assert!(!text.contains("Try:"));
    }
}
