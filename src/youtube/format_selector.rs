// FormatSelector - picks the stream to hand to the player
//
// Input order is trusted: the extractor already ranks formats, so the
// selector only filters and never re-sorts.
// Handles:
// - "Auto" (first combined video+audio stream)
// - Quality matching by label substring (legacy) or numeric height (strict)
// - Graceful fallback when nothing matches

use serde::{Deserialize, Serialize};

use super::models::VideoFormat;

/// Sentinel quality that means "whatever the extractor ranked first"
pub const AUTO_QUALITY: &str = "Auto";

/// How a requested quality is compared against a format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityMatch {
    /// Label contains the requested digits ("108" matches "1080p")
    #[default]
    Legacy,
    /// Format height equals the requested height
    Strict,
}

impl std::str::FromStr for QualityMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" | "loose" => Ok(Self::Legacy),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown quality match mode: {}", other)),
        }
    }
}

/// Format selector over normalized `VideoFormat` lists
pub struct FormatSelector;

impl FormatSelector {
    /// Pick the best format for `requested` using the legacy label match.
    ///
    /// Returns `None` only for an empty list.
    pub fn select_best<'a>(formats: &'a [VideoFormat], requested: &str) -> Option<&'a VideoFormat> {
        Self::select_best_with(formats, requested, QualityMatch::Legacy)
    }

    /// Pick the best format for `requested` with an explicit match mode
    pub fn select_best_with<'a>(
        formats: &'a [VideoFormat],
        requested: &str,
        mode: QualityMatch,
    ) -> Option<&'a VideoFormat> {
        let first = formats.first()?;

        let combined: Vec<&VideoFormat> = formats.iter().filter(|f| f.is_combined()).collect();

        let Some(&first_combined) = combined.first() else {
            return Some(first);
        };

        if requested == AUTO_QUALITY {
            return Some(first_combined);
        }

        let wanted = Self::normalize_quality(requested);
        let matched = match mode {
            QualityMatch::Legacy => combined
                .iter()
                .find(|f| f.quality_label.contains(wanted))
                .copied(),
            QualityMatch::Strict => wanted
                .parse::<u32>()
                .ok()
                .and_then(|height| combined.iter().find(|f| f.height == height).copied()),
        };

        Some(matched.unwrap_or(first_combined))
    }

    /// Strip one trailing "p" unit ("720p" -> "720")
    pub fn normalize_quality(requested: &str) -> &str {
        requested.strip_suffix('p').unwrap_or(requested)
    }

    /// Qualities worth offering for these formats: "Auto" followed by the
    /// distinct heights of combined streams, highest first
    pub fn available_qualities(formats: &[VideoFormat]) -> Vec<String> {
        let mut heights: Vec<u32> = formats
            .iter()
            .filter(|f| f.is_combined() && f.height > 0)
            .map(|f| f.height)
            .collect();
        heights.sort_unstable_by(|a, b| b.cmp(a));
        heights.dedup();

        std::iter::once(AUTO_QUALITY.to_string())
            .chain(heights.into_iter().map(|h| format!("{}p", h)))
            .collect()
    }
}
