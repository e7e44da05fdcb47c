// Data models shared by the normalizer, the selector and the service

use std::hash::{Hash, Hasher};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::format_selector::{FormatSelector, QualityMatch};

/// Base URL for watch pages
pub const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// A YouTube video with its metadata and playable formats
///
/// Equality and hashing look at the identifier only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    id: String,
    pub title: String,
    pub description: Option<String>,
    pub channel_name: Option<String>,
    pub channel_id: Option<String>,
    pub channel_url: Option<String>,
    pub thumbnail_url: Option<String>,
    /// Absent for live content and for records with only a text label
    pub duration: Option<Duration>,
    /// Display fallback when `duration` is unknown (e.g. "LIVE", "12:04")
    pub duration_text: Option<String>,
    pub view_count: u64,
    pub like_count: u64,
    /// ISO-8601 date (YYYY-MM-DD)
    pub upload_date: Option<String>,
    pub is_live: bool,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub formats: Vec<VideoFormat>,
}

impl Video {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            channel_name: None,
            channel_id: None,
            channel_url: None,
            thumbnail_url: None,
            duration: None,
            duration_text: None,
            view_count: 0,
            like_count: 0,
            upload_date: None,
            is_live: false,
            category: None,
            tags: Vec::new(),
            formats: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn watch_url(&self) -> String {
        format!("{}{}", WATCH_URL_PREFIX, self.id)
    }

    /// View count for display (e.g., "999", "1.2K", "3.4M")
    pub fn formatted_view_count(&self) -> String {
        let count = self.view_count;
        if count < 1_000 {
            count.to_string()
        } else if count < 1_000_000 {
            format!("{:.1}K", count as f64 / 1_000.0)
        } else if count < 1_000_000_000 {
            format!("{:.1}M", count as f64 / 1_000_000.0)
        } else {
            format!("{:.1}B", count as f64 / 1_000_000_000.0)
        }
    }

    /// Duration for display: "m:ss" or "h:mm:ss"
    pub fn formatted_duration(&self) -> String {
        match self.duration {
            Some(duration) => format_duration(duration),
            None => self
                .duration_text
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }

    /// Best format for the requested quality (see `FormatSelector`)
    pub fn best_format(&self, quality: &str, mode: QualityMatch) -> Option<&VideoFormat> {
        FormatSelector::select_best_with(&self.formats, quality, mode)
    }

    /// "Auto" plus the heights this video offers as combined streams
    pub fn available_qualities(&self) -> Vec<String> {
        FormatSelector::available_qualities(&self.formats)
    }
}

impl PartialEq for Video {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Video {}

impl Hash for Video {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Format a duration as "m:ss", or "h:mm:ss" from one hour up
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// One playable stream of a video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoFormat {
    pub url: String,
    pub mime_type: String,
    /// Display label (e.g., "720p", "1080p60", "Audio Only")
    pub quality_label: String,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Total bitrate in bits per second
    pub bitrate: u64,
    /// Size in bytes, 0 when unknown
    pub content_length: u64,
    pub has_video: bool,
    pub has_audio: bool,
    /// Audio bitrate in kbps
    pub audio_bitrate: u32,
    /// Audio sample rate in Hz
    pub audio_sample_rate: u32,
}

impl VideoFormat {
    pub fn is_combined(&self) -> bool {
        self.has_video && self.has_audio
    }

    pub fn is_video_only(&self) -> bool {
        self.has_video && !self.has_audio
    }

    pub fn is_audio_only(&self) -> bool {
        self.has_audio && !self.has_video
    }

    /// "1920x1080", or the quality label when dimensions are unknown
    pub fn resolution(&self) -> String {
        if self.width > 0 && self.height > 0 {
            format!("{}x{}", self.width, self.height)
        } else if !self.quality_label.is_empty() {
            self.quality_label.clone()
        } else {
            "Unknown".to_string()
        }
    }

    pub fn formatted_bitrate(&self) -> String {
        let bps = self.bitrate;
        if bps == 0 {
            "Unknown".to_string()
        } else if bps < 1_000 {
            format!("{} bps", bps)
        } else if bps < 1_000_000 {
            format!("{:.1} Kbps", bps as f64 / 1_000.0)
        } else {
            format!("{:.1} Mbps", bps as f64 / 1_000_000.0)
        }
    }

    pub fn formatted_size(&self) -> String {
        const KB: f64 = 1024.0;
        const MB: f64 = KB * 1024.0;
        const GB: f64 = MB * 1024.0;

        let bytes = self.content_length;
        if bytes == 0 {
            "Unknown".to_string()
        } else if bytes < 1024 {
            format!("{} B", bytes)
        } else if (bytes as f64) < MB {
            format!("{:.1} KB", bytes as f64 / KB)
        } else if (bytes as f64) < GB {
            format!("{:.1} MB", bytes as f64 / MB)
        } else {
            format!("{:.1} GB", bytes as f64 / GB)
        }
    }
}

/// A titled row of videos (e.g., "Trending", "Recommended")
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoGroup {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub videos: Vec<Video>,
    pub id: Option<String>,
    /// Pagination cursor for the next page, if any
    pub next_page_key: Option<String>,
    pub auth_required: bool,
}

impl VideoGroup {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_videos(title: impl Into<String>, videos: Vec<Video>) -> Self {
        Self {
            title: Some(title.into()),
            videos,
            ..Self::default()
        }
    }

    pub fn push(&mut self, video: Video) {
        self.videos.push(video);
    }

    pub fn extend(&mut self, videos: impl IntoIterator<Item = Video>) {
        self.videos.extend(videos);
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn clear(&mut self) {
        self.videos.clear();
    }
}

// Identifier wins when both sides carry one, otherwise titles decide.
// Not `Eq`/`Hash`: this relation cannot back a consistent hash.
impl PartialEq for VideoGroup {
    fn eq(&self, other: &Self) -> bool {
        match (&self.id, &other.id) {
            (Some(a), Some(b)) => a == b,
            _ => self.title == other.title,
        }
    }
}
