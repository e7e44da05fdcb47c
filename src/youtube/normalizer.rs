// Metadata normalizer - raw extractor records to `Video`
//
// Pure and synchronous. Optional fields degrade to defaults; only a missing
// identifier or title is an error.

use std::time::Duration;

use regex::Regex;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use super::errors::MetadataError;
use super::extractors::{RawFormat, RawSourceRecord};
use super::models::{Video, VideoFormat};

/// Quality label used for audio-only streams
pub const AUDIO_ONLY_LABEL: &str = "Audio Only";

lazy_static::lazy_static! {
    static ref WATCH_URL_RE: Regex =
        Regex::new(r"^https?://(?:www\.|m\.)?[\w.-]+/watch\?(?:[^#]*&)?v=[\w-]+").unwrap();
}

/// Map one raw record into a `Video`
pub fn normalize(raw: &RawSourceRecord) -> Result<Video, MetadataError> {
    let id = required(raw.id.as_deref(), "id")?;
    let title = required(raw.title.as_deref(), "title")?;

    let mut video = Video::new(id, title);

    video.description = non_empty(raw.description.as_deref());
    video.channel_name = non_empty(raw.channel.as_deref().or(raw.uploader.as_deref()));
    video.channel_id = non_empty(raw.channel_id.as_deref().or(raw.uploader_id.as_deref()));
    video.channel_url = non_empty(raw.channel_url.as_deref().or(raw.uploader_url.as_deref()));

    video.thumbnail_url = raw
        .thumbnails
        .first()
        .and_then(|t| non_empty(t.url.as_deref()));

    video.duration_text = non_empty(raw.duration_string.as_deref());
    video.duration = match raw.duration {
        Some(secs) if secs == 0.0 && video.duration_text.is_some() => None,
        Some(secs) if secs >= 0.0 && secs.is_finite() => Some(Duration::from_secs(secs as u64)),
        _ => None,
    };

    video.view_count = clamp_count(raw.view_count);
    video.like_count = clamp_count(raw.like_count);
    video.upload_date = upload_date(raw);

    video.is_live =
        raw.is_live.unwrap_or(false) || raw.live_status.as_deref() == Some("is_live");
    video.category = raw.categories.first().cloned();
    video.tags = raw.tags.clone();

    video.formats = raw.formats.iter().filter_map(normalize_format).collect();

    Ok(video)
}

/// Map one raw stream descriptor; `None` when it has no URL or carries
/// neither track
pub fn normalize_format(raw: &RawFormat) -> Option<VideoFormat> {
    let url = non_empty(raw.url.as_deref())?;
    let has_video = raw.has_video();
    let has_audio = raw.has_audio();

    if !has_video && !has_audio {
        return None;
    }

    let height = raw.height.unwrap_or(0);
    let fps = raw.fps.filter(|f| f.is_finite() && *f > 0.0).map_or(0, |f| f.round() as u32);

    Some(VideoFormat {
        url,
        mime_type: mime_type(raw.ext.as_deref(), has_video),
        quality_label: quality_label(raw, has_video, height, fps),
        video_codec: raw.vcodec.clone().filter(|_| has_video),
        audio_codec: raw.acodec.clone().filter(|_| has_audio),
        width: raw.width.unwrap_or(0),
        height,
        fps,
        bitrate: kbps_to_bps(raw.tbr),
        content_length: raw.effective_size().unwrap_or(0),
        has_video,
        has_audio,
        audio_bitrate: raw.abr.filter(|_| has_audio).map_or(0, |b| b.round() as u32),
        audio_sample_rate: raw.asr.filter(|_| has_audio).unwrap_or(0),
    })
}

/// Video identifier from a bare URL: everything after the last `=`.
///
/// Assumes a `watch?v=ID` URL; anything else yields a wrong or unchanged
/// string, so check `is_watch_url` first when the shape is not known.
pub fn extract_video_id(url: &str) -> &str {
    match url.rfind('=') {
        Some(pos) => &url[pos + 1..],
        None => url,
    }
}

/// Whether `url` looks like a `.../watch?v=ID` page
pub fn is_watch_url(url: &str) -> bool {
    WATCH_URL_RE.is_match(url)
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, MetadataError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(MetadataError::MissingField(field))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn clamp_count(count: Option<i64>) -> u64 {
    count.map_or(0, |c| c.max(0) as u64)
}

fn kbps_to_bps(kbps: Option<f64>) -> u64 {
    kbps.filter(|k| k.is_finite() && *k > 0.0)
        .map_or(0, |k| (k * 1000.0).round() as u64)
}

/// Upload date as YYYY-MM-DD, from `upload_date` or else `timestamp`
fn upload_date(raw: &RawSourceRecord) -> Option<String> {
    let date = raw
        .upload_date
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .and_then(parse_date)
        .or_else(|| {
            raw.timestamp
                .and_then(|ts| OffsetDateTime::from_unix_timestamp(ts).ok())
                .map(|dt| dt.date())
        });

    let iso = format_description!("[year]-[month]-[day]");
    date.and_then(|d| d.format(&iso).ok())
}

fn parse_date(text: &str) -> Option<Date> {
    let compact = format_description!("[year][month][day]");
    let iso = format_description!("[year]-[month]-[day]");

    match Date::parse(text, &compact).or_else(|_| Date::parse(text, &iso)) {
        Ok(date) => Some(date),
        Err(e) => {
            log::debug!("[Normalizer] Ignoring upload date {:?}: {}", text, e);
            None
        }
    }
}

fn quality_label(raw: &RawFormat, has_video: bool, height: u32, fps: u32) -> String {
    if !has_video {
        return AUDIO_ONLY_LABEL.to_string();
    }

    if height > 0 {
        if fps > 30 {
            format!("{}p{}", height, fps)
        } else {
            format!("{}p", height)
        }
    } else {
        non_empty(raw.format_note.as_deref()).unwrap_or_else(|| "Unknown".to_string())
    }
}

fn mime_type(ext: Option<&str>, has_video: bool) -> String {
    let kind = if has_video { "video" } else { "audio" };

    match ext.map(|e| e.to_ascii_lowercase()).as_deref() {
        Some("mp4") | Some("m4a") | Some("m4v") => format!("{}/mp4", kind),
        Some("webm") | Some("weba") => format!("{}/webm", kind),
        Some("3gp") => format!("{}/3gpp", kind),
        Some("mp3") => "audio/mpeg".to_string(),
        Some("ogg") | Some("opus") => "audio/ogg".to_string(),
        Some("mhtml") => "multipart/related".to_string(),
        Some(other) if !other.is_empty() => format!("{}/{}", kind, other),
        _ => "application/octet-stream".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube::extractors::RawThumbnail;

    fn make_record() -> RawSourceRecord {
        RawSourceRecord {
            id: Some("dQw4w9WgXcQ".to_string()),
            title: Some("Never Gonna Give You Up".to_string()),
            channel: Some("Rick Astley".to_string()),
            channel_id: Some("UCuAXFkgsw1L7xaCfnd5JJOw".to_string()),
            duration: Some(212.0),
            view_count: Some(1_500_000_000),
            like_count: Some(17_000_000),
            upload_date: Some("20091025".to_string()),
            ..RawSourceRecord::default()
        }
    }

    fn make_format(vcodec: &str, acodec: &str, height: Option<u32>) -> RawFormat {
        RawFormat {
            url: Some("https://rr1.googlevideo.com/videoplayback".to_string()),
            ext: Some("mp4".to_string()),
            height,
            width: height.map(|h| h * 16 / 9),
            vcodec: Some(vcodec.to_string()),
            acodec: Some(acodec.to_string()),
            ..RawFormat::default()
        }
    }

    #[test]
    fn test_normalize_basic_record() {
        let video = normalize(&make_record()).unwrap();

        assert_eq!(video.id(), "dQw4w9WgXcQ");
        assert_eq!(video.channel_name.as_deref(), Some("Rick Astley"));
        assert_eq!(video.duration, Some(Duration::from_secs(212)));
        assert_eq!(video.formatted_duration(), "3:32");
        assert_eq!(video.upload_date.as_deref(), Some("2009-10-25"));
        assert!(!video.is_live);
    }

    #[test]
    fn test_missing_required_fields() {
        let mut record = make_record();
        record.id = None;
        assert_eq!(normalize(&record), Err(MetadataError::MissingField("id")));

        let mut record = make_record();
        record.title = Some("   ".to_string());
        assert_eq!(normalize(&record), Err(MetadataError::MissingField("title")));
    }

    #[test]
    fn test_negative_counts_clamp_to_zero() {
        let mut record = make_record();
        record.view_count = Some(-5);
        record.like_count = None;

        let video = normalize(&record).unwrap();
        assert_eq!(video.view_count, 0);
        assert_eq!(video.like_count, 0);
    }

    #[test]
    fn test_duration_formatting() {
        let mut record = make_record();
        record.duration = Some(125.0);

        let video = normalize(&record).unwrap();
        assert_eq!(video.formatted_duration(), "2:05");
    }

    #[test]
    fn test_zero_duration_uses_label() {
        let mut record = make_record();
        record.duration = Some(0.0);
        record.duration_string = Some("LIVE".to_string());

        let video = normalize(&record).unwrap();
        assert!(video.duration.is_none());
        assert_eq!(video.formatted_duration(), "LIVE");
    }

    #[test]
    fn test_live_without_duration() {
        let mut record = make_record();
        record.duration = None;
        record.live_status = Some("is_live".to_string());

        let video = normalize(&record).unwrap();
        assert!(video.is_live);
        assert!(video.duration.is_none());
        assert_eq!(video.formatted_duration(), "Unknown");
    }

    #[test]
    fn test_upload_date_variants() {
        let mut record = make_record();
        record.upload_date = Some("2024-01-31".to_string());
        assert_eq!(normalize(&record).unwrap().upload_date.as_deref(), Some("2024-01-31"));

        record.upload_date = None;
        assert!(normalize(&record).unwrap().upload_date.is_none());

        record.timestamp = Some(1_700_000_000);
        assert_eq!(normalize(&record).unwrap().upload_date.as_deref(), Some("2023-11-14"));

        record.upload_date = Some("yesterday".to_string());
        assert_eq!(normalize(&record).unwrap().upload_date.as_deref(), Some("2023-11-14"));

        record.timestamp = None;
        assert!(normalize(&record).unwrap().upload_date.is_none());
    }

    #[test]
    fn test_first_thumbnail_wins() {
        let mut record = make_record();
        assert!(normalize(&record).unwrap().thumbnail_url.is_none());

        record.thumbnails = vec![
            RawThumbnail {
                url: Some("https://i.ytimg.com/vi/x/default.jpg".to_string()),
                ..RawThumbnail::default()
            },
            RawThumbnail {
                url: Some("https://i.ytimg.com/vi/x/maxresdefault.jpg".to_string()),
                ..RawThumbnail::default()
            },
        ];
        assert_eq!(
            normalize(&record).unwrap().thumbnail_url.as_deref(),
            Some("https://i.ytimg.com/vi/x/default.jpg")
        );
    }

    #[test]
    fn test_channel_falls_back_to_uploader() {
        let mut record = make_record();
        record.channel = None;
        record.uploader = Some("Uploader".to_string());
        record.uploader_url = Some("https://www.youtube.com/@uploader".to_string());

        let video = normalize(&record).unwrap();
        assert_eq!(video.channel_name.as_deref(), Some("Uploader"));
        assert_eq!(video.channel_url.as_deref(), Some("https://www.youtube.com/@uploader"));
    }

    #[test]
    fn test_formats_without_tracks_are_dropped() {
        let mut record = make_record();
        record.formats = vec![
            make_format("none", "none", Some(45)),
            make_format("avc1.42001E", "mp4a.40.2", Some(360)),
            make_format("vp9", "none", Some(1080)),
            RawFormat {
                ext: Some("m4a".to_string()),
                abr: Some(129.5),
                asr: Some(44100),
                ..make_format("none", "mp4a.40.2", None)
            },
        ];

        let video = normalize(&record).unwrap();
        assert_eq!(video.formats.len(), 3);
        assert!(video.formats.iter().all(|f| f.has_video || f.has_audio));

        let muxed = &video.formats[0];
        assert!(muxed.is_combined());
        assert_eq!(muxed.quality_label, "360p");
        assert_eq!(muxed.mime_type, "video/mp4");

        let video_only = &video.formats[1];
        assert!(video_only.is_video_only());
        assert!(video_only.audio_codec.is_none());

        let audio = &video.formats[2];
        assert_eq!(audio.quality_label, AUDIO_ONLY_LABEL);
        assert_eq!(audio.mime_type, "audio/mp4");
        assert_eq!(audio.audio_bitrate, 130);
        assert_eq!(audio.audio_sample_rate, 44100);
    }

    #[test]
    fn test_formats_without_url_are_dropped() {
        let mut record = make_record();
        record.formats = vec![
            RawFormat {
                url: None,
                ..make_format("avc1.640028", "mp4a.40.2", Some(1080))
            },
            RawFormat {
                url: Some("  ".to_string()),
                ..make_format("avc1.4d401f", "mp4a.40.2", Some(720))
            },
            make_format("avc1.42001E", "mp4a.40.2", Some(360)),
        ];

        let video = normalize(&record).unwrap();
        assert_eq!(video.formats.len(), 1);
        assert_eq!(video.formats[0].height, 360);
        assert!(!video.formats[0].url.is_empty());
    }

    #[test]
    fn test_format_numbers() {
        let raw = RawFormat {
            fps: Some(59.94),
            tbr: Some(2500.5),
            filesize: None,
            filesize_approx: Some(42),
            ..make_format("avc1.640028", "mp4a.40.2", Some(1080))
        };

        let format = normalize_format(&raw).unwrap();
        assert_eq!(format.quality_label, "1080p60");
        assert_eq!(format.fps, 60);
        assert_eq!(format.bitrate, 2_500_500);
        assert_eq!(format.content_length, 42);
        assert_eq!(format.width, 1920);
    }

    #[test]
    fn test_extract_video_id() {
        assert_eq!(extract_video_id("https://example.com/watch?v=abc123"), "abc123");
        assert_eq!(extract_video_id("https://youtu.be/abc123"), "https://youtu.be/abc123");
        assert_eq!(extract_video_id("https://example.com/watch?v="), "");
    }

    #[test]
    fn test_is_watch_url() {
        assert!(is_watch_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(is_watch_url("https://example.com/watch?feature=share&v=abc123"));
        assert!(!is_watch_url("https://youtu.be/dQw4w9WgXcQ"));
        assert!(!is_watch_url("dQw4w9WgXcQ"));
    }
}
