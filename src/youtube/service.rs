// YouTubeService - search, trending, details and stream URLs
//
// Thin async layer: the extractor fetches raw records, the normalizer turns
// them into `Video`s and the selector picks what to play.

use std::sync::Arc;

use super::errors::{MetadataError, ServiceError};
use super::extractors::{
    ExtractorConfig, InfoExtractor, InfoExtractorOrchestrator, RawSourceRecord,
};
use super::format_selector::QualityMatch;
use super::models::{Video, WATCH_URL_PREFIX};
use super::normalizer::normalize;

/// Query used for the trending feed
const TRENDING_QUERY: &str = "trending";

pub struct YouTubeService {
    extractor: Arc<dyn InfoExtractor>,
    config: ExtractorConfig,
    quality_match: QualityMatch,
}

impl YouTubeService {
    pub fn new(config: ExtractorConfig) -> Self {
        Self::with_extractor(Arc::new(InfoExtractorOrchestrator::new()), config)
    }

    pub fn with_extractor(extractor: Arc<dyn InfoExtractor>, config: ExtractorConfig) -> Self {
        Self {
            extractor,
            config,
            quality_match: QualityMatch::default(),
        }
    }

    pub fn with_quality_match(mut self, mode: QualityMatch) -> Self {
        self.quality_match = mode;
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Search YouTube; entries that cannot be normalized are skipped
    pub async fn search_videos(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Video>, ServiceError> {
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let entries = self
            .extractor
            .search(query, max_results, &self.config)
            .await?;

        let videos: Vec<Video> = entries
            .into_iter()
            .filter_map(|entry| match video_from_entry(entry) {
                Ok(video) => Some(video),
                Err(e) => {
                    log::warn!("[YouTubeService] Skipping search result: {}", e);
                    None
                }
            })
            .take(max_results)
            .collect();

        log::info!(
            "[YouTubeService] Search '{}' returned {} videos",
            query,
            videos.len()
        );
        Ok(videos)
    }

    pub async fn get_trending_videos(&self, max_results: usize) -> Result<Vec<Video>, ServiceError> {
        self.search_videos(TRENDING_QUERY, max_results).await
    }

    /// Full details, including formats, for a video id or watch URL
    pub async fn get_video_details(&self, id_or_url: &str) -> Result<Video, ServiceError> {
        let url = watch_url_for(id_or_url);
        let record = self.extractor.extract(&url, &self.config).await?;
        let video = normalize(&record)?;

        log::info!(
            "[YouTubeService] Loaded '{}' ({}) with {} formats",
            video.title,
            video.id(),
            video.formats.len()
        );
        Ok(video)
    }

    /// URL of the best stream for `quality` ("Auto", "720p", ...)
    pub async fn get_stream_url(&self, id_or_url: &str, quality: &str) -> Result<String, ServiceError> {
        let video = self.get_video_details(id_or_url).await?;

        let format = video
            .best_format(quality, self.quality_match)
            .ok_or_else(|| ServiceError::NoPlayableFormat(video.id().to_string()))?;

        log::debug!(
            "[YouTubeService] Picked {} ({}) for quality '{}'",
            format.quality_label,
            format.mime_type,
            quality
        );
        Ok(format.url.clone())
    }

    /// Qualities a picker can offer for this video ("Auto", "1080p", ...)
    pub async fn get_available_qualities(&self, id_or_url: &str) -> Result<Vec<String>, ServiceError> {
        Ok(self.get_video_details(id_or_url).await?.available_qualities())
    }
}

/// Watch URL for a bare id; URLs pass through, gaining `https://` when
/// they have no scheme
pub fn watch_url_for(id_or_url: &str) -> String {
    let trimmed = id_or_url.trim();
    if trimmed.contains("://") {
        trimmed.to_string()
    } else if trimmed.contains('/') || trimmed.contains("watch?") {
        format!("https://{}", trimmed)
    } else {
        format!("{}{}", WATCH_URL_PREFIX, trimmed)
    }
}

fn video_from_entry(entry: serde_json::Value) -> Result<Video, MetadataError> {
    let record: RawSourceRecord =
        serde_json::from_value(entry).map_err(|e| MetadataError::Malformed(e.to_string()))?;
    normalize(&record)
}
