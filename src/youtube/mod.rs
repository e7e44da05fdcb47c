// YouTube core: data model, metadata normalization, format selection,
// yt-dlp extraction and the async service on top of them.

pub mod errors;
pub mod extractors;
pub mod format_selector;
pub mod models;
pub mod normalizer;
pub mod samples;
pub mod service;
pub mod utils;

pub use errors::{ExtractError, MetadataError, ServiceError};
pub use format_selector::{FormatSelector, QualityMatch, AUTO_QUALITY};
pub use models::{Video, VideoFormat, VideoGroup};
pub use normalizer::{extract_video_id, normalize};
pub use service::YouTubeService;
