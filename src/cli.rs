// Command-line shell over `YouTubeService`; results are printed as JSON

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::Settings;
use crate::youtube::extractors::ExtractorMode;
use crate::youtube::samples::sections_for;
use crate::youtube::{QualityMatch, ServiceError, YouTubeService};

/// Default number of results for search and trending
pub const DEFAULT_MAX_RESULTS: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "smarttube")]
#[command(author, version, about = "Browse YouTube and resolve playable streams through yt-dlp", long_about = None)]
pub struct Cli {
    /// Extraction backend: auto, python or cli
    #[arg(long, global = true)]
    pub extractor: Option<ExtractorMode>,

    /// Proxy URL passed to yt-dlp
    #[arg(long, global = true)]
    pub proxy: Option<String>,

    /// Netscape cookies file passed to yt-dlp
    #[arg(long, global = true)]
    pub cookies: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search videos
    Search {
        query: String,

        #[arg(short, long, default_value_t = DEFAULT_MAX_RESULTS)]
        max: usize,
    },

    /// List trending videos
    Trending {
        #[arg(short, long, default_value_t = DEFAULT_MAX_RESULTS)]
        max: usize,
    },

    /// Show full details and formats for a video
    Details {
        /// Video id or watch URL
        video: String,
    },

    /// Print the stream URL picked for a quality
    Stream {
        /// Video id or watch URL
        video: String,

        /// "Auto", "1080p", "720p", ...
        #[arg(short, long)]
        quality: Option<String>,

        /// Match the numeric height exactly instead of the label
        #[arg(long)]
        strict: bool,
    },

    /// List the qualities a video can be streamed in
    Qualities {
        /// Video id or watch URL
        video: String,
    },

    /// Show the placeholder sections for a category
    Sections { category: String },
}

#[derive(Serialize)]
struct StreamOutput<'a> {
    video: &'a str,
    quality: &'a str,
    url: String,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Environment settings with command-line flags applied on top
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::from_env();
        if let Some(mode) = self.extractor {
            settings.extractor.mode = mode;
        }
        if self.proxy.is_some() {
            settings.extractor.proxy = self.proxy.clone();
        }
        if self.cookies.is_some() {
            settings.extractor.cookies_path = self.cookies.clone();
        }
        settings
    }
}

pub async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = cli.settings();
    log::debug!("[Cli] Extractor config: {:?}", settings.extractor);

    let quality_match = match cli.command {
        Commands::Stream { strict: true, .. } => QualityMatch::Strict,
        _ => settings.quality_match,
    };
    let service = || YouTubeService::new(settings.extractor.clone()).with_quality_match(quality_match);

    let output = match &cli.command {
        Commands::Search { query, max } => to_json(&service().search_videos(query, *max).await?)?,
        Commands::Trending { max } => to_json(&service().get_trending_videos(*max).await?)?,
        Commands::Details { video } => to_json(&service().get_video_details(video).await?)?,
        Commands::Stream { video, quality, .. } => {
            let quality = quality.as_deref().unwrap_or(settings.quality.as_str());
            let url = service().get_stream_url(video, quality).await?;
            to_json(&StreamOutput {
                video: video.as_str(),
                quality,
                url,
            })?
        }
        Commands::Qualities { video } => to_json(&service().get_available_qualities(video).await?)?,
        Commands::Sections { category } => to_json(&sections_for(category))?,
    };

    println!("{}", output);
    Ok(())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}
