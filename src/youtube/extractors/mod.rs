// InfoExtractor module - video info extraction through yt-dlp
//
// Provides two modes:
// - Python mode: `python3 -m yt_dlp` (better for YouTube, avoids bot detection)
// - CLI mode: native `yt-dlp` binary (faster, no Python dependency)
//
// The orchestrator picks a mode per URL and falls back to the other one.

mod cli;
mod diagnostics;
mod orchestrator;
mod python;
mod traits;

pub use cli::CliInfoExtractor;
pub use diagnostics::{diagnose_error, BlockingReason};
pub use orchestrator::{ExtractFailure, InfoExtractorOrchestrator};
pub use python::PythonInfoExtractor;
pub use traits::{
    parse_record, parse_search_entries, ExtractorConfig, ExtractorMode, InfoExtractor, RawFormat,
    RawSourceRecord, RawThumbnail,
};
