// Python InfoExtractor - uses `python3 -m yt_dlp`
//
// Better at getting past YouTube bot detection and works well with cookies,
// at the cost of needing Python 3 with the yt_dlp module installed.

use async_trait::async_trait;

use super::traits::{
    is_youtube_url, parse_record, parse_search_entries, search_target, ExtractorConfig,
    InfoExtractor, RawSourceRecord,
};
use crate::youtube::errors::ExtractError;
use crate::youtube::utils::{probe_command, run_output_with_timeout};

/// Python-based info extractor using the yt_dlp module
pub struct PythonInfoExtractor {
    python_cmd: String,
}

impl PythonInfoExtractor {
    pub fn new() -> Self {
        Self {
            python_cmd: Self::find_python(),
        }
    }

    pub fn with_interpreter(python_cmd: impl Into<String>) -> Self {
        Self {
            python_cmd: python_cmd.into(),
        }
    }

    fn find_python() -> String {
        // YTDLP_PYTHON points at a venv interpreter when the system one is locked down
        if let Ok(custom) = std::env::var("YTDLP_PYTHON") {
            return custom;
        }

        let candidates = ["python3", "/opt/homebrew/bin/python3", "/usr/local/bin/python3"];

        candidates
            .iter()
            .find(|cmd| probe_command(cmd, &["--version"]))
            .map(|cmd| cmd.to_string())
            .unwrap_or_else(|| "python3".to_string())
    }

    fn module_args() -> Vec<String> {
        vec!["-m".to_string(), "yt_dlp".to_string()]
    }

    fn build_video_args(url: &str, config: &ExtractorConfig) -> Vec<String> {
        let mut args = Self::module_args();
        args.push("--dump-json".to_string());
        args.push("--no-playlist".to_string());
        args.extend(config.common_args());

        if let Some(client) = config.player_client.as_ref().filter(|_| is_youtube_url(url)) {
            args.push("--extractor-args".to_string());
            args.push(format!("youtube:player_client={}", client));
        }

        args.push(url.to_string());
        args
    }

    fn build_search_args(query: &str, max_results: usize, config: &ExtractorConfig) -> Vec<String> {
        let mut args = Self::module_args();
        args.push("-J".to_string());
        args.push("--flat-playlist".to_string());
        args.extend(config.common_args());
        args.push(search_target(query, max_results));
        args
    }

    async fn run(&self, args: Vec<String>, config: &ExtractorConfig) -> Result<Vec<u8>, ExtractError> {
        log::debug!("[PythonExtractor] {} {}", self.python_cmd, args.join(" "));

        let out = run_output_with_timeout(&self.python_cmd, &args, config.process_timeout_secs()).await?;

        if out.status.success() {
            Ok(out.stdout)
        } else {
            let stderr = String::from_utf8_lossy(&out.stderr).to_string();
            log::warn!("[PythonExtractor] yt_dlp failed: {}", stderr.trim());
            Err(ExtractError::from(stderr))
        }
    }
}

impl Default for PythonInfoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InfoExtractor for PythonInfoExtractor {
    fn name(&self) -> &'static str {
        "python-yt-dlp"
    }

    fn is_available(&self) -> bool {
        probe_command(&self.python_cmd, &["-c", "import yt_dlp"])
    }

    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<RawSourceRecord, ExtractError> {
        let stdout = self.run(Self::build_video_args(url, config), config).await?;
        parse_record(&stdout)
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
        config: &ExtractorConfig,
    ) -> Result<Vec<serde_json::Value>, ExtractError> {
        let stdout = self
            .run(Self::build_search_args(query, max_results, config), config)
            .await?;
        parse_search_entries(&stdout)
    }
}
