// CLI InfoExtractor - uses the native `yt-dlp` binary
//
// Faster and Python-free, but more likely to trip YouTube's bot detection,
// so YouTube URLs are tried with several player clients in turn.

use async_trait::async_trait;
use std::process::Command as StdCommand;

use super::traits::{
    is_youtube_url, parse_record, parse_search_entries, search_target, ExtractorConfig,
    InfoExtractor, RawSourceRecord,
};
use crate::youtube::errors::ExtractError;
use crate::youtube::utils::{probe_command, run_output_with_timeout};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// CLI-based info extractor using yt-dlp binary
pub struct CliInfoExtractor {
    ytdlp_path: String,
}

impl CliInfoExtractor {
    pub fn new() -> Self {
        Self {
            ytdlp_path: Self::find_ytdlp(),
        }
    }

    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            ytdlp_path: path.into(),
        }
    }

    fn find_ytdlp() -> String {
        let common_paths = [
            "/opt/homebrew/bin/yt-dlp", // Homebrew on Apple Silicon
            "/usr/local/bin/yt-dlp",    // Homebrew on Intel Mac
            "/usr/bin/yt-dlp",
        ];

        for path in common_paths {
            if std::path::Path::new(path).exists() {
                return path.to_string();
            }
        }

        if let Ok(output) = StdCommand::new("which").arg("yt-dlp").output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout);
                let trimmed = path.trim();
                if !trimmed.is_empty() {
                    return trimmed.to_string();
                }
            }
        }

        "yt-dlp".to_string()
    }

    /// Player clients to try, in order
    fn clients_for(url: &str, config: &ExtractorConfig) -> Vec<String> {
        if let Some(client) = &config.player_client {
            return vec![client.clone()];
        }

        if !is_youtube_url(url) {
            return vec![String::new()];
        }

        // android is less likely to be blocked; web handles age-gated content with cookies
        let clients: &[&str] = if config.has_cookies() {
            &["web", "android"]
        } else {
            &["android", "tv", "web"]
        };
        clients.iter().map(|c| c.to_string()).collect()
    }

    fn build_video_args(url: &str, config: &ExtractorConfig, client: &str) -> Vec<String> {
        let mut args = vec!["--dump-json".to_string(), "--no-playlist".to_string()];
        args.extend(config.common_args());
        args.push("--user-agent".to_string());
        args.push(USER_AGENT.to_string());

        if !client.is_empty() {
            args.push("--extractor-args".to_string());
            args.push(format!("youtube:player_client={}", client));
        }

        args.push(url.to_string());
        args
    }

    fn build_search_args(query: &str, max_results: usize, config: &ExtractorConfig) -> Vec<String> {
        let mut args = vec!["-J".to_string(), "--flat-playlist".to_string()];
        args.extend(config.common_args());
        args.push(search_target(query, max_results));
        args
    }

    async fn run(&self, args: Vec<String>, config: &ExtractorConfig) -> Result<Vec<u8>, ExtractError> {
        log::debug!("[CliExtractor] {} {}", self.ytdlp_path, args.join(" "));

        let out = run_output_with_timeout(&self.ytdlp_path, &args, config.process_timeout_secs()).await?;

        if out.status.success() {
            Ok(out.stdout)
        } else {
            Err(ExtractError::from(String::from_utf8_lossy(&out.stderr).to_string()))
        }
    }
}

impl Default for CliInfoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InfoExtractor for CliInfoExtractor {
    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }

    fn is_available(&self) -> bool {
        probe_command(&self.ytdlp_path, &["--version"])
    }

    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<RawSourceRecord, ExtractError> {
        let mut last_error = ExtractError::Unknown("No clients to try".to_string());

        for client in Self::clients_for(url, config) {
            let args = Self::build_video_args(url, config, &client);

            match self.run(args, config).await {
                Ok(stdout) => {
                    log::info!("[CliExtractor] Success with client '{}'", client);
                    return parse_record(&stdout);
                }
                Err(e) => {
                    log::warn!("[CliExtractor] Client '{}' failed: {}", client, e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clients_for_youtube() {
        let config = ExtractorConfig::default();
        assert_eq!(
            CliInfoExtractor::clients_for("https://www.youtube.com/watch?v=x", &config),
            vec!["android", "tv", "web"]
        );

        let config = config.with_cookies_path(Some("/tmp/c.txt".to_string()));
        assert_eq!(
            CliInfoExtractor::clients_for("https://youtu.be/x", &config),
            vec!["web", "android"]
        );
    }

    #[test]
    fn test_explicit_client_wins() {
        let config = ExtractorConfig::default().with_player_client(Some("tv".to_string()));
        assert_eq!(
            CliInfoExtractor::clients_for("https://www.youtube.com/watch?v=x", &config),
            vec!["tv"]
        );
    }

    #[test]
    fn test_video_args() {
        let args = CliInfoExtractor::build_video_args(
            "https://www.youtube.com/watch?v=x",
            &ExtractorConfig::default(),
            "android",
        );

        assert_eq!(args[0], "--dump-json");
        assert!(args.contains(&"youtube:player_client=android".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("https://www.youtube.com/watch?v=x"));
    }

    #[test]
    fn test_non_youtube_has_no_client_args() {
        let config = ExtractorConfig::default();
        let clients = CliInfoExtractor::clients_for("https://vimeo.com/1", &config);
        let args = CliInfoExtractor::build_video_args("https://vimeo.com/1", &config, &clients[0]);

        assert!(!args.contains(&"--extractor-args".to_string()));
    }

    #[test]
    fn test_search_args() {
        let args = CliInfoExtractor::build_search_args("lofi", 3, &ExtractorConfig::default());
        assert_eq!(&args[..2], ["-J", "--flat-playlist"]);
        assert_eq!(args.last().map(String::as_str), Some("ytsearch3:lofi"));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let extractor = CliInfoExtractor::with_path("definitely-not-a-real-binary-xyz");
        assert!(!extractor.is_available());

        let err = extractor
            .extract("https://vimeo.com/1", &ExtractorConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::ToolNotFound(_)));
    }
}
