// InfoExtractor Orchestrator - mode selection and fallback
//
// Strategy:
// 1. YouTube: Python first (better anti-bot bypass), then CLI
// 2. Other sites: CLI first (faster), then Python
// 3. Permanent failures (DRM, removed video) skip the fallback

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use super::cli::CliInfoExtractor;
use super::diagnostics::{diagnose_error, BlockingReason};
use super::python::PythonInfoExtractor;
use super::traits::{is_youtube_url, ExtractorConfig, ExtractorMode, InfoExtractor, RawSourceRecord};
use crate::youtube::errors::ExtractError;

/// Orchestrator over the Python and CLI extractors
pub struct InfoExtractorOrchestrator {
    python: Arc<dyn InfoExtractor>,
    cli: Arc<dyn InfoExtractor>,
}

/// Failure with diagnostic information
#[derive(Debug, Clone)]
pub struct ExtractFailure {
    pub error: ExtractError,
    pub blocking_reason: Option<BlockingReason>,
    pub used_mode: ExtractorMode,
    pub tried_fallback: bool,
}

impl ExtractFailure {
    fn new(error: ExtractError, used_mode: ExtractorMode, tried_fallback: bool) -> Self {
        let blocking_reason = diagnose_error(&error.to_string());
        Self {
            error,
            blocking_reason,
            used_mode,
            tried_fallback,
        }
    }

    pub fn suggestion(&self) -> Option<String> {
        self.blocking_reason.map(|r| r.suggestion())
    }
}

impl fmt::Display for ExtractFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (mode: {})", self.error, self.used_mode)?;

        if let Some(reason) = &self.blocking_reason {
            write!(f, "\nBlocking reason: {}", reason.description())?;
        }

        Ok(())
    }
}

impl std::error::Error for ExtractFailure {}

impl InfoExtractorOrchestrator {
    pub fn new() -> Self {
        Self::with_extractors(
            Arc::new(PythonInfoExtractor::new()),
            Arc::new(CliInfoExtractor::new()),
        )
    }

    pub fn with_extractors(python: Arc<dyn InfoExtractor>, cli: Arc<dyn InfoExtractor>) -> Self {
        Self { python, cli }
    }

    fn extractor(&self, mode: ExtractorMode) -> Option<&dyn InfoExtractor> {
        match mode {
            ExtractorMode::Python => Some(self.python.as_ref()),
            ExtractorMode::Cli => Some(self.cli.as_ref()),
            ExtractorMode::Auto => None,
        }
    }

    /// Modes to try for `target`, in order
    fn plan(&self, target: &str, mode: ExtractorMode) -> Vec<ExtractorMode> {
        match mode {
            ExtractorMode::Auto if is_youtube_url(target) => {
                vec![ExtractorMode::Python, ExtractorMode::Cli]
            }
            ExtractorMode::Auto => vec![ExtractorMode::Cli, ExtractorMode::Python],
            fixed => vec![fixed],
        }
    }

    /// Extract one video, falling back between modes, keeping diagnostics
    pub async fn extract_with_diagnostics(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<RawSourceRecord, ExtractFailure> {
        let plan = self.plan(url, config.mode);
        let mut failure: Option<ExtractFailure> = None;

        for (attempt, mode) in plan.iter().copied().enumerate() {
            let Some(extractor) = self.extractor(mode) else {
                continue;
            };

            if !extractor.is_available() {
                log::warn!("[Orchestrator] {} is not installed, skipping", extractor.name());
                failure.get_or_insert_with(|| {
                    ExtractFailure::new(
                        ExtractError::ToolNotFound(Self::install_hint(mode).to_string()),
                        mode,
                        attempt > 0,
                    )
                });
                continue;
            }

            log::info!("[Orchestrator] Trying mode {} for {}", mode, url);

            match extractor.extract(url, config).await {
                Ok(record) => {
                    log::info!("[Orchestrator] Mode {} succeeded", mode);
                    return Ok(record);
                }
                Err(e) => {
                    let current = ExtractFailure::new(e, mode, attempt > 0);
                    log::warn!("[Orchestrator] Mode {} failed: {}", mode, current);

                    let permanent = current.blocking_reason.is_some_and(|r| r.is_permanent());
                    failure = Some(current);
                    if permanent {
                        break;
                    }
                }
            }
        }

        Err(failure.unwrap_or_else(|| {
            ExtractFailure::new(
                ExtractError::ToolNotFound("No extractor available".to_string()),
                config.mode,
                false,
            )
        }))
    }

    /// Search through the first available mode, falling back on failure
    pub async fn search_with_fallback(
        &self,
        query: &str,
        max_results: usize,
        config: &ExtractorConfig,
    ) -> Result<Vec<serde_json::Value>, ExtractError> {
        let mut last_error = ExtractError::ToolNotFound("No extractor available".to_string());

        for mode in self.plan("https://www.youtube.com", config.mode) {
            let Some(extractor) = self.extractor(mode).filter(|e| e.is_available()) else {
                continue;
            };

            match extractor.search(query, max_results, config).await {
                Ok(entries) => return Ok(entries),
                Err(e) => {
                    log::warn!("[Orchestrator] Search via {} failed: {}", mode, e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    fn install_hint(mode: ExtractorMode) -> &'static str {
        match mode {
            ExtractorMode::Python => "Python yt_dlp module not installed (pip3 install yt-dlp)",
            _ => "yt-dlp binary not found (brew install yt-dlp)",
        }
    }
}

impl Default for InfoExtractorOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InfoExtractor for InfoExtractorOrchestrator {
    fn name(&self) -> &'static str {
        "orchestrator"
    }

    fn is_available(&self) -> bool {
        self.python.is_available() || self.cli.is_available()
    }

    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<RawSourceRecord, ExtractError> {
        self.extract_with_diagnostics(url, config)
            .await
            .map_err(|failure| {
                if let Some(suggestion) = failure.suggestion() {
                    log::warn!("[Orchestrator] {}", suggestion);
                }
                failure.error
            })
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
        config: &ExtractorConfig,
    ) -> Result<Vec<serde_json::Value>, ExtractError> {
        self.search_with_fallback(query, max_results, config).await
    }
}
