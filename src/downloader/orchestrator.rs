// Orchestrator - list, or select + download + resolve key

use log::{info, warn};

use super::drm::{is_manifest_url, KeyResolver};
use super::errors::DownloadError;
use super::format_selector::FormatSelector;
use super::models::{DownloadMode, DownloadRequest, SelectionPlan};
use super::traits::MediaBackend;
use crate::cli::Invocation;
use crate::config::AppConfig;

/// yt-dlp default naming, placed under the media directory
pub const DEFAULT_OUTPUT_TEMPLATE: &str = "%(title)s [%(id)s].%(ext)s";
/// Fixed output name for DRM downloads
pub const DRM_OUTPUT_FILENAME: &str = "drm_content";

/// Result of a completed run
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Rendered format table
    Listed(String),
    /// Download finished; `key` is set when the key service returned one
    Downloaded {
        plan: SelectionPlan,
        key: Option<String>,
    },
}

pub struct Orchestrator {
    config: AppConfig,
    backend: Box<dyn MediaBackend>,
    key_resolver: KeyResolver,
}

impl Orchestrator {
    pub fn new(config: AppConfig, backend: Box<dyn MediaBackend>) -> Result<Self, DownloadError> {
        let key_resolver = KeyResolver::new(&config.key_service_url, config.timeout_seconds)?;
        Ok(Self {
            config,
            backend,
            key_resolver,
        })
    }

    pub async fn run(&self, invocation: &Invocation) -> Result<RunOutcome, DownloadError> {
        info!("[Orchestrator] URL: {}", invocation.url);

        let Some(format_id) = invocation.format_id.as_deref() else {
            info!("[Orchestrator] List out all available formats ...");
            let table = self.backend.list_formats(&invocation.url).await?;
            return Ok(RunOutcome::Listed(table));
        };

        info!("[Orchestrator] Target format id: {}", format_id);
        let info = self.backend.extract_info(&invocation.url).await?;
        let plan = FormatSelector::select(format_id, &info.formats, self.config.auto_mix_audio)?;

        let request = DownloadRequest {
            format_spec: plan.composite_id().to_string(),
            output_template: self.output_template(invocation),
            allow_unplayable_formats: invocation.is_drm(),
        };
        info!("[Orchestrator] Output: {}", request.output_template);

        info!("[Orchestrator] Downloading {} with {}", plan.composite_id(), self.backend.name());
        self.backend.download(&invocation.url, &request).await?;

        // The file stays on disk whatever happens below
        let key = self.resolve_key(invocation).await?;
        Ok(RunOutcome::Downloaded { plan, key })
    }

    async fn resolve_key(&self, invocation: &Invocation) -> Result<Option<String>, DownloadError> {
        if invocation.mode != DownloadMode::Drm {
            return Ok(None);
        }
        if !is_manifest_url(&invocation.url) {
            warn!("[Orchestrator] DRM mode, but URL is not a DASH manifest; skipping key lookup");
            return Ok(None);
        }

        self.key_resolver
            .resolve_key(&invocation.url, invocation.license_server_url.as_deref())
            .await
    }

    /// Output template for this invocation, under the media directory
    pub fn output_template(&self, invocation: &Invocation) -> String {
        let filename = match invocation.mode {
            DownloadMode::Drm => DRM_OUTPUT_FILENAME,
            DownloadMode::Plain => invocation
                .output_filename
                .as_deref()
                .unwrap_or(DEFAULT_OUTPUT_TEMPLATE),
        };
        self.config.output_path(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::models::{FormatDescriptor, MediaInfo};
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeBackend {
        downloads: Arc<Mutex<Vec<DownloadRequest>>>,
        fail_download: bool,
    }

    #[async_trait]
    impl MediaBackend for FakeBackend {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn extract_info(&self, _url: &str) -> Result<MediaInfo, DownloadError> {
            Ok(MediaInfo {
                id: "vid".to_string(),
                title: "Video".to_string(),
                formats: vec![
                    FormatDescriptor::new("5", "webm", "none", "opus"),
                    FormatDescriptor::new("18", "mp4", "h264", "none"),
                    FormatDescriptor::new("140", "m4a", "none", "aac"),
                ],
            })
        }

        async fn download(&self, _url: &str, request: &DownloadRequest) -> Result<(), DownloadError> {
            if self.fail_download {
                return Err(DownloadError::ExecutionError("yt-dlp download failed".to_string()));
            }
            self.downloads.lock().unwrap().push(request.clone());
            Ok(())
        }
    }

    fn config() -> AppConfig {
        AppConfig {
            media_dir: PathBuf::from("/srv/media"),
            ytdlp_path: None,
            key_service_url: "http://127.0.0.1:9/api/decrypt".to_string(),
            auto_mix_audio: true,
            timeout_seconds: 5,
        }
    }

    fn orchestrator(backend: FakeBackend) -> Orchestrator {
        Orchestrator::new(config(), Box::new(backend)).unwrap()
    }

    fn invocation(args: &[&str]) -> Invocation {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        Invocation::from_positionals(&args).unwrap()
    }

    #[tokio::test]
    async fn test_lists_without_format_id() {
        let downloads = Arc::new(Mutex::new(Vec::new()));
        let orch = orchestrator(FakeBackend {
            downloads: downloads.clone(),
            ..Default::default()
        });

        let outcome = orch.run(&invocation(&["https://example.com/v"])).await.unwrap();

        match outcome {
            RunOutcome::Listed(table) => assert!(table.contains("Available formats for vid")),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(downloads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_downloads_mixed_plan() {
        let downloads = Arc::new(Mutex::new(Vec::new()));
        let orch = orchestrator(FakeBackend {
            downloads: downloads.clone(),
            ..Default::default()
        });

        let outcome = orch
            .run(&invocation(&["https://example.com/v", "18"]))
            .await
            .unwrap();

        let RunOutcome::Downloaded { plan, key } = outcome else {
            panic!("expected a download");
        };
        assert_eq!(plan.composite_id(), "18+140");
        assert_eq!(key, None);

        let downloads = downloads.lock().unwrap();
        assert_eq!(
            downloads.as_slice(),
            [DownloadRequest {
                format_spec: "18+140".to_string(),
                output_template: "/srv/media/%(title)s [%(id)s].%(ext)s".to_string(),
                allow_unplayable_formats: false,
            }]
        );
    }

    #[tokio::test]
    async fn test_unknown_format_aborts_before_download() {
        let downloads = Arc::new(Mutex::new(Vec::new()));
        let orch = orchestrator(FakeBackend {
            downloads: downloads.clone(),
            ..Default::default()
        });

        let err = orch
            .run(&invocation(&["https://example.com/v", "999", "out.mp4"]))
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::FormatNotFound { .. }));
        assert!(downloads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_download_failure_propagates() {
        let orch = orchestrator(FakeBackend {
            fail_download: true,
            ..Default::default()
        });

        let err = orch
            .run(&invocation(&["https://example.com/v", "140"]))
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::ExecutionError(_)));
    }

    #[tokio::test]
    async fn test_drm_non_manifest_skips_key_lookup() {
        let downloads = Arc::new(Mutex::new(Vec::new()));
        let orch = orchestrator(FakeBackend {
            downloads: downloads.clone(),
            ..Default::default()
        });

        let outcome = orch
            .run(&invocation(&["https://example.com/v", "drm", "18", "https://lic.example.com"]))
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::Downloaded { key: None, .. }));
        let downloads = downloads.lock().unwrap();
        assert_eq!(downloads[0].output_template, "/srv/media/drm_content");
        assert!(downloads[0].allow_unplayable_formats);
    }

    #[test]
    fn test_output_templates() {
        let orch = orchestrator(FakeBackend::default());

        assert_eq!(
            orch.output_template(&invocation(&["u", "18", "clip.mp4"])),
            "/srv/media/clip.mp4"
        );
        assert_eq!(
            orch.output_template(&invocation(&["u", "18"])),
            "/srv/media/%(title)s [%(id)s].%(ext)s"
        );
        assert_eq!(
            orch.output_template(&invocation(&["u", "DRM", "18"])),
            "/srv/media/drm_content"
        );
    }
}
