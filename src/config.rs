// Configuration - startup settings read from the environment

use std::path::PathBuf;

use crate::downloader::drm::DEFAULT_KEY_SERVICE_URL;
use crate::downloader::errors::DownloadError;
use crate::downloader::utils::expand_home;

/// Base output directory, required
pub const MEDIA_DIR_VAR: &str = "MEDIA_DIR";
/// Optional path to the yt-dlp binary
pub const YTDLP_BIN_VAR: &str = "YTDLP_BIN";
/// Optional key service endpoint
pub const KEY_SERVICE_URL_VAR: &str = "KEY_SERVICE_URL";
/// Optional timeout in seconds for info extraction and HTTP requests
pub const TIMEOUT_VAR: &str = "YTMIX_TIMEOUT";

/// Generous enough for slow extractors and large manifests
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300;

/// Startup configuration, read once and passed to the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub media_dir: PathBuf,
    pub ytdlp_path: Option<String>,
    pub key_service_url: String,
    pub auto_mix_audio: bool,
    /// Timeout for info extraction and HTTP requests
    pub timeout_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, DownloadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DownloadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let media_dir = non_empty(MEDIA_DIR_VAR)
            .map(|dir| expand_home(&dir))
            .ok_or_else(|| DownloadError::MissingEnvironment(MEDIA_DIR_VAR.to_string()))?;

        let timeout_seconds = match non_empty(TIMEOUT_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(DownloadError::InvalidEnvironment {
                    name: TIMEOUT_VAR.to_string(),
                    value: raw,
                })?,
            None => DEFAULT_TIMEOUT_SECONDS,
        };

        Ok(Self {
            media_dir,
            ytdlp_path: non_empty(YTDLP_BIN_VAR),
            key_service_url: non_empty(KEY_SERVICE_URL_VAR)
                .unwrap_or_else(|| DEFAULT_KEY_SERVICE_URL.to_string()),
            auto_mix_audio: true,
            timeout_seconds,
        })
    }

    pub fn with_auto_mix_audio(mut self, enabled: bool) -> Self {
        self.auto_mix_audio = enabled;
        self
    }

    /// Output path under the media directory, as a yt-dlp template string
    ///
    /// Absolute filenames are still placed under `media_dir`.
    pub fn output_path(&self, filename: &str) -> String {
        self.media_dir
            .join(filename.trim_start_matches('/'))
            .to_string_lossy()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_media_dir_required() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, DownloadError::MissingEnvironment(ref v) if v == "MEDIA_DIR"));

        let err = AppConfig::from_lookup(lookup(&[("MEDIA_DIR", "  ")])).unwrap_err();
        assert!(matches!(err, DownloadError::MissingEnvironment(_)));
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("MEDIA_DIR", "/srv/media")])).unwrap();

        assert_eq!(config.media_dir, PathBuf::from("/srv/media"));
        assert_eq!(config.ytdlp_path, None);
        assert_eq!(config.key_service_url, DEFAULT_KEY_SERVICE_URL);
        assert!(config.auto_mix_audio);
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
    }

    #[test]
    fn test_timeout_override() {
        let config = AppConfig::from_lookup(lookup(&[
            ("MEDIA_DIR", "/srv/media"),
            ("YTMIX_TIMEOUT", " 900 "),
        ]))
        .unwrap();
        assert_eq!(config.timeout_seconds, 900);

        for bad in ["soon", "0", "-5"] {
            let err = AppConfig::from_lookup(lookup(&[
                ("MEDIA_DIR", "/srv/media"),
                ("YTMIX_TIMEOUT", bad),
            ]))
            .unwrap_err();
            assert!(
                matches!(err, DownloadError::InvalidEnvironment { ref name, .. } if name == "YTMIX_TIMEOUT")
            );
        }
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("MEDIA_DIR", "/srv/media"),
            ("YTDLP_BIN", "/opt/yt-dlp"),
            ("KEY_SERVICE_URL", "http://localhost:8080/api/decrypt"),
        ]))
        .unwrap()
        .with_auto_mix_audio(false);

        assert_eq!(config.ytdlp_path.as_deref(), Some("/opt/yt-dlp"));
        assert_eq!(config.key_service_url, "http://localhost:8080/api/decrypt");
        assert!(!config.auto_mix_audio);
    }

    #[test]
    fn test_output_path_prefixes_media_dir() {
        let config = AppConfig::from_lookup(lookup(&[("MEDIA_DIR", "/srv/media")])).unwrap();
        assert_eq!(config.output_path("clip.mp4"), "/srv/media/clip.mp4");
        assert_eq!(config.output_path("drm_content"), "/srv/media/drm_content");
        assert_eq!(config.output_path("/tmp/x.mp4"), "/srv/media/tmp/x.mp4");
    }
}
