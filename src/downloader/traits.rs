// Extraction backend trait definition

use async_trait::async_trait;

use super::errors::DownloadError;
use super::listing::render_table;
use super::models::{DownloadRequest, MediaInfo};

/// Trait for media extraction/download backends
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Name of the backend (for logging)
    fn name(&self) -> &'static str;

    /// Get media information with the format catalog (worst to best)
    async fn extract_info(&self, url: &str) -> Result<MediaInfo, DownloadError>;

    /// Download the formats named by `request.format_spec`
    async fn download(&self, url: &str, request: &DownloadRequest) -> Result<(), DownloadError>;

    /// Render the format table for `url`
    async fn list_formats(&self, url: &str) -> Result<String, DownloadError> {
        let info = self.extract_info(url).await?;
        Ok(render_table(&info))
    }
}
