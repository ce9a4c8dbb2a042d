// Error types for the downloader

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DownloadError {
    /// Requested format id is not exposed by the source
    #[error("Format id not available from source: {requested_id}")]
    FormatNotFound { requested_id: String },

    /// Video container has no entry in the audio-mixing table
    #[error("No compatible audio container known for video extension '{extension}'")]
    UnsupportedContainer { extension: String },

    /// No audio-only stream with the required extension
    #[error("No audio-only format with extension '{required_extension}' available for mixing")]
    AudioNotFound { required_extension: String },

    /// Manifest request answered with a non-success status
    #[error("Failed to fetch manifest {url}: HTTP {status}")]
    ManifestFetch { url: String, status: u16 },

    /// Manifest carries no `<cenc:pssh>` element
    #[error("No PSSH (urn:mpeg:cenc:2013) found in manifest")]
    PsshNotFound,

    /// Key service rejected the request or answered with an unusable body
    #[error("Key service error (HTTP {status}): {detail}")]
    KeyService { status: u16, detail: String },

    /// Required environment variable is unset
    #[error("Environment variable {0} is not set")]
    MissingEnvironment(String),

    /// Environment variable is set to something unusable
    #[error("Environment variable {name} has an invalid value: {value}")]
    InvalidEnvironment { name: String, value: String },

    /// yt-dlp not found in system
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Failed to parse yt-dlp JSON output
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Command execution failed
    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    /// True for the errors raised by the format selector
    pub fn is_selection_error(&self) -> bool {
        matches!(
            self,
            Self::FormatNotFound { .. } | Self::UnsupportedContainer { .. } | Self::AudioNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failed_lookup() {
        let err = DownloadError::FormatNotFound {
            requested_id: "137".to_string(),
        };
        assert_eq!(err.to_string(), "Format id not available from source: 137");

        let err = DownloadError::UnsupportedContainer {
            extension: "flv".to_string(),
        };
        assert!(err.to_string().contains("'flv'"));

        let err = DownloadError::KeyService {
            status: 500,
            detail: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Key service error (HTTP 500): boom");
    }

    #[test]
    fn test_selection_error_classification() {
        assert!(DownloadError::AudioNotFound {
            required_extension: "webm".to_string()
        }
        .is_selection_error());
        assert!(!DownloadError::PsshNotFound.is_selection_error());
    }
}
