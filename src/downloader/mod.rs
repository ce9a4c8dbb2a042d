// Downloader module - format selection, yt-dlp backend, DRM key lookup

pub mod diagnostics;
pub mod drm;
pub mod errors;
pub mod extractor;
pub mod format_selector;
pub mod listing;
pub mod models;
pub mod orchestrator;
pub mod traits;
pub mod utils;

pub use drm::KeyResolver;
pub use errors::DownloadError;
pub use extractor::YtDlpBackend;
pub use format_selector::FormatSelector;
pub use models::{DownloadMode, DownloadRequest, FormatDescriptor, MediaInfo, SelectionPlan};
pub use orchestrator::{Orchestrator, RunOutcome};
pub use traits::MediaBackend;
