// Common data models for downloader

use serde::{Deserialize, Serialize};

/// Codec sentinel yt-dlp uses for an absent stream
pub const NO_CODEC: &str = "none";

/// One stream entry from the format catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    /// Format ID (e.g., "137", "140")
    pub id: String,
    /// File extension (mp4, webm, m4a)
    pub extension: String,
    /// Video codec (avc1, vp9, av01, none)
    pub video_codec: String,
    /// Audio codec (mp4a, opus, none)
    pub audio_codec: String,
    /// Resolution string (e.g., "1920x1080", "audio only")
    pub resolution: Option<String>,
    pub fps: Option<f64>,
    /// File size in bytes
    pub filesize: Option<u64>,
    /// Approximate file size (when exact is unknown)
    pub filesize_approx: Option<u64>,
    /// Total bitrate in kbps
    pub tbr: Option<f64>,
    /// Format note (e.g., "1080p", "tiny")
    pub format_note: Option<String>,
}

impl FormatDescriptor {
    pub fn new(id: &str, extension: &str, video_codec: &str, audio_codec: &str) -> Self {
        Self {
            id: id.to_string(),
            extension: extension.to_string(),
            video_codec: video_codec.to_string(),
            audio_codec: audio_codec.to_string(),
            resolution: None,
            fps: None,
            filesize: None,
            filesize_approx: None,
            tbr: None,
            format_note: None,
        }
    }

    pub fn has_video(&self) -> bool {
        self.video_codec != NO_CODEC
    }

    pub fn has_audio(&self) -> bool {
        self.audio_codec != NO_CODEC
    }

    /// Video stream without audio
    pub fn is_video_only(&self) -> bool {
        self.has_video() && !self.has_audio()
    }

    /// Audio stream without video
    pub fn is_audio_only(&self) -> bool {
        self.has_audio() && !self.has_video()
    }

    /// Get effective file size and whether it is an estimate
    pub fn effective_size(&self) -> Option<(u64, bool)> {
        self.filesize
            .map(|s| (s, false))
            .or(self.filesize_approx.map(|s| (s, true)))
    }
}

/// Media information with the full format catalog (worst to best)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    pub id: String,
    pub title: String,
    pub formats: Vec<FormatDescriptor>,
}

/// Streams to fetch for one download, as decided by the format selector
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionPlan {
    composite_id: String,
    components: Vec<FormatDescriptor>,
    extension: String,
}

impl SelectionPlan {
    /// Plan fetching a single descriptor as-is
    pub(crate) fn single(format: FormatDescriptor) -> Self {
        Self {
            composite_id: format.id.clone(),
            extension: format.extension.clone(),
            components: vec![format],
        }
    }

    /// Plan merging a video-only stream with an audio-only stream
    pub(crate) fn mixed(video: FormatDescriptor, audio: FormatDescriptor) -> Self {
        Self {
            composite_id: format!("{}+{}", video.id, audio.id),
            extension: video.extension.clone(),
            components: vec![video, audio],
        }
    }

    /// Format spec handed to yt-dlp (`-f`)
    pub fn composite_id(&self) -> &str {
        &self.composite_id
    }

    pub fn components(&self) -> &[FormatDescriptor] {
        &self.components
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn is_mixed(&self) -> bool {
        self.components.len() > 1
    }
}

/// Whether the run targets DRM-protected content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadMode {
    #[default]
    Plain,
    Drm,
}

/// Parameters for one yt-dlp download invocation
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    /// yt-dlp format spec, e.g. "18+140"
    pub format_spec: String,
    /// yt-dlp output template (`-o`)
    pub output_template: String,
    /// Keep encrypted formats selectable
    pub allow_unplayable_formats: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_kinds() {
        let video = FormatDescriptor::new("137", "mp4", "avc1.640028", "none");
        let audio = FormatDescriptor::new("140", "m4a", "none", "mp4a.40.2");
        let muxed = FormatDescriptor::new("18", "mp4", "avc1.42001E", "mp4a.40.2");

        assert!(video.is_video_only());
        assert!(!video.is_audio_only());
        assert!(audio.is_audio_only());
        assert!(!muxed.is_video_only());
        assert!(!muxed.is_audio_only());
    }

    #[test]
    fn test_mixed_plan_takes_video_extension() {
        let plan = SelectionPlan::mixed(
            FormatDescriptor::new("248", "webm", "vp9", "none"),
            FormatDescriptor::new("251", "webm", "none", "opus"),
        );

        assert_eq!(plan.composite_id(), "248+251");
        assert_eq!(plan.extension(), "webm");
        assert!(plan.is_mixed());
    }

    #[test]
    fn test_effective_size_prefers_exact() {
        let mut f = FormatDescriptor::new("1", "mp4", "h264", "aac");
        f.filesize_approx = Some(10);
        assert_eq!(f.effective_size(), Some((10, true)));
        f.filesize = Some(12);
        assert_eq!(f.effective_size(), Some((12, false)));
    }
}
