// FormatSelector - turns a requested format id into a download plan
//
// Given the format catalog of a source (worst to best), it:
// - Looks up the requested format id
// - Leaves complete or audio formats untouched
// - Pairs a video-only format with an audio-only stream of a compatible container
//
// Audio matching is first-match in catalog order, not best-quality.

use log::{debug, info};

use super::errors::DownloadError;
use super::models::{FormatDescriptor, SelectionPlan};

/// Video extension -> audio extension that merges into the same container
const AUDIO_FOR_VIDEO_EXT: &[(&str, &str)] = &[("mp4", "m4a"), ("webm", "webm")];

/// Format selector with automatic audio mixing
pub struct FormatSelector;

impl FormatSelector {
    /// Build the plan for `target_format_id` from `catalog`
    pub fn select(
        target_format_id: &str,
        catalog: &[FormatDescriptor],
        auto_mix_audio: bool,
    ) -> Result<SelectionPlan, DownloadError> {
        let target = catalog
            .iter()
            .find(|f| f.id == target_format_id)
            .ok_or_else(|| DownloadError::FormatNotFound {
                requested_id: target_format_id.to_string(),
            })?;

        if !target.is_video_only() || !auto_mix_audio {
            debug!(
                "[Selector] Using format {} as-is (video only: {}, auto mix: {})",
                target.id,
                target.is_video_only(),
                auto_mix_audio
            );
            return Ok(SelectionPlan::single(target.clone()));
        }

        info!("[Selector] Try auto mixing audio ...");
        let audio_ext = Self::matching_audio_extension(&target.extension)?;
        info!("[Selector] Matched audio ext: {}", audio_ext);

        let audio = Self::find_audio(catalog, audio_ext).ok_or_else(|| {
            DownloadError::AudioNotFound {
                required_extension: audio_ext.to_string(),
            }
        })?;
        info!("[Selector] Audio id found: {}", audio.id);

        let plan = SelectionPlan::mixed(target.clone(), audio.clone());
        info!("[Selector] Mixed format id: {}", plan.composite_id());
        Ok(plan)
    }

    /// Audio extension that can be merged into a video of extension `video_ext`
    pub fn matching_audio_extension(video_ext: &str) -> Result<&'static str, DownloadError> {
        AUDIO_FOR_VIDEO_EXT
            .iter()
            .find(|(video, _)| *video == video_ext)
            .map(|(_, audio)| *audio)
            .ok_or_else(|| DownloadError::UnsupportedContainer {
                extension: video_ext.to_string(),
            })
    }

    /// First audio-only format with the given extension, in catalog order
    fn find_audio<'a>(catalog: &'a [FormatDescriptor], ext: &str) -> Option<&'a FormatDescriptor> {
        catalog
            .iter()
            .find(|f| f.is_audio_only() && f.extension == ext)
    }
}
